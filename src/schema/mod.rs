//! Components F, G, and I: the schema object model, its RFC 4512 /
//! OpenLDAP parsers, and the schema renderer (spec §4.F, §4.G, §4.I).

pub mod model;
pub mod parser;
pub mod registry;
pub mod render;

pub use model::{
    AttributeType, DitContentRule, DitStructureRule, Envelope, LdapSyntax, MatchingRule,
    MatchingRuleUse, NameForm, ObjectClass, ObjectClassKind, ObjectKind, Usage,
};
pub use registry::{NamedRegistry, SchemaRegistry};
pub use render::{RenderStyle, Renderer};
