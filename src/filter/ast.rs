//! RFC 4515 filter AST (spec §3, §4.E).

use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substrings {
    pub initial: Option<Value>,
    pub any: Vec<Value>,
    pub final_: Option<Value>,
}

/// A sum type over every filter construct plus `Undefined`, the
/// sentinel a schema-aware parse substitutes for an item referencing
/// an unknown attribute (spec §4.E "Undefined propagation").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    Present {
        attr: String,
    },
    Equality {
        attr: String,
        value: Value,
    },
    Approx {
        attr: String,
        value: Value,
    },
    GreaterEq {
        attr: String,
        value: Value,
    },
    LessEq {
        attr: String,
        value: Value,
    },
    Substring {
        attr: String,
        substrings: Substrings,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Extensible {
        attr: Option<String>,
        matching_rule: Option<String>,
        dn_attrs: bool,
        value: Value,
    },
    Undefined,
}

impl Filter {
    /// Builds an `And`, collapsing to `Undefined` if any child is
    /// `Undefined` (spec §3 invariant).
    pub fn and(children: Vec<Filter>) -> Filter {
        debug_assert!(!children.is_empty(), "filterList requires at least one filter");
        if children.iter().any(|c| matches!(c, Filter::Undefined)) {
            Filter::Undefined
        } else {
            Filter::And(children)
        }
    }

    /// Builds an `Or`, dropping `Undefined` children and collapsing to
    /// `Undefined` only if every child was `Undefined`.
    pub fn or(children: Vec<Filter>) -> Filter {
        debug_assert!(!children.is_empty(), "filterList requires at least one filter");
        let defined: Vec<Filter> = children
            .into_iter()
            .filter(|c| !matches!(c, Filter::Undefined))
            .collect();
        if defined.is_empty() {
            Filter::Undefined
        } else {
            Filter::Or(defined)
        }
    }
}
