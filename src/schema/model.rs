//! Component F: the schema object model (spec §3, §4.F).

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Which concrete schema object an [`Envelope`] belongs to; used only
/// by `lock()`'s hash and by structural equality, since those are
/// defined over the envelope alone (spec §4.F).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ObjectKind {
    AttributeType,
    ObjectClass,
    MatchingRule,
    LdapSyntax,
    DitContentRule,
    DitStructureRule,
    NameForm,
    MatchingRuleUse,
}

/// The common envelope shared by every schema object type: `{ oid,
/// names[], description?, obsolete, extensions, schema_name?, enabled,
/// read_only, locked }`.
///
/// `lock()` computes a stable hash over the envelope fields and
/// rejects further mutation with [`Error::ReadOnly`]; `unlock()`
/// reverses that for administrative rebuilds.
#[derive(Clone, Debug)]
pub struct Envelope {
    kind: ObjectKind,
    oid: String,
    names: Vec<String>,
    description: Option<String>,
    obsolete: bool,
    extensions: HashMap<String, Vec<String>>,
    schema_name: Option<String>,
    enabled: bool,
    read_only: bool,
    locked: bool,
    lock_hash: Option<u64>,
}

impl Envelope {
    pub fn new(kind: ObjectKind, oid: impl Into<String>) -> Self {
        Envelope {
            kind,
            oid: oid.into(),
            names: Vec::new(),
            description: None,
            obsolete: false,
            extensions: HashMap::new(),
            schema_name: None,
            enabled: true,
            read_only: false,
            locked: false,
            lock_hash: None,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// Overwrites the OID. Used only by the OpenLDAP macro resolution
    /// pass, which parses attribute types and object classes with
    /// their macro-reference OID still unresolved and rewrites it once
    /// the whole file (and its macro table) has been read.
    pub fn set_oid(&mut self, oid: impl Into<String>) -> Result<()> {
        self.check_unlocked()?;
        self.oid = oid.into();
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Appends `name`, order-preserving, unless a case-insensitively
    /// equal name is already present.
    pub fn add_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.check_unlocked()?;
        let name = name.into();
        if !self.names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            self.names.push(name);
        }
        Ok(())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<()> {
        self.check_unlocked()?;
        self.description = Some(description.into());
        Ok(())
    }

    pub fn obsolete(&self) -> bool {
        self.obsolete
    }

    pub fn set_obsolete(&mut self, obsolete: bool) -> Result<()> {
        self.check_unlocked()?;
        self.obsolete = obsolete;
        Ok(())
    }

    /// Replaces (or inserts) the extension under `key`, uppercased.
    pub fn add_extension(&mut self, key: impl AsRef<str>, values: Vec<String>) -> Result<()> {
        self.check_unlocked()?;
        self.extensions.insert(key.as_ref().to_ascii_uppercase(), values);
        Ok(())
    }

    pub fn get_extension(&self, key: &str) -> Option<&[String]> {
        self.extensions.get(&key.to_ascii_uppercase()).map(|v| v.as_slice())
    }

    pub fn has_extension(&self, key: &str) -> bool {
        self.extensions.contains_key(&key.to_ascii_uppercase())
    }

    /// Every extension key (already uppercased) and its values, in no
    /// particular order; callers that need determinism (the renderer)
    /// sort the result themselves.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.extensions.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    pub fn set_schema_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.check_unlocked()?;
        self.schema_name = Some(name.into());
        Ok(())
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.check_unlocked()?;
        self.enabled = enabled;
        Ok(())
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) -> Result<()> {
        self.check_unlocked()?;
        self.read_only = read_only;
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn check_unlocked(&self) -> Result<()> {
        if self.locked {
            Err(Error::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Computes a stable hash over (OID, kind, names, schema_name,
    /// enabled/read-only, description, extensions) and sets the
    /// locked flag. Idempotent.
    pub fn lock(&mut self) {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        self.oid.hash(&mut hasher);
        self.kind.hash(&mut hasher);
        self.names.hash(&mut hasher);
        self.schema_name.hash(&mut hasher);
        self.enabled.hash(&mut hasher);
        self.read_only.hash(&mut hasher);
        self.description.as_deref().map(str::to_ascii_lowercase).hash(&mut hasher);
        let mut ext: Vec<_> = self.extensions.iter().collect();
        ext.sort_by(|a, b| a.0.cmp(b.0));
        ext.hash(&mut hasher);
        self.lock_hash = Some(hasher.finish());
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        self.lock_hash = None;
    }

    pub fn lock_hash(&self) -> Option<u64> {
        self.lock_hash
    }
}

/// Structural equality on (OID, kind, names-as-a-set, schema_name,
/// enabled, obsolete, read_only, description case-insensitive,
/// extensions). Deliberately excludes type-specific fields (SYNTAX,
/// MUST/MAY, ...): the OID alone is insufficient since the same OID
/// may appear in different schema states during migration, but the
/// envelope is the unit of comparison, not the full grammar (spec
/// §4.F).
impl PartialEq for Envelope {
    fn eq(&self, other: &Self) -> bool {
        use std::collections::HashSet;
        let names_a: HashSet<String> = self.names.iter().map(|n| n.to_ascii_lowercase()).collect();
        let names_b: HashSet<String> = other.names.iter().map(|n| n.to_ascii_lowercase()).collect();
        self.oid == other.oid
            && self.kind == other.kind
            && names_a == names_b
            && self.schema_name == other.schema_name
            && self.enabled == other.enabled
            && self.obsolete == other.obsolete
            && self.read_only == other.read_only
            && self
                .description
                .as_deref()
                .map(str::to_ascii_lowercase)
                == other.description.as_deref().map(str::to_ascii_lowercase)
            && self.extensions == other.extensions
    }
}

impl Eq for Envelope {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Usage {
    UserApplications,
    DirectoryOperation,
    DistributedOperation,
    DsaOperation,
}

impl Default for Usage {
    fn default() -> Self {
        Usage::UserApplications
    }
}

#[derive(Clone, Debug)]
pub struct AttributeType {
    pub envelope: Envelope,
    pub superior: Option<String>,
    pub equality: Option<String>,
    pub ordering: Option<String>,
    pub substring: Option<String>,
    pub syntax: Option<String>,
    pub syntax_len: Option<i64>,
    pub single_valued: bool,
    pub collective: bool,
    pub user_modifiable: bool,
    pub usage: Usage,
}

impl AttributeType {
    pub fn new(oid: impl Into<String>) -> Self {
        AttributeType {
            envelope: Envelope::new(ObjectKind::AttributeType, oid),
            superior: None,
            equality: None,
            ordering: None,
            substring: None,
            syntax: None,
            syntax_len: None,
            single_valued: false,
            collective: false,
            user_modifiable: true,
            usage: Usage::UserApplications,
        }
    }
}

impl PartialEq for AttributeType {
    fn eq(&self, other: &Self) -> bool {
        self.envelope == other.envelope
    }
}

impl Eq for AttributeType {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ObjectClassKind {
    Abstract,
    Structural,
    Auxiliary,
}

impl Default for ObjectClassKind {
    fn default() -> Self {
        ObjectClassKind::Structural
    }
}

#[derive(Clone, Debug)]
pub struct ObjectClass {
    pub envelope: Envelope,
    pub superiors: Vec<String>,
    pub kind: ObjectClassKind,
    pub must: Vec<String>,
    pub may: Vec<String>,
}

impl ObjectClass {
    pub fn new(oid: impl Into<String>) -> Self {
        ObjectClass {
            envelope: Envelope::new(ObjectKind::ObjectClass, oid),
            superiors: Vec::new(),
            kind: ObjectClassKind::Structural,
            must: Vec::new(),
            may: Vec::new(),
        }
    }
}

impl PartialEq for ObjectClass {
    fn eq(&self, other: &Self) -> bool {
        self.envelope == other.envelope
    }
}

impl Eq for ObjectClass {}

#[derive(Clone, Debug)]
pub struct MatchingRule {
    pub envelope: Envelope,
    pub syntax_oid: String,
}

impl MatchingRule {
    pub fn new(oid: impl Into<String>, syntax_oid: impl Into<String>) -> Self {
        MatchingRule {
            envelope: Envelope::new(ObjectKind::MatchingRule, oid),
            syntax_oid: syntax_oid.into(),
        }
    }
}

impl PartialEq for MatchingRule {
    fn eq(&self, other: &Self) -> bool {
        self.envelope == other.envelope
    }
}

impl Eq for MatchingRule {}

#[derive(Clone, Debug)]
pub struct LdapSyntax {
    pub envelope: Envelope,
    pub human_readable: bool,
}

impl LdapSyntax {
    pub fn new(oid: impl Into<String>) -> Self {
        LdapSyntax {
            envelope: Envelope::new(ObjectKind::LdapSyntax, oid),
            human_readable: true,
        }
    }
}

impl PartialEq for LdapSyntax {
    fn eq(&self, other: &Self) -> bool {
        self.envelope == other.envelope
    }
}

impl Eq for LdapSyntax {}

#[derive(Clone, Debug)]
pub struct DitContentRule {
    pub envelope: Envelope,
    pub aux: Vec<String>,
    pub must: Vec<String>,
    pub may: Vec<String>,
    pub not: Vec<String>,
}

impl DitContentRule {
    pub fn new(oid: impl Into<String>) -> Self {
        DitContentRule {
            envelope: Envelope::new(ObjectKind::DitContentRule, oid),
            aux: Vec::new(),
            must: Vec::new(),
            may: Vec::new(),
            not: Vec::new(),
        }
    }
}

impl PartialEq for DitContentRule {
    fn eq(&self, other: &Self) -> bool {
        self.envelope == other.envelope
    }
}

impl Eq for DitContentRule {}

#[derive(Clone, Debug)]
pub struct DitStructureRule {
    pub envelope: Envelope,
    pub rule_id: u32,
    pub form: String,
    pub super_rules: Vec<u32>,
}

impl DitStructureRule {
    pub fn new(rule_id: u32, form: impl Into<String>) -> Self {
        DitStructureRule {
            envelope: Envelope::new(ObjectKind::DitStructureRule, rule_id.to_string()),
            rule_id,
            form: form.into(),
            super_rules: Vec::new(),
        }
    }
}

impl PartialEq for DitStructureRule {
    fn eq(&self, other: &Self) -> bool {
        self.envelope == other.envelope
    }
}

impl Eq for DitStructureRule {}

#[derive(Clone, Debug)]
pub struct NameForm {
    pub envelope: Envelope,
    pub structural_oc: String,
    pub must: Vec<String>,
    pub may: Vec<String>,
}

impl NameForm {
    pub fn new(oid: impl Into<String>, structural_oc: impl Into<String>) -> Self {
        NameForm {
            envelope: Envelope::new(ObjectKind::NameForm, oid),
            structural_oc: structural_oc.into(),
            must: Vec::new(),
            may: Vec::new(),
        }
    }
}

impl PartialEq for NameForm {
    fn eq(&self, other: &Self) -> bool {
        self.envelope == other.envelope
    }
}

impl Eq for NameForm {}

#[derive(Clone, Debug)]
pub struct MatchingRuleUse {
    pub envelope: Envelope,
    pub applies_to: Vec<String>,
}

impl MatchingRuleUse {
    pub fn new(oid: impl Into<String>) -> Self {
        MatchingRuleUse {
            envelope: Envelope::new(ObjectKind::MatchingRuleUse, oid),
            applies_to: Vec::new(),
        }
    }
}

impl PartialEq for MatchingRuleUse {
    fn eq(&self, other: &Self) -> bool {
        self.envelope == other.envelope
    }
}

impl Eq for MatchingRuleUse {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_rejects_further_mutation() {
        let mut env = Envelope::new(ObjectKind::AttributeType, "2.5.4.3");
        env.add_name("cn").unwrap();
        env.lock();
        assert!(env.is_locked());
        assert!(matches!(env.add_name("commonName"), Err(Error::ReadOnly)));
        env.unlock();
        assert!(env.add_name("commonName").is_ok());
    }

    #[test]
    fn equality_ignores_name_order() {
        let mut a = Envelope::new(ObjectKind::AttributeType, "2.5.4.3");
        a.add_name("cn").unwrap();
        a.add_name("commonName").unwrap();
        let mut b = Envelope::new(ObjectKind::AttributeType, "2.5.4.3");
        b.add_name("commonName").unwrap();
        b.add_name("cn").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn equality_is_case_insensitive_on_description() {
        let mut a = Envelope::new(ObjectKind::AttributeType, "2.5.4.3");
        a.set_description("Common Name").unwrap();
        let mut b = Envelope::new(ObjectKind::AttributeType, "2.5.4.3");
        b.set_description("common name").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn attribute_type_equality_ignores_grammar_fields() {
        let mut a = AttributeType::new("2.5.4.3");
        a.syntax = Some("1.3.6.1.4.1.1466.115.121.1.15".to_string());
        let b = AttributeType::new("2.5.4.3");
        assert_eq!(a, b);
    }
}
