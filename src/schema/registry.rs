//! Schema object registries, keyed by OID with a secondary
//! case-insensitive name index for the two types callers look up by
//! name far more often than by OID (spec §4.F, §9).

use crate::schema::model::{
    AttributeType, DitContentRule, DitStructureRule, LdapSyntax, MatchingRule, MatchingRuleUse,
    NameForm, ObjectClass,
};
use std::collections::HashMap;

/// Holds one kind of schema object, keyed by OID, with a
/// case-insensitive name index built from `names()`.
#[derive(Default)]
pub struct NamedRegistry<T> {
    by_oid: HashMap<String, T>,
    name_to_oid: HashMap<String, String>,
}

impl<T> NamedRegistry<T> {
    pub fn new() -> Self {
        NamedRegistry {
            by_oid: HashMap::new(),
            name_to_oid: HashMap::new(),
        }
    }

    pub fn insert(&mut self, oid: impl Into<String>, names: &[String], value: T) {
        let oid = oid.into();
        for name in names {
            self.name_to_oid.insert(name.to_ascii_lowercase(), oid.clone());
        }
        self.by_oid.insert(oid, value);
    }

    pub fn get_by_oid(&self, oid: &str) -> Option<&T> {
        self.by_oid.get(oid)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        let oid = self.name_to_oid.get(&name.to_ascii_lowercase())?;
        self.by_oid.get(oid)
    }

    /// Looks up by either a numeric OID or a name, since both appear
    /// interchangeably in schema descriptions (a SUP/SYNTAX reference
    /// may use either form).
    pub fn get(&self, oid_or_name: &str) -> Option<&T> {
        self.get_by_oid(oid_or_name).or_else(|| self.get_by_name(oid_or_name))
    }

    pub fn len(&self) -> usize {
        self.by_oid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_oid.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.by_oid.values()
    }
}

/// A complete set of schema object registries: one per RFC 4512 schema
/// object type, holding the state a `SubschemaSubentry` would publish.
#[derive(Default)]
pub struct SchemaRegistry {
    pub attribute_types: NamedRegistry<AttributeType>,
    pub object_classes: NamedRegistry<ObjectClass>,
    pub matching_rules: NamedRegistry<MatchingRule>,
    pub syntaxes: NamedRegistry<LdapSyntax>,
    pub dit_content_rules: NamedRegistry<DitContentRule>,
    pub name_forms: NamedRegistry<NameForm>,
    pub matching_rule_uses: NamedRegistry<MatchingRuleUse>,
    pub dit_structure_rules: HashMap<u32, DitStructureRule>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    pub fn insert_attribute_type(&mut self, at: AttributeType) {
        let oid = at.envelope.oid().to_string();
        let names = at.envelope.names().to_vec();
        self.attribute_types.insert(oid, &names, at);
    }

    pub fn insert_object_class(&mut self, oc: ObjectClass) {
        let oid = oc.envelope.oid().to_string();
        let names = oc.envelope.names().to_vec();
        self.object_classes.insert(oid, &names, oc);
    }

    pub fn insert_matching_rule(&mut self, mr: MatchingRule) {
        let oid = mr.envelope.oid().to_string();
        let names = mr.envelope.names().to_vec();
        self.matching_rules.insert(oid, &names, mr);
    }

    pub fn insert_syntax(&mut self, syntax: LdapSyntax) {
        let oid = syntax.envelope.oid().to_string();
        self.syntaxes.insert(oid, &[], syntax);
    }

    pub fn insert_dit_content_rule(&mut self, dcr: DitContentRule) {
        let oid = dcr.envelope.oid().to_string();
        let names = dcr.envelope.names().to_vec();
        self.dit_content_rules.insert(oid, &names, dcr);
    }

    pub fn insert_name_form(&mut self, nf: NameForm) {
        let oid = nf.envelope.oid().to_string();
        let names = nf.envelope.names().to_vec();
        self.name_forms.insert(oid, &names, nf);
    }

    pub fn insert_matching_rule_use(&mut self, mru: MatchingRuleUse) {
        let oid = mru.envelope.oid().to_string();
        let names = mru.envelope.names().to_vec();
        self.matching_rule_uses.insert(oid, &names, mru);
    }

    pub fn insert_dit_structure_rule(&mut self, dsr: DitStructureRule) {
        self.dit_structure_rules.insert(dsr.rule_id, dsr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_type_looked_up_by_name_or_oid() {
        let mut registry = SchemaRegistry::new();
        let mut at = AttributeType::new("2.5.4.3");
        at.envelope.add_name("cn").unwrap();
        at.envelope.add_name("commonName").unwrap();
        registry.insert_attribute_type(at);

        assert!(registry.attribute_types.get_by_oid("2.5.4.3").is_some());
        assert!(registry.attribute_types.get_by_name("CN").is_some());
        assert!(registry.attribute_types.get("commonname").is_some());
        assert!(registry.attribute_types.get_by_name("sn").is_none());
    }
}
