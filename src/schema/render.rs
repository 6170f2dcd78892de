//! Component I: renders schema objects back to RFC 4512 description
//! text, in either of two styles (spec §4.I).

use crate::schema::model::{
    AttributeType, DitContentRule, DitStructureRule, LdapSyntax, MatchingRule, MatchingRuleUse,
    NameForm, ObjectClass, ObjectClassKind, Usage,
};

/// Which textual convention to render in.
///
/// `SubschemaSubentry` matches what a directory server publishes at
/// `cn=subschema`: no leading type keyword, compact single-line form,
/// with the owning schema name appended as an `X-SCHEMA` extension.
/// `OpenLdapPretty` matches `slapcat -f`-style `slapd.conf`/`.schema`
/// output: a leading type keyword, one element per line, no
/// `X-SCHEMA`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderStyle {
    SubschemaSubentry,
    OpenLdapPretty,
}

impl RenderStyle {
    fn start_with_schema_type(self) -> bool {
        matches!(self, RenderStyle::OpenLdapPretty)
    }

    fn pretty_print(self) -> bool {
        matches!(self, RenderStyle::OpenLdapPretty)
    }

    fn print_schema_name(self) -> bool {
        matches!(self, RenderStyle::SubschemaSubentry)
    }
}

pub struct Renderer {
    style: RenderStyle,
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Renderer { style }
    }

    fn assemble(&self, keyword: &str, oid: &str, elements: Vec<String>) -> String {
        let mut out = String::new();
        if self.style.start_with_schema_type() {
            out.push_str(keyword);
            out.push(' ');
        }
        out.push('(');
        if self.style.pretty_print() {
            out.push('\n');
            out.push_str(&format!("\t{}\n", oid));
            for e in &elements {
                out.push_str(&format!("\t{}\n", e));
            }
            out.push(')');
        } else {
            out.push(' ');
            out.push_str(oid);
            for e in &elements {
                out.push(' ');
                out.push_str(e);
            }
            out.push_str(" )");
        }
        out
    }

    fn extensions(&self, envelope: &crate::schema::model::Envelope) -> Vec<String> {
        let mut pairs: Vec<(&str, &[String])> = envelope.extensions().collect();
        pairs.sort_by_key(|(k, _)| *k);
        let mut out: Vec<String> = pairs
            .into_iter()
            .map(|(key, values)| format!("{} {}", key, render_qdescrs(values)))
            .collect();
        if self.style.print_schema_name() {
            if let Some(name) = envelope.schema_name() {
                out.push(format!("X-SCHEMA {}", render_qdstring(name)));
            }
        }
        out
    }
}

fn escape_qdstring(s: &str) -> String {
    let mut out = String::new();
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\5C"),
            '\'' => out.push_str("\\27"),
            other => out.push(other),
        }
    }
    out
}

fn render_qdstring(s: &str) -> String {
    format!("'{}'", escape_qdstring(s))
}

fn render_qdescrs(names: &[String]) -> String {
    if names.len() == 1 {
        render_qdstring(&names[0])
    } else {
        format!("( {} )", names.iter().map(|n| render_qdstring(n)).collect::<Vec<_>>().join(" "))
    }
}

fn render_oids(oids: &[String]) -> String {
    if oids.len() == 1 {
        oids[0].clone()
    } else {
        format!("( {} )", oids.join(" $ "))
    }
}

impl Renderer {
    pub fn render_attribute_type(&self, at: &AttributeType) -> String {
        let mut elements = Vec::new();
        if !at.envelope.names().is_empty() {
            elements.push(format!("NAME {}", render_qdescrs(at.envelope.names())));
        }
        if let Some(desc) = at.envelope.description() {
            elements.push(format!("DESC {}", render_qdstring(desc)));
        }
        if at.envelope.obsolete() {
            elements.push("OBSOLETE".to_string());
        }
        if let Some(sup) = &at.superior {
            elements.push(format!("SUP {}", sup));
        }
        if let Some(eq) = &at.equality {
            elements.push(format!("EQUALITY {}", eq));
        }
        if let Some(ord) = &at.ordering {
            elements.push(format!("ORDERING {}", ord));
        }
        if let Some(sub) = &at.substring {
            elements.push(format!("SUBSTR {}", sub));
        }
        if let Some(syntax) = &at.syntax {
            match at.syntax_len {
                Some(len) => elements.push(format!("SYNTAX {}{{{}}}", syntax, len)),
                None => elements.push(format!("SYNTAX {}", syntax)),
            }
        }
        if at.single_valued {
            elements.push("SINGLE-VALUE".to_string());
        }
        if at.collective {
            elements.push("COLLECTIVE".to_string());
        }
        if !at.user_modifiable {
            elements.push("NO-USER-MODIFICATION".to_string());
        }
        if at.usage != Usage::UserApplications {
            let usage = match at.usage {
                Usage::UserApplications => unreachable!(),
                Usage::DirectoryOperation => "directoryOperation",
                Usage::DistributedOperation => "distributedOperation",
                Usage::DsaOperation => "dSAOperation",
            };
            elements.push(format!("USAGE {}", usage));
        }
        elements.extend(self.extensions(&at.envelope));
        self.assemble("attributetype", at.envelope.oid(), elements)
    }

    pub fn render_object_class(&self, oc: &ObjectClass) -> String {
        let mut elements = Vec::new();
        if !oc.envelope.names().is_empty() {
            elements.push(format!("NAME {}", render_qdescrs(oc.envelope.names())));
        }
        if let Some(desc) = oc.envelope.description() {
            elements.push(format!("DESC {}", render_qdstring(desc)));
        }
        if oc.envelope.obsolete() {
            elements.push("OBSOLETE".to_string());
        }
        if !oc.superiors.is_empty() {
            elements.push(format!("SUP {}", render_oids(&oc.superiors)));
        }
        elements.push(
            match oc.kind {
                ObjectClassKind::Abstract => "ABSTRACT",
                ObjectClassKind::Structural => "STRUCTURAL",
                ObjectClassKind::Auxiliary => "AUXILIARY",
            }
            .to_string(),
        );
        if !oc.must.is_empty() {
            elements.push(format!("MUST {}", render_oids(&oc.must)));
        }
        if !oc.may.is_empty() {
            elements.push(format!("MAY {}", render_oids(&oc.may)));
        }
        elements.extend(self.extensions(&oc.envelope));
        self.assemble("objectclass", oc.envelope.oid(), elements)
    }

    pub fn render_matching_rule(&self, mr: &MatchingRule) -> String {
        let mut elements = Vec::new();
        if !mr.envelope.names().is_empty() {
            elements.push(format!("NAME {}", render_qdescrs(mr.envelope.names())));
        }
        if let Some(desc) = mr.envelope.description() {
            elements.push(format!("DESC {}", render_qdstring(desc)));
        }
        if mr.envelope.obsolete() {
            elements.push("OBSOLETE".to_string());
        }
        elements.push(format!("SYNTAX {}", mr.syntax_oid));
        elements.extend(self.extensions(&mr.envelope));
        self.assemble("matchingrule", mr.envelope.oid(), elements)
    }

    pub fn render_ldap_syntax(&self, syntax: &LdapSyntax) -> String {
        let mut elements = Vec::new();
        if let Some(desc) = syntax.envelope.description() {
            elements.push(format!("DESC {}", render_qdstring(desc)));
        }
        elements.extend(self.extensions(&syntax.envelope));
        self.assemble("ldapsyntax", syntax.envelope.oid(), elements)
    }

    pub fn render_dit_content_rule(&self, dcr: &DitContentRule) -> String {
        let mut elements = Vec::new();
        if !dcr.envelope.names().is_empty() {
            elements.push(format!("NAME {}", render_qdescrs(dcr.envelope.names())));
        }
        if let Some(desc) = dcr.envelope.description() {
            elements.push(format!("DESC {}", render_qdstring(desc)));
        }
        if dcr.envelope.obsolete() {
            elements.push("OBSOLETE".to_string());
        }
        if !dcr.aux.is_empty() {
            elements.push(format!("AUX {}", render_oids(&dcr.aux)));
        }
        if !dcr.must.is_empty() {
            elements.push(format!("MUST {}", render_oids(&dcr.must)));
        }
        if !dcr.may.is_empty() {
            elements.push(format!("MAY {}", render_oids(&dcr.may)));
        }
        if !dcr.not.is_empty() {
            elements.push(format!("NOT {}", render_oids(&dcr.not)));
        }
        elements.extend(self.extensions(&dcr.envelope));
        self.assemble("ditcontentrule", dcr.envelope.oid(), elements)
    }

    pub fn render_dit_structure_rule(&self, dsr: &DitStructureRule) -> String {
        let mut elements = Vec::new();
        if !dsr.envelope.names().is_empty() {
            elements.push(format!("NAME {}", render_qdescrs(dsr.envelope.names())));
        }
        if let Some(desc) = dsr.envelope.description() {
            elements.push(format!("DESC {}", render_qdstring(desc)));
        }
        if dsr.envelope.obsolete() {
            elements.push("OBSOLETE".to_string());
        }
        elements.push(format!("FORM {}", dsr.form));
        if !dsr.super_rules.is_empty() {
            let rules: Vec<String> = dsr.super_rules.iter().map(|r| r.to_string()).collect();
            elements.push(format!("SUP {}", render_oids(&rules)));
        }
        elements.extend(self.extensions(&dsr.envelope));
        self.assemble("ditstructurerule", dsr.envelope.oid(), elements)
    }

    pub fn render_name_form(&self, nf: &NameForm) -> String {
        let mut elements = Vec::new();
        if !nf.envelope.names().is_empty() {
            elements.push(format!("NAME {}", render_qdescrs(nf.envelope.names())));
        }
        if let Some(desc) = nf.envelope.description() {
            elements.push(format!("DESC {}", render_qdstring(desc)));
        }
        if nf.envelope.obsolete() {
            elements.push("OBSOLETE".to_string());
        }
        elements.push(format!("OC {}", nf.structural_oc));
        if !nf.must.is_empty() {
            elements.push(format!("MUST {}", render_oids(&nf.must)));
        }
        if !nf.may.is_empty() {
            elements.push(format!("MAY {}", render_oids(&nf.may)));
        }
        elements.extend(self.extensions(&nf.envelope));
        self.assemble("nameform", nf.envelope.oid(), elements)
    }

    pub fn render_matching_rule_use(&self, mru: &MatchingRuleUse) -> String {
        let mut elements = Vec::new();
        if !mru.envelope.names().is_empty() {
            elements.push(format!("NAME {}", render_qdescrs(mru.envelope.names())));
        }
        if let Some(desc) = mru.envelope.description() {
            elements.push(format!("DESC {}", render_qdstring(desc)));
        }
        if mru.envelope.obsolete() {
            elements.push("OBSOLETE".to_string());
        }
        if !mru.applies_to.is_empty() {
            elements.push(format!("APPLIES {}", render_oids(&mru.applies_to)));
        }
        elements.extend(self.extensions(&mru.envelope));
        self.assemble("matchingruleuse", mru.envelope.oid(), elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::AttributeType;

    #[test]
    fn subschema_style_is_compact_without_keyword() {
        let mut at = AttributeType::new("2.5.4.3");
        at.envelope.add_name("cn").unwrap();
        at.syntax = Some("1.3.6.1.4.1.1466.115.121.1.15".to_string());
        at.syntax_len = Some(64);
        let rendered = Renderer::new(RenderStyle::SubschemaSubentry).render_attribute_type(&at);
        assert_eq!(
            rendered,
            "( 2.5.4.3 NAME 'cn' SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{64} )"
        );
    }

    #[test]
    fn openldap_pretty_starts_with_keyword_and_is_multiline() {
        let mut at = AttributeType::new("2.5.4.3");
        at.envelope.add_name("cn").unwrap();
        let rendered = Renderer::new(RenderStyle::OpenLdapPretty).render_attribute_type(&at);
        assert!(rendered.starts_with("attributetype (\n"));
        assert!(rendered.contains("\tNAME 'cn'\n"));
    }

    #[test]
    fn qdstring_escapes_quote_and_backslash() {
        assert_eq!(render_qdstring(r"a'b\c"), r"'a\27b\5Cc'");
    }

    #[test]
    fn multi_name_qdescrs_is_parenthesized() {
        assert_eq!(
            render_qdescrs(&["cn".to_string(), "commonName".to_string()]),
            "( 'cn' 'commonName' )"
        );
    }
}
