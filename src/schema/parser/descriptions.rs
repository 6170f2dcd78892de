//! RFC 4512 LPAREN..RPAREN description grammars: `AttributeTypeDescription`,
//! `ObjectClassDescription`, `MatchingRuleDescription`,
//! `LDAPSyntaxDescription`, `DITContentRuleDescription`,
//! `DITStructureRuleDescription`, `NameFormDescription`, and
//! `MatchingRuleUseDescription` (spec §4.G).

use super::{parse_noidlen, parse_oid, parse_oids, parse_qdescrs, parse_qdstring, parse_qdstrings, SeenElements};
use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::schema::model::{
    AttributeType, DitContentRule, DitStructureRule, LdapSyntax, MatchingRule, MatchingRuleUse,
    NameForm, ObjectClass, ObjectClassKind, Usage,
};

fn parse_extension(lex: &mut Lexer, quirks: bool) -> Result<(String, Vec<String>)> {
    let start = lex.offset();
    lex.expect_char(b'X')?;
    lex.expect_char(b'-')?;
    while let Some(b) = lex.peek_char() {
        if crate::lexer::is_keychar(b, quirks) || b == b'_' {
            lex.next_char();
        } else {
            break;
        }
    }
    let key = lex.slice_from(start).to_string();
    lex.skip_whitespace(true)?;
    let values = parse_qdstrings(lex)?;
    Ok((key, values))
}

pub fn parse_attribute_type_description(s: &str, quirks: bool) -> Result<AttributeType> {
    const NAME: u32 = 1 << 0;
    const DESC: u32 = 1 << 1;
    const OBSOLETE: u32 = 1 << 2;
    const SUP: u32 = 1 << 3;
    const EQUALITY: u32 = 1 << 4;
    const ORDERING: u32 = 1 << 5;
    const SUBSTR: u32 = 1 << 6;
    const SYNTAX: u32 = 1 << 7;
    const SINGLE_VALUE: u32 = 1 << 8;
    const COLLECTIVE: u32 = 1 << 9;
    const NO_USER_MOD: u32 = 1 << 10;
    const USAGE: u32 = 1 << 11;

    let mut lex = Lexer::new(s.as_bytes());
    lex.expect_char(b'(')?;
    lex.skip_whitespace(true)?;
    let oid = parse_oid(&mut lex, quirks)?;
    let mut at = AttributeType::new(oid);
    let mut seen = SeenElements::new();

    loop {
        lex.skip_whitespace(true)?;
        if lex.peek_char() == Some(b')') {
            lex.next_char();
            break;
        }
        let pos = lex.position();
        if lex.eat("NAME") {
            seen.mark(NAME, "NAME", pos)?;
            lex.skip_whitespace(true)?;
            for name in parse_qdescrs(&mut lex, quirks)? {
                at.envelope.add_name(name)?;
            }
        } else if lex.eat("DESC") {
            seen.mark(DESC, "DESC", pos)?;
            lex.skip_whitespace(true)?;
            at.envelope.set_description(parse_qdstring(&mut lex)?)?;
        } else if lex.eat("OBSOLETE") {
            seen.mark(OBSOLETE, "OBSOLETE", pos)?;
            at.envelope.set_obsolete(true)?;
        } else if lex.eat("SUP") {
            seen.mark(SUP, "SUP", pos)?;
            lex.skip_whitespace(true)?;
            at.superior = Some(parse_oid(&mut lex, quirks)?);
        } else if lex.eat("EQUALITY") {
            seen.mark(EQUALITY, "EQUALITY", pos)?;
            lex.skip_whitespace(true)?;
            at.equality = Some(parse_oid(&mut lex, quirks)?);
        } else if lex.eat("ORDERING") {
            seen.mark(ORDERING, "ORDERING", pos)?;
            lex.skip_whitespace(true)?;
            at.ordering = Some(parse_oid(&mut lex, quirks)?);
        } else if lex.eat("SUBSTR") {
            seen.mark(SUBSTR, "SUBSTR", pos)?;
            lex.skip_whitespace(true)?;
            at.substring = Some(parse_oid(&mut lex, quirks)?);
        } else if lex.eat("SYNTAX") {
            seen.mark(SYNTAX, "SYNTAX", pos)?;
            lex.skip_whitespace(true)?;
            let (oid, len) = parse_noidlen(&mut lex, quirks)?;
            at.syntax = Some(oid);
            at.syntax_len = if len >= 0 { Some(len) } else { None };
        } else if lex.eat("SINGLE-VALUE") {
            seen.mark(SINGLE_VALUE, "SINGLE-VALUE", pos)?;
            at.single_valued = true;
        } else if lex.eat("COLLECTIVE") {
            seen.mark(COLLECTIVE, "COLLECTIVE", pos)?;
            at.collective = true;
        } else if lex.eat("NO-USER-MODIFICATION") {
            seen.mark(NO_USER_MOD, "NO-USER-MODIFICATION", pos)?;
            at.user_modifiable = false;
        } else if lex.eat("USAGE") {
            seen.mark(USAGE, "USAGE", pos)?;
            lex.skip_whitespace(true)?;
            at.usage = parse_usage(&mut lex)?;
        } else if lex.peek_char() == Some(b'X') {
            let (key, values) = parse_extension(&mut lex, quirks)?;
            at.envelope.add_extension(key, values)?;
        } else {
            return Err(Error::invalid_schema_description(pos, "unrecognized attribute type element"));
        }
    }

    if !quirks {
        if at.superior.is_none() && at.syntax.is_none() {
            return Err(Error::invalid_schema_description(
                lex.position(),
                "attribute type requires SUP or SYNTAX",
            ));
        }
        if at.collective && at.usage != Usage::UserApplications {
            return Err(Error::invalid_schema_description(
                lex.position(),
                "COLLECTIVE requires usage userApplications",
            ));
        }
        if !at.user_modifiable && at.usage == Usage::UserApplications {
            return Err(Error::invalid_schema_description(
                lex.position(),
                "NO-USER-MODIFICATION requires an operational USAGE",
            ));
        }
    }
    Ok(at)
}

fn parse_usage(lex: &mut Lexer) -> Result<Usage> {
    if lex.eat("userApplications") {
        Ok(Usage::UserApplications)
    } else if lex.eat("directoryOperation") {
        Ok(Usage::DirectoryOperation)
    } else if lex.eat("distributedOperation") {
        Ok(Usage::DistributedOperation)
    } else if lex.eat("dSAOperation") {
        Ok(Usage::DsaOperation)
    } else {
        Err(Error::invalid_schema_description(lex.position(), "unknown USAGE value"))
    }
}

pub fn parse_object_class_description(s: &str, quirks: bool) -> Result<ObjectClass> {
    const NAME: u32 = 1 << 0;
    const DESC: u32 = 1 << 1;
    const OBSOLETE: u32 = 1 << 2;
    const SUP: u32 = 1 << 3;
    const KIND: u32 = 1 << 4; // ABSTRACT/STRUCTURAL/AUXILIARY share one slot
    const MUST: u32 = 1 << 5;
    const MAY: u32 = 1 << 6;

    let mut lex = Lexer::new(s.as_bytes());
    lex.expect_char(b'(')?;
    lex.skip_whitespace(true)?;
    let oid = parse_oid(&mut lex, quirks)?;
    let mut oc = ObjectClass::new(oid);
    let mut seen = SeenElements::new();

    loop {
        lex.skip_whitespace(true)?;
        if lex.peek_char() == Some(b')') {
            lex.next_char();
            break;
        }
        let pos = lex.position();
        if lex.eat("NAME") {
            seen.mark(NAME, "NAME", pos)?;
            lex.skip_whitespace(true)?;
            for name in parse_qdescrs(&mut lex, quirks)? {
                oc.envelope.add_name(name)?;
            }
        } else if lex.eat("DESC") {
            seen.mark(DESC, "DESC", pos)?;
            lex.skip_whitespace(true)?;
            oc.envelope.set_description(parse_qdstring(&mut lex)?)?;
        } else if lex.eat("OBSOLETE") {
            seen.mark(OBSOLETE, "OBSOLETE", pos)?;
            oc.envelope.set_obsolete(true)?;
        } else if lex.eat("SUP") {
            seen.mark(SUP, "SUP", pos)?;
            lex.skip_whitespace(true)?;
            oc.superiors = parse_oids(&mut lex, quirks)?;
        } else if lex.eat("ABSTRACT") {
            seen.mark(KIND, "ABSTRACT/STRUCTURAL/AUXILIARY", pos)?;
            oc.kind = ObjectClassKind::Abstract;
        } else if lex.eat("STRUCTURAL") {
            seen.mark(KIND, "ABSTRACT/STRUCTURAL/AUXILIARY", pos)?;
            oc.kind = ObjectClassKind::Structural;
        } else if lex.eat("AUXILIARY") {
            seen.mark(KIND, "ABSTRACT/STRUCTURAL/AUXILIARY", pos)?;
            oc.kind = ObjectClassKind::Auxiliary;
        } else if lex.eat("MUST") {
            seen.mark(MUST, "MUST", pos)?;
            lex.skip_whitespace(true)?;
            oc.must = parse_oids(&mut lex, quirks)?;
        } else if lex.eat("MAY") {
            seen.mark(MAY, "MAY", pos)?;
            lex.skip_whitespace(true)?;
            oc.may = parse_oids(&mut lex, quirks)?;
        } else if lex.peek_char() == Some(b'X') {
            let (key, values) = parse_extension(&mut lex, quirks)?;
            oc.envelope.add_extension(key, values)?;
        } else {
            return Err(Error::invalid_schema_description(pos, "unrecognized object class element"));
        }
    }
    Ok(oc)
}

pub fn parse_matching_rule_description(s: &str, quirks: bool) -> Result<MatchingRule> {
    const NAME: u32 = 1 << 0;
    const DESC: u32 = 1 << 1;
    const OBSOLETE: u32 = 1 << 2;
    const SYNTAX: u32 = 1 << 3;

    let mut lex = Lexer::new(s.as_bytes());
    lex.expect_char(b'(')?;
    lex.skip_whitespace(true)?;
    let oid = parse_oid(&mut lex, quirks)?;
    let mut mr = MatchingRule::new(oid, String::new());
    let mut seen = SeenElements::new();

    loop {
        lex.skip_whitespace(true)?;
        if lex.peek_char() == Some(b')') {
            lex.next_char();
            break;
        }
        let pos = lex.position();
        if lex.eat("NAME") {
            seen.mark(NAME, "NAME", pos)?;
            lex.skip_whitespace(true)?;
            for name in parse_qdescrs(&mut lex, quirks)? {
                mr.envelope.add_name(name)?;
            }
        } else if lex.eat("DESC") {
            seen.mark(DESC, "DESC", pos)?;
            lex.skip_whitespace(true)?;
            mr.envelope.set_description(parse_qdstring(&mut lex)?)?;
        } else if lex.eat("OBSOLETE") {
            seen.mark(OBSOLETE, "OBSOLETE", pos)?;
            mr.envelope.set_obsolete(true)?;
        } else if lex.eat("SYNTAX") {
            seen.mark(SYNTAX, "SYNTAX", pos)?;
            lex.skip_whitespace(true)?;
            mr.syntax_oid = parse_oid(&mut lex, quirks)?;
        } else if lex.peek_char() == Some(b'X') {
            let (key, values) = parse_extension(&mut lex, quirks)?;
            mr.envelope.add_extension(key, values)?;
        } else {
            return Err(Error::invalid_schema_description(pos, "unrecognized matching rule element"));
        }
    }
    if mr.syntax_oid.is_empty() {
        return Err(Error::invalid_schema_description(lex.position(), "matching rule requires SYNTAX"));
    }
    Ok(mr)
}

pub fn parse_ldap_syntax_description(s: &str, quirks: bool) -> Result<LdapSyntax> {
    const DESC: u32 = 1 << 0;

    let mut lex = Lexer::new(s.as_bytes());
    lex.expect_char(b'(')?;
    lex.skip_whitespace(true)?;
    let oid = parse_oid(&mut lex, quirks)?;
    let mut syntax = LdapSyntax::new(oid);
    let mut seen = SeenElements::new();

    loop {
        lex.skip_whitespace(true)?;
        if lex.peek_char() == Some(b')') {
            lex.next_char();
            break;
        }
        let pos = lex.position();
        if lex.eat("DESC") {
            seen.mark(DESC, "DESC", pos)?;
            lex.skip_whitespace(true)?;
            syntax.envelope.set_description(parse_qdstring(&mut lex)?)?;
        } else if lex.peek_char() == Some(b'X') {
            let (key, values) = parse_extension(&mut lex, quirks)?;
            syntax.envelope.add_extension(key, values)?;
        } else {
            return Err(Error::invalid_schema_description(pos, "unrecognized syntax element"));
        }
    }
    Ok(syntax)
}

pub fn parse_dit_content_rule_description(s: &str, quirks: bool) -> Result<DitContentRule> {
    const NAME: u32 = 1 << 0;
    const DESC: u32 = 1 << 1;
    const OBSOLETE: u32 = 1 << 2;
    const AUX: u32 = 1 << 3;
    const MUST: u32 = 1 << 4;
    const MAY: u32 = 1 << 5;
    const NOT: u32 = 1 << 6;

    let mut lex = Lexer::new(s.as_bytes());
    lex.expect_char(b'(')?;
    lex.skip_whitespace(true)?;
    let oid = parse_oid(&mut lex, quirks)?;
    let mut dcr = DitContentRule::new(oid);
    let mut seen = SeenElements::new();

    loop {
        lex.skip_whitespace(true)?;
        if lex.peek_char() == Some(b')') {
            lex.next_char();
            break;
        }
        let pos = lex.position();
        if lex.eat("NAME") {
            seen.mark(NAME, "NAME", pos)?;
            lex.skip_whitespace(true)?;
            for name in parse_qdescrs(&mut lex, quirks)? {
                dcr.envelope.add_name(name)?;
            }
        } else if lex.eat("DESC") {
            seen.mark(DESC, "DESC", pos)?;
            lex.skip_whitespace(true)?;
            dcr.envelope.set_description(parse_qdstring(&mut lex)?)?;
        } else if lex.eat("OBSOLETE") {
            seen.mark(OBSOLETE, "OBSOLETE", pos)?;
            dcr.envelope.set_obsolete(true)?;
        } else if lex.eat("AUX") {
            seen.mark(AUX, "AUX", pos)?;
            lex.skip_whitespace(true)?;
            dcr.aux = parse_oids(&mut lex, quirks)?;
        } else if lex.eat("MUST") {
            seen.mark(MUST, "MUST", pos)?;
            lex.skip_whitespace(true)?;
            dcr.must = parse_oids(&mut lex, quirks)?;
        } else if lex.eat("MAY") {
            seen.mark(MAY, "MAY", pos)?;
            lex.skip_whitespace(true)?;
            dcr.may = parse_oids(&mut lex, quirks)?;
        } else if lex.eat("NOT") {
            seen.mark(NOT, "NOT", pos)?;
            lex.skip_whitespace(true)?;
            dcr.not = parse_oids(&mut lex, quirks)?;
        } else if lex.peek_char() == Some(b'X') {
            let (key, values) = parse_extension(&mut lex, quirks)?;
            dcr.envelope.add_extension(key, values)?;
        } else {
            return Err(Error::invalid_schema_description(pos, "unrecognized DIT content rule element"));
        }
    }
    Ok(dcr)
}

pub fn parse_dit_structure_rule_description(s: &str, quirks: bool) -> Result<DitStructureRule> {
    const NAME: u32 = 1 << 0;
    const DESC: u32 = 1 << 1;
    const OBSOLETE: u32 = 1 << 2;
    const FORM: u32 = 1 << 3;
    const SUP: u32 = 1 << 4;

    let mut lex = Lexer::new(s.as_bytes());
    lex.expect_char(b'(')?;
    lex.skip_whitespace(true)?;
    let start = lex.offset();
    while matches!(lex.peek_char(), Some(b) if b.is_ascii_digit()) {
        lex.next_char();
    }
    let rule_id: u32 = lex
        .slice_from(start)
        .parse()
        .map_err(|_| Error::invalid_schema_description(lex.position(), "expected a rule id"))?;
    let mut dsr = DitStructureRule::new(rule_id, String::new());
    let mut seen = SeenElements::new();

    loop {
        lex.skip_whitespace(true)?;
        if lex.peek_char() == Some(b')') {
            lex.next_char();
            break;
        }
        let pos = lex.position();
        if lex.eat("NAME") {
            seen.mark(NAME, "NAME", pos)?;
            lex.skip_whitespace(true)?;
            for name in parse_qdescrs(&mut lex, quirks)? {
                dsr.envelope.add_name(name)?;
            }
        } else if lex.eat("DESC") {
            seen.mark(DESC, "DESC", pos)?;
            lex.skip_whitespace(true)?;
            dsr.envelope.set_description(parse_qdstring(&mut lex)?)?;
        } else if lex.eat("OBSOLETE") {
            seen.mark(OBSOLETE, "OBSOLETE", pos)?;
            dsr.envelope.set_obsolete(true)?;
        } else if lex.eat("FORM") {
            seen.mark(FORM, "FORM", pos)?;
            lex.skip_whitespace(true)?;
            dsr.form = parse_oid(&mut lex, quirks)?;
        } else if lex.eat("SUP") {
            seen.mark(SUP, "SUP", pos)?;
            lex.skip_whitespace(true)?;
            dsr.super_rules = parse_oids(&mut lex, quirks)?
                .into_iter()
                .filter_map(|s| s.parse().ok())
                .collect();
        } else if lex.peek_char() == Some(b'X') {
            let (key, values) = parse_extension(&mut lex, quirks)?;
            dsr.envelope.add_extension(key, values)?;
        } else {
            return Err(Error::invalid_schema_description(pos, "unrecognized DIT structure rule element"));
        }
    }
    if dsr.form.is_empty() {
        return Err(Error::invalid_schema_description(lex.position(), "DIT structure rule requires FORM"));
    }
    Ok(dsr)
}

pub fn parse_name_form_description(s: &str, quirks: bool) -> Result<NameForm> {
    const NAME: u32 = 1 << 0;
    const DESC: u32 = 1 << 1;
    const OBSOLETE: u32 = 1 << 2;
    const OC: u32 = 1 << 3;
    const MUST: u32 = 1 << 4;
    const MAY: u32 = 1 << 5;

    let mut lex = Lexer::new(s.as_bytes());
    lex.expect_char(b'(')?;
    lex.skip_whitespace(true)?;
    let oid = parse_oid(&mut lex, quirks)?;
    let mut nf = NameForm::new(oid, String::new());
    let mut seen = SeenElements::new();

    loop {
        lex.skip_whitespace(true)?;
        if lex.peek_char() == Some(b')') {
            lex.next_char();
            break;
        }
        let pos = lex.position();
        if lex.eat("NAME") {
            seen.mark(NAME, "NAME", pos)?;
            lex.skip_whitespace(true)?;
            for name in parse_qdescrs(&mut lex, quirks)? {
                nf.envelope.add_name(name)?;
            }
        } else if lex.eat("DESC") {
            seen.mark(DESC, "DESC", pos)?;
            lex.skip_whitespace(true)?;
            nf.envelope.set_description(parse_qdstring(&mut lex)?)?;
        } else if lex.eat("OBSOLETE") {
            seen.mark(OBSOLETE, "OBSOLETE", pos)?;
            nf.envelope.set_obsolete(true)?;
        } else if lex.eat("OC") {
            seen.mark(OC, "OC", pos)?;
            lex.skip_whitespace(true)?;
            nf.structural_oc = parse_oid(&mut lex, quirks)?;
        } else if lex.eat("MUST") {
            seen.mark(MUST, "MUST", pos)?;
            lex.skip_whitespace(true)?;
            nf.must = parse_oids(&mut lex, quirks)?;
        } else if lex.eat("MAY") {
            seen.mark(MAY, "MAY", pos)?;
            lex.skip_whitespace(true)?;
            nf.may = parse_oids(&mut lex, quirks)?;
        } else if lex.peek_char() == Some(b'X') {
            let (key, values) = parse_extension(&mut lex, quirks)?;
            nf.envelope.add_extension(key, values)?;
        } else {
            return Err(Error::invalid_schema_description(pos, "unrecognized name form element"));
        }
    }
    if nf.structural_oc.is_empty() {
        return Err(Error::invalid_schema_description(lex.position(), "name form requires OC"));
    }
    Ok(nf)
}

pub fn parse_matching_rule_use_description(s: &str, quirks: bool) -> Result<MatchingRuleUse> {
    const NAME: u32 = 1 << 0;
    const DESC: u32 = 1 << 1;
    const OBSOLETE: u32 = 1 << 2;
    const APPLIES: u32 = 1 << 3;

    let mut lex = Lexer::new(s.as_bytes());
    lex.expect_char(b'(')?;
    lex.skip_whitespace(true)?;
    let oid = parse_oid(&mut lex, quirks)?;
    let mut mru = MatchingRuleUse::new(oid);
    let mut seen = SeenElements::new();

    loop {
        lex.skip_whitespace(true)?;
        if lex.peek_char() == Some(b')') {
            lex.next_char();
            break;
        }
        let pos = lex.position();
        if lex.eat("NAME") {
            seen.mark(NAME, "NAME", pos)?;
            lex.skip_whitespace(true)?;
            for name in parse_qdescrs(&mut lex, quirks)? {
                mru.envelope.add_name(name)?;
            }
        } else if lex.eat("DESC") {
            seen.mark(DESC, "DESC", pos)?;
            lex.skip_whitespace(true)?;
            mru.envelope.set_description(parse_qdstring(&mut lex)?)?;
        } else if lex.eat("OBSOLETE") {
            seen.mark(OBSOLETE, "OBSOLETE", pos)?;
            mru.envelope.set_obsolete(true)?;
        } else if lex.eat("APPLIES") {
            seen.mark(APPLIES, "APPLIES", pos)?;
            lex.skip_whitespace(true)?;
            mru.applies_to = parse_oids(&mut lex, quirks)?;
        } else if lex.peek_char() == Some(b'X') {
            let (key, values) = parse_extension(&mut lex, quirks)?;
            mru.envelope.add_extension(key, values)?;
        } else {
            return Err(Error::invalid_schema_description(pos, "unrecognized matching rule use element"));
        }
    }
    Ok(mru)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_name_attribute_type() {
        let at = parse_attribute_type_description(
            "( 2.5.4.3 NAME ( 'cn' 'commonName' ) SUP name EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{64} )",
            false,
        )
        .unwrap();
        assert_eq!(at.envelope.oid(), "2.5.4.3");
        assert_eq!(at.envelope.names(), &["cn".to_string(), "commonName".to_string()]);
        assert_eq!(at.equality.as_deref(), Some("caseIgnoreMatch"));
        assert_eq!(at.syntax_len, Some(64));
    }

    #[test]
    fn rejects_duplicate_element() {
        let result = parse_attribute_type_description(
            "( 2.5.4.3 NAME 'cn' NAME 'commonName' SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )",
            false,
        );
        assert!(matches!(result, Err(Error::DuplicateElement { .. })));
    }

    #[test]
    fn strict_mode_requires_sup_or_syntax() {
        let result = parse_attribute_type_description("( 2.5.4.3 NAME 'cn' )", false);
        assert!(result.is_err());
    }

    #[test]
    fn quirks_mode_skips_sup_or_syntax_check() {
        let at = parse_attribute_type_description("( 2.5.4.3 NAME 'cn' )", true).unwrap();
        assert!(at.superior.is_none() && at.syntax.is_none());
    }

    #[test]
    fn parses_person_object_class() {
        let oc = parse_object_class_description(
            "( 2.5.6.6 NAME 'person' SUP top STRUCTURAL MUST ( sn $ cn ) MAY ( userPassword $ telephoneNumber ) )",
            false,
        )
        .unwrap();
        assert_eq!(oc.kind, ObjectClassKind::Structural);
        assert_eq!(oc.must, vec!["sn".to_string(), "cn".to_string()]);
    }

    #[test]
    fn object_class_kind_markers_share_one_slot() {
        let result = parse_object_class_description("( 2.5.6.6 NAME 'x' STRUCTURAL AUXILIARY )", false);
        assert!(matches!(result, Err(Error::DuplicateElement { .. })));
    }

    #[test]
    fn parses_matching_rule() {
        let mr = parse_matching_rule_description(
            "( 2.5.13.2 NAME 'caseIgnoreMatch' SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )",
            false,
        )
        .unwrap();
        assert_eq!(mr.syntax_oid, "1.3.6.1.4.1.1466.115.121.1.15");
    }
}
