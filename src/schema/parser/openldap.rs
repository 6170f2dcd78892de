//! The OpenLDAP schema file format: streams of `objectidentifier`,
//! `attributetype`, and `objectclass` statements (spec §4.G).
//!
//! Unlike RFC 4512 descriptions, statements here are not wrapped in a
//! transport envelope; each one starts at column 0 after whitespace
//! and `#`-comment skipping, and there is no line-continuation rule.

use super::descriptions;
use super::macros::resolve_macro_ref;
use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::oid::MacroTable;
use crate::schema::model::{AttributeType, ObjectClass};

/// The result of parsing one OpenLDAP schema file: its macro table
/// (fully resolved) plus every attribute type and object class it
/// declared, with macro-reference OIDs already rewritten to numeric
/// form.
pub struct ParsedSchema {
    pub attribute_types: Vec<AttributeType>,
    pub object_classes: Vec<ObjectClass>,
    pub macros: MacroTable,
}

/// Reads a bare token made of alphanumerics, `-`, `_`, `.`, and `:` —
/// wide enough to cover both descriptor-shaped macro names and
/// `name:tail` suffix references.
fn read_token(lex: &mut Lexer) -> Result<String> {
    let start = lex.offset();
    while let Some(b) = lex.peek_char() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':') {
            lex.next_char();
        } else {
            break;
        }
    }
    if lex.offset() == start {
        return Err(Error::invalid_schema_description(lex.position(), "expected a token"));
    }
    Ok(lex.slice_from(start).to_string())
}

/// Captures the text from the cursor's current `(` through its
/// matching `)`, honoring nested parens and skipping the contents of
/// quoted strings (whose `\HH` escapes could otherwise be mistaken for
/// parens).
fn capture_parenthesized(lex: &mut Lexer) -> Result<String> {
    let start = lex.offset();
    let mut depth = 0i32;
    loop {
        match lex.peek_char() {
            Some(b'\'') => {
                lex.next_char();
                loop {
                    match lex.peek_char() {
                        Some(b'\\') => {
                            lex.next_char();
                            lex.next_char();
                            lex.next_char();
                        }
                        Some(b'\'') => {
                            lex.next_char();
                            break;
                        }
                        Some(_) => {
                            lex.next_char();
                        }
                        None => {
                            return Err(Error::invalid_schema_description(
                                lex.position(),
                                "unterminated quoted string",
                            ))
                        }
                    }
                }
            }
            Some(b'(') => {
                depth += 1;
                lex.next_char();
            }
            Some(b')') => {
                depth -= 1;
                lex.next_char();
                if depth == 0 {
                    break;
                }
            }
            Some(_) => {
                lex.next_char();
            }
            None => {
                return Err(Error::invalid_schema_description(
                    lex.position(),
                    "unterminated parenthesized statement",
                ))
            }
        }
    }
    Ok(lex.slice_from(start).to_string())
}

pub fn parse(input: &str, quirks: bool) -> Result<ParsedSchema> {
    let mut lex = Lexer::new(input.as_bytes());
    let mut table = MacroTable::new();
    let mut attribute_types = Vec::new();
    let mut object_classes = Vec::new();

    loop {
        lex.skip_whitespace(false)?;
        if lex.is_eof() {
            break;
        }
        if lex.eat("objectidentifier") {
            lex.skip_whitespace(true)?;
            let name = read_token(&mut lex)?;
            lex.skip_whitespace(true)?;
            let suffix = read_token(&mut lex)?;
            table.insert(name, suffix);
        } else if lex.eat("attributetype") {
            lex.skip_whitespace(true)?;
            let text = capture_parenthesized(&mut lex)?;
            attribute_types.push(descriptions::parse_attribute_type_description(&text, quirks)?);
        } else if lex.eat("objectclass") {
            lex.skip_whitespace(true)?;
            let text = capture_parenthesized(&mut lex)?;
            object_classes.push(descriptions::parse_object_class_description(&text, quirks)?);
        } else {
            return Err(Error::invalid_schema_description(lex.position(), "unrecognized statement"));
        }
    }

    table.resolve_all()?;

    for at in &mut attribute_types {
        let resolved = resolve_macro_ref(at.envelope.oid(), &mut table)?;
        at.envelope.set_oid(resolved)?;
        if let Some(syntax) = at.syntax.clone() {
            at.syntax = Some(resolve_macro_ref(&syntax, &mut table)?);
        }
    }
    for oc in &mut object_classes {
        let resolved = resolve_macro_ref(oc.envelope.oid(), &mut table)?;
        oc.envelope.set_oid(resolved)?;
    }

    Ok(ParsedSchema {
        attribute_types,
        object_classes,
        macros: table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_referenced_macro_resolves_in_attribute_type_oid() {
        let input = r#"
objectidentifier OrgOID MyBase:1
objectidentifier MyBase 1.3.6.1.4.1.99999
attributetype ( OrgOID:1 NAME 'myAttr' )
"#;
        let parsed = parse(input, true).unwrap();
        assert_eq!(parsed.attribute_types.len(), 1);
        assert_eq!(parsed.attribute_types[0].envelope.oid(), "1.3.6.1.4.1.99999.1.1");
    }

    #[test]
    fn quirks_accepts_nonnumeric_sup() {
        let input = "objectclass ( 2.5.6.99 NAME 'widget' SUP top STRUCTURAL )\n";
        let parsed = parse(input, true).unwrap();
        assert_eq!(parsed.object_classes[0].superiors, vec!["top".to_string()]);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let input = "# a comment\n\nobjectclass ( 2.5.6.99 NAME 'widget' STRUCTURAL )\n";
        let parsed = parse(input, true).unwrap();
        assert_eq!(parsed.object_classes.len(), 1);
    }
}
