//! Component G: schema description and OpenLDAP schema file parsing
//! (spec §4.G).
//!
//! `descriptions` implements the RFC 4512 LPAREN..RPAREN grammars for
//! each schema object type; `openldap` implements the OpenLDAP schema
//! file format built on top of them; `macros` integrates the macro
//! table used by the latter.

pub mod descriptions;
pub mod macros;
pub mod openldap;

use crate::error::{Error, Position, Result};
use crate::lexer::Lexer;

/// Tracks which optional elements a description grammar has already
/// consumed, failing with `DuplicateElement` on a repeat. Object class
/// kind keywords (ABSTRACT/STRUCTURAL/AUXILIARY) share one bit since
/// they are mutually exclusive, not merely each-once.
#[derive(Default)]
pub struct SeenElements(u32);

impl SeenElements {
    pub fn new() -> Self {
        SeenElements(0)
    }

    pub fn mark(&mut self, bit: u32, name: &str, pos: Position) -> Result<()> {
        if self.0 & bit != 0 {
            return Err(Error::DuplicateElement {
                position: pos,
                element: name.to_string(),
            });
        }
        self.0 |= bit;
        Ok(())
    }
}

/// A single quoted descriptor: `'keystring'`.
pub fn parse_qdescr(lex: &mut Lexer, quirks: bool) -> Result<String> {
    lex.expect_char(b'\'')?;
    let start = lex.offset();
    while let Some(b) = lex.peek_char() {
        if b == b'\'' {
            break;
        }
        if !crate::lexer::is_lead_keychar(b, quirks) && !crate::lexer::is_keychar(b, quirks) {
            break;
        }
        lex.next_char();
    }
    let value = lex.slice_from(start).to_string();
    lex.expect_char(b'\'')?;
    if value.is_empty() {
        return Err(Error::invalid_schema_description(lex.position(), "empty descriptor"));
    }
    Ok(value)
}

/// `qdescr | '(' WSP* qdescr (WSP+ qdescr)* WSP* ')'`.
pub fn parse_qdescrs(lex: &mut Lexer, quirks: bool) -> Result<Vec<String>> {
    if lex.peek_char() == Some(b'(') {
        lex.next_char();
        let mut out = Vec::new();
        loop {
            lex.skip_whitespace(false)?;
            if lex.peek_char() == Some(b')') {
                lex.next_char();
                break;
            }
            out.push(parse_qdescr(lex, quirks)?);
        }
        if out.is_empty() {
            return Err(Error::invalid_schema_description(lex.position(), "empty qdescrs list"));
        }
        Ok(out)
    } else {
        Ok(vec![parse_qdescr(lex, quirks)?])
    }
}

/// A quoted string allowing `\27`/`\5C`-style hex escapes.
pub fn parse_qdstring(lex: &mut Lexer) -> Result<String> {
    lex.expect_char(b'\'')?;
    let mut bytes = Vec::new();
    loop {
        match lex.peek_char() {
            Some(b'\'') => {
                lex.next_char();
                break;
            }
            Some(b'\\') => {
                lex.next_char();
                bytes.push(lex.decode_hex_pair()?);
            }
            Some(_) => {
                bytes.push(lex.next_char().unwrap());
            }
            None => {
                return Err(Error::invalid_schema_description(lex.position(), "unterminated quoted string"));
            }
        }
    }
    String::from_utf8(bytes)
        .map_err(|_| Error::invalid_schema_description(lex.position(), "quoted string is not valid UTF-8"))
}

pub fn parse_qdstrings(lex: &mut Lexer) -> Result<Vec<String>> {
    if lex.peek_char() == Some(b'(') {
        lex.next_char();
        let mut out = Vec::new();
        loop {
            lex.skip_whitespace(false)?;
            if lex.peek_char() == Some(b')') {
                lex.next_char();
                break;
            }
            out.push(parse_qdstring(lex)?);
        }
        Ok(out)
    } else {
        Ok(vec![parse_qdstring(lex)?])
    }
}

/// A bare OID: either a numeric OID or a descriptor (a name reference,
/// resolved by the caller — not by this grammar layer).
pub fn parse_oid(lex: &mut Lexer, quirks: bool) -> Result<String> {
    let start = lex.offset();
    if let Some(b) = lex.peek_char() {
        if b.is_ascii_digit() {
            while matches!(lex.peek_char(), Some(b) if b.is_ascii_digit() || b == b'.') {
                lex.next_char();
            }
            return Ok(lex.slice_from(start).to_string());
        }
    }
    if let Some(b) = lex.peek_char() {
        if crate::lexer::is_lead_keychar(b, quirks) {
            lex.next_char();
            while let Some(b) = lex.peek_char() {
                if crate::lexer::is_keychar(b, quirks) {
                    lex.next_char();
                } else {
                    break;
                }
            }
            // An OID slot (unlike a NAME/qdescr slot) may, in quirks
            // mode, be a macro reference: `macroName:relativeTail`.
            // The ':' is never part of the descriptor itself here —
            // Open Question 3's resolution of the grammar's ':'
            // ambiguity.
            if quirks && lex.peek_char() == Some(b':') {
                lex.next_char();
                while matches!(lex.peek_char(), Some(b) if b.is_ascii_digit() || b == b'.') {
                    lex.next_char();
                }
            }
            return Ok(lex.slice_from(start).to_string());
        }
    }
    Err(Error::invalid_schema_description(lex.position(), "expected an OID or descriptor"))
}

/// `oid | '(' WSP* oid (WSP* '$' WSP* oid)* WSP* ')'`.
pub fn parse_oids(lex: &mut Lexer, quirks: bool) -> Result<Vec<String>> {
    if lex.peek_char() == Some(b'(') {
        lex.next_char();
        let mut out = Vec::new();
        loop {
            lex.skip_whitespace(false)?;
            out.push(parse_oid(lex, quirks)?);
            lex.skip_whitespace(false)?;
            match lex.peek_char() {
                Some(b'$') => {
                    lex.next_char();
                    continue;
                }
                Some(b')') => {
                    lex.next_char();
                    break;
                }
                _ => {
                    return Err(Error::invalid_schema_description(
                        lex.position(),
                        "expected '$' or ')' in OID list",
                    ))
                }
            }
        }
        Ok(out)
    } else {
        Ok(vec![parse_oid(lex, quirks)?])
    }
}

/// `oid ( '{' digits '}' )?`. Empty braces are the `-1` sentinel.
pub fn parse_noidlen(lex: &mut Lexer, quirks: bool) -> Result<(String, i64)> {
    let oid = parse_oid(lex, quirks)?;
    if lex.peek_char() == Some(b'{') {
        lex.next_char();
        let start = lex.offset();
        while matches!(lex.peek_char(), Some(b) if b.is_ascii_digit()) {
            lex.next_char();
        }
        let digits = lex.slice_from(start);
        let len = if digits.is_empty() {
            -1
        } else {
            digits
                .parse()
                .map_err(|_| Error::invalid_schema_description(lex.position(), "bad length"))?
        };
        lex.expect_char(b'}')?;
        Ok((oid, len))
    } else {
        Ok((oid, -1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qdescrs_single_and_list() {
        let mut lex = Lexer::new(b"'cn'");
        assert_eq!(parse_qdescrs(&mut lex, false).unwrap(), vec!["cn".to_string()]);
        let mut lex = Lexer::new(b"( 'cn' 'commonName' )");
        assert_eq!(
            parse_qdescrs(&mut lex, false).unwrap(),
            vec!["cn".to_string(), "commonName".to_string()]
        );
    }

    #[test]
    fn qdstring_decodes_hex_escapes() {
        let mut lex = Lexer::new(br"'it\27s'");
        assert_eq!(parse_qdstring(&mut lex).unwrap(), "it's");
    }

    #[test]
    fn noidlen_empty_braces_is_sentinel() {
        let mut lex = Lexer::new(b"1.3.6.1.4.1.1466.115.121.1.15{}");
        let (oid, len) = parse_noidlen(&mut lex, false).unwrap();
        assert_eq!(oid, "1.3.6.1.4.1.1466.115.121.1.15");
        assert_eq!(len, -1);
    }

    #[test]
    fn noidlen_with_length() {
        let mut lex = Lexer::new(b"1.3.6.1.4.1.1466.115.121.1.15{64}");
        let (_, len) = parse_noidlen(&mut lex, false).unwrap();
        assert_eq!(len, 64);
    }

    #[test]
    fn oids_dollar_separated() {
        let mut lex = Lexer::new(b"( top $ person )");
        assert_eq!(
            parse_oids(&mut lex, false).unwrap(),
            vec!["top".to_string(), "person".to_string()]
        );
    }
}
