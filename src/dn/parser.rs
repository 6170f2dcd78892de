//! Two-parser strategy (spec §4.D): a fast path for the common
//! unescaped-ASCII subset, falling back to a general parser built on
//! [`crate::lexer::Lexer`] the moment anything complex is seen. Both
//! paths must produce the identical `Dn` for input the fast path
//! accepts; this is an optimization, not an independent grammar.

use super::ava::Ava;
use super::rdn::Rdn;
use super::Dn;
use crate::error::{Error, Position, Result};
use crate::lexer::{is_keychar, is_lead_keychar, Lexer};
use crate::value::Value;

pub fn parse(s: &str) -> Result<Dn> {
    if let Some(dn) = try_fast_path(s) {
        return Ok(dn);
    }
    parse_general(s)
}

/// Accepts only: descriptor attribute types, single-valued Rdns, plain
/// (unquoted, unescaped, non-hex) values containing no `+ " \ #` and
/// no leading/trailing space. Anything else returns `None` so the
/// caller falls back to [`parse_general`].
fn try_fast_path(s: &str) -> Option<Dn> {
    if s.is_empty() {
        return Some(Dn::root());
    }
    let mut rdns = Vec::new();
    for segment in split_unescaped(s, &[b',', b';'])? {
        if segment.is_empty() {
            return None;
        }
        let eq = segment.find('=')?;
        let (ty, val) = segment.split_at(eq);
        let val = &val[1..];
        if ty.is_empty() || val.is_empty() {
            return None;
        }
        if !ty.bytes().next().map(|b| is_lead_keychar(b, false)).unwrap_or(false) {
            return None;
        }
        if !ty.bytes().all(|b| is_keychar(b, false)) {
            return None;
        }
        if val.bytes().any(|b| matches!(b, b'+' | b'"' | b'\\' | b'#' | b'=')) {
            return None;
        }
        if val.starts_with(' ') || val.ends_with(' ') {
            return None;
        }
        let ava = Ava::unattached(ty, Value::text(val), val);
        rdns.push(Rdn::single(ava, segment));
    }
    if rdns.is_empty() {
        return None;
    }
    Some(Dn::from_rdns(rdns))
}

/// Splits on `sep` bytes not inside quotes and not preceded by an
/// unescaped backslash; returns `None` the instant it sees anything
/// the fast path doesn't want to deal with (quotes, backslashes).
fn split_unescaped(s: &str, sep: &[u8]) -> Option<Vec<&str>> {
    let bytes = s.as_bytes();
    if bytes.iter().any(|&b| b == b'"' || b == b'\\') {
        return None;
    }
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if sep.contains(&b) {
            parts.push(&s[start..i]);
            start = i + 1;
        }
    }
    parts.push(&s[start..]);
    Some(parts)
}

pub fn parse_general(s: &str) -> Result<Dn> {
    let mut lex = Lexer::new(s.as_bytes());
    if lex.is_eof() {
        return Ok(Dn::root());
    }
    let mut rdns = Vec::new();
    loop {
        let rdn_start = lex.offset();
        let rdn = parse_rdn(&mut lex)?;
        let raw = &s[rdn_start..lex.offset()];
        rdns.push(Rdn::new(rdn, raw)?);
        match lex.peek_char() {
            Some(b',') | Some(b';') => {
                lex.next_char();
            }
            None => break,
            Some(_) => {
                return Err(Error::invalid_dn(lex.position_offset(), "expected ',' or ';' between Rdns"));
            }
        }
    }
    Ok(Dn::from_rdns(rdns))
}

fn parse_rdn(lex: &mut Lexer) -> Result<Vec<Ava>> {
    let mut avas = vec![parse_ava(lex)?];
    while lex.peek_char() == Some(b'+') {
        lex.next_char();
        avas.push(parse_ava(lex)?);
    }
    Ok(avas)
}

fn parse_ava(lex: &mut Lexer) -> Result<Ava> {
    let ty = parse_attribute_type(lex)?;
    if lex.peek_char() != Some(b'=') {
        return Err(Error::invalid_dn(lex.position_offset(), "expected '=' in attribute-value assertion"));
    }
    lex.next_char();
    let (value, user_name) = parse_attribute_value(lex)?;
    Ok(Ava::unattached(ty, value, user_name))
}

fn parse_attribute_type(lex: &mut Lexer) -> Result<String> {
    let start = lex.offset();
    match lex.peek_char() {
        Some(b) if b.is_ascii_digit() => {
            lex.next_char();
            while matches!(lex.peek_char(), Some(b) if b.is_ascii_digit() || b == b'.') {
                lex.next_char();
            }
        }
        Some(b) if is_lead_keychar(b, false) => {
            lex.next_char();
            while matches!(lex.peek_char(), Some(b) if is_keychar(b, false)) {
                lex.next_char();
            }
        }
        _ => return Err(Error::invalid_dn(lex.position_offset(), "expected attribute type")),
    }
    Ok(lex.slice_from(start).to_string())
}

fn parse_attribute_value(lex: &mut Lexer) -> Result<(Value, String)> {
    match lex.peek_char() {
        Some(b'#') => parse_hex_value(lex),
        Some(b'"') => parse_quoted_value(lex),
        _ => parse_plain_value(lex),
    }
}

fn parse_hex_value(lex: &mut Lexer) -> Result<(Value, String)> {
    let start = lex.offset();
    lex.next_char(); // '#'
    let mut bytes = Vec::new();
    loop {
        match lex.peek_char() {
            Some(b) if b.is_ascii_hexdigit() => {
                bytes.push(lex.decode_hex_pair()?);
            }
            _ => break,
        }
    }
    if bytes.is_empty() {
        return Err(Error::invalid_dn(lex.position_offset(), "empty hex-string value"));
    }
    let raw = lex.slice_from(start).to_string();
    Ok((Value::binary(bytes), raw))
}

fn parse_quoted_value(lex: &mut Lexer) -> Result<(Value, String)> {
    let start = lex.offset();
    lex.next_char(); // opening quote
    let mut decoded = Vec::new();
    loop {
        match lex.peek_char() {
            None => return Err(Error::invalid_dn(lex.position_offset(), "unterminated quoted value")),
            Some(b'"') => {
                lex.next_char();
                break;
            }
            Some(b'\\') => {
                lex.next_char();
                decoded.push(read_escape(lex)?);
            }
            Some(b) => {
                lex.next_char();
                decoded.push(b);
            }
        }
    }
    let raw = lex.slice_from(start).to_string();
    Ok((bytes_to_value(decoded), raw))
}

fn parse_plain_value(lex: &mut Lexer) -> Result<(Value, String)> {
    let start = lex.offset();
    let mut decoded = Vec::new();
    let mut first = true;
    let mut last_was_literal_space = false;
    loop {
        match lex.peek_char() {
            None | Some(b',') | Some(b';') | Some(b'+') => break,
            Some(b'\\') => {
                lex.next_char();
                decoded.push(read_escape(lex)?);
                last_was_literal_space = false;
            }
            Some(b' ') if first => {
                return Err(Error::invalid_dn(lex.position_offset(), "leading unescaped space in value"));
            }
            Some(b) => {
                lex.next_char();
                decoded.push(b);
                last_was_literal_space = b == b' ';
            }
        }
        first = false;
    }
    if last_was_literal_space {
        return Err(Error::invalid_dn(lex.position_offset(), "trailing unescaped space in value"));
    }
    if decoded.is_empty() {
        return Err(Error::invalid_dn(lex.position_offset(), "empty attribute value"));
    }
    let raw = lex.slice_from(start).to_string();
    Ok((bytes_to_value(decoded), raw))
}

/// A backslash has just been consumed; decodes the escape it
/// introduces: either one of the RFC 4514 special characters, taken
/// literally, or two hex digits decoded as a byte.
fn read_escape(lex: &mut Lexer) -> Result<u8> {
    match lex.peek_char() {
        Some(b) if matches!(b, b'"' | b'+' | b',' | b';' | b'<' | b'>' | b'#' | b'=' | b'\\' | b' ') => {
            lex.next_char();
            Ok(b)
        }
        Some(b) if b.is_ascii_hexdigit() => lex.decode_hex_pair(),
        _ => Err(Error::invalid_dn(lex.position_offset(), "invalid escape sequence")),
    }
}

fn bytes_to_value(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(s) => Value::text(s),
        Err(e) => Value::binary(e.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_path_parses_plain_dn() {
        let dn = parse("cn=Jane,ou=people,dc=example,dc=com").unwrap();
        assert_eq!(dn.len(), 4);
    }

    #[test]
    fn general_parser_handles_escapes() {
        let dn = parse(r#"cn=Doe\, John,dc=example,dc=com"#).unwrap();
        assert_eq!(dn.len(), 3);
        let first = dn.rdns().next().unwrap();
        let ava = first.iter().next().unwrap();
        assert_eq!(ava.value().as_str(), Some("Doe, John"));
    }

    #[test]
    fn general_parser_handles_multivalued_rdn() {
        let dn = parse("cn=Jane+ou=eng,dc=example,dc=com").unwrap();
        let first = dn.rdns().next().unwrap();
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn general_parser_handles_hex_value() {
        let dn = parse("cn=#4A616E65,dc=example,dc=com").unwrap();
        let first = dn.rdns().next().unwrap();
        let ava = first.iter().next().unwrap();
        assert!(ava.value().is_binary());
        assert_eq!(ava.value().raw_bytes(), b"Jane");
    }

    #[test]
    fn rejects_leading_unescaped_space() {
        assert!(parse("cn= Jane,dc=example,dc=com").is_err());
    }

    #[test]
    fn rejects_duplicate_ava_in_rdn() {
        assert!(parse("cn=Jane+cn=Jane,dc=example,dc=com").is_err());
    }

    #[test]
    fn empty_string_is_root_dn() {
        let dn = parse("").unwrap();
        assert_eq!(dn.len(), 0);
    }
}
