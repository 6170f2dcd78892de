//! RFC 4515 byte parser (spec §4.E): hand-written, built on
//! [`crate::lexer::Lexer`] the same way the DN parser's general path
//! is, since both grammars are "decode runs of literal bytes
//! interleaved with `\HH` escapes, stopping at a handful of
//! significant delimiters".

use super::ast::{Filter, Substrings};
use crate::error::Error;
use crate::lexer::{is_keychar, is_lead_keychar, Lexer};
use crate::value::Value;

/// Controls two independent relaxations: tolerance for whitespace
/// outside the strict RFC 4515 grammar, and schema-aware `Undefined`
/// substitution.
pub struct ParseOptions<'a> {
    pub relaxed: bool,
    pub attribute_known: Option<&'a dyn Fn(&str) -> bool>,
    pub attribute_is_human_readable: Option<&'a dyn Fn(&str) -> bool>,
}

impl<'a> Default for ParseOptions<'a> {
    fn default() -> Self {
        ParseOptions {
            relaxed: true,
            attribute_known: None,
            attribute_is_human_readable: None,
        }
    }
}

pub fn parse(s: &str) -> crate::error::Result<Filter> {
    parse_with(s, &ParseOptions::default())
}

pub fn parse_with(s: &str, opts: &ParseOptions) -> crate::error::Result<Filter> {
    let mut p = FilterParser {
        lex: Lexer::new(s.as_bytes()),
        opts,
    };
    p.skip_ws();
    let filter = p.parse_filter()?;
    p.skip_ws();
    if !p.lex.is_eof() {
        return Err(Error::invalid_filter(p.lex.position_offset(), "trailing input after filter"));
    }
    Ok(filter)
}

struct FilterParser<'a, 'o> {
    lex: Lexer<'a>,
    opts: &'o ParseOptions<'o>,
}

impl<'a, 'o> FilterParser<'a, 'o> {
    /// Whitespace immediately inside `(`/`)`: part of the base grammar
    /// (spec §4.E's `WSP*` tokens), tolerated in both modes. Relaxed
    /// mode additionally accepts tab/newline/CR here, not just SP.
    fn skip_ws(&mut self) {
        loop {
            match self.lex.peek_char() {
                Some(b' ') => {
                    self.lex.next_char();
                }
                Some(b'\t') | Some(b'\n') | Some(b'\r') if self.opts.relaxed => {
                    self.lex.next_char();
                }
                _ => break,
            }
        }
    }

    /// Whitespace around operators: a relaxed-mode-only extension
    /// beyond RFC 4515's base grammar; a no-op in strict mode.
    fn skip_ws_around_operator(&mut self) {
        if self.opts.relaxed {
            self.skip_ws();
        }
    }

    fn parse_filter(&mut self) -> crate::error::Result<Filter> {
        if self.lex.peek_char() != Some(b'(') {
            return Err(Error::invalid_filter(self.lex.position_offset(), "expected '('"));
        }
        self.lex.next_char();
        self.skip_ws();
        let filter = self.parse_filter_comp()?;
        self.skip_ws();
        if self.lex.peek_char() != Some(b')') {
            return Err(Error::invalid_filter(self.lex.position_offset(), "expected ')'"));
        }
        self.lex.next_char();
        Ok(filter)
    }

    fn parse_filter_comp(&mut self) -> crate::error::Result<Filter> {
        match self.lex.peek_char() {
            Some(b'&') => {
                self.lex.next_char();
                Ok(Filter::and(self.parse_filter_list()?))
            }
            Some(b'|') => {
                self.lex.next_char();
                Ok(Filter::or(self.parse_filter_list()?))
            }
            Some(b'!') => {
                self.lex.next_char();
                self.skip_ws();
                let child = self.parse_filter()?;
                Ok(Filter::Not(Box::new(child)))
            }
            _ => self.parse_item(),
        }
    }

    fn parse_filter_list(&mut self) -> crate::error::Result<Vec<Filter>> {
        self.skip_ws();
        let mut filters = Vec::new();
        while self.lex.peek_char() == Some(b'(') {
            filters.push(self.parse_filter()?);
            self.skip_ws();
        }
        if filters.is_empty() {
            return Err(Error::invalid_filter(self.lex.position_offset(), "expected at least one filter"));
        }
        Ok(filters)
    }

    fn parse_item(&mut self) -> crate::error::Result<Filter> {
        if self.lex.peek_char() == Some(b':') {
            return self.parse_extensible(None);
        }
        let attr = self.parse_attr()?;
        self.skip_ws_around_operator();
        if self.lex.eat("~=") {
            self.skip_ws_around_operator();
            let value = self.parse_simple_value(&attr)?;
            return Ok(self.gate(attr, |attr, value| Filter::Approx { attr, value }, value));
        }
        if self.lex.eat(">=") {
            self.skip_ws_around_operator();
            let value = self.parse_simple_value(&attr)?;
            return Ok(self.gate(attr, |attr, value| Filter::GreaterEq { attr, value }, value));
        }
        if self.lex.eat("<=") {
            self.skip_ws_around_operator();
            let value = self.parse_simple_value(&attr)?;
            return Ok(self.gate(attr, |attr, value| Filter::LessEq { attr, value }, value));
        }
        if self.lex.peek_char() == Some(b':') {
            return self.parse_extensible(Some(attr));
        }
        if self.lex.eat("=") {
            self.skip_ws_around_operator();
            return self.parse_equality_or_substring(attr);
        }
        Err(Error::invalid_filter(self.lex.position_offset(), "expected a filter operator"))
    }

    fn gate(&self, attr: String, build: impl FnOnce(String, Value) -> Filter, value: Value) -> Filter {
        if self.is_known(&attr) {
            build(attr, value)
        } else {
            Filter::Undefined
        }
    }

    fn is_known(&self, attr: &str) -> bool {
        match self.opts.attribute_known {
            Some(check) => check(attr),
            None => true,
        }
    }

    fn parse_attr(&mut self) -> crate::error::Result<String> {
        let start = self.lex.offset();
        match self.lex.peek_char() {
            Some(b) if b.is_ascii_digit() => {
                self.lex.next_char();
                while matches!(self.lex.peek_char(), Some(b) if b.is_ascii_digit() || b == b'.') {
                    self.lex.next_char();
                }
            }
            Some(b) if is_lead_keychar(b, false) => {
                self.lex.next_char();
                while matches!(self.lex.peek_char(), Some(b) if is_keychar(b, false) || b == b';') {
                    self.lex.next_char();
                }
            }
            _ => return Err(Error::invalid_filter(self.lex.position_offset(), "expected an attribute description")),
        }
        if start == self.lex.offset() {
            return Err(Error::invalid_filter(self.lex.position_offset(), "empty attribute description"));
        }
        Ok(self.lex.slice_from(start).to_string())
    }

    fn parse_extensible(&mut self, attr: Option<String>) -> crate::error::Result<Filter> {
        let mut dn_attrs = false;
        let mut matching_rule = None;
        loop {
            if !self.lex.eat(":") {
                return Err(Error::invalid_filter(self.lex.position_offset(), "expected ':' in extensible match"));
            }
            if self.lex.peek_char() == Some(b'=') {
                self.lex.next_char();
                break;
            }
            let tok_start = self.lex.offset();
            while matches!(self.lex.peek_char(), Some(b) if b != b':' && b != b'=') {
                self.lex.next_char();
            }
            if self.lex.offset() == tok_start {
                return Err(Error::invalid_filter(self.lex.position_offset(), "empty extensible match option"));
            }
            let tok = self.lex.slice_from(tok_start).to_string();
            if tok.eq_ignore_ascii_case("dn") {
                dn_attrs = true;
            } else {
                matching_rule = Some(tok);
            }
        }
        if attr.is_none() && matching_rule.is_none() {
            return Err(Error::invalid_filter(
                self.lex.position_offset(),
                "standalone extensible match requires a matching rule",
            ));
        }
        let human_readable = attr
            .as_deref()
            .and_then(|a| self.opts.attribute_is_human_readable.map(|f| f(a)))
            .unwrap_or(true);
        let value = self.parse_assertion_value(human_readable)?;
        let filter = Filter::Extensible {
            attr: attr.clone(),
            matching_rule,
            dn_attrs,
            value,
        };
        Ok(match &attr {
            Some(a) if !self.is_known(a) => Filter::Undefined,
            _ => filter,
        })
    }

    fn parse_simple_value(&mut self, attr: &str) -> crate::error::Result<Value> {
        let human_readable = self.opts.attribute_is_human_readable.map(|f| f(attr)).unwrap_or(true);
        self.parse_assertion_value(human_readable)
    }

    fn parse_equality_or_substring(&mut self, attr: String) -> crate::error::Result<Filter> {
        if self.lex.remaining().starts_with(b"*)") {
            self.lex.next_char();
            return Ok(self.gate(attr, |attr, _| Filter::Present { attr }, Value::text("")));
        }
        if self.lex.peek_char() == Some(b')') {
            return Ok(self.gate(attr, |attr, value| Filter::Equality { attr, value }, Value::text("")));
        }
        let human_readable = self.opts.attribute_is_human_readable.map(|f| f(&attr)).unwrap_or(true);
        let segments = self.read_star_separated_segments()?;
        if segments.len() == 1 {
            let value = bytes_to_value(segments.into_iter().next().unwrap(), human_readable);
            return Ok(self.gate(attr, |attr, value| Filter::Equality { attr, value }, value));
        }
        let last = segments.len() - 1;
        let initial = non_empty(&segments[0]).map(|b| bytes_to_value(b, human_readable));
        let final_ = non_empty(&segments[last]).map(|b| bytes_to_value(b, human_readable));
        let any = segments[1..last]
            .iter()
            .filter_map(|s| non_empty(s))
            .map(|b| bytes_to_value(b, human_readable))
            .collect();
        let substrings = Substrings { initial, any, final_ };
        if self.is_known(&attr) {
            Ok(Filter::Substring { attr, substrings })
        } else {
            Ok(Filter::Undefined)
        }
    }

    /// Reads raw decoded bytes up to (but not consuming) the closing
    /// `)`, splitting on unescaped `*` into segments. Consecutive
    /// stars produce adjacent empty segments; callers drop the empty
    /// ones except to distinguish "no initial"/"no final".
    fn read_star_separated_segments(&mut self) -> crate::error::Result<Vec<Vec<u8>>> {
        let mut segments = vec![Vec::new()];
        loop {
            match self.lex.peek_char() {
                None => return Err(Error::invalid_filter(self.lex.position_offset(), "unterminated filter value")),
                Some(b')') => break,
                Some(b'*') => {
                    self.lex.next_char();
                    segments.push(Vec::new());
                }
                Some(b'\\') => {
                    self.lex.next_char();
                    let byte = self.lex.decode_hex_pair()?;
                    segments.last_mut().unwrap().push(byte);
                }
                Some(b) => {
                    self.lex.next_char();
                    segments.last_mut().unwrap().push(b);
                }
            }
        }
        Ok(segments)
    }

    fn parse_assertion_value(&mut self, human_readable: bool) -> crate::error::Result<Value> {
        let mut decoded = Vec::new();
        loop {
            match self.lex.peek_char() {
                None | Some(b')') => break,
                Some(b'\\') => {
                    self.lex.next_char();
                    decoded.push(self.lex.decode_hex_pair()?);
                }
                Some(b) => {
                    self.lex.next_char();
                    decoded.push(b);
                }
            }
        }
        Ok(bytes_to_value(decoded, human_readable))
    }
}

fn non_empty(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.is_empty() {
        None
    } else {
        Some(bytes.to_vec())
    }
}

/// RFC 4515 says the result is `Binary` unless the attribute's syntax
/// is known human-readable, in which case `Text`. Absent schema
/// information (`human_readable` defaults to `true` via
/// [`ParseOptions::attribute_is_human_readable`]), bytes that are
/// valid UTF-8 are still treated as `Text` since that is the common
/// case and callers can override via the option.
fn bytes_to_value(bytes: Vec<u8>, human_readable: bool) -> Value {
    if human_readable {
        match String::from_utf8(bytes) {
            Ok(s) => Value::text(s),
            Err(e) => Value::binary(e.into_bytes()),
        }
    } else {
        Value::binary(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_equality() {
        let f = parse("(cn=Jane)").unwrap();
        assert_eq!(
            f,
            Filter::Equality {
                attr: "cn".to_string(),
                value: Value::text("Jane")
            }
        );
    }

    #[test]
    fn parses_present() {
        let f = parse("(cn=*)").unwrap();
        assert_eq!(f, Filter::Present { attr: "cn".to_string() });
    }

    #[test]
    fn parses_substring_with_collapsed_stars() {
        let f = parse("(cn=Ja**ne*)").unwrap();
        match f {
            Filter::Substring { attr, substrings } => {
                assert_eq!(attr, "cn");
                assert_eq!(substrings.initial, Some(Value::text("Ja")));
                assert_eq!(substrings.any, vec![Value::text("ne")]);
                assert_eq!(substrings.final_, None);
            }
            other => panic!("expected Substring, got {:?}", other),
        }
    }

    #[test]
    fn parses_and_or_not() {
        let f = parse("(&(cn=Jane)(|(sn=Doe)(!(ou=eng))))").unwrap();
        match f {
            Filter::And(children) => assert_eq!(children.len(), 2),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn and_with_undefined_child_collapses() {
        let opts = ParseOptions {
            relaxed: true,
            attribute_known: Some(&|a: &str| a != "unknownAttr"),
            attribute_is_human_readable: None,
        };
        let f = parse_with("(&(cn=Jane)(unknownAttr=x))", &opts).unwrap();
        assert_eq!(f, Filter::Undefined);
    }

    #[test]
    fn or_drops_undefined_children() {
        let opts = ParseOptions {
            relaxed: true,
            attribute_known: Some(&|a: &str| a != "unknownAttr"),
            attribute_is_human_readable: None,
        };
        let f = parse_with("(|(cn=Jane)(unknownAttr=x))", &opts).unwrap();
        assert_eq!(
            f,
            Filter::Or(vec![Filter::Equality {
                attr: "cn".to_string(),
                value: Value::text("Jane")
            }])
        );
    }

    #[test]
    fn parses_extensible_with_attr_and_rule() {
        let f = parse("(cn:caseExactMatch:=Jane)").unwrap();
        assert_eq!(
            f,
            Filter::Extensible {
                attr: Some("cn".to_string()),
                matching_rule: Some("caseExactMatch".to_string()),
                dn_attrs: false,
                value: Value::text("Jane"),
            }
        );
    }

    #[test]
    fn parses_standalone_extensible() {
        let f = parse("(:caseExactMatch:=Jane)").unwrap();
        assert_eq!(
            f,
            Filter::Extensible {
                attr: None,
                matching_rule: Some("caseExactMatch".to_string()),
                dn_attrs: false,
                value: Value::text("Jane"),
            }
        );
    }

    #[test]
    fn standalone_extensible_requires_matching_rule() {
        assert!(parse("(:dn:=Jane)").is_err());
    }

    #[test]
    fn relaxed_mode_tolerates_whitespace_around_parens() {
        let f = parse("(  &  (cn=Jane)  )").unwrap();
        match f {
            Filter::And(children) => assert_eq!(children.len(), 1),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn strict_mode_rejects_whitespace_around_operator() {
        let opts = ParseOptions {
            relaxed: false,
            attribute_known: None,
            attribute_is_human_readable: None,
        };
        assert!(parse_with("(cn =Jane)", &opts).is_err());
    }

    #[test]
    fn relaxed_mode_tolerates_whitespace_around_operator() {
        let f = parse("(cn =Jane)").unwrap();
        assert_eq!(
            f,
            Filter::Equality {
                attr: "cn".to_string(),
                value: Value::text("Jane")
            }
        );
    }

    #[test]
    fn handles_escaped_bytes_in_value() {
        let f = parse(r"(cn=Jane\28Doe\29)").unwrap();
        assert_eq!(
            f,
            Filter::Equality {
                attr: "cn".to_string(),
                value: Value::text("Jane(Doe)")
            }
        );
    }
}
