//! Per-syntax validators (RFC 4517 §3 and RFC 4530), dispatched by
//! OID through a [`super::Registry`].

use num_bigint::BigInt;
use std::str::FromStr;

/// `is_valid(value) -> bool`. Stateless; accepts `str` or raw bytes
/// (the `&[u8]` entry point covers binary syntaxes, the `str` entry
/// point is a convenience for the (common) human-readable case).
pub trait SyntaxChecker: Send + Sync {
    fn is_valid(&self, value: &[u8]) -> bool;

    fn is_valid_str(&self, value: &str) -> bool {
        self.is_valid(value.as_bytes())
    }
}

#[derive(Debug, Default)]
pub struct BooleanSyntaxChecker;

impl SyntaxChecker for BooleanSyntaxChecker {
    fn is_valid(&self, value: &[u8]) -> bool {
        value == b"TRUE" || value == b"FALSE"
    }
}

/// `DirectoryString`: any non-empty UTF-8 string.
#[derive(Debug, Default)]
pub struct DirectoryStringSyntaxChecker;

impl SyntaxChecker for DirectoryStringSyntaxChecker {
    fn is_valid(&self, value: &[u8]) -> bool {
        !value.is_empty() && std::str::from_utf8(value).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct IntegerSyntaxChecker;

impl SyntaxChecker for IntegerSyntaxChecker {
    fn is_valid(&self, value: &[u8]) -> bool {
        let Ok(s) = std::str::from_utf8(value) else {
            return false;
        };
        let digits = s.strip_prefix('-').unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return false;
        }
        BigInt::from_str(s).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct OidSyntaxChecker;

impl SyntaxChecker for OidSyntaxChecker {
    fn is_valid(&self, value: &[u8]) -> bool {
        let Ok(s) = std::str::from_utf8(value) else {
            return false;
        };
        if crate::oid::is_valid_numeric_oid(s) {
            return true;
        }
        // descr form: leadkeychar keychar*
        let mut bytes = s.bytes();
        match bytes.next() {
            Some(b) if crate::lexer::is_lead_keychar(b, false) => {}
            _ => return false,
        }
        bytes.all(|b| crate::lexer::is_keychar(b, false))
    }
}

#[derive(Debug, Default)]
pub struct DnSyntaxChecker;

impl SyntaxChecker for DnSyntaxChecker {
    fn is_valid(&self, value: &[u8]) -> bool {
        let Ok(s) = std::str::from_utf8(value) else {
            return false;
        };
        crate::dn::Dn::parse(s).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct TelephoneNumberSyntaxChecker;

impl SyntaxChecker for TelephoneNumberSyntaxChecker {
    fn is_valid(&self, value: &[u8]) -> bool {
        let Ok(s) = std::str::from_utf8(value) else {
            return false;
        };
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_graphic() || c == ' ')
    }
}

#[derive(Debug, Default)]
pub struct UuidSyntaxChecker;

impl SyntaxChecker for UuidSyntaxChecker {
    fn is_valid(&self, value: &[u8]) -> bool {
        let Ok(s) = std::str::from_utf8(value) else {
            return false;
        };
        uuid::Uuid::parse_str(s).is_ok()
    }
}

/// `time#count#sid#mod`, the OpenLDAP CSN syntax used for replication
/// ordering.
#[derive(Debug, Default)]
pub struct CsnSyntaxChecker;

impl SyntaxChecker for CsnSyntaxChecker {
    fn is_valid(&self, value: &[u8]) -> bool {
        let Ok(s) = std::str::from_utf8(value) else {
            return false;
        };
        let parts: Vec<&str> = s.split('#').collect();
        if parts.len() != 4 {
            return false;
        }
        let [time, count, sid, modifier] = [parts[0], parts[1], parts[2], parts[3]];
        is_generalized_time(time)
            && !count.is_empty()
            && count.bytes().all(|b| b.is_ascii_hexdigit())
            && sid.len() == 3
            && sid.bytes().all(|b| b.is_ascii_hexdigit())
            && !modifier.is_empty()
            && modifier.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

#[derive(Debug, Default)]
pub struct GeneralizedTimeSyntaxChecker;

impl SyntaxChecker for GeneralizedTimeSyntaxChecker {
    fn is_valid(&self, value: &[u8]) -> bool {
        std::str::from_utf8(value)
            .map(is_generalized_time)
            .unwrap_or(false)
    }
}

/// Minimal RFC 4517 `GeneralizedTime` shape check:
/// `YYYYMMDDHH[MM[SS]][.f+](Z|(+|-)HHMM)`. The comparator
/// ([`super::comparator::GeneralizedTimeComparator`]) does the real
/// parse; this only gates well-formedness.
pub(crate) fn is_generalized_time(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 11 {
        return false;
    }
    if !bytes[..10].iter().all(u8::is_ascii_digit) {
        return false;
    }
    let mut i = 10;
    // optional minutes/seconds (2 digits each)
    while i + 2 <= bytes.len() && bytes[i..i + 2].iter().all(u8::is_ascii_digit) && i < 14 {
        i += 2;
    }
    // optional fraction
    if i < bytes.len() && (bytes[i] == b'.' || bytes[i] == b',') {
        i += 1;
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    if i >= bytes.len() {
        return false;
    }
    match bytes[i] {
        b'Z' => i + 1 == bytes.len(),
        b'+' | b'-' => {
            let rest = &bytes[i + 1..];
            (rest.len() == 4 || rest.len() == 2) && rest.iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_checker() {
        assert!(BooleanSyntaxChecker.is_valid(b"TRUE"));
        assert!(!BooleanSyntaxChecker.is_valid(b"true"));
    }

    #[test]
    fn integer_checker_rejects_leading_zero() {
        assert!(IntegerSyntaxChecker.is_valid(b"-42"));
        assert!(IntegerSyntaxChecker.is_valid(b"0"));
        assert!(!IntegerSyntaxChecker.is_valid(b"007"));
    }

    #[test]
    fn uuid_checker() {
        assert!(UuidSyntaxChecker.is_valid(b"f81d4fae-7dec-11d0-a765-00a0c91e6bf6"));
        assert!(!UuidSyntaxChecker.is_valid(b"not-a-uuid"));
    }

    #[test]
    fn generalized_time_checker() {
        assert!(is_generalized_time("20240102030405Z"));
        assert!(is_generalized_time("202401020304.5Z"));
        assert!(is_generalized_time("20240102030405+0200"));
        assert!(!is_generalized_time("2024010203"));
    }

    #[test]
    fn csn_checker() {
        assert!(CsnSyntaxChecker.is_valid(b"20240102030405.000000Z#000000#000#000000"));
        assert!(!CsnSyntaxChecker.is_valid(b"not-a-csn"));
    }
}
