//! `compare(a, b) -> Ordering`, a total order consistent with the
//! declared equality/ordering/substring rule. Every comparator here
//! applies the same null-handling rule before dispatching to its
//! specific logic: `(null,null)=Equal`, `(null,x)=Less`, `(x,null)=Greater`.

use super::normalizer::{CaseIgnoreNormalizer, IntegerNormalizer, Normalizer, TelephoneNumberNormalizer};
use super::Registry;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use num_bigint::BigInt;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::str::FromStr;

pub trait Comparator: Send + Sync {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering;
}

/// Applies the universal null-handling rule; `None` means "handle it
/// yourself", i.e. both sides were present.
fn null_ordering(a: Option<&[u8]>, b: Option<&[u8]>) -> Option<Ordering> {
    match (a, b) {
        (None, None) => Some(Ordering::Equal),
        (None, Some(_)) => Some(Ordering::Less),
        (Some(_), None) => Some(Ordering::Greater),
        (Some(_), Some(_)) => None,
    }
}

/// Byte-for-byte fallback used when no comparator is registered for a
/// matching rule OID.
#[derive(Debug, Default)]
pub struct StructuralComparator;

impl Comparator for StructuralComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        a.unwrap().cmp(b.unwrap())
    }
}

#[derive(Debug, Default)]
pub struct CaseIgnoreComparator;

impl Comparator for CaseIgnoreComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        let n = CaseIgnoreNormalizer;
        n.normalize(a.unwrap()).cmp(&n.normalize(b.unwrap()))
    }
}

/// Parses arbitrary-precision decimal integers after normalization;
/// comparison is numeric, not lexicographic.
#[derive(Debug, Default)]
pub struct IntegerComparator;

impl Comparator for IntegerComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        let norm = IntegerNormalizer;
        let pa = String::from_utf8_lossy(&norm.normalize(a.unwrap())).into_owned();
        let pb = String::from_utf8_lossy(&norm.normalize(b.unwrap())).into_owned();
        match (BigInt::from_str(&pa), BigInt::from_str(&pb)) {
            (Ok(ia), Ok(ib)) => ia.cmp(&ib),
            _ => pa.cmp(&pb),
        }
    }
}

/// Parses RFC 4517 `GeneralizedTime` and compares on the resulting
/// instant.
#[derive(Debug, Default)]
pub struct GeneralizedTimeComparator;

impl GeneralizedTimeComparator {
    pub fn parse(s: &str) -> Option<DateTime<FixedOffset>> {
        parse_generalized_time(s)
    }
}

impl Comparator for GeneralizedTimeComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        let sa = std::str::from_utf8(a.unwrap()).unwrap_or("");
        let sb = std::str::from_utf8(b.unwrap()).unwrap_or("");
        match (parse_generalized_time(sa), parse_generalized_time(sb)) {
            (Some(ta), Some(tb)) => ta.cmp(&tb),
            _ => sa.cmp(sb),
        }
    }
}

fn parse_generalized_time(s: &str) -> Option<DateTime<FixedOffset>> {
    let (datetime_part, tz) = if let Some(rest) = s.strip_suffix('Z') {
        (rest, FixedOffset::east_opt(0)?)
    } else if let Some(pos) = s.rfind(['+', '-']) {
        if pos < 10 {
            return None;
        }
        let (rest, offset) = s.split_at(pos);
        let sign = if offset.starts_with('-') { -1 } else { 1 };
        let digits = &offset[1..];
        let (hh, mm) = if digits.len() == 4 {
            (digits[0..2].parse::<i32>().ok()?, digits[2..4].parse::<i32>().ok()?)
        } else if digits.len() == 2 {
            (digits.parse::<i32>().ok()?, 0)
        } else {
            return None;
        };
        (rest, FixedOffset::east_opt(sign * (hh * 3600 + mm * 60))?)
    } else {
        return None;
    };

    let (main, fraction) = match datetime_part.find(['.', ',']) {
        Some(pos) => (&datetime_part[..pos], Some(&datetime_part[pos + 1..])),
        None => (datetime_part, None),
    };

    let year: i32 = main.get(0..4)?.parse().ok()?;
    let month: u32 = main.get(4..6)?.parse().ok()?;
    let day: u32 = main.get(6..8)?.parse().ok()?;
    let hour: u32 = main.get(8..10)?.parse().ok()?;
    let (minute, second): (u32, u32) = match main.len() {
        10 => (0, 0),
        12 => (main.get(10..12)?.parse().ok()?, 0),
        14 => (main.get(10..12)?.parse().ok()?, main.get(12..14)?.parse().ok()?),
        _ => return None,
    };
    let naive = NaiveDateTime::parse_from_str(
        &format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", year, month, day, hour, minute, second),
        "%Y-%m-%d %H:%M:%S",
    )
    .ok()?;
    let nanos = fraction
        .and_then(|f| f.parse::<f64>().ok())
        .map(|f| (f * 1_000_000_000.0) as u32)
        .unwrap_or(0);
    let naive = naive + chrono::Duration::nanoseconds(nanos as i64);
    Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).with_timezone(&tz))
}

/// Strips spaces and hyphens, then compares case-insensitively.
#[derive(Debug, Default)]
pub struct TelephoneNumberComparator;

impl Comparator for TelephoneNumberComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        let n = TelephoneNumberNormalizer;
        let pa = n.normalize(a.unwrap()).to_ascii_lowercase();
        let pb = n.normalize(b.unwrap()).to_ascii_lowercase();
        pa.cmp(&pb)
    }
}

/// Lexicographic comparison on the canonical hex form of a UUID.
#[derive(Debug, Default)]
pub struct UuidComparator;

impl Comparator for UuidComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        let sa = std::str::from_utf8(a.unwrap()).ok().and_then(|s| uuid::Uuid::parse_str(s).ok());
        let sb = std::str::from_utf8(b.unwrap()).ok().and_then(|s| uuid::Uuid::parse_str(s).ok());
        match (sa, sb) {
            (Some(ua), Some(ub)) => ua
                .hyphenated()
                .to_string()
                .cmp(&ub.hyphenated().to_string()),
            _ => a.unwrap().cmp(b.unwrap()),
        }
    }
}

/// Extracts the leading `( <oid>` from each argument and compares the
/// OIDs; a side that fails to parse sorts as less than any valid OID.
#[derive(Debug, Default)]
pub struct OidFirstComponentComparator;

fn leading_oid(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let s = s.strip_prefix('(')?;
    let s = s.trim_start();
    let end = s
        .find(|c: char| c.is_whitespace() || c == ')')
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some(&s[..end])
}

impl Comparator for OidFirstComponentComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        let sa = std::str::from_utf8(a.unwrap()).ok().and_then(leading_oid);
        let sb = std::str::from_utf8(b.unwrap()).ok().and_then(leading_oid);
        match (sa, sb) {
            (Some(oa), Some(ob)) => crate::oid::compare_oid(oa, ob),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Less,
        }
    }
}

/// Equal iff the trimmed assertion is a whole word in the value,
/// bounded by non-alphanumeric characters (or the string edges).
#[derive(Debug, Default)]
pub struct WordComparator;

impl Comparator for WordComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        if a == b {
            return Ordering::Equal;
        }
        let value = String::from_utf8_lossy(a.unwrap());
        let word = String::from_utf8_lossy(b.unwrap());
        let word = word.trim();
        if contains_word(&value, word) {
            Ordering::Equal
        } else {
            Ordering::Less
        }
    }
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let hay_lower = haystack.to_lowercase();
    let needle_lower = needle.to_lowercase();
    let mut start = 0;
    while let Some(pos) = hay_lower[start..].find(&needle_lower) {
        let abs = start + pos;
        let before_ok = hay_lower[..abs]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        let after = abs + needle_lower.len();
        let after_ok = hay_lower[after..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        if before_ok && after_ok {
            return true;
        }
        start = abs + 1;
    }
    false
}

/// Change Sequence Numbers are pre-normalized into `time#count#sid#mod`
/// form by the caller, so a plain string compare equals a
/// component-wise compare.
#[derive(Debug, Default)]
pub struct CsnComparator;

impl Comparator for CsnComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        a.unwrap().cmp(b.unwrap())
    }
}

/// Wraps a base comparator and a normalizer. `on_server` bypasses
/// normalization, for the case where values are already normalized
/// server-side.
pub struct NormalizingComparator {
    base: Box<dyn Comparator>,
    normalizer: Box<dyn Normalizer>,
    on_server: bool,
}

impl NormalizingComparator {
    pub fn new(base: Box<dyn Comparator>, normalizer: Box<dyn Normalizer>, on_server: bool) -> Self {
        NormalizingComparator {
            base,
            normalizer,
            on_server,
        }
    }
}

impl Comparator for NormalizingComparator {
    fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        if let Some(o) = null_ordering(a, b) {
            return o;
        }
        if self.on_server {
            return self.base.compare(a, b);
        }
        let na = self.normalizer.normalize(a.unwrap());
        let nb = self.normalizer.normalize(b.unwrap());
        self.base.compare(Some(&na), Some(&nb))
    }
}

/// Defers binding to a concrete comparator until first use: resolves
/// the matching-rule OID against a [`Registry`] on the first
/// `compare` call and caches the result; a missing rule falls back to
/// [`StructuralComparator`].
pub struct SerializableComparator<'a> {
    oid: String,
    registry: &'a Registry<dyn Comparator>,
    cached: RefCell<Option<bool>>,
}

impl<'a> SerializableComparator<'a> {
    pub fn new(oid: impl Into<String>, registry: &'a Registry<dyn Comparator>) -> Self {
        SerializableComparator {
            oid: oid.into(),
            registry,
            cached: RefCell::new(None),
        }
    }

    pub fn compare(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
        let resolved = {
            let mut cache = self.cached.borrow_mut();
            if cache.is_none() {
                *cache = Some(self.registry.contains(&self.oid));
            }
            cache.unwrap()
        };
        if resolved {
            self.registry.get(&self.oid).unwrap().compare(a, b)
        } else {
            StructuralComparator.compare(a, b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handling_is_universal() {
        let c = CaseIgnoreComparator;
        assert_eq!(c.compare(None, None), Ordering::Equal);
        assert_eq!(c.compare(None, Some(b"x")), Ordering::Less);
        assert_eq!(c.compare(Some(b"x"), None), Ordering::Greater);
    }

    #[test]
    fn integer_comparator_is_numeric() {
        let c = IntegerComparator;
        assert_eq!(c.compare(Some(b"9"), Some(b"10")), Ordering::Less);
        assert_eq!(c.compare(Some(b"-1"), Some(b"1")), Ordering::Less);
    }

    #[test]
    fn generalized_time_comparator_orders_by_instant() {
        let c = GeneralizedTimeComparator;
        assert_eq!(
            c.compare(Some(b"20240101000000Z"), Some(b"20240102000000Z")),
            Ordering::Less
        );
        assert_eq!(
            c.compare(Some(b"20240101010000+0100"), Some(b"20240101000000Z")),
            Ordering::Equal
        );
    }

    #[test]
    fn telephone_comparator_ignores_separators() {
        let c = TelephoneNumberComparator;
        assert_eq!(
            c.compare(Some(b"+1 555-0100"), Some(b"+15550100")),
            Ordering::Equal
        );
    }

    #[test]
    fn uuid_comparator_compares_canonical_form() {
        let c = UuidComparator;
        assert_eq!(
            c.compare(
                Some(b"F81D4FAE-7DEC-11D0-A765-00A0C91E6BF6"),
                Some(b"f81d4fae-7dec-11d0-a765-00a0c91e6bf6")
            ),
            Ordering::Equal
        );
    }

    #[test]
    fn oid_first_component_comparator() {
        let c = OidFirstComponentComparator;
        assert_eq!(
            c.compare(
                Some(b"( 2.5.4.3 NAME 'cn' )"),
                Some(b"( 2.5.4.4 NAME 'sn' )")
            ),
            Ordering::Less
        );
        assert_eq!(c.compare(Some(b"garbage"), Some(b"( 2.5.4.3 )")), Ordering::Less);
    }

    #[test]
    fn word_comparator_requires_boundaries() {
        let c = WordComparator;
        assert_eq!(
            c.compare(Some(b"the quick fox"), Some(b"quick")),
            Ordering::Equal
        );
        assert_ne!(
            c.compare(Some(b"thequickfox"), Some(b"quick")),
            Ordering::Equal
        );
    }

    #[test]
    fn word_comparator_is_reflexive_for_empty_and_blank_values() {
        let c = WordComparator;
        assert_eq!(c.compare(Some(b""), Some(b"")), Ordering::Equal);
        assert_eq!(c.compare(Some(b"  "), Some(b"  ")), Ordering::Equal);
    }

    #[test]
    fn serializable_comparator_falls_back_when_unregistered() {
        let registry: Registry<dyn Comparator> = Registry::new();
        let cmp = SerializableComparator::new("1.2.3.4", &registry);
        assert_eq!(cmp.compare(Some(b"b"), Some(b"a")), Ordering::Greater);
    }

    #[test]
    fn normalizing_comparator_bypasses_on_server() {
        let base = Box::new(StructuralComparator);
        let normalizer = Box::new(CaseIgnoreNormalizer);
        let cmp = NormalizingComparator::new(base, normalizer, true);
        assert_eq!(cmp.compare(Some(b"Jane"), Some(b"jane")), Ordering::Greater);
    }
}
