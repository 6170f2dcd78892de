//! `normalize(bytes) -> bytes`, idempotent: `n(n(x)) == n(x)`.

/// Normalizes a value in preparation for comparison.
///
/// Implementations MUST be idempotent: applying `normalize` to an
/// already-normalized value must return it unchanged.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, input: &[u8]) -> Vec<u8>;

    /// Every normalizer in this module is a stateless unit struct, so
    /// boxed clones are cheap; this lets [`crate::value::Value`] carry
    /// an attached normalizer without forcing `Normalizer: Clone` on
    /// trait objects.
    fn clone_box(&self) -> Box<dyn Normalizer>;
}

impl Clone for Box<dyn Normalizer> {
    fn clone(&self) -> Self {
        self.as_ref().clone_box()
    }
}

/// caseIgnoreMatch / caseIgnoreOrderingMatch / caseIgnoreSubstringsMatch
/// normalizer: collapse internal whitespace runs to a single space,
/// trim leading/trailing whitespace, fold ASCII case.
#[derive(Debug, Default)]
pub struct CaseIgnoreNormalizer;

impl Normalizer for CaseIgnoreNormalizer {
    fn normalize(&self, input: &[u8]) -> Vec<u8> {
        let s = String::from_utf8_lossy(input);
        let mut out = String::with_capacity(s.len());
        let mut prev_space = true; // trims leading space
        for c in s.chars() {
            if c.is_whitespace() {
                if !prev_space {
                    out.push(' ');
                }
                prev_space = true;
            } else {
                out.extend(c.to_lowercase());
                prev_space = false;
            }
        }
        while out.ends_with(' ') {
            out.pop();
        }
        out.into_bytes()
    }

    fn clone_box(&self) -> Box<dyn Normalizer> {
        Box::new(CaseIgnoreNormalizer)
    }
}

/// caseExactMatch normalizer: same whitespace folding as case-ignore,
/// but case is preserved.
#[derive(Debug, Default)]
pub struct CaseExactNormalizer;

impl Normalizer for CaseExactNormalizer {
    fn normalize(&self, input: &[u8]) -> Vec<u8> {
        let s = String::from_utf8_lossy(input);
        let mut out = String::with_capacity(s.len());
        let mut prev_space = true;
        for c in s.chars() {
            if c.is_whitespace() {
                if !prev_space {
                    out.push(' ');
                }
                prev_space = true;
            } else {
                out.push(c);
                prev_space = false;
            }
        }
        while out.ends_with(' ') {
            out.pop();
        }
        out.into_bytes()
    }

    fn clone_box(&self) -> Box<dyn Normalizer> {
        Box::new(CaseExactNormalizer)
    }
}

/// integerMatch normalizer: strip a redundant `+` and leading zeros,
/// leaving a canonical decimal representation.
#[derive(Debug, Default)]
pub struct IntegerNormalizer;

impl Normalizer for IntegerNormalizer {
    fn normalize(&self, input: &[u8]) -> Vec<u8> {
        let s = String::from_utf8_lossy(input);
        let s = s.trim();
        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", s.strip_prefix('+').unwrap_or(s)),
        };
        let trimmed = digits.trim_start_matches('0');
        let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
        if trimmed == "0" {
            b"0".to_vec()
        } else {
            format!("{}{}", sign, trimmed).into_bytes()
        }
    }

    fn clone_box(&self) -> Box<dyn Normalizer> {
        Box::new(IntegerNormalizer)
    }
}

/// telephoneNumberMatch normalizer: strip spaces and hyphens.
#[derive(Debug, Default)]
pub struct TelephoneNumberNormalizer;

impl Normalizer for TelephoneNumberNormalizer {
    fn normalize(&self, input: &[u8]) -> Vec<u8> {
        input
            .iter()
            .copied()
            .filter(|&b| b != b' ' && b != b'-')
            .collect()
    }

    fn clone_box(&self) -> Box<dyn Normalizer> {
        Box::new(TelephoneNumberNormalizer)
    }
}

/// A no-op normalizer, used for syntaxes with no defined equality
/// normalization (e.g. most binary syntaxes).
#[derive(Debug, Default)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn normalize(&self, input: &[u8]) -> Vec<u8> {
        input.to_vec()
    }

    fn clone_box(&self) -> Box<dyn Normalizer> {
        Box::new(IdentityNormalizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_ignore_folds_case_and_whitespace() {
        let n = CaseIgnoreNormalizer;
        assert_eq!(n.normalize(b"  Jane   Doe  "), b"jane doe".to_vec());
    }

    #[test]
    fn case_ignore_is_idempotent() {
        let n = CaseIgnoreNormalizer;
        let once = n.normalize(b"  Jane   Doe  ");
        let twice = n.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn integer_normalizer_strips_leading_zeros() {
        let n = IntegerNormalizer;
        assert_eq!(n.normalize(b"007"), b"7".to_vec());
        assert_eq!(n.normalize(b"-007"), b"-7".to_vec());
        assert_eq!(n.normalize(b"000"), b"0".to_vec());
    }

    #[test]
    fn telephone_normalizer_strips_separators() {
        let n = TelephoneNumberNormalizer;
        assert_eq!(n.normalize(b"+1 555-0100"), b"+15550100".to_vec());
    }
}
