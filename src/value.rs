//! Component C: a tagged value with syntax-aware normalization
//! caching (spec §4.C).

use crate::error::{Diagnostic, SchemaErrorHandler};
use crate::matching::Normalizer;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Data {
    Text(String),
    Binary(Vec<u8>),
}

/// The equality rule attached to a value, carried so that
/// [`Value::equals`] can normalize the *other* side of a comparison
/// through *this* value's rule (Open Question 2).
struct EqualityRule {
    oid: String,
    normalizer: Box<dyn Normalizer>,
}

impl Clone for EqualityRule {
    fn clone(&self) -> Self {
        EqualityRule {
            oid: self.oid.clone(),
            normalizer: self.normalizer.clone(),
        }
    }
}

/// A tagged value: either text or raw bytes, plus an optional attached
/// equality rule and its normalized form.
///
/// The normalized form is computed eagerly by the `&mut self` mutators
/// (`attach_equality`, `detach_equality`, `set_text`, `set_binary`) and
/// stored alongside the raw value; `normalized_bytes` just reads it
/// (falling back to the raw bytes when no rule has ever been
/// attached), so no interior mutability is needed to keep `Value`
/// usable from `&self` contexts.
pub struct Value {
    data: Data,
    equality: Option<EqualityRule>,
    normalized: Option<Vec<u8>>,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value {
            data: Data::Text(s.into()),
            equality: None,
            normalized: None,
        }
    }

    pub fn binary(b: impl Into<Vec<u8>>) -> Self {
        Value {
            data: Data::Binary(b.into()),
            equality: None,
            normalized: None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.data, Data::Binary(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Data::Text(s) => Some(s),
            Data::Binary(_) => None,
        }
    }

    /// The raw, un-normalized bytes, regardless of tag.
    pub fn raw_bytes(&self) -> &[u8] {
        match &self.data {
            Data::Text(s) => s.as_bytes(),
            Data::Binary(b) => b,
        }
    }

    pub fn attribute_equality_oid(&self) -> Option<&str> {
        self.equality.as_ref().map(|r| r.oid.as_str())
    }

    /// Attaches an equality matching rule and eagerly recomputes the
    /// normalized cache. Binary values have no textual normalization
    /// (spec §4.C), so the rule is still recorded (for
    /// cross-normalization of the other side of an `equals` call) but
    /// the cache is set to the raw bytes.
    ///
    /// A normalization failure (the normalizer producing invalid
    /// output for a textual value) degrades to the raw bytes and is
    /// reported through `handler` rather than aborting.
    pub fn attach_equality(
        &mut self,
        oid: impl Into<String>,
        normalizer: Box<dyn Normalizer>,
        handler: &mut dyn SchemaErrorHandler,
    ) {
        let oid = oid.into();
        let cache = if self.is_binary() {
            self.raw_bytes().to_vec()
        } else {
            let normalized = normalizer.normalize(self.raw_bytes());
            if std::str::from_utf8(&normalized).is_err() {
                handler.handle(Diagnostic::with_cause(
                    "normalization produced invalid UTF-8, falling back to raw value",
                    oid.clone(),
                ));
                self.raw_bytes().to_vec()
            } else {
                normalized
            }
        };
        self.normalized = Some(cache);
        self.equality = Some(EqualityRule { oid, normalizer });
    }

    /// Detaches any equality rule; the cache reverts to the raw bytes.
    pub fn detach_equality(&mut self) {
        self.equality = None;
        self.normalized = None;
    }

    /// Replaces the raw value, invalidating the cache. If an equality
    /// rule is attached it is reapplied immediately, matching the
    /// spec's "recomputed whenever... changed" invariant.
    pub fn set_text(&mut self, s: impl Into<String>) {
        self.data = Data::Text(s.into());
        self.recompute();
    }

    pub fn set_binary(&mut self, b: impl Into<Vec<u8>>) {
        self.data = Data::Binary(b.into());
        self.recompute();
    }

    fn recompute(&mut self) {
        match self.equality.take() {
            Some(rule) => {
                let mut handler = crate::error::CollectingErrorHandler::default();
                self.attach_equality(rule.oid, rule.normalizer, &mut handler);
            }
            None => self.normalized = None,
        }
    }

    /// The normalized form: the cached value set by `attach_equality`,
    /// or the raw bytes if no equality rule has ever been attached.
    pub fn normalized_bytes(&self) -> Vec<u8> {
        match &self.normalized {
            Some(cached) => cached.clone(),
            None => self.raw_bytes().to_vec(),
        }
    }

    /// Equality per Open Question 2: when exactly one side carries an
    /// attached equality rule, that rule normalizes the *other* side's
    /// raw bytes before comparing; when both or neither side carries a
    /// rule, each side's own cached (or raw) normalized form is used.
    pub fn equals(&self, other: &Value) -> bool {
        match (&self.equality, &other.equality) {
            (Some(rule), None) => {
                self.normalized_bytes() == rule.normalizer.normalize(other.raw_bytes())
            }
            (None, Some(rule)) => {
                rule.normalizer.normalize(self.raw_bytes()) == other.normalized_bytes()
            }
            _ => self.normalized_bytes() == other.normalized_bytes(),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Value {
            data: self.data.clone(),
            equality: self.equality.clone(),
            normalized: self.normalized.clone(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Data::Text(s) => f.debug_tuple("Value::Text").field(s).finish(),
            Data::Binary(b) => f.debug_tuple("Value::Binary").field(&b.len()).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized_bytes().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingErrorHandler;
    use crate::matching::normalizer::CaseIgnoreNormalizer;

    #[test]
    fn raw_values_compare_byte_for_byte_without_a_rule() {
        let a = Value::text("Jane");
        let b = Value::text("jane");
        assert_ne!(a, b);
    }

    #[test]
    fn attached_rule_normalizes_both_sides_when_shared() {
        let mut handler = CollectingErrorHandler::default();
        let mut a = Value::text("  Jane   Doe ");
        let mut b = Value::text("jane doe");
        a.attach_equality("2.5.13.2", Box::new(CaseIgnoreNormalizer), &mut handler);
        b.attach_equality("2.5.13.2", Box::new(CaseIgnoreNormalizer), &mut handler);
        assert_eq!(a, b);
        assert!(!handler.was_error());
    }

    #[test]
    fn one_sided_rule_normalizes_the_other_value() {
        let mut handler = CollectingErrorHandler::default();
        let mut a = Value::text("Jane Doe");
        a.attach_equality("2.5.13.2", Box::new(CaseIgnoreNormalizer), &mut handler);
        let b = Value::text("jane doe");
        assert!(a.equals(&b));
        assert!(b.equals(&a));
    }

    #[test]
    fn mutation_invalidates_the_cache() {
        let mut handler = CollectingErrorHandler::default();
        let mut a = Value::text("Jane");
        a.attach_equality("2.5.13.2", Box::new(CaseIgnoreNormalizer), &mut handler);
        assert_eq!(a.normalized_bytes(), b"jane".to_vec());
        a.set_text("Doe");
        assert_eq!(a.normalized_bytes(), b"doe".to_vec());
    }

    #[test]
    fn binary_values_are_never_textually_normalized() {
        let mut handler = CollectingErrorHandler::default();
        let mut a = Value::binary(vec![0x01, 0x02]);
        a.attach_equality("2.5.13.17", Box::new(CaseIgnoreNormalizer), &mut handler);
        assert_eq!(a.normalized_bytes(), vec![0x01, 0x02]);
    }

    #[test]
    fn detach_reverts_to_raw_bytes() {
        let mut handler = CollectingErrorHandler::default();
        let mut a = Value::text("Jane");
        a.attach_equality("2.5.13.2", Box::new(CaseIgnoreNormalizer), &mut handler);
        a.detach_equality();
        assert_eq!(a.normalized_bytes(), b"Jane".to_vec());
        assert!(a.attribute_equality_oid().is_none());
    }
}
