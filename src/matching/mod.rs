//! Matching infrastructure: three independent registries keyed by
//! OID (syntax checkers, normalizers, comparators), dispatched at use
//! time the same way the schema model resolves cyclic references —
//! by OID string, never by owning back-pointer (spec.md §9).

pub mod comparator;
pub mod normalizer;
pub mod oids;
pub mod syntax;

pub use comparator::{Comparator, SerializableComparator};
pub use normalizer::Normalizer;
pub use syntax::SyntaxChecker;

use crate::error::Error;
use std::collections::HashMap;

/// A registry of `T` keyed by matching-rule or syntax OID.
///
/// Conceptually copy-on-write: readers see a consistent snapshot,
/// writes must go through the mutable façade ([`Registry::insert`]);
/// wrapping a registry in [`Frozen`] yields an immutable façade that
/// rejects mutation with [`Error::ReadOnlyRegistry`].
#[derive(Default)]
pub struct Registry<T: ?Sized> {
    entries: HashMap<String, Box<T>>,
}

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Registry {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, oid: impl Into<String>, value: Box<T>) {
        self.entries.insert(oid.into(), value);
    }

    pub fn get(&self, oid: &str) -> Option<&T> {
        self.entries.get(oid).map(|b| b.as_ref())
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.entries.contains_key(oid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An immutable façade over a [`Registry`]. Every mutator fails with
/// [`Error::ReadOnlyRegistry`]; reads pass straight through.
pub struct Frozen<'a, T: ?Sized>(&'a Registry<T>);

impl<'a, T: ?Sized> Frozen<'a, T> {
    pub fn new(registry: &'a Registry<T>) -> Self {
        Frozen(registry)
    }

    pub fn get(&self, oid: &str) -> Option<&T> {
        self.0.get(oid)
    }

    pub fn insert(&mut self, _oid: &str, _value: Box<T>) -> Result<(), Error> {
        Err(Error::ReadOnlyRegistry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::syntax::BooleanSyntaxChecker;

    #[test]
    fn frozen_registry_rejects_mutation() {
        let mut registry: Registry<dyn SyntaxChecker> = Registry::new();
        registry.insert(oids::SYNTAX_BOOLEAN, Box::new(BooleanSyntaxChecker));
        let mut frozen = Frozen::new(&registry);
        assert!(frozen.get(oids::SYNTAX_BOOLEAN).is_some());
        assert!(matches!(
            frozen.insert(oids::SYNTAX_BOOLEAN, Box::new(BooleanSyntaxChecker)),
            Err(Error::ReadOnlyRegistry)
        ));
    }
}
