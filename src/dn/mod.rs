//! Component D: the DN/RDN engine (spec §4.D).

pub mod ava;
pub mod parser;
pub mod rdn;

pub use ava::Ava;
pub use rdn::Rdn;

use crate::error::{Error, Position, Result};

/// An ordered sequence of [`Rdn`]s, indexed leaf-first: `rdns()[0]` is
/// the leaf Rdn (the one nearest the entry), matching the order Rdns
/// appear left-to-right in the textual form.
///
/// Immutable after construction; equality is Rdn-by-Rdn.
#[derive(Clone, Debug)]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    pub fn root() -> Self {
        Dn { rdns: Vec::new() }
    }

    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        Dn { rdns }
    }

    pub fn parse(s: &str) -> Result<Dn> {
        parser::parse(s)
    }

    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    pub fn rdns(&self) -> impl Iterator<Item = &Rdn> {
        self.rdns.iter()
    }

    pub fn leaf(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// Leaf-first, `,`-separated canonical textual form: lowercased
    /// types, normalized and escaped values.
    pub fn to_canonical(&self) -> String {
        self.rdns
            .iter()
            .map(|r| r.canonical())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `self.len() <= other.len()` and `self`'s Rdn sequence matches
    /// the root-most suffix of `other`. The root DN is an ancestor of
    /// every Dn, including itself.
    pub fn is_ancestor_of(&self, other: &Dn) -> bool {
        if self.len() > other.len() {
            return false;
        }
        let offset = other.len() - self.len();
        self.rdns.iter().zip(other.rdns[offset..].iter()).all(|(a, b)| a == b)
    }

    pub fn is_descendant_of(&self, other: &Dn) -> bool {
        other.is_ancestor_of(self)
    }

    /// The leaf-side Rdns of `self` that remain once `ancestor`'s
    /// suffix is verified and removed. A hard error if `ancestor` is
    /// not actually a suffix of `self`.
    pub fn get_descendant_of(&self, ancestor: &Dn) -> Result<Dn> {
        if !ancestor.is_ancestor_of(self) {
            return Err(Error::invalid_dn(
                Position::Offset(0),
                "given Dn is not an ancestor of this Dn",
            ));
        }
        let keep = self.len() - ancestor.len();
        Ok(Dn::from_rdns(self.rdns[..keep].to_vec()))
    }

    /// `self` with its `levels` leaf-most Rdns stripped, i.e. the
    /// ancestor `levels` steps up from `self`.
    pub fn get_ancestor_of(&self, levels: usize) -> Result<Dn> {
        if levels > self.len() {
            return Err(Error::invalid_dn(Position::Offset(0), "ancestor level exceeds Dn depth"));
        }
        Ok(Dn::from_rdns(self.rdns[levels..].to_vec()))
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.rdns == other.rdns
    }
}

impl Eq for Dn {}

impl std::fmt::Display for Dn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_dn_is_empty() {
        let dn = Dn::parse("").unwrap();
        assert!(dn.is_root());
    }

    #[test]
    fn ancestry_checks_suffix_match() {
        let base = Dn::parse("dc=example,dc=com").unwrap();
        let entry = Dn::parse("cn=Jane,ou=people,dc=example,dc=com").unwrap();
        assert!(base.is_ancestor_of(&entry));
        assert!(entry.is_descendant_of(&base));
        assert!(!entry.is_ancestor_of(&base));
    }

    #[test]
    fn root_is_ancestor_of_everything() {
        let root = Dn::root();
        let entry = Dn::parse("cn=Jane,dc=example,dc=com").unwrap();
        assert!(root.is_ancestor_of(&entry));
    }

    #[test]
    fn get_descendant_of_strips_suffix() {
        let base = Dn::parse("dc=example,dc=com").unwrap();
        let entry = Dn::parse("cn=Jane,ou=people,dc=example,dc=com").unwrap();
        let rdn = entry.get_descendant_of(&base).unwrap();
        assert_eq!(rdn.to_canonical(), "cn=Jane,ou=people");
    }

    #[test]
    fn get_descendant_of_rejects_non_ancestor() {
        let other = Dn::parse("dc=other,dc=com").unwrap();
        let entry = Dn::parse("cn=Jane,dc=example,dc=com").unwrap();
        assert!(entry.get_descendant_of(&other).is_err());
    }

    #[test]
    fn dn_equality_is_rdn_by_rdn() {
        let a = Dn::parse("CN=Jane,DC=example,DC=com").unwrap();
        let b = Dn::parse("cn=Jane,dc=example,dc=com").unwrap();
        assert_eq!(a, b);
    }
}
