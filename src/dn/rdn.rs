//! An ordered multiset of [`Ava`]s sharing one textual span (spec §3).

use super::ava::Ava;
use crate::error::{Error, Position, Result};
use std::hash::{Hash, Hasher};

impl Hash for Ava {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized_type().hash(state);
        self.value().hash(state);
    }
}

/// Invariants: at least one Ava; no two Avas share a
/// `(normalized_type, normalized_value)` pair; Avas iterate in
/// insertion order but compare as a set.
#[derive(Clone, Debug)]
pub struct Rdn {
    avas: Vec<Ava>,
    raw: String,
}

impl Rdn {
    pub fn new(avas: Vec<Ava>, raw: impl Into<String>) -> Result<Self> {
        if avas.is_empty() {
            return Err(Error::invalid_rdn(Position::Offset(0), "RDN has no attribute-value pairs"));
        }
        for i in 0..avas.len() {
            for j in (i + 1)..avas.len() {
                if avas[i].equals(&avas[j]) {
                    return Err(Error::invalid_rdn(
                        Position::Offset(0),
                        format!("duplicate attribute-value pair in RDN: {}", avas[i].normalized_type()),
                    ));
                }
            }
        }
        Ok(Rdn { avas, raw: raw.into() })
    }

    pub fn single(ava: Ava, raw: impl Into<String>) -> Self {
        Rdn {
            avas: vec![ava],
            raw: raw.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.avas.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ava> {
        self.avas.iter()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `type=value(+type=value)*` with lowercased types and normalized,
    /// escaped values, in insertion order.
    pub fn canonical(&self) -> String {
        self.avas
            .iter()
            .map(|a| a.to_canonical())
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        if self.avas.len() != other.avas.len() {
            return false;
        }
        let mut matched = vec![false; other.avas.len()];
        'outer: for a in &self.avas {
            for (i, b) in other.avas.iter().enumerate() {
                if !matched[i] && a.equals(b) {
                    matched[i] = true;
                    continue 'outer;
                }
            }
            return false;
        }
        true
    }
}

impl Eq for Rdn {}

impl Hash for Rdn {
    /// Order-independent: XORs each Ava's hash together, so that
    /// Rdns equal under the set semantics of `PartialEq` also hash
    /// equal regardless of insertion order.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut acc: u64 = 0;
        for ava in &self.avas {
            let mut h = std::collections::hash_map::DefaultHasher::new();
            ava.hash(&mut h);
            acc ^= h.finish();
        }
        acc.hash(state);
    }
}

impl PartialOrd for Rdn {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rdn {
    /// Lexicographic order of canonical forms (Open Question 1). This
    /// does not fully agree with `PartialEq` for multi-valued Rdns
    /// whose Avas were given in different orders: such Rdns compare
    /// equal but may order differently. Accepted tradeoff; see
    /// DESIGN.md.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn ava(t: &str, v: &str) -> Ava {
        Ava::unattached(t, Value::text(v), v)
    }

    #[test]
    fn rejects_empty_rdn() {
        assert!(Rdn::new(vec![], "").is_err());
    }

    #[test]
    fn rejects_duplicate_avas() {
        let r = Rdn::new(vec![ava("cn", "Jane"), ava("CN", "Jane")], "cn=Jane+CN=Jane");
        assert!(r.is_err());
    }

    #[test]
    fn multivalued_rdns_compare_as_a_set_regardless_of_order() {
        let a = Rdn::new(vec![ava("cn", "Jane"), ava("ou", "eng")], "cn=Jane+ou=eng").unwrap();
        let b = Rdn::new(vec![ava("ou", "eng"), ava("cn", "Jane")], "ou=eng+cn=Jane").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_lowercases_types() {
        let r = Rdn::single(ava("CN", "Jane"), "CN=Jane");
        assert_eq!(r.canonical(), "cn=Jane");
    }
}
