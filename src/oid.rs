//! Numeric OID grammar, comparison, and the macro resolution table
//! used by the OpenLDAP schema file parser.

use crate::error::{Error, Position, Result};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Parses `number ('.' number)+`.
///
/// Rejects leading zeros in multi-digit numbers, consecutive dots, a
/// trailing dot, and fewer than two arcs.
pub fn parse_numeric_oid(s: &str) -> Result<Vec<u64>> {
    if s.is_empty() {
        return Err(Error::invalid_schema_description(
            Position::Offset(0),
            "empty OID",
        ));
    }
    let mut arcs = Vec::new();
    for (i, part) in s.split('.').enumerate() {
        if part.is_empty() {
            return Err(Error::invalid_schema_description(
                Position::Offset(i),
                "empty arc (consecutive dots or trailing dot)",
            ));
        }
        if part.len() > 1 && part.starts_with('0') {
            return Err(Error::invalid_schema_description(
                Position::Offset(i),
                "leading zero in OID arc",
            ));
        }
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_schema_description(
                Position::Offset(i),
                "non-digit in OID arc",
            ));
        }
        let arc: u64 = part
            .parse()
            .map_err(|_| Error::invalid_schema_description(Position::Offset(i), "arc overflow"))?;
        arcs.push(arc);
    }
    if arcs.len() < 2 {
        return Err(Error::invalid_schema_description(
            Position::Offset(0),
            "OID must have at least two arcs",
        ));
    }
    Ok(arcs)
}

pub fn is_valid_numeric_oid(s: &str) -> bool {
    parse_numeric_oid(s).is_ok()
}

/// Arc-wise lexicographic comparison of two numeric OID strings'
/// integer values. Malformed OIDs compare by raw string as a
/// fallback, since `compare_oid` is total.
pub fn compare_oid(a: &str, b: &str) -> Ordering {
    match (parse_numeric_oid(a), parse_numeric_oid(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// A macro entry in the OpenLDAP `objectidentifier` table.
///
/// `raw_suffix` is the text following the macro name as written in
/// the schema file: either a numeric OID, a bare reference to another
/// macro, or `parent:rest`. `resolved_oid` is filled in by
/// [`MacroTable::resolve_all`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Macro {
    pub name: String,
    pub raw_suffix: String,
    pub resolved_oid: Option<String>,
}

impl Macro {
    pub fn is_resolved(&self) -> bool {
        self.resolved_oid.is_some()
    }
}

/// `name -> macro` table with lazy, DFS-based resolution.
///
/// Forward references are accepted during parsing; call
/// [`resolve_all`](MacroTable::resolve_all) once parsing completes to
/// resolve every macro's `resolved_oid`.
#[derive(Clone, Debug, Default)]
pub struct MacroTable {
    macros: HashMap<String, Macro>,
}

impl MacroTable {
    pub fn new() -> Self {
        MacroTable::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, raw_suffix: impl Into<String>) {
        let name = name.into();
        self.macros.insert(
            name.clone(),
            Macro {
                name,
                raw_suffix: raw_suffix.into(),
                resolved_oid: None,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    /// Resolves every macro in the table. A cycle or a reference to a
    /// missing macro yields `UnresolvedMacro`. Idempotent: calling it
    /// twice on an already-resolved table is a no-op per macro.
    pub fn resolve_all(&mut self) -> Result<()> {
        let names: Vec<String> = self.macros.keys().cloned().collect();
        for name in names {
            self.resolve(&name, &mut Vec::new())?;
        }
        Ok(())
    }

    /// Resolves a single macro by name, recursing into its parent if
    /// the suffix is `parent:rest`. Returns the resolved OID string.
    pub fn resolve(&mut self, name: &str, stack: &mut Vec<String>) -> Result<String> {
        if let Some(m) = self.macros.get(name) {
            if let Some(resolved) = &m.resolved_oid {
                return Ok(resolved.clone());
            }
        } else {
            return Err(Error::UnresolvedMacro {
                name: name.to_string(),
            });
        }
        if stack.contains(&name.to_string()) {
            return Err(Error::UnresolvedMacro {
                name: name.to_string(),
            });
        }
        stack.push(name.to_string());

        let raw_suffix = self.macros[name].raw_suffix.clone();
        let resolved = if is_valid_numeric_oid(&raw_suffix) {
            raw_suffix
        } else if let Some((parent, rest)) = raw_suffix.split_once(':') {
            let parent_oid = self.resolve(parent, stack)?;
            format!("{}.{}", parent_oid, rest)
        } else {
            // bare reference to another macro, resolved entirely
            self.resolve(&raw_suffix, stack)?
        };

        stack.pop();
        self.macros.get_mut(name).unwrap().resolved_oid = Some(resolved.clone());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_leading_zero() {
        assert!(parse_numeric_oid("1.02.3").is_err());
    }

    #[test]
    fn rejects_single_arc() {
        assert!(parse_numeric_oid("1").is_err());
    }

    #[test]
    fn rejects_consecutive_dots() {
        assert!(parse_numeric_oid("1..2").is_err());
        assert!(parse_numeric_oid("1.2.").is_err());
    }

    #[test]
    fn accepts_well_formed() {
        assert_eq!(parse_numeric_oid("2.5.4.3").unwrap(), vec![2, 5, 4, 3]);
        assert_eq!(parse_numeric_oid("0.9").unwrap(), vec![0, 9]);
    }

    #[test]
    fn compare_is_numeric_not_lexicographic() {
        assert_eq!(compare_oid("1.2.9", "1.2.10"), Ordering::Less);
    }

    #[test]
    fn macro_forward_reference_resolves() {
        let mut table = MacroTable::new();
        table.insert("OrgOID", "MyBase:1");
        table.insert("MyBase", "1.3.6.1.4.1.99999");
        table.resolve_all().unwrap();
        assert_eq!(
            table.get("OrgOID").unwrap().resolved_oid.as_deref(),
            Some("1.3.6.1.4.1.99999.1")
        );
    }

    #[test]
    fn macro_cycle_is_unresolved() {
        let mut table = MacroTable::new();
        table.insert("A", "B:1");
        table.insert("B", "A:2");
        assert!(table.resolve_all().is_err());
    }

    #[test]
    fn macro_missing_parent_is_unresolved() {
        let mut table = MacroTable::new();
        table.insert("A", "Missing:1");
        assert!(table.resolve_all().is_err());
    }
}
