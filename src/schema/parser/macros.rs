//! Resolves the macro references that can appear in place of a
//! numeric OID inside an OpenLDAP schema file (spec §4.G).

use crate::error::Result;
use crate::oid::{is_valid_numeric_oid, MacroTable};

/// Resolves a single OID-or-macro-reference token to a numeric OID.
///
/// `token` is one of: a numeric OID (returned unchanged), a bare
/// reference to a macro name (resolved via `table`), or
/// `macroName:relativeTail` (resolved by appending `.relativeTail` to
/// the macro's resolved OID).
pub fn resolve_macro_ref(token: &str, table: &mut MacroTable) -> Result<String> {
    if is_valid_numeric_oid(token) {
        return Ok(token.to_string());
    }
    if let Some((parent, rest)) = token.split_once(':') {
        let parent_oid = table.resolve(parent, &mut Vec::new())?;
        return Ok(format!("{}.{}", parent_oid, rest));
    }
    table.resolve(token, &mut Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_oid_passes_through() {
        let mut table = MacroTable::new();
        assert_eq!(resolve_macro_ref("2.5.4.3", &mut table).unwrap(), "2.5.4.3");
    }

    #[test]
    fn relative_reference_appends_tail() {
        let mut table = MacroTable::new();
        table.insert("MyBase", "1.3.6.1.4.1.99999");
        assert_eq!(resolve_macro_ref("MyBase:1.2", &mut table).unwrap(), "1.3.6.1.4.1.99999.1.2");
    }

    #[test]
    fn bare_macro_name_resolves_fully() {
        let mut table = MacroTable::new();
        table.insert("MyBase", "1.3.6.1.4.1.99999");
        assert_eq!(resolve_macro_ref("MyBase", &mut table).unwrap(), "1.3.6.1.4.1.99999");
    }
}
