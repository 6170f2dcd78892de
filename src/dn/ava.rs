//! Attribute-Value Assertions: the leaves that make up an [`super::Rdn`].

use crate::value::Value;

/// `{ user_type, normalized_type, value, user_name }` (spec §3).
///
/// `user_name` preserves the attribute value exactly as the caller
/// wrote it (pre-unescape), so a `Dn` built from user input can echo
/// back the parts a consumer never asked to have rewritten, while
/// `normalized_type`/`value` carry the form used for comparison.
#[derive(Clone, Debug)]
pub struct Ava {
    user_type: String,
    normalized_type: String,
    value: Value,
    user_name: String,
}

impl Ava {
    pub fn new(
        user_type: impl Into<String>,
        normalized_type: impl Into<String>,
        value: Value,
        user_name: impl Into<String>,
    ) -> Self {
        Ava {
            user_type: user_type.into(),
            normalized_type: normalized_type.into(),
            value,
            user_name: user_name.into(),
        }
    }

    /// Builds an `Ava` with no schema attached: `normalized_type` is
    /// the lowercased `user_type`.
    pub fn unattached(user_type: impl Into<String>, value: Value, user_name: impl Into<String>) -> Self {
        let user_type = user_type.into();
        let normalized_type = user_type.to_ascii_lowercase();
        Ava {
            user_type,
            normalized_type,
            value,
            user_name: user_name.into(),
        }
    }

    pub fn user_type(&self) -> &str {
        &self.user_type
    }

    pub fn normalized_type(&self) -> &str {
        &self.normalized_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn normalized_value(&self) -> Vec<u8> {
        self.value.normalized_bytes()
    }

    /// `(normalized_type, normalized_value)` equality, used to reject
    /// duplicate Avas within an `Rdn` and to compare Avas across Rdns.
    pub fn equals(&self, other: &Ava) -> bool {
        self.normalized_type == other.normalized_type && self.value.equals(&other.value)
    }

    /// `type=value` using the user-provided type and an escaped value,
    /// as it would appear in the canonical textual form of the owning
    /// `Rdn`.
    pub fn to_canonical(&self) -> String {
        format!(
            "{}={}",
            self.normalized_type.to_ascii_lowercase(),
            escape_value(&self.normalized_value_text())
        )
    }

    fn normalized_value_text(&self) -> String {
        if self.value.is_binary() {
            format!("#{}", hex_encode(&self.value.normalized_bytes()))
        } else {
            String::from_utf8_lossy(&self.value.normalized_bytes()).into_owned()
        }
    }
}

/// Escapes `"`, `+`, `,`, `;`, `<`, `>`, `=`, `\`, a leading/trailing
/// space, a leading `#`, and control characters `0x00-0x1F`/`0x7F` as
/// `\HH` (uppercase hex), per spec §4.D.
pub fn escape_value(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    for (i, &b) in bytes.iter().enumerate() {
        let is_first = i == 0;
        let is_last = i == bytes.len() - 1;
        let needs_escape = matches!(b, b'"' | b'+' | b',' | b';' | b'<' | b'>' | b'=' | b'\\')
            || (b == b' ' && (is_first || is_last))
            || (b == b'#' && is_first)
            || b < 0x20
            || b == 0x7F;
        if needs_escape {
            out.push('\\');
            if b.is_ascii_graphic() || b == b' ' {
                out.push(b as char);
            } else {
                out.push_str(&format!("{:02X}", b));
            }
        } else {
            out.push(b as char);
        }
    }
    out
}

pub fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02X}", b));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_specials_and_boundary_spaces() {
        assert_eq!(escape_value("Doe, John"), "Doe\\, John");
        assert_eq!(escape_value(" leading"), "\\ leading");
        assert_eq!(escape_value("trailing "), "trailing\\ ");
        assert_eq!(escape_value("#hash"), "\\#hash");
        assert_eq!(escape_value("mid#hash"), "mid#hash");
    }

    #[test]
    fn escape_handles_control_bytes() {
        assert_eq!(escape_value("a\x01b"), "a\\01b");
    }

    #[test]
    fn avas_compare_by_normalized_type_and_value() {
        let a = Ava::unattached("CN", Value::text("Jane"), "Jane");
        let b = Ava::unattached("cn", Value::text("Jane"), "Jane");
        assert!(a.equals(&b));
        let c = Ava::unattached("cn", Value::text("Doe"), "Doe");
        assert!(!a.equals(&c));
    }
}
