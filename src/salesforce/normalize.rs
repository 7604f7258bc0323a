//! Identity string normalization for SOQL embedding
//!
//! Engineer identities arrive as free-form display names, sometimes with a
//! trailing role annotation ("Jane Doe (Contractor)") and sometimes with
//! quote characters that would break a SOQL string literal. Both transforms
//! here are idempotent: normalizing an already-normalized string is a no-op.

/// Normalize a free-form identity for embedding in a SOQL literal:
/// strip a trailing parenthetical annotation, trim, and escape quotes.
pub fn normalize_identity(raw: &str) -> String {
    escape_soql_quotes(strip_trailing_parenthetical(raw))
}

/// Drop a trailing parenthetical annotation, e.g.
/// `"Jane Doe (Contractor)"` -> `"Jane Doe"`. Truncates at the first `(`
/// when the string ends with `)`; parentheses elsewhere are preserved.
pub fn strip_trailing_parenthetical(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.ends_with(')') {
        if let Some(open) = trimmed.find('(') {
            return trimmed[..open].trim_end();
        }
    }
    trimmed
}

/// Escape single quotes for a SOQL string literal. Already-escaped quotes
/// are unescaped first so a second pass cannot double-escape.
pub fn escape_soql_quotes(s: &str) -> String {
    s.replace("\\'", "'").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_trailing_parenthetical() {
        assert_eq!(
            strip_trailing_parenthetical("Jane Doe (Contractor)"),
            "Jane Doe"
        );
        assert_eq!(strip_trailing_parenthetical("Jane Doe"), "Jane Doe");
        assert_eq!(strip_trailing_parenthetical("  Jane Doe  "), "Jane Doe");
        // truncates at the first open paren when the string ends with one
        assert_eq!(strip_trailing_parenthetical("A (B) (C)"), "A");
        // parenthetical not at the end is preserved
        assert_eq!(
            strip_trailing_parenthetical("Jane (Contractor) Doe"),
            "Jane (Contractor) Doe"
        );
        assert_eq!(strip_trailing_parenthetical("(Lead)"), "");
    }

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape_soql_quotes("O'Brien"), "O\\'Brien");
        assert_eq!(escape_soql_quotes("no quotes"), "no quotes");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_identity("O'Brien (Lead)");
        assert_eq!(once, "O\\'Brien");
        assert_eq!(normalize_identity(&once), once);

        let plain = normalize_identity("Jane Doe");
        assert_eq!(normalize_identity(&plain), plain);
    }
}
