//! Log sanitization utilities
//!
//! Keeps OAuth tokens, client secrets and large accounting payloads
//! (customer addresses, line items) out of debug/error logs.

/// Maximum number of bytes to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters kept visible by [`mask_secret`].
const MASK_VISIBLE: usize = 4;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Short strings pass through; longer ones keep the first `TRUNCATE_LIMIT`
/// bytes (on a char boundary) plus a suffix with the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask a credential for display, e.g. `1000.ABCD...` → `1000****`.
///
/// Values of up to `2 * MASK_VISIBLE` characters are fully masked.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(MASK_VISIBLE).collect();
    if secret.chars().count() <= MASK_VISIBLE * 2 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_string_unchanged() {
        let s = r#"{"code":0,"message":"success"}"#;
        assert_eq!(truncate_for_log(s), s);
    }

    #[test]
    fn over_limit_truncated() {
        let s = "a".repeat(TRUNCATE_LIMIT + 100);
        let result = truncate_for_log(&s);
        assert!(result.contains(&format!("{} bytes]", TRUNCATE_LIMIT + 100)));
        assert!(result.len() < s.len());
    }

    #[test]
    fn multibyte_chars_safe() {
        let s = "€".repeat(200);
        let result = truncate_for_log(&s);
        assert!(result.contains("... [truncated, total"));
    }

    #[test]
    fn mask_keeps_prefix_only() {
        assert_eq!(mask_secret("1000.abcdef123456"), "1000****");
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
