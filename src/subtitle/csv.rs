//! Comma-separated field helpers for SSA/ASS rows.

/// The `n`th (0-based) comma-separated field, trimmed of ASCII whitespace.
/// `None` if the row has fewer than `n + 1` fields.
pub(super) fn nth_field(s: &str, n: usize) -> Option<String> {
    s.split(',').nth(n).map(|f| f.trim().to_string())
}

/// Everything from the start of the `n`th (0-based) comma-separated field
/// onward, with embedded commas preserved (used for the ASS `Text` field,
/// which is always the last declared field but may itself contain commas).
/// `None` if the row has fewer than `n` leading fields to skip.
pub(super) fn remainder_from_field(s: &str, n: usize) -> Option<String> {
    if n == 0 {
        return Some(s.to_string());
    }
    let mut count = 0;
    for (i, c) in s.char_indices() {
        if c == ',' {
            count += 1;
            if count == n {
                return Some(s[i + 1..].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_field_trims_whitespace() {
        assert_eq!(nth_field("a, b , c", 1), Some("b".to_string()));
    }

    #[test]
    fn nth_field_out_of_range_is_none() {
        assert_eq!(nth_field("a,b", 5), None);
    }

    #[test]
    fn remainder_preserves_embedded_commas() {
        assert_eq!(
            remainder_from_field("0,0,1,Default,,0,0,0,,Hello, world", 9),
            Some("Hello, world".to_string())
        );
    }

    #[test]
    fn remainder_zero_returns_whole_string() {
        assert_eq!(remainder_from_field("a,b,c", 0), Some("a,b,c".to_string()));
    }

    #[test]
    fn remainder_missing_fields_is_none() {
        assert_eq!(remainder_from_field("a,b", 9), None);
    }
}
