//! Text helpers.

/// Return at most `max_chars` leading characters of `s`.
///
/// Counts chars rather than bytes so multi-byte text is never split.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Replace each line break (`\r\n`, `\n` or `\r`) with a single space.
pub fn flatten_line_breaks(s: &str) -> String {
    s.replace("\r\n", " ").replace(|c: char| c == '\n' || c == '\r', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_chars("HELLO", 100), "HELLO");
        assert_eq!(truncate_chars("", 100), "");
    }

    #[test]
    fn test_truncate_exact_boundary() {
        assert_eq!(truncate_chars("abcdef", 6), "abcdef");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abcdef", 0), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    }

    #[test]
    fn test_flatten_line_breaks() {
        assert_eq!(flatten_line_breaks("HELLO\nWORLD"), "HELLO WORLD");
        assert_eq!(flatten_line_breaks("a\r\nb\rc\n\nd"), "a b c  d");
        assert_eq!(flatten_line_breaks("no breaks"), "no breaks");
    }
}
