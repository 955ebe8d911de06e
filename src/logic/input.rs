//! Input sanitization and line splitting, trimmed down from the teacher's
//! `logic::utf8` to exactly what a line-oriented parser needs: lossy UTF-8
//! decoding and control-character filtering. NFC normalization and
//! line-ending normalization are dropped here — CR / LF / CRLF are a
//! property of the parser's own line splitting (spec.md §8 "line-ending
//! normalization" is a law about parse output, not a pre-processing pass).

/// Decode raw bytes, replacing invalid sequences the way `String::from_utf8_lossy`
/// does, and drop control characters other than tab/newline/carriage-return.
pub fn sanitize(bytes: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(bytes);
    decoded
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Split `text` into lines on `\n`, `\r\n`, or bare `\r` (spec.md §8
/// "indifferent to line-ending convention"), dropping the terminator itself.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_drops_control_bytes_but_keeps_tabs_and_newlines() {
        let out = sanitize(b"a\x07b\tc\n");
        assert_eq!(out, "ab\tc\n");
    }

    #[test]
    fn split_lines_handles_all_three_conventions() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn split_lines_keeps_trailing_empty_line_only_if_no_final_terminator() {
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
    }
}
