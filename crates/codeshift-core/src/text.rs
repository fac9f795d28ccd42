//! Text position utilities for byte offset and line:column conversions.
//!
//! Lines and columns are **1-indexed** (matching editor conventions) and
//! columns count Unicode scalar values, not bytes. Byte offsets are
//! **0-indexed**.

/// Convert a byte offset to 1-indexed line and column.
///
/// If `offset` exceeds the content length, returns the position at the end
/// of the content.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;
    let mut current_offset = 0usize;

    for ch in content.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

/// Return the full text of the 1-indexed `line`, without its newline.
pub fn line_text(content: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }
    content.lines().nth(line as usize - 1)
}

/// Shorten `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_to_position_simple() {
        let content = "line1\nline2\nline3\n";
        assert_eq!(byte_offset_to_position(content, 0), (1, 1));
        assert_eq!(byte_offset_to_position(content, 4), (1, 5));
        assert_eq!(byte_offset_to_position(content, 5), (1, 6));
        assert_eq!(byte_offset_to_position(content, 6), (2, 1));
        assert_eq!(byte_offset_to_position(content, 12), (3, 1));
    }

    #[test]
    fn offset_to_position_counts_chars() {
        let content = "<?php\n$é = 1;";
        // `$` is at byte 6, `é` spans bytes 7..9, ` ` at byte 9
        assert_eq!(byte_offset_to_position(content, 9), (2, 3));
    }

    #[test]
    fn line_text_and_truncate() {
        let content = "a\nbcd\n";
        assert_eq!(line_text(content, 2), Some("bcd"));
        assert_eq!(line_text(content, 0), None);
        assert_eq!(line_text(content, 5), None);
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("ab", 3), "ab");
    }
}
