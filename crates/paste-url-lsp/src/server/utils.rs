//! Position and text utilities.
//!
//! LSP positions count UTF-16 code units; ropes index by `char`.

use lsp_types::{Position, Range, TextDocumentContentChangeEvent};
use ropey::{Rope, RopeSlice};

/// Convert an LSP position to a char index in the rope.
///
/// Positions past the end of a line or the document are clamped.
pub fn position_to_char(rope: &Rope, position: Position) -> usize {
    let line_idx = position.line as usize;
    if line_idx >= rope.len_lines() {
        return rope.len_chars();
    }

    let line = trim_line_ending(rope.line(line_idx));
    let utf16_idx = (position.character as usize).min(line.len_utf16_cu());

    rope.line_to_char(line_idx) + line.utf16_cu_to_char(utf16_idx)
}

/// The line without its trailing `\n`, `\r\n` or `\r`.
fn trim_line_ending(line: RopeSlice) -> RopeSlice {
    let mut end = line.len_chars();
    if end > 0 && line.char(end - 1) == '\n' {
        end -= 1;
    }
    if end > 0 && line.char(end - 1) == '\r' {
        end -= 1;
    }
    line.slice(..end)
}

/// Convert an LSP range to a char range, start first.
pub fn range_to_chars(rope: &Rope, range: Range) -> std::ops::Range<usize> {
    let start = position_to_char(rope, range.start);
    let end = position_to_char(rope, range.end);
    start.min(end)..start.max(end)
}

/// The text covered by `range`.
pub fn range_text(rope: &Rope, range: Range) -> String {
    rope.slice(range_to_chars(rope, range)).to_string()
}

/// Apply one `didChange` content change to the rope.
pub fn apply_change(rope: &mut Rope, change: &TextDocumentContentChangeEvent) {
    match change.range {
        Some(range) => {
            let chars = range_to_chars(rope, range);
            let start = chars.start;
            rope.remove(chars);
            rope.insert(start, &change.text);
        }
        None => *rope = Rope::from_str(&change.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: u32, character: u32) -> Position {
        Position { line, character }
    }

    fn range(sl: u32, sc: u32, el: u32, ec: u32) -> Range {
        Range {
            start: pos(sl, sc),
            end: pos(el, ec),
        }
    }

    #[test]
    fn test_position_to_char() {
        let rope = Rope::from_str("abc\ndef\n");
        assert_eq!(position_to_char(&rope, pos(0, 0)), 0);
        assert_eq!(position_to_char(&rope, pos(1, 2)), 6);
        assert_eq!(position_to_char(&rope, pos(2, 0)), 8);
    }

    #[test]
    fn test_position_to_char_utf16() {
        // '😀' is one char but two UTF-16 code units
        let rope = Rope::from_str("😀x\n");
        assert_eq!(position_to_char(&rope, pos(0, 2)), 1);
        assert_eq!(position_to_char(&rope, pos(0, 3)), 2);
    }

    #[test]
    fn test_position_to_char_clamps() {
        let rope = Rope::from_str("ab");
        assert_eq!(position_to_char(&rope, pos(0, 99)), 2);
        assert_eq!(position_to_char(&rope, pos(7, 0)), 2);
    }

    #[test]
    fn test_position_past_line_end_stays_on_line() {
        let rope = Rope::from_str("ab\ncd\r\nef");
        assert_eq!(position_to_char(&rope, pos(0, 99)), 2);
        assert_eq!(position_to_char(&rope, pos(1, 99)), 5);
        assert_eq!(range_text(&rope, range(0, 1, 0, 99)), "b");
    }

    #[test]
    fn test_range_text() {
        let rope = Rope::from_str("Visit My Site today\nnext");
        assert_eq!(range_text(&rope, range(0, 6, 0, 13)), "My Site");
        assert_eq!(range_text(&rope, range(0, 14, 1, 4)), "today\nnext");
        assert_eq!(range_text(&rope, range(0, 3, 0, 3)), "");
    }

    #[test]
    fn test_apply_incremental_change() {
        let mut rope = Rope::from_str("hello world\n");
        let change = TextDocumentContentChangeEvent {
            range: Some(range(0, 6, 0, 11)),
            range_length: None,
            text: "there".to_string(),
        };
        apply_change(&mut rope, &change);
        assert_eq!(rope.to_string(), "hello there\n");
    }

    #[test]
    fn test_apply_change_after_emoji() {
        let mut rope = Rope::from_str("😀 x\n");
        let change = TextDocumentContentChangeEvent {
            range: Some(range(0, 3, 0, 4)),
            range_length: None,
            text: "[link](http://x.com)".to_string(),
        };
        apply_change(&mut rope, &change);
        assert_eq!(rope.to_string(), "😀 [link](http://x.com)\n");
    }

    #[test]
    fn test_apply_full_change() {
        let mut rope = Rope::from_str("old");
        let change = TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "new text".to_string(),
        };
        apply_change(&mut rope, &change);
        assert_eq!(rope.to_string(), "new text");
    }
}
