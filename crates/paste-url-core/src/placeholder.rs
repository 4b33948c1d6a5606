// This file is part of paste-url-lsp.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! Placeholder text shown while a title is being fetched.

use chrono::Timelike;
use lsp_types::{Position, Range};

const PLACEHOLDER_PREFIX: &str = "Getting Title at ";

/// Prepend `http://` unless the URL already starts with `http`.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Placeholder text stamped with the minute and second of `now`.
///
/// Minutes are not padded, seconds are: `Getting Title at 7:05`.
pub fn placeholder_text<T: Timelike>(now: &T) -> String {
    format!("{}{}:{:02}", PLACEHOLDER_PREFIX, now.minute(), now.second())
}

/// Find the first line containing `placeholder`, scanning from the top.
///
/// The returned range covers the placeholder itself, with LSP (UTF-16)
/// character offsets. `None` when the text no longer contains it.
pub fn find_placeholder(text: &str, placeholder: &str) -> Option<Range> {
    if placeholder.is_empty() {
        return None;
    }

    for (line_idx, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(byte_idx) = line.find(placeholder) {
            let start = utf16_len(&line[..byte_idx]);
            let end = start + utf16_len(placeholder);
            return Some(Range {
                start: Position {
                    line: line_idx as u32,
                    character: start,
                },
                end: Position {
                    line: line_idx as u32,
                    character: end,
                },
            });
        }
    }

    None
}

fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "http://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com/a?b=c"), "https://example.com/a?b=c");
    }

    #[test]
    fn test_placeholder_text_pads_seconds() {
        let time = NaiveTime::from_hms_opt(14, 7, 5).unwrap();
        assert_eq!(placeholder_text(&time), "Getting Title at 7:05");

        let time = NaiveTime::from_hms_opt(9, 42, 31).unwrap();
        assert_eq!(placeholder_text(&time), "Getting Title at 42:31");
    }

    #[test]
    fn test_find_placeholder() {
        let text = "# Notes\n\nsee [Getting Title at 3:04](http://x.com) here\n";
        let range = find_placeholder(text, "Getting Title at 3:04").unwrap();

        assert_eq!(range.start, Position { line: 2, character: 5 });
        assert_eq!(range.end, Position { line: 2, character: 26 });
    }

    #[test]
    fn test_find_placeholder_first_line_wins() {
        let text = "a Getting Title at 1:00\nb Getting Title at 1:00\n";
        let range = find_placeholder(text, "Getting Title at 1:00").unwrap();
        assert_eq!(range.start.line, 0);
    }

    #[test]
    fn test_find_placeholder_utf16_offsets() {
        // '😀' is two UTF-16 code units, 'é' one
        let text = "😀é [Getting Title at 0:00](http://x.com)";
        let range = find_placeholder(text, "Getting Title at 0:00").unwrap();
        assert_eq!(range.start.character, 5);
        assert_eq!(range.end.character, 26);
    }

    #[test]
    fn test_find_placeholder_crlf() {
        let text = "first\r\nsecond Getting Title at 2:02\r\n";
        let range = find_placeholder(text, "Getting Title at 2:02").unwrap();
        assert_eq!(range.start, Position { line: 1, character: 7 });
    }

    #[test]
    fn test_find_placeholder_missing() {
        assert_eq!(find_placeholder("nothing here", "Getting Title at 1:00"), None);
        assert_eq!(find_placeholder("Getting Title at 1:0", "Getting Title at 1:00"), None);
        assert_eq!(find_placeholder("", "Getting Title at 1:00"), None);
    }
}
