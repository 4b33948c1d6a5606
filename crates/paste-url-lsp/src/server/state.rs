//! Document state management.

use ropey::Rope;

/// A document we're tracking (an open file in the editor).
#[derive(Debug, Clone)]
pub struct Document {
    /// The document content, stored as a rope so incremental edits stay cheap.
    pub content: Rope,

    /// Document version (incremented by editor on each change).
    pub version: i32,

    /// Language id from `didOpen`, used to pick the link syntax.
    pub language_id: String,
}

impl Document {
    pub fn new(text: &str, version: i32, language_id: String) -> Self {
        Self {
            content: Rope::from_str(text),
            version,
            language_id,
        }
    }
}
