//! The `pasteUrl.paste` command and its arguments.

use lsp_types::Range;
use serde::Deserialize;
use serde_json::Value;
use tower_lsp::jsonrpc;

/// Command id advertised in `executeCommandProvider`.
pub const PASTE_COMMAND: &str = "pasteUrl.paste";

/// First argument of `pasteUrl.paste`.
///
/// The client sends the editor's active document and selection; a language
/// server has no notion of either.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasteArgs {
    pub uri: String,
    pub selection: Range,
    /// Clipboard text read by the client. Takes precedence over the system
    /// clipboard, which a remote server cannot see.
    #[serde(default)]
    pub clipboard: Option<String>,
}

/// Parse the command arguments.
pub fn parse_paste_args(arguments: &[Value]) -> jsonrpc::Result<PasteArgs> {
    let first = arguments.first().ok_or_else(|| {
        jsonrpc::Error::invalid_params("pasteUrl.paste expects { uri, selection } argument")
    })?;

    serde_json::from_value(first.clone())
        .map_err(|e| jsonrpc::Error::invalid_params(format!("Invalid pasteUrl.paste argument: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::Position;
    use serde_json::json;

    #[test]
    fn test_parse_paste_args() {
        let args = parse_paste_args(&[json!({
            "uri": "file:///notes/todo.md",
            "selection": {
                "start": { "line": 2, "character": 4 },
                "end": { "line": 2, "character": 9 }
            }
        })])
        .unwrap();

        assert_eq!(args.uri, "file:///notes/todo.md");
        assert_eq!(args.selection.start, Position { line: 2, character: 4 });
        assert_eq!(args.selection.end, Position { line: 2, character: 9 });
        assert_eq!(args.clipboard, None);
    }

    #[test]
    fn test_parse_paste_args_with_clipboard() {
        let args = parse_paste_args(&[json!({
            "uri": "file:///a.rst",
            "selection": {
                "start": { "line": 0, "character": 0 },
                "end": { "line": 0, "character": 0 }
            },
            "clipboard": "example.com"
        })])
        .unwrap();

        assert_eq!(args.clipboard.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_parse_paste_args_invalid() {
        assert!(parse_paste_args(&[]).is_err());
        assert!(parse_paste_args(&[json!({ "uri": "file:///a.md" })]).is_err());
        assert!(parse_paste_args(&[json!("file:///a.md")]).is_err());
    }
}
