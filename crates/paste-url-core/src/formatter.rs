// This file is part of paste-url-lsp.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! Link formatting for the two supported markup languages.
//!
//! # How it works
//!
//! 1. The server hands us the document's file name and language id
//! 2. reStructuredText file extensions win over the declared language id
//! 3. Any language other than `restructuredtext` gets Markdown links

/// File extensions that are always treated as reStructuredText.
const RST_EXTENSIONS: [&str; 3] = [".rst", ".rest", ".restx"];

/// Language id the editor reports for reStructuredText documents.
const RST_LANGUAGE_ID: &str = "restructuredtext";

/// The markup syntax used to render a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFormatter {
    /// `[text](url)`
    Markdown,
    /// `` `text <url>`_ ``
    RestructuredText,
}

impl LinkFormatter {
    /// Pick the formatter for a document.
    ///
    /// `file_name` can be a path or a URI; only its suffix is inspected.
    pub fn for_document(file_name: &str, language_id: &str) -> Self {
        if RST_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext)) {
            return LinkFormatter::RestructuredText;
        }

        if language_id.to_lowercase() == RST_LANGUAGE_ID {
            LinkFormatter::RestructuredText
        } else {
            LinkFormatter::Markdown
        }
    }

    /// Render `text` as a link pointing at `url`.
    pub fn format_link(&self, text: &str, url: &str) -> String {
        match self {
            LinkFormatter::Markdown => format!("[{}]({})", text, url),
            LinkFormatter::RestructuredText => format!("`{} <{}>`_", text, url),
        }
    }
}
