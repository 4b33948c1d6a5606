// This file is part of paste-url-lsp.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! The editor-side services the paste flow needs.
//!
//! The language server implements this on top of the LSP client; tests use
//! an in-memory editor.

use std::future::Future;
use std::time::Duration;

use lsp_types::Range;

use crate::error::ClipboardError;

/// Snapshot of the document the command was invoked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    /// Document URI; also used for the file extension check.
    pub uri: String,
    pub language_id: String,
    /// Version of the server's copy the selection refers to.
    pub version: i32,
    pub selection: Range,
    /// Text covered by `selection` (empty for a bare cursor).
    pub selected_text: String,
}

/// The server's copy of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub text: String,
    pub version: i32,
}

/// Services provided by the editor host.
pub trait EditorHost: Send + Sync {
    /// Read the clipboard as text.
    fn read_clipboard(&self) -> impl Future<Output = Result<String, ClipboardError>> + Send;

    /// The document the command targets, if the editor knows it.
    fn active_document(&self) -> Option<ActiveDocument>;

    /// Current text and version of a document.
    fn document_snapshot(&self, uri: &str) -> Option<DocumentSnapshot>;

    /// Wait until the copy of `uri` contains `text`, at most `timeout`.
    ///
    /// An applied edit is not necessarily in the copy yet: the editor's change
    /// notification can arrive after its answer to the edit.
    fn wait_for_text(
        &self,
        uri: &str,
        text: &str,
        timeout: Duration,
    ) -> impl Future<Output = bool> + Send;

    /// Replace `range` in `uri` with `new_text`.
    ///
    /// The editor rejects the edit if the document is no longer at `version`.
    /// Resolves once the editor has answered; `true` if the edit was applied.
    fn apply_edit(
        &self,
        uri: &str,
        version: i32,
        range: Range,
        new_text: String,
    ) -> impl Future<Output = bool> + Send;

    /// Show a transient status message.
    fn show_status(&self, text: String) -> impl Future<Output = ()> + Send;

    /// Hide the status message shown last.
    fn hide_status(&self) -> impl Future<Output = ()> + Send;
}
