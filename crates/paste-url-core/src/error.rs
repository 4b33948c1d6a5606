// This file is part of paste-url-lsp.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by the fetcher and the paste orchestrator.

use thiserror::Error;

/// Failure while talking to the remote page.
///
/// The `Display` text is what ends up in the document when a fetch fails,
/// so it stays close to the underlying error message.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The configured proxy could not be turned into a client.
    #[error("Invalid proxy '{proxy}': {source}")]
    Proxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The clipboard could not be read.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// A paste invocation that could not run to the placeholder stage.
#[derive(Debug, Error)]
pub enum PasteError {
    #[error("No active editor")]
    NoActiveEditor,

    #[error("Editor rejected the edit to {0}")]
    EditRejected(String),
}
