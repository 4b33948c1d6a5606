// This file is part of paste-url-lsp.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! Paste URL core - the editor-independent half of paste-url-lsp
//!
//! This crate provides:
//! - Link formatter: Markdown or reStructuredText link syntax
//! - Title fetcher: GET + charset decoding + `<title>` extraction
//! - HTTP configuration: proxy settings to reqwest client
//! - Paster: the clipboard → placeholder → title flow over an `EditorHost`

pub mod error;
pub mod fetcher;
pub mod formatter;
pub mod host;
pub mod http_config;
pub mod paste;
pub mod placeholder;

pub use error::{ClipboardError, FetchError, PasteError};
pub use fetcher::TitleFetcher;
pub use formatter::LinkFormatter;
pub use host::{ActiveDocument, DocumentSnapshot, EditorHost};
pub use http_config::HttpSettings;
pub use paste::{PasteOutcome, Paster, PendingTitle};
