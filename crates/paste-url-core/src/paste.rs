// This file is part of paste-url-lsp.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! The paste flow: clipboard → link → placeholder → title.
//!
//! # How it works
//!
//! 1. Read the clipboard; empty means "Not a URL" and we stop
//! 2. With a selection, the selection becomes the link text (no network)
//! 3. Without one, insert a placeholder link at the cursor and wait for the edit
//! 4. `complete` waits for the placeholder to show up in the server's copy,
//!    fetches the title and swaps it in for the placeholder text
//!
//! Steps 1-3 are `paste`; the server runs `complete` as a detached task so the
//! command returns as soon as the placeholder is visible.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use lsp_types::Range;

use crate::error::PasteError;
use crate::fetcher::TitleFetcher;
use crate::formatter::LinkFormatter;
use crate::host::{ActiveDocument, EditorHost};
use crate::placeholder::{find_placeholder, normalize_url, placeholder_text};

/// How long status messages stay visible.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// How long to wait for the inserted placeholder to reach the server's copy.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(2);

const STATUS_PREFIX: &str = "Paste URL: ";
const NOT_A_URL: &str = "[PasteURL]: Not a URL.";

/// A placeholder that is waiting for its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTitle {
    /// Document the placeholder was inserted into.
    pub uri: String,
    /// Normalized URL to fetch.
    pub url: String,
    /// Placeholder text to search for when the title arrives.
    pub placeholder: String,
}

/// What a paste did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Clipboard was empty; a status message was shown.
    NotAUrl,
    /// The selection was replaced by a link.
    Linked,
    /// A placeholder was inserted and needs `complete`.
    FetchingTitle(PendingTitle),
}

/// Runs paste invocations against an editor host.
pub struct Paster<H> {
    host: Arc<H>,
    status_timeout: Duration,
    sync_timeout: Duration,
}

impl<H> Clone for Paster<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            status_timeout: self.status_timeout,
            sync_timeout: self.sync_timeout,
        }
    }
}

impl<H: EditorHost + 'static> Paster<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            status_timeout: STATUS_TIMEOUT,
            sync_timeout: SYNC_TIMEOUT,
        }
    }

    /// Override how long status messages stay up.
    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    /// Override how long `complete` waits for the placeholder to sync.
    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    /// Read the clipboard and insert a link (or a placeholder for one).
    pub async fn paste(&self) -> Result<PasteOutcome, PasteError> {
        let content = match self.host.read_clipboard().await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("{}", e);
                String::new()
            }
        };

        if content.is_empty() {
            self.show_message(NOT_A_URL).await;
            return Ok(PasteOutcome::NotAUrl);
        }

        let document = self
            .host
            .active_document()
            .ok_or(PasteError::NoActiveEditor)?;
        let formatter = LinkFormatter::for_document(&document.uri, &document.language_id);

        if document.selected_text.is_empty() {
            let pending = self.insert_placeholder(&document, formatter, &content).await?;
            Ok(PasteOutcome::FetchingTitle(pending))
        } else {
            self.replace_selection(&document, formatter, &content).await?;
            Ok(PasteOutcome::Linked)
        }
    }

    /// Fetch the title for `pending` and put it in place of the placeholder.
    ///
    /// The request is only sent once the server's copy holds the placeholder
    /// (or the sync timeout ran out). Returns whether the document was edited.
    pub async fn complete(&self, pending: PendingTitle, fetcher: &TitleFetcher) -> bool {
        if !self
            .host
            .wait_for_text(&pending.uri, &pending.placeholder, self.sync_timeout)
            .await
        {
            tracing::warn!(
                "Placeholder '{}' not in {} after {:?}",
                pending.placeholder,
                pending.uri,
                self.sync_timeout
            );
        }

        let title = fetcher.resolve_title(&pending.url).await;
        self.replace_placeholder(&pending, title).await
    }

    /// Replace the first occurrence of the placeholder with `new_text`.
    ///
    /// If the placeholder was edited away in the meantime nothing happens. The
    /// edit carries the version it was computed on, so a copy that fell behind
    /// the editor gets the edit rejected instead of misplaced.
    pub async fn replace_placeholder(&self, pending: &PendingTitle, new_text: String) -> bool {
        let snapshot = match self.host.document_snapshot(&pending.uri) {
            Some(snapshot) => snapshot,
            None => {
                tracing::debug!("Document {} closed before title arrived", pending.uri);
                return false;
            }
        };

        let range = match find_placeholder(&snapshot.text, &pending.placeholder) {
            Some(range) => range,
            None => {
                tracing::debug!(
                    "Placeholder '{}' no longer in {}, skipping",
                    pending.placeholder,
                    pending.uri
                );
                return false;
            }
        };

        self.host
            .apply_edit(&pending.uri, snapshot.version, range, new_text)
            .await
    }

    async fn replace_selection(
        &self,
        document: &ActiveDocument,
        formatter: LinkFormatter,
        url: &str,
    ) -> Result<(), PasteError> {
        let link = formatter.format_link(&document.selected_text, url);

        if self
            .host
            .apply_edit(&document.uri, document.version, document.selection, link)
            .await
        {
            Ok(())
        } else {
            Err(PasteError::EditRejected(document.uri.clone()))
        }
    }

    async fn insert_placeholder(
        &self,
        document: &ActiveDocument,
        formatter: LinkFormatter,
        content: &str,
    ) -> Result<PendingTitle, PasteError> {
        let url = normalize_url(content);
        let placeholder = placeholder_text(&Local::now());
        let link = formatter.format_link(&placeholder, &url);

        let cursor = document.selection.start;
        let at_cursor = Range {
            start: cursor,
            end: cursor,
        };

        if !self
            .host
            .apply_edit(&document.uri, document.version, at_cursor, link)
            .await
        {
            return Err(PasteError::EditRejected(document.uri.clone()));
        }

        tracing::debug!("Inserted placeholder '{}' for {}", placeholder, url);

        Ok(PendingTitle {
            uri: document.uri.clone(),
            url,
            placeholder,
        })
    }

    /// Show a status message and hide it later without holding the caller.
    async fn show_message(&self, message: &str) {
        self.host
            .show_status(format!("{}{}", STATUS_PREFIX, message))
            .await;

        let host = self.host.clone();
        let timeout = self.status_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            host.hide_status().await;
        });
    }
}
