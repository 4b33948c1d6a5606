//! `EditorHost` on top of the LSP client.
//!
//! One `LspHost` is built per command invocation: it pins the document and
//! selection the client sent, and owns the progress token used as the status
//! item.
//!
//! Edits go out as versioned `documentChanges`, so the editor refuses an edit
//! computed on a copy that has fallen behind.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use lsp_types::notification::Progress;
use lsp_types::request::WorkDoneProgressCreate;
use lsp_types::*;
use paste_url_core::{ActiveDocument, ClipboardError, DocumentSnapshot, EditorHost};
use tokio::sync::Notify;
use tower_lsp::Client;

use super::clipboard;
use super::command::PasteArgs;
use super::utils;
use super::Document;

static NEXT_STATUS_ID: AtomicU64 = AtomicU64::new(1);

pub struct LspHost {
    client: Client,
    documents: Arc<DashMap<String, Document>>,
    /// Signalled after every `didOpen`/`didChange`.
    changed: Arc<Notify>,
    args: PasteArgs,
    /// Client supports `window/workDoneProgress`.
    work_done_progress: bool,
    status_token: NumberOrString,
}

impl LspHost {
    pub fn new(
        client: Client,
        documents: Arc<DashMap<String, Document>>,
        changed: Arc<Notify>,
        args: PasteArgs,
        work_done_progress: bool,
    ) -> Self {
        let id = NEXT_STATUS_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            client,
            documents,
            changed,
            args,
            work_done_progress,
            status_token: NumberOrString::String(format!("paste-url/status/{}", id)),
        }
    }

    fn contains(&self, uri: &str, text: &str) -> bool {
        self.documents
            .get(uri)
            .is_some_and(|doc| doc.content.to_string().contains(text))
    }

    async fn send_progress(&self, progress: WorkDoneProgress) {
        self.client
            .send_notification::<Progress>(ProgressParams {
                token: self.status_token.clone(),
                value: ProgressParamsValue::WorkDone(progress),
            })
            .await;
    }
}

impl EditorHost for LspHost {
    fn read_clipboard(&self) -> impl Future<Output = Result<String, ClipboardError>> + Send {
        async move {
            match &self.args.clipboard {
                Some(text) => Ok(text.clone()),
                None => clipboard::read_system_clipboard().await,
            }
        }
    }

    fn active_document(&self) -> Option<ActiveDocument> {
        let doc = self.documents.get(&self.args.uri)?;

        Some(ActiveDocument {
            uri: self.args.uri.clone(),
            language_id: doc.language_id.clone(),
            version: doc.version,
            selection: self.args.selection,
            selected_text: utils::range_text(&doc.content, self.args.selection),
        })
    }

    fn document_snapshot(&self, uri: &str) -> Option<DocumentSnapshot> {
        self.documents.get(uri).map(|doc| DocumentSnapshot {
            text: doc.content.to_string(),
            version: doc.version,
        })
    }

    fn wait_for_text(
        &self,
        uri: &str,
        text: &str,
        timeout: Duration,
    ) -> impl Future<Output = bool> + Send {
        async move {
            let synced = async {
                loop {
                    // Register before checking so a change in between still wakes us
                    let notified = self.changed.notified();
                    if self.contains(uri, text) {
                        return;
                    }
                    notified.await;
                }
            };
            tokio::time::timeout(timeout, synced).await.is_ok()
        }
    }

    fn apply_edit(
        &self,
        uri: &str,
        version: i32,
        range: Range,
        new_text: String,
    ) -> impl Future<Output = bool> + Send {
        async move {
            let uri = match uri.parse::<Uri>() {
                Ok(uri) => uri,
                Err(e) => {
                    tracing::warn!("Cannot edit {}: {}", uri, e);
                    return false;
                }
            };

            let edit = WorkspaceEdit {
                changes: None,
                document_changes: Some(DocumentChanges::Edits(vec![TextDocumentEdit {
                    text_document: OptionalVersionedTextDocumentIdentifier {
                        uri,
                        version: Some(version),
                    },
                    edits: vec![OneOf::Left(TextEdit { range, new_text })],
                }])),
                change_annotations: None,
            };

            match self.client.apply_edit(edit).await {
                Ok(response) => {
                    if !response.applied {
                        tracing::warn!(
                            "Editor did not apply edit: {}",
                            response.failure_reason.unwrap_or_default()
                        );
                    }
                    response.applied
                }
                Err(e) => {
                    tracing::warn!("workspace/applyEdit failed: {}", e);
                    false
                }
            }
        }
    }

    fn show_status(&self, text: String) -> impl Future<Output = ()> + Send {
        async move {
            if self.work_done_progress {
                let created = self
                    .client
                    .send_request::<WorkDoneProgressCreate>(WorkDoneProgressCreateParams {
                        token: self.status_token.clone(),
                    })
                    .await;

                if created.is_ok() {
                    self.send_progress(WorkDoneProgress::Begin(WorkDoneProgressBegin {
                        title: text,
                        ..Default::default()
                    }))
                    .await;
                    return;
                }
            }

            self.client.show_message(MessageType::INFO, text).await;
        }
    }

    fn hide_status(&self) -> impl Future<Output = ()> + Send {
        async move {
            // showMessage popups are dismissed by the user
            if self.work_done_progress {
                self.send_progress(WorkDoneProgress::End(WorkDoneProgressEnd { message: None }))
                    .await;
            }
        }
    }
}
