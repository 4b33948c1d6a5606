//! The main Language Server implementation.
//!
//! # LSP Lifecycle
//!
//! 1. Editor starts our binary and sends `initialize` request
//! 2. We respond with our capabilities (document sync + the paste command)
//! 3. Editor sends `initialized` notification; we pull the `http` settings
//! 4. Normal operation: document events keep our copies in sync, the editor
//!    runs `pasteUrl.paste` through `workspace/executeCommand`
//! 5. Editor sends `shutdown` request, we respond, then `exit` notification

mod clipboard;
mod command;
mod config;
mod host;
mod state;
mod utils;

pub use state::Document;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use lsp_types::*;
use paste_url_core::{HttpSettings, PasteOutcome, Paster, TitleFetcher};
use serde_json::Value;
use tokio::sync::Notify;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::{Client, LanguageServer};

use command::PASTE_COMMAND;
use host::LspHost;

/// The Paste URL Language Server.
///
/// This struct holds all the state needed by the server:
/// - `client`: Used to send edits and messages TO the editor
/// - `documents`: Map of open files (Uri -> Document)
/// - `fetcher`: Title fetcher built from the latest `http` settings
pub struct PasteUrlLanguageServer {
    /// The LSP client - used to send messages TO the editor.
    client: Client,

    /// Open documents, keyed by their URI.
    documents: Arc<DashMap<String, Document>>,

    /// Woken after each document update; pending title fetches wait on it
    /// for their placeholder to arrive.
    doc_changed: Arc<Notify>,

    /// Replaced wholesale whenever the settings change. Each paste clones the
    /// `Arc` so in-flight fetches keep the client they started with.
    fetcher: Arc<RwLock<Arc<TitleFetcher>>>,

    /// Client capabilities captured from initialize params.
    work_done_progress: AtomicBool,
    pull_configuration: AtomicBool,
    dynamic_configuration: AtomicBool,
}

impl PasteUrlLanguageServer {
    /// Create a new language server instance.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            doc_changed: Arc::new(Notify::new()),
            fetcher: Arc::new(RwLock::new(Arc::new(TitleFetcher::direct()))),
            work_done_progress: AtomicBool::new(false),
            pull_configuration: AtomicBool::new(false),
            dynamic_configuration: AtomicBool::new(false),
        }
    }

    /// The fetcher for the current settings.
    fn current_fetcher(&self) -> Arc<TitleFetcher> {
        match self.fetcher.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Rebuild the HTTP client from new settings.
    fn apply_http_settings(&self, settings: HttpSettings) {
        let fetcher = Arc::new(TitleFetcher::new(&settings.with_env_fallback()));

        match self.fetcher.write() {
            Ok(mut guard) => *guard = fetcher,
            Err(poisoned) => *poisoned.into_inner() = fetcher,
        }
    }

    /// Ask the editor for the `http` section and apply it.
    async fn pull_http_settings(&self) {
        if !self.pull_configuration.load(Ordering::Relaxed) {
            tracing::debug!("Client does not support workspace/configuration");
            return;
        }

        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(config::HTTP_SECTION.to_string()),
        }];

        match self.client.configuration(items).await {
            Ok(values) => {
                let section = values.into_iter().next().unwrap_or(Value::Null);
                self.apply_http_settings(config::parse_http_settings(&section));
            }
            Err(e) => tracing::warn!("workspace/configuration failed: {}", e),
        }
    }

    /// Ask to be told about configuration changes (pull-model clients only
    /// send them after registration).
    async fn register_configuration_watch(&self) {
        if !self.dynamic_configuration.load(Ordering::Relaxed) {
            return;
        }

        let registration = Registration {
            id: "paste-url/didChangeConfiguration".to_string(),
            method: "workspace/didChangeConfiguration".to_string(),
            register_options: None,
        };

        if let Err(e) = self.client.register_capability(vec![registration]).await {
            tracing::warn!("Failed to register for configuration changes: {}", e);
        }
    }

    /// Run `pasteUrl.paste`.
    ///
    /// Returns once the link or placeholder is in the document; the title
    /// fetch continues in a background task.
    async fn paste(&self, arguments: Vec<Value>) -> Result<Option<Value>> {
        let args = command::parse_paste_args(&arguments)?;
        tracing::debug!("Paste into {} at {:?}", args.uri, args.selection.start);

        let host = LspHost::new(
            self.client.clone(),
            self.documents.clone(),
            self.doc_changed.clone(),
            args,
            self.work_done_progress.load(Ordering::Relaxed),
        );
        let paster = Paster::new(Arc::new(host));

        match paster.paste().await {
            Ok(PasteOutcome::FetchingTitle(pending)) => {
                let fetcher = self.current_fetcher();
                tokio::spawn(async move {
                    let url = pending.url.clone();
                    if paster.complete(pending, &fetcher).await {
                        tracing::debug!("Title for {} inserted", url);
                    }
                });
            }
            Ok(outcome) => tracing::debug!("Paste finished: {:?}", outcome),
            Err(e) => {
                tracing::warn!("Paste failed: {}", e);
                self.client
                    .show_message(MessageType::WARNING, format!("Paste URL: {}", e))
                    .await;
            }
        }

        Ok(None)
    }
}

/// Implementation of the Language Server Protocol.
impl LanguageServer for PasteUrlLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("Received initialize request");

        let capabilities = &params.capabilities;
        let work_done_progress = capabilities
            .window
            .as_ref()
            .and_then(|w| w.work_done_progress)
            .unwrap_or(false);
        let pull_configuration = capabilities
            .workspace
            .as_ref()
            .and_then(|w| w.configuration)
            .unwrap_or(false);
        let dynamic_configuration = capabilities
            .workspace
            .as_ref()
            .and_then(|w| w.did_change_configuration.as_ref())
            .and_then(|c| c.dynamic_registration)
            .unwrap_or(false);

        self.work_done_progress.store(work_done_progress, Ordering::Relaxed);
        self.pull_configuration.store(pull_configuration, Ordering::Relaxed);
        self.dynamic_configuration
            .store(dynamic_configuration, Ordering::Relaxed);

        let settings = params
            .initialization_options
            .as_ref()
            .and_then(config::http_section)
            .map(config::parse_http_settings)
            .unwrap_or_default();
        self.apply_http_settings(settings);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::INCREMENTAL),
                        ..Default::default()
                    },
                )),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![PASTE_COMMAND.to_string()],
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "paste-url-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        tracing::info!("Server initialized - handshake complete");
        self.register_configuration_watch().await;
        self.pull_http_settings().await;
        self.client
            .log_message(MessageType::INFO, "Paste URL server ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutdown requested");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let uri = doc.uri.to_string();
        tracing::debug!("Document opened: {} ({})", uri, doc.language_id);

        self.documents
            .insert(uri, Document::new(&doc.text, doc.version, doc.language_id));
        self.doc_changed.notify_waiters();
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.to_string();

        if let Some(mut doc) = self.documents.get_mut(&uri) {
            for change in &params.content_changes {
                utils::apply_change(&mut doc.content, change);
            }
            doc.version = params.text_document.version;
            tracing::trace!("Document {} now at version {}", uri, doc.version);
        } else {
            tracing::debug!("Change for untracked document: {}", uri);
            return;
        }

        self.doc_changed.notify_waiters();
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        tracing::debug!("Document closed: {}", uri);
        self.documents.remove(&uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        tracing::debug!("Configuration changed");

        match config::http_section(&params.settings) {
            Some(section) => self.apply_http_settings(config::parse_http_settings(section)),
            None => self.pull_http_settings().await,
        }
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        if params.command == PASTE_COMMAND {
            self.paste(params.arguments).await
        } else {
            Err(Error::invalid_params(format!(
                "Unknown command: {}",
                params.command
            )))
        }
    }
}
