//! Paste URL LSP - pastes the clipboard URL as a titled link
//!
//! # How this works
//!
//! 1. This binary is started by the editor (e.g., VS Code, Neovim, Helix)
//! 2. Communication happens over stdin/stdout using JSON-RPC
//! 3. The editor keeps us in sync with open documents and settings
//! 4. The `pasteUrl.paste` command inserts the link through `workspace/applyEdit`
//!
//! # Why we use stderr for logging
//!
//! Since stdin/stdout are used for the LSP protocol, we CANNOT use
//! println!() for debugging. Instead, we use the `tracing` crate
//! which writes to stderr.

mod server;

use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug to see debug messages
    // Example: RUST_LOG=paste_url_lsp=debug,paste_url_core=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr) // IMPORTANT: write to stderr, not stdout
        .init();

    tracing::info!("Starting paste-url-lsp server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    // The Client handed to the closure is how we send edits and messages TO the editor
    let (service, socket) = LspService::build(server::PasteUrlLanguageServer::new).finish();

    // Runs until the editor disconnects
    Server::new(stdin, stdout, socket).serve(service).await;

    tracing::info!("paste-url-lsp server stopped");
}
