//! System clipboard access.

use paste_url_core::ClipboardError;

/// Read the system clipboard as text.
///
/// arboard is blocking, so the read runs on the blocking pool. A clipboard
/// holding no text (an image, nothing at all) reads as an empty string.
pub async fn read_system_clipboard() -> Result<String, ClipboardError> {
    tokio::task::spawn_blocking(|| {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        match clipboard.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
        }
    })
    .await
    .map_err(|e| ClipboardError::Unavailable(e.to_string()))?
}
