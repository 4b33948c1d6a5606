//! Reading the editor's `http` settings.
//!
//! Settings arrive three ways: `initializationOptions`, the settings object of
//! `workspace/didChangeConfiguration`, or a `workspace/configuration` pull.
//! The first two carry the whole tree; the pull returns just the section.

use paste_url_core::HttpSettings;
use serde_json::Value;

/// Configuration section holding the proxy settings.
pub const HTTP_SECTION: &str = "http";

/// The `http` section of a full settings tree, if present.
pub fn http_section(settings: &Value) -> Option<&Value> {
    settings.get(HTTP_SECTION).filter(|section| section.is_object())
}

/// Parse an `http` section. Missing or malformed sections give defaults.
pub fn parse_http_settings(section: &Value) -> HttpSettings {
    if section.is_null() {
        return HttpSettings::default();
    }

    match serde_json::from_value(section.clone()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Ignoring malformed http settings: {}", e);
            HttpSettings::default()
        }
    }
}
