// This file is part of paste-url-lsp.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! HTTP client configuration read from the editor's `http` settings.
//!
//! # How it works
//!
//! 1. The server pulls the `http` section from the editor (startup and on change)
//! 2. A non-empty `proxy` is normalized to a URL and bound to the client
//! 3. Without a proxy we fall back to `PASTE_URL_PROXY`, then to a direct client

use reqwest::{Client, Proxy};
use serde::Deserialize;

use crate::error::FetchError;

/// Environment variable consulted when the editor has no proxy configured.
pub const PROXY_ENV: &str = "PASTE_URL_PROXY";

/// The editor's `http` settings section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Proxy URL, possibly without a scheme (`proxy.local:3128`).
    pub proxy: Option<String>,

    /// Whether the proxy's certificate must be verified. Defaults to true.
    #[serde(rename = "proxyStrictSSL")]
    pub proxy_strict_ssl: Option<bool>,
}

impl HttpSettings {
    /// Fill in the proxy from `PASTE_URL_PROXY` if the editor left it empty.
    pub fn with_env_fallback(mut self) -> Self {
        if self.proxy_url().is_none() {
            if let Ok(proxy) = std::env::var(PROXY_ENV) {
                tracing::info!("Using proxy from {} env", PROXY_ENV);
                self.proxy = Some(proxy);
            }
        }
        self
    }

    /// The normalized proxy URL, if one is configured.
    pub fn proxy_url(&self) -> Option<String> {
        self.proxy.as_deref().and_then(normalize_proxy)
    }

    pub fn strict_ssl(&self) -> bool {
        self.proxy_strict_ssl.unwrap_or(true)
    }
}

/// Turn a proxy setting into a URL reqwest accepts.
///
/// Blank settings mean "no proxy". A value without a scheme gets `http://`.
pub fn normalize_proxy(proxy: &str) -> Option<String> {
    let proxy = proxy.trim();
    if proxy.is_empty() {
        return None;
    }

    if proxy.starts_with("http") || proxy.contains("://") {
        Some(proxy.to_string())
    } else {
        Some(format!("http://{}", proxy))
    }
}

/// Build the reqwest client for the given settings.
///
/// A configured proxy handles every scheme. Without one the client connects
/// directly and ignores the process environment's proxy variables.
pub fn build_client(settings: &HttpSettings) -> Result<Client, FetchError> {
    let mut builder = Client::builder().gzip(true).brotli(true);

    if !settings.strict_ssl() {
        tracing::warn!("proxyStrictSSL is off - certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    match settings.proxy_url() {
        Some(proxy_url) => {
            let proxy = Proxy::all(&proxy_url).map_err(|source| FetchError::Proxy {
                proxy: proxy_url.clone(),
                source,
            })?;
            tracing::info!("HTTP client configured with proxy {}", proxy_url);
            builder = builder.proxy(proxy);
        }
        None => {
            tracing::debug!("HTTP client configured for direct connections");
            builder = builder.no_proxy();
        }
    }

    builder.build().map_err(FetchError::Request)
}
