//! Configuration loading from `.env` files.

use std::{env, path::PathBuf, time::Duration};

use anyhow::{Context, Result};

use crate::store::Store;

/// Collections that only the submission endpoints may write.
pub const DEFAULT_PRIVATE: [&str; 2] = ["contactMessages", "newsletterSubscribers"];
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 15_000;

/// Runtime settings derived from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory for all storage.
    pub store_root: PathBuf,
    /// HTTP bind address, e.g. `127.0.0.1:7777`.
    pub bind_http: String,
    /// WebSocket bind address, e.g. `127.0.0.1:7778`.
    pub bind_ws: String,
    /// Collections hidden from public reads and writes.
    pub private_collections: Vec<String>,
    /// Bound on an unacknowledged write from a view.
    pub write_timeout: Duration,
    /// Base URL of a remote server for `watch`/`submit`, if not local.
    pub remote_http: Option<String>,
    /// WebSocket URL of a remote server.
    pub remote_ws: Option<String>,
}

impl Settings {
    /// Load settings from the specified `.env` file.
    pub fn from_env(path: &str) -> Result<Self> {
        dotenvy::from_filename(path).context("reading env file")?;
        let store_root = PathBuf::from(env::var("STORE_ROOT").context("STORE_ROOT")?);
        let bind_http = env::var("BIND_HTTP").context("BIND_HTTP")?;
        let bind_ws = env::var("BIND_WS").context("BIND_WS")?;
        let private_collections = match env::var("PRIVATE_COLLECTIONS") {
            Ok(s) => csv_strings(s),
            Err(_) => DEFAULT_PRIVATE.iter().map(|s| s.to_string()).collect(),
        };
        let write_timeout = Duration::from_millis(
            env::var("WRITE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_WRITE_TIMEOUT_MS),
        );
        let remote_http = env::var("REMOTE_HTTP").ok().filter(|s| !s.is_empty());
        let remote_ws = env::var("REMOTE_WS").ok().filter(|s| !s.is_empty());
        Ok(Self {
            store_root,
            bind_http,
            bind_ws,
            private_collections,
            write_timeout,
            remote_http,
            remote_ws,
        })
    }

    /// The local store with the configured private collections.
    pub fn store(&self) -> Store {
        Store::new(self.store_root.clone()).with_private(self.private_collections.clone())
    }

    /// `(ws, http)` endpoints of the server a client should talk to. Falls
    /// back to the local bind addresses.
    pub fn remote_endpoints(&self) -> (String, String) {
        let ws = self
            .remote_ws
            .clone()
            .unwrap_or_else(|| format!("ws://{}/", self.bind_ws));
        let http = self
            .remote_http
            .clone()
            .unwrap_or_else(|| format!("http://{}/", self.bind_http));
        (ws, http)
    }
}

/// Split a comma-separated string into trimmed string values.
pub fn csv_strings(input: impl AsRef<str>) -> Vec<String> {
    let s = input.as_ref();
    s.split(',')
        .filter_map(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .collect()
}
