//! Configuration loading and server URL resolution

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{Error, Result};

/// Environment variable consulted when no explicit server URL is given
pub const SERVER_ENV_VAR: &str = "LEXCTL_SERVER";

/// Stock address of a locally running lexicon server
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8787";

/// Path of the WebSocket registration endpoint on the server
pub const WEBSOCK_PATH: &str = "/websockreg";

/// On-disk configuration (`~/.config/lexctl/config.toml`).
///
/// All fields are optional and a missing file is not an error; the client
/// must start with no configuration at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the lexicon server, e.g. `http://lex.example.org:8787`
    pub server_url: Option<String>,
    /// Default log filter used when `RUST_LOG` is unset
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Load the config file from its default location, if present.
    pub fn load() -> TomlConfig {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => TomlConfig::default(),
        }
    }

    /// Load a config file from `path`. Unreadable or malformed files are
    /// logged as warnings and treated as absent; configuration problems
    /// never prevent startup.
    pub fn load_from(path: &Path) -> TomlConfig {
        if !path.exists() {
            return TomlConfig::default();
        }
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read config file {}: {}", path.display(), e);
                return TomlConfig::default();
            }
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring malformed config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }

    /// Default config file path for the platform (`dirs::config_dir()`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lexctl").join("config.toml"))
    }
}

/// Resolve the server base URL following priority order:
/// 1. Command-line argument (highest priority)
/// 2. `LEXCTL_SERVER` environment variable
/// 3. TOML config file
/// 4. Compiled default (fallback)
pub fn resolve_server_url(cli_arg: Option<&str>, config: &TomlConfig) -> String {
    if let Some(url) = cli_arg {
        return normalize_base_url(url);
    }
    if let Ok(url) = std::env::var(SERVER_ENV_VAR) {
        if !url.trim().is_empty() {
            return normalize_base_url(&url);
        }
    }
    if let Some(url) = &config.server_url {
        return normalize_base_url(url);
    }
    DEFAULT_SERVER_URL.to_string()
}

/// Strip surrounding whitespace and any trailing slash so endpoint paths
/// can be appended verbatim.
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Derive the notification channel endpoint from the HTTP base URL.
pub fn websocket_url(http_base: &str) -> Result<String> {
    let base = normalize_base_url(http_base);
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        return Err(Error::Config(format!(
            "server URL must start with http:// or https://, got '{}'",
            base
        )));
    };
    Ok(format!("{}{}", ws_base, WEBSOCK_PATH))
}
