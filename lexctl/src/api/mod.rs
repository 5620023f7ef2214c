//! HTTP client for the lexicon server's admin surface
//!
//! The server owns all persistence and validation; this module only speaks
//! its request/response contracts. Non-success responses carry their body
//! text through verbatim so the operator sees what the server said.

mod import;
mod ipa;
mod lexicon;
mod symbolset;

pub use import::{ImportJob, ImportOutcome};
pub use ipa::{IpaSymbol, IpaTable};
pub use lexicon::Lexicon;
pub use symbolset::{Symbol, SYMBOL_CATEGORIES};

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

const USER_AGENT: &str = concat!("lexctl/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the lexicon server's admin endpoints.
///
/// Cheap to clone; wraps a shared `reqwest::Client`. Connection
/// establishment is bounded, but requests themselves carry no deadline —
/// the import endpoint answers only when the server-side job finishes.
#[derive(Clone)]
pub struct AdminApi {
    http: reqwest::Client,
    base_url: String,
}

impl AdminApi {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str) -> Result<AdminApi> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(AdminApi {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL this client talks to (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON endpoint, mapping non-success statuses to
    /// [`ClientError::Api`] with the body preserved for display.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let response = error_for_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// GET an endpoint for its side effect, returning the body text.
    pub(crate) async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let response = error_for_status(response).await?;
        response
            .text()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

/// Split a response into success and failure, keeping the failure body.
pub(crate) async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            body,
        })
    }
}
