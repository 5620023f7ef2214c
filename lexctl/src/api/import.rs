//! Import submission client
//!
//! One-shot multipart upload of a lexicon file. The outcome reported here
//! covers only the submission itself; the job's progress and result arrive
//! independently on the notification channel, correlated by the session
//! identifier carried in the form. The two signals are reconciled by the
//! caller, not here.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::{info, warn};

use lexctl_common::SessionId;

use crate::error::{ClientError, Result};

use super::AdminApi;

/// Endpoint the admin console posts import jobs to.
const IMPORT_PATH: &str = "/admin/lex_do_import";

/// One validated upload attempt.
///
/// Construction is the precondition gate: a job with an empty lexicon
/// name, an empty symbol-set name, or no chosen file never exists, so no
/// network call can be made for it.
#[derive(Debug, Clone)]
pub struct ImportJob {
    lexicon_name: String,
    symbol_set_name: String,
    validate: bool,
    file_name: String,
    payload: Vec<u8>,
}

impl ImportJob {
    /// Validate the job parameters. Names must be non-empty after trimming
    /// and a file must have been chosen.
    pub fn new(
        lexicon_name: &str,
        symbol_set_name: &str,
        validate: bool,
        file_name: &str,
        payload: Vec<u8>,
    ) -> Result<ImportJob> {
        let lexicon_name = lexicon_name.trim();
        if lexicon_name.is_empty() {
            return Err(ClientError::InvalidInput(
                "lexicon name must not be empty".to_string(),
            ));
        }
        let symbol_set_name = symbol_set_name.trim();
        if symbol_set_name.is_empty() {
            return Err(ClientError::InvalidInput(
                "symbol set name must not be empty".to_string(),
            ));
        }
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(ClientError::InvalidInput(
                "no lexicon file chosen".to_string(),
            ));
        }
        Ok(ImportJob {
            lexicon_name: lexicon_name.to_string(),
            symbol_set_name: symbol_set_name.to_string(),
            validate,
            file_name: file_name.to_string(),
            payload,
        })
    }

    /// Build a job from a file on disk.
    pub async fn from_path(
        lexicon_name: &str,
        symbol_set_name: &str,
        validate: bool,
        path: &Path,
    ) -> Result<ImportJob> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::InvalidInput(format!("no usable file name in {}", path.display()))
            })?
            .to_string();
        let payload = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::Common(lexctl_common::Error::Io(e)))?;
        ImportJob::new(lexicon_name, symbol_set_name, validate, &file_name, payload)
    }

    pub fn lexicon_name(&self) -> &str {
        &self.lexicon_name
    }

    pub fn symbol_set_name(&self) -> &str {
        &self.symbol_set_name
    }

    pub fn validate(&self) -> bool {
        self.validate
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Terminal outcome of one submission.
///
/// `detail` is the backend's response body verbatim; its structure (entry
/// counts, per-line validation messages) belongs to the backend contract
/// and is displayed, never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The server accepted and completed the submission (HTTP 200)
    Accepted { detail: String },
    /// Non-200 status or transport failure; `status` is `None` when the
    /// request never produced a response
    Rejected {
        status: Option<u16>,
        detail: String,
    },
}

impl ImportOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ImportOutcome::Accepted { .. })
    }

    /// Backend-provided detail text, whatever the outcome.
    pub fn detail(&self) -> &str {
        match self {
            ImportOutcome::Accepted { detail } => detail,
            ImportOutcome::Rejected { detail, .. } => detail,
        }
    }
}

impl AdminApi {
    /// Submit an import job under `session`.
    ///
    /// Fire-and-observe-terminal-result: resolves when the server answers
    /// the upload, with rejection folded into the outcome rather than an
    /// error. This does not wait for the job's notifications; whether they
    /// reach anyone depends on the session having registered its channel
    /// first. Concurrent submissions are neither serialized nor
    /// deduplicated — each resolves to its own outcome.
    pub async fn submit_import(&self, session: &SessionId, job: &ImportJob) -> ImportOutcome {
        let form = Form::new()
            .text("client_uuid", session.as_str().to_string())
            .text("symbolset_name", job.symbol_set_name.clone())
            .text("lexicon_name", job.lexicon_name.clone())
            .text("validate", job.validate.to_string())
            .part(
                "upload_file",
                Part::bytes(job.payload.clone()).file_name(job.file_name.clone()),
            );

        info!(
            "Submitting import of '{}' into lexicon '{}' (symbol set '{}', validate: {})",
            job.file_name, job.lexicon_name, job.symbol_set_name, job.validate
        );

        let response = match self
            .http()
            .post(self.url(IMPORT_PATH))
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Import submission failed in transport: {}", e);
                return ImportOutcome::Rejected {
                    status: None,
                    detail: e.to_string(),
                };
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::OK {
            info!("Import submission accepted: {}", body);
            ImportOutcome::Accepted { detail: body }
        } else {
            warn!("Import submission rejected with {}: {}", status, body);
            ImportOutcome::Rejected {
                status: Some(status.as_u16()),
                detail: body,
            }
        }
    }
}
