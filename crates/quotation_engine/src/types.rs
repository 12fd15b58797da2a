use quotation_core::Credentials;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of a successful `POST /api/process-files`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub sheet_id: String,
    #[serde(default)]
    pub results: Vec<FileResult>,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// One extracted quotation. `data` is whatever structure the server produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Body of `GET /api/credentials`. Either field may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RemoteCredentials {
    #[serde(default)]
    pub google_api_key: Option<String>,
    #[serde(default)]
    pub gcp_service_account_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub response: ProcessResponse,
    /// Completion timestamp from the configured clock; empty when none is set.
    pub completed_utc: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RemoteCredentials(RemoteCredentials),
    /// The startup fetch found nothing usable. Carries no detail on purpose:
    /// the UI keeps whatever it already has.
    RemoteCredentialsUnavailable,
    CredentialsSaved {
        credentials: Credentials,
        result: Result<(), ApiError>,
    },
    ProcessCompleted(Result<ProcessOutcome, ApiError>),
}

pub const UNREACHABLE_MESSAGE: &str = "Could not reach the processing service";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from the processing service";
pub const INTERRUPTED_MESSAGE: &str = "Processing stopped unexpectedly";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid api base url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("http status {status}")]
    HttpStatus { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("cannot upload {name}: {message}")]
    InvalidFile { name: String, message: String },
    #[error("request task stopped: {0}")]
    Interrupted(String),
}

impl ApiError {
    /// Text shown in the error view.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) | ApiError::Timeout(_) => UNREACHABLE_MESSAGE.to_string(),
            ApiError::HttpStatus { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("HTTP {status}")),
            ApiError::Decode(_) => INVALID_RESPONSE_MESSAGE.to_string(),
            ApiError::Interrupted(_) => INTERRUPTED_MESSAGE.to_string(),
            ApiError::InvalidBaseUrl { .. } | ApiError::InvalidFile { .. } => self.to_string(),
        }
    }

    /// Text the server sent with a non-success status, if any.
    pub fn server_text(&self) -> Option<&str> {
        match self {
            ApiError::HttpStatus {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}
