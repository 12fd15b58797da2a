//! Quotation engine: API client, effect execution and local persistence helpers.
mod client;
mod engine;
mod persist;
mod settings;
mod types;

pub use client::{ProcessingApi, ReqwestApiClient};
pub use engine::{EngineConfig, EngineHandle, UtcClock};
pub use persist::{ensure_store_dir, read_if_exists, AtomicFileWriter, PersistError};
pub use settings::{ApiSettings, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use types::{
    ApiError, EngineEvent, FileResult, ProcessOutcome, ProcessResponse, RemoteCredentials,
    INTERRUPTED_MESSAGE, INVALID_RESPONSE_MESSAGE, UNREACHABLE_MESSAGE,
};

/// Failure to bring the engine up.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}
