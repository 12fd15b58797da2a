use crate::{Credentials, OutputFormat, SelectedFile};

/// Everything one call to the processing endpoint carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub sheet_url: String,
    pub output_format: OutputFormat,
    pub credentials: Credentials,
    pub files: Vec<SelectedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchRemoteCredentials,
    SaveCredentials(Credentials),
    /// Write credentials to durable local storage.
    PersistCredentials(Credentials),
    SubmitFiles(ProcessRequest),
}
