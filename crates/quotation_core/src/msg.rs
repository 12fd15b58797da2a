use crate::{Credentials, OutputFormat, SelectedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// App finished loading; triggers the one-time remote credential fetch.
    Started,
    /// Files came in from the picker or a drop. Unsupported ones are filtered out.
    FilesAdded(Vec<SelectedFile>),
    /// User removed the file at this position.
    FileRemoved(usize),
    /// User edited the sheet link / id box.
    SheetLinkChanged(String),
    OutputFormatSelected(OutputFormat),
    ApiKeyChanged(String),
    ServiceAccountChanged(String),
    OpenSettings,
    SaveCredentialsClicked,
    /// Server accepted the credentials that were sent.
    CredentialsSaved(Credentials),
    CredentialsSaveFailed(String),
    /// The local credential store could not be written; carries the error text.
    CredentialsPersistFailed(String),
    /// Values read back from local storage at startup.
    CredentialsRestored(Credentials),
    /// Values returned by the remote credentials endpoint. Missing fields are `None`.
    RemoteCredentialsLoaded {
        google_api_key: Option<String>,
        service_account_json: Option<String>,
    },
    ProcessClicked,
    /// Processing endpoint answered with 2xx and a decodable body.
    ProcessSucceeded {
        sheet_id: String,
        result_count: usize,
        errors: Vec<String>,
        completed_at: Option<String>,
    },
    /// Transport failure or non-2xx response, already rendered for the user.
    ProcessFailed { message: String },
    /// Leave a terminal view (or settings) without clearing the form.
    BackToDashboard,
    /// "Process more files": clear everything except credentials.
    Reset,
    /// Animation tick while processing; `elapsed_ms` counts from submission.
    Tick { elapsed_ms: u64 },
    /// Fallback for placeholder wiring.
    NoOp,
}
