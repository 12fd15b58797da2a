//! Quotation core: pure dashboard state machine and view-model helpers.
mod effect;
mod estimate;
mod intake;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ProcessRequest};
pub use estimate::{estimate_seconds, format_bytes, simulated_progress, MAX_SIMULATED_PROGRESS};
pub use intake::{accept_files, is_allowed, ALLOWED_EXTENSIONS};
pub use msg::Msg;
pub use state::{AppState, Credentials, OutputFormat, SelectedFile, View};
pub use update::{
    update, INCOMPLETE_CREDENTIALS_MESSAGE, LOCAL_SAVE_FAILED_MESSAGE, MISSING_CREDENTIALS_MESSAGE,
    SAVED_CREDENTIALS_MESSAGE,
};
pub use view_model::{resolve_sheet_url, AppViewModel, FileRowView, SHEETS_BASE_URL};
