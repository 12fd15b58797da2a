use std::fmt;
use std::path::PathBuf;

use crate::estimate::{estimate_seconds, simulated_progress};
use crate::view_model::{resolve_sheet_url, AppViewModel, FileRowView};

/// Which screen of the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Settings,
    Processing,
    Success,
    Error,
}

/// Destination the server writes results to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Excel,
    GoogleSheet,
    Both,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Excel,
        OutputFormat::GoogleSheet,
        OutputFormat::Both,
    ];

    /// Label sent in the `output_format` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Excel => "Excel",
            OutputFormat::GoogleSheet => "Google Sheet",
            OutputFormat::Both => "Both",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file picked by the user. `path` is where the engine reads the bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub path: PathBuf,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        mime_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            path: path.into(),
        }
    }
}

/// API key plus service-account blob. Both are opaque to the client.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub google_api_key: String,
    pub service_account_json: String,
}

impl Credentials {
    pub fn new(google_api_key: impl Into<String>, service_account_json: impl Into<String>) -> Self {
        Self {
            google_api_key: google_api_key.into(),
            service_account_json: service_account_json.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.google_api_key.trim().is_empty() && !self.service_account_json.trim().is_empty()
    }

    pub fn trimmed(&self) -> Self {
        Self {
            google_api_key: self.google_api_key.trim().to_string(),
            service_account_json: self.service_account_json.trim().to_string(),
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("google_api_key_len", &self.google_api_key.len())
            .field("service_account_json_len", &self.service_account_json.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    view: View,
    files: Vec<SelectedFile>,
    sheet_link: String,
    output_format: OutputFormat,
    error_message: String,
    last_sheet_id: Option<String>,
    results_count: usize,
    completed_at: Option<String>,
    credentials: Credentials,
    credentials_status: String,
    progress_percent: u8,
    hydration_requested: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let total_bytes = self.total_bytes();
        AppViewModel {
            view: self.view,
            files: self
                .files
                .iter()
                .enumerate()
                .map(|(index, file)| FileRowView::from_file(index, file))
                .collect(),
            file_count: self.files.len(),
            total_bytes,
            estimated_secs: estimate_seconds(total_bytes),
            sheet_link: self.sheet_link.clone(),
            output_format: self.output_format,
            error_message: non_empty(&self.error_message),
            sheet_id: self.last_sheet_id.clone(),
            sheet_url: resolve_sheet_url(&self.sheet_link, self.last_sheet_id.as_deref()),
            results_count: self.results_count,
            completed_at: self.completed_at.clone(),
            credentials: self.credentials.clone(),
            credentials_complete: self.credentials.is_complete(),
            credentials_status: non_empty(&self.credentials_status),
            progress_percent: self.progress_percent,
            can_process: !self.files.is_empty()
                && matches!(self.view, View::Dashboard | View::Settings),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn current_view(&self) -> View {
        self.view
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|file| file.size).sum()
    }

    /// True only on the first call.
    pub(crate) fn request_hydration(&mut self) -> bool {
        !std::mem::replace(&mut self.hydration_requested, true)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.mark_dirty();
        }
    }

    pub(crate) fn append_files(&mut self, accepted: Vec<SelectedFile>) {
        if accepted.is_empty() {
            return;
        }
        self.files.extend(accepted);
        self.mark_dirty();
    }

    pub(crate) fn remove_file(&mut self, index: usize) -> Option<SelectedFile> {
        if index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);
        self.mark_dirty();
        Some(removed)
    }

    pub(crate) fn set_sheet_link(&mut self, link: String) {
        if self.sheet_link != link {
            self.sheet_link = link;
            self.mark_dirty();
        }
    }

    pub(crate) fn sheet_link(&self) -> &str {
        &self.sheet_link
    }

    pub(crate) fn set_output_format(&mut self, format: OutputFormat) {
        if self.output_format != format {
            self.output_format = format;
            self.mark_dirty();
        }
    }

    pub(crate) fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub(crate) fn set_api_key(&mut self, value: String) -> bool {
        if self.credentials.google_api_key == value {
            return false;
        }
        self.credentials.google_api_key = value;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_service_account_json(&mut self, value: String) -> bool {
        if self.credentials.service_account_json == value {
            return false;
        }
        self.credentials.service_account_json = value;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_credentials_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        if self.credentials_status != status {
            self.credentials_status = status;
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_processing(&mut self) {
        self.view = View::Processing;
        self.error_message.clear();
        self.progress_percent = 0;
        self.completed_at = None;
        self.mark_dirty();
    }

    pub(crate) fn record_success(
        &mut self,
        sheet_id: String,
        results_count: usize,
        errors: &[String],
        completed_at: Option<String>,
    ) {
        self.view = View::Success;
        self.last_sheet_id = Some(sheet_id);
        self.results_count = results_count;
        self.error_message = errors.join("\n");
        self.completed_at = completed_at;
        self.progress_percent = 100;
        self.mark_dirty();
    }

    pub(crate) fn record_failure(&mut self, message: String) {
        self.view = View::Error;
        self.error_message = message;
        self.mark_dirty();
    }

    pub(crate) fn advance_progress(&mut self, elapsed_ms: u64) {
        let next = simulated_progress(elapsed_ms, estimate_seconds(self.total_bytes()));
        if next > self.progress_percent {
            self.progress_percent = next;
            self.mark_dirty();
        }
    }

    /// Back to a blank dashboard. Credentials are kept.
    pub(crate) fn reset(&mut self) {
        let credentials = std::mem::take(&mut self.credentials);
        *self = Self {
            credentials,
            hydration_requested: self.hydration_requested,
            dirty: true,
            ..Self::default()
        };
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
