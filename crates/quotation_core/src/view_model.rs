use url::Url;

use crate::{format_bytes, Credentials, OutputFormat, SelectedFile, View};

/// Spreadsheet ids are appended to this to build an openable link.
pub const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub view: View,
    pub files: Vec<FileRowView>,
    pub file_count: usize,
    pub total_bytes: u64,
    pub estimated_secs: u64,
    pub sheet_link: String,
    pub output_format: OutputFormat,
    pub error_message: Option<String>,
    pub sheet_id: Option<String>,
    pub sheet_url: Option<String>,
    pub results_count: usize,
    pub completed_at: Option<String>,
    pub credentials: Credentials,
    pub credentials_complete: bool,
    pub credentials_status: Option<String>,
    pub progress_percent: u8,
    pub can_process: bool,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn total_size_label(&self) -> String {
        format_bytes(self.total_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub mime_type: String,
}

impl FileRowView {
    pub(crate) fn from_file(index: usize, file: &SelectedFile) -> Self {
        Self {
            index,
            name: file.name.clone(),
            size: file.size,
            size_label: format_bytes(file.size),
            mime_type: file.mime_type.clone(),
        }
    }
}

/// Link for the "Open sheet" action.
///
/// Before any result arrives this is whatever the user typed. Afterwards a
/// full spreadsheet link typed by the user wins; otherwise the link is built
/// from the returned sheet id.
pub fn resolve_sheet_url(sheet_link: &str, sheet_id: Option<&str>) -> Option<String> {
    let resolved = match sheet_id {
        None => sheet_link.to_string(),
        Some(_) if sheet_link.contains("spreadsheets/d/") => sheet_link.to_string(),
        Some(id) => sheet_url_for_id(id),
    };
    if resolved.is_empty() {
        None
    } else {
        Some(resolved)
    }
}

fn sheet_url_for_id(id: &str) -> String {
    if id.is_empty() {
        return String::new();
    }
    match Url::parse(SHEETS_BASE_URL) {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(id);
            }
            url.to_string()
        }
        Err(_) => format!("{SHEETS_BASE_URL}/{id}"),
    }
}
