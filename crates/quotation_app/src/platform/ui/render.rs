use quotation_core::{AppViewModel, Credentials, FileRowView, View};

/// Lines to print for the current view.
pub fn render(view: &AppViewModel) -> Vec<String> {
    match view.view {
        View::Dashboard => render_dashboard(view),
        View::Settings => render_settings(view),
        View::Processing => vec![progress_line(view)],
        View::Success => render_success(view),
        View::Error => render_error(view),
    }
}

fn render_dashboard(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.files.len() + 4);
    if view.file_count == 0 {
        lines.push("No files selected".to_string());
    } else {
        lines.push(format!(
            "{} file(s), {} total, estimated ~{}s",
            view.file_count,
            view.total_size_label(),
            view.estimated_secs
        ));
        lines.extend(view.files.iter().map(file_row));
    }
    lines.push(format!("Output format: {}", view.output_format));
    if !view.sheet_link.is_empty() {
        lines.push(format!("Sheet: {}", view.sheet_link));
    }
    if !view.credentials_complete {
        lines.push("Credentials: not set".to_string());
    }
    lines
}

fn render_settings(view: &AppViewModel) -> Vec<String> {
    let mut lines = credential_lines(&view.credentials);
    if let Some(status) = &view.credentials_status {
        lines.push(status.clone());
    }
    lines
}

fn render_success(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!(
        "Processing complete: {} quotation(s) extracted",
        view.results_count
    )];
    if let Some(url) = &view.sheet_url {
        lines.push(format!("Open sheet: {url}"));
    }
    if let Some(completed_at) = &view.completed_at {
        lines.push(format!("Finished at {completed_at}"));
    }
    if let Some(errors) = &view.error_message {
        lines.push("Some files could not be processed:".to_string());
        lines.extend(errors.lines().map(|line| format!("  - {line}")));
    }
    lines
}

fn render_error(view: &AppViewModel) -> Vec<String> {
    vec![format!(
        "Processing failed: {}",
        view.error_message.as_deref().unwrap_or("unknown error")
    )]
}

fn file_row(row: &FileRowView) -> String {
    format!("  [{}] {} ({}, {})", row.index, row.name, row.size_label, row.mime_type)
}

pub fn progress_line(view: &AppViewModel) -> String {
    format!(
        "Processing {} file(s)... {}% (estimated ~{}s)",
        view.file_count, view.progress_percent, view.estimated_secs
    )
}

/// Masked summary of stored credentials.
pub fn credential_lines(credentials: &Credentials) -> Vec<String> {
    vec![
        format!("Google API key: {}", mask(&credentials.google_api_key)),
        format!(
            "Service account JSON: {}",
            if credentials.service_account_json.trim().is_empty() {
                "(not set)".to_string()
            } else {
                format!("{} characters", credentials.service_account_json.chars().count())
            }
        ),
    ]
}

fn mask(secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    let hidden = secret.chars().count().saturating_sub(4);
    format!("{visible}{}", "*".repeat(hidden))
}
