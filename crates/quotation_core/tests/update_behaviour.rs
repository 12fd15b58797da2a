use std::sync::Once;

use pretty_assertions::assert_eq;
use quotation_core::{
    update, AppState, Credentials, Effect, Msg, OutputFormat, ProcessRequest, SelectedFile, View,
    MISSING_CREDENTIALS_MESSAGE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(app_logging::initialize_for_tests);
}

fn file(name: &str, size: u64, mime: &str) -> SelectedFile {
    SelectedFile::new(name, size, mime, format!("/uploads/{name}"))
}

fn names(state: &AppState) -> Vec<String> {
    state.view().files.into_iter().map(|row| row.name).collect()
}

fn with_credentials(state: AppState) -> AppState {
    let (state, _) = update(state, Msg::ApiKeyChanged("AIza-key".to_string()));
    let (state, _) = update(
        state,
        Msg::ServiceAccountChanged("{\"type\":\"service_account\"}".to_string()),
    );
    state
}

fn add_files(state: AppState, files: Vec<SelectedFile>) -> AppState {
    update(state, Msg::FilesAdded(files)).0
}

fn processing_state() -> AppState {
    let state = with_credentials(AppState::new());
    let state = add_files(state, vec![file("quote.pdf", 2048, "application/pdf")]);
    let (state, effects) = update(state, Msg::ProcessClicked);
    assert_eq!(effects.len(), 1);
    state
}

#[test]
fn files_added_keeps_only_allowed_in_order_and_appends() {
    init_logging();
    let state = add_files(AppState::new(), vec![file("first.pdf", 10, "application/pdf")]);

    let state = add_files(
        state,
        vec![
            file("notes.txt", 5, "text/plain"),
            file("scan.png", 20, "image/png"),
            file("sheet.xlsx", 30, "application/vnd.ms-excel"),
            file("photo.HEIC", 40, ""),
            file("blob.bin", 50, "application/octet-stream"),
            file("archive.zip", 60, "application/zip"),
        ],
    );

    assert_eq!(
        names(&state),
        vec!["first.pdf", "scan.png", "photo.HEIC", "blob.bin"]
    );
    let view = state.view();
    assert_eq!(view.file_count, 4);
    assert_eq!(view.total_bytes, 120);
}

#[test]
fn files_added_with_nothing_allowed_leaves_state_clean() {
    init_logging();
    let mut state = add_files(AppState::new(), vec![file("a.pdf", 1, "application/pdf")]);
    assert!(state.consume_dirty());

    let mut state = add_files(state, vec![file("b.txt", 1, "text/plain")]);

    assert_eq!(names(&state), vec!["a.pdf"]);
    assert!(!state.consume_dirty());
}

#[test]
fn duplicate_files_are_not_deduplicated() {
    init_logging();
    let state = add_files(
        AppState::new(),
        vec![file("a.pdf", 1, "application/pdf"), file("a.pdf", 1, "application/pdf")],
    );

    assert_eq!(names(&state), vec!["a.pdf", "a.pdf"]);
}

#[test]
fn file_removed_drops_only_that_index() {
    init_logging();
    let state = add_files(
        AppState::new(),
        vec![
            file("a.pdf", 1, "application/pdf"),
            file("b.jpg", 2, "image/jpeg"),
            file("c.png", 3, "image/png"),
            file("d.webp", 4, "image/webp"),
        ],
    );

    let (state, effects) = update(state, Msg::FileRemoved(1));

    assert!(effects.is_empty());
    assert_eq!(names(&state), vec!["a.pdf", "c.png", "d.webp"]);
    let indices: Vec<_> = state.view().files.iter().map(|row| row.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn file_removed_out_of_range_is_ignored() {
    init_logging();
    let mut state = add_files(AppState::new(), vec![file("a.pdf", 1, "application/pdf")]);
    state.consume_dirty();

    let (mut state, _) = update(state, Msg::FileRemoved(3));

    assert_eq!(names(&state), vec!["a.pdf"]);
    assert!(!state.consume_dirty());
}

#[test]
fn process_without_files_does_nothing() {
    init_logging();
    let state = with_credentials(AppState::new());

    let (state, effects) = update(state, Msg::ProcessClicked);

    assert_eq!(state.view().view, View::Dashboard);
    assert!(effects.is_empty());
}

#[test]
fn process_with_empty_credentials_never_submits() {
    init_logging();
    let state = add_files(AppState::new(), vec![file("a.pdf", 1, "application/pdf")]);
    let (state, _) = update(state, Msg::ApiKeyChanged("   ".to_string()));

    let (state, effects) = update(state, Msg::ProcessClicked);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.view, View::Settings);
    assert_eq!(
        view.credentials_status.as_deref(),
        Some(MISSING_CREDENTIALS_MESSAGE)
    );
}

#[test]
fn process_emits_single_submission_with_trimmed_credentials() {
    init_logging();
    let state = add_files(
        AppState::new(),
        vec![
            file("a.pdf", 1, "application/pdf"),
            file("b.png", 2, "image/png"),
        ],
    );
    let (state, _) = update(state, Msg::ApiKeyChanged("  AIza-key \n".to_string()));
    let (state, _) = update(state, Msg::ServiceAccountChanged(" {} ".to_string()));
    let (state, _) = update(
        state,
        Msg::SheetLinkChanged("https://docs.google.com/spreadsheets/d/xyz".to_string()),
    );
    let (state, _) = update(state, Msg::OutputFormatSelected(OutputFormat::Both));

    let (state, effects) = update(state, Msg::ProcessClicked);

    assert_eq!(state.view().view, View::Processing);
    assert_eq!(
        effects,
        vec![Effect::SubmitFiles(ProcessRequest {
            sheet_url: "https://docs.google.com/spreadsheets/d/xyz".to_string(),
            output_format: OutputFormat::Both,
            credentials: Credentials::new("AIza-key", "{}"),
            files: vec![
                file("a.pdf", 1, "application/pdf"),
                file("b.png", 2, "image/png"),
            ],
        })]
    );
}

#[test]
fn second_process_click_while_processing_is_ignored() {
    init_logging();
    let state = processing_state();

    let (state, effects) = update(state, Msg::ProcessClicked);

    assert_eq!(state.view().view, View::Processing);
    assert!(effects.is_empty());
}

#[test]
fn server_error_moves_to_error_with_message() {
    init_logging();
    let state = processing_state();

    let (state, effects) = update(
        state,
        Msg::ProcessFailed {
            message: "Internal error".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.view, View::Error);
    assert_eq!(view.error_message.as_deref(), Some("Internal error"));
}

#[test]
fn success_records_sheet_and_count() {
    init_logging();
    let state = processing_state();

    let (state, _) = update(
        state,
        Msg::ProcessSucceeded {
            sheet_id: "abc123".to_string(),
            result_count: 2,
            errors: Vec::new(),
            completed_at: Some("2026-10-16T09:00:00+00:00".to_string()),
        },
    );

    let view = state.view();
    assert_eq!(view.view, View::Success);
    assert_eq!(view.results_count, 2);
    assert_eq!(view.error_message, None);
    assert_eq!(view.sheet_id.as_deref(), Some("abc123"));
    assert_eq!(
        view.sheet_url.as_deref(),
        Some("https://docs.google.com/spreadsheets/d/abc123")
    );
    assert_eq!(view.progress_percent, 100);
}

#[test]
fn partial_errors_are_shown_alongside_success() {
    init_logging();
    let state = processing_state();

    let (state, _) = update(
        state,
        Msg::ProcessSucceeded {
            sheet_id: "abc123".to_string(),
            result_count: 1,
            errors: vec![
                "b.png: unreadable".to_string(),
                "c.pdf: no table".to_string(),
            ],
            completed_at: None,
        },
    );

    let view = state.view();
    assert_eq!(view.view, View::Success);
    assert_eq!(
        view.error_message.as_deref(),
        Some("b.png: unreadable\nc.pdf: no table")
    );
}

#[test]
fn late_results_outside_processing_are_ignored() {
    init_logging();
    let state = AppState::new();

    let (state, _) = update(
        state,
        Msg::ProcessFailed {
            message: "late".to_string(),
        },
    );

    assert_eq!(state.view().view, View::Dashboard);
    assert_eq!(state.view().error_message, None);
}

#[test]
fn reset_from_terminal_views_restores_dashboard() {
    init_logging();
    let failed = update(
        processing_state(),
        Msg::ProcessFailed {
            message: "HTTP 502".to_string(),
        },
    )
    .0;
    let succeeded = update(
        processing_state(),
        Msg::ProcessSucceeded {
            sheet_id: "abc123".to_string(),
            result_count: 1,
            errors: Vec::new(),
            completed_at: None,
        },
    )
    .0;

    for state in [failed, succeeded] {
        let (state, effects) = update(state, Msg::Reset);
        let view = state.view();

        assert!(effects.is_empty());
        assert_eq!(view.view, View::Dashboard);
        assert!(view.files.is_empty());
        assert_eq!(view.sheet_link, "");
        assert_eq!(view.output_format, OutputFormat::Excel);
        assert_eq!(view.error_message, None);
        assert_eq!(view.sheet_id, None);
        assert_eq!(view.results_count, 0);
        assert_eq!(view.progress_percent, 0);
        assert!(view.credentials_complete);
    }
}

#[test]
fn can_process_only_where_a_click_would_submit() {
    init_logging();
    let ready = with_credentials(add_files(
        AppState::new(),
        vec![file("quote.pdf", 2048, "application/pdf")],
    ));
    assert!(ready.view().can_process);

    let processing = processing_state();
    assert!(!processing.view().can_process);

    let failed = update(
        processing_state(),
        Msg::ProcessFailed {
            message: "boom".to_string(),
        },
    )
    .0;
    assert!(!failed.view().can_process);
    let (failed, effects) = update(failed, Msg::ProcessClicked);
    assert!(effects.is_empty());

    let succeeded = update(
        processing_state(),
        Msg::ProcessSucceeded {
            sheet_id: "abc123".to_string(),
            result_count: 1,
            errors: Vec::new(),
            completed_at: None,
        },
    )
    .0;
    assert!(!succeeded.view().can_process);

    let (back, _) = update(failed, Msg::BackToDashboard);
    assert!(back.view().can_process);
}

#[test]
fn back_to_dashboard_keeps_selection() {
    init_logging();
    let state = update(
        processing_state(),
        Msg::ProcessFailed {
            message: "boom".to_string(),
        },
    )
    .0;

    let (state, _) = update(state, Msg::BackToDashboard);

    assert_eq!(state.view().view, View::Dashboard);
    assert_eq!(names(&state), vec!["quote.pdf"]);
}

#[test]
fn ticks_advance_progress_without_reaching_complete() {
    init_logging();
    let state = processing_state();
    let estimate_ms = state.view().estimated_secs * 1000;

    let (state, _) = update(
        state,
        Msg::Tick {
            elapsed_ms: estimate_ms / 2,
        },
    );
    assert_eq!(state.view().progress_percent, 50);

    let (state, _) = update(state, Msg::Tick { elapsed_ms: 10 });
    assert_eq!(state.view().progress_percent, 50);

    let (state, _) = update(
        state,
        Msg::Tick {
            elapsed_ms: estimate_ms * 10,
        },
    );
    assert_eq!(state.view().progress_percent, 95);
}

#[test]
fn intake_is_ignored_while_processing() {
    init_logging();
    let state = processing_state();

    let state = add_files(state, vec![file("late.pdf", 1, "application/pdf")]);
    let (state, _) = update(state, Msg::FileRemoved(0));

    assert_eq!(names(&state), vec!["quote.pdf"]);
}
