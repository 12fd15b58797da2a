use crate::{accept_files, AppState, Effect, Msg, ProcessRequest, View};

pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "Please enter Google API Key and Service Account JSON before processing.";
pub const INCOMPLETE_CREDENTIALS_MESSAGE: &str = "Please provide both credentials before saving";
pub const SAVED_CREDENTIALS_MESSAGE: &str = "Saved credentials";
pub const LOCAL_SAVE_FAILED_MESSAGE: &str = "Failed to store credentials locally";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            if state.request_hydration() {
                vec![Effect::FetchRemoteCredentials]
            } else {
                Vec::new()
            }
        }
        Msg::FilesAdded(candidates) => {
            if state.current_view() == View::Dashboard {
                state.append_files(accept_files(candidates));
            }
            Vec::new()
        }
        Msg::FileRemoved(index) => {
            if state.current_view() == View::Dashboard {
                state.remove_file(index);
            }
            Vec::new()
        }
        Msg::SheetLinkChanged(link) => {
            state.set_sheet_link(link);
            Vec::new()
        }
        Msg::OutputFormatSelected(format) => {
            state.set_output_format(format);
            Vec::new()
        }
        Msg::ApiKeyChanged(value) => {
            if state.set_api_key(value) {
                state.set_credentials_status("");
            }
            Vec::new()
        }
        Msg::ServiceAccountChanged(value) => {
            if state.set_service_account_json(value) {
                state.set_credentials_status("");
            }
            Vec::new()
        }
        Msg::OpenSettings => {
            if state.current_view() != View::Processing {
                state.set_view(View::Settings);
            }
            Vec::new()
        }
        Msg::SaveCredentialsClicked => {
            if state.credentials().is_complete() {
                vec![Effect::SaveCredentials(state.credentials().trimmed())]
            } else {
                state.set_credentials_status(INCOMPLETE_CREDENTIALS_MESSAGE);
                Vec::new()
            }
        }
        Msg::CredentialsSaved(saved) => {
            state.set_credentials_status(SAVED_CREDENTIALS_MESSAGE);
            vec![Effect::PersistCredentials(saved)]
        }
        Msg::CredentialsSaveFailed(message) => {
            state.set_credentials_status(message);
            Vec::new()
        }
        Msg::CredentialsPersistFailed(detail) => {
            state.set_credentials_status(format!("{LOCAL_SAVE_FAILED_MESSAGE}: {detail}"));
            Vec::new()
        }
        Msg::CredentialsRestored(stored) => {
            apply_non_empty(
                &mut state,
                Some(stored.google_api_key),
                Some(stored.service_account_json),
            );
            Vec::new()
        }
        Msg::RemoteCredentialsLoaded {
            google_api_key,
            service_account_json,
        } => {
            if apply_non_empty(&mut state, google_api_key, service_account_json) {
                vec![Effect::PersistCredentials(state.credentials().clone())]
            } else {
                Vec::new()
            }
        }
        Msg::ProcessClicked => start_processing(&mut state),
        Msg::ProcessSucceeded {
            sheet_id,
            result_count,
            errors,
            completed_at,
        } => {
            if state.current_view() == View::Processing {
                state.record_success(sheet_id, result_count, &errors, completed_at);
            }
            Vec::new()
        }
        Msg::ProcessFailed { message } => {
            if state.current_view() == View::Processing {
                state.record_failure(message);
            }
            Vec::new()
        }
        Msg::BackToDashboard => {
            if state.current_view() != View::Processing {
                state.set_view(View::Dashboard);
            }
            Vec::new()
        }
        Msg::Reset => {
            if state.current_view() != View::Processing {
                state.reset();
            }
            Vec::new()
        }
        Msg::Tick { elapsed_ms } => {
            if state.current_view() == View::Processing {
                state.advance_progress(elapsed_ms);
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_processing(state: &mut AppState) -> Vec<Effect> {
    if state.files().is_empty() {
        return Vec::new();
    }
    match state.current_view() {
        View::Dashboard | View::Settings => {}
        // A request is already in flight, or a result is still on screen.
        View::Processing | View::Success | View::Error => return Vec::new(),
    }
    if !state.credentials().is_complete() {
        state.set_credentials_status(MISSING_CREDENTIALS_MESSAGE);
        state.set_view(View::Settings);
        return Vec::new();
    }

    state.begin_processing();
    vec![Effect::SubmitFiles(ProcessRequest {
        sheet_url: state.sheet_link().to_string(),
        output_format: state.output_format(),
        credentials: state.credentials().trimmed(),
        files: state.files().to_vec(),
    })]
}

/// Copies over only the values that carry text. Returns whether anything changed.
fn apply_non_empty(
    state: &mut AppState,
    google_api_key: Option<String>,
    service_account_json: Option<String>,
) -> bool {
    let mut changed = false;
    if let Some(key) = google_api_key.filter(|value| !value.is_empty()) {
        changed |= state.set_api_key(key);
    }
    if let Some(json) = service_account_json.filter(|value| !value.is_empty()) {
        changed |= state.set_service_account_json(json);
    }
    if changed {
        state.set_credentials_status("");
    }
    changed
}

