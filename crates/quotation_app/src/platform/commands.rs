use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use app_logging::{app_debug, app_info};
use quotation_core::{update, AppState, Msg, View, SAVED_CREDENTIALS_MESSAGE};
use quotation_engine::ApiSettings;

use super::app::{is_hydration, is_save_result, Session};
use super::effects::{EffectRunner, SAVE_FAILED_MESSAGE};
use super::files::collect_candidates;
use super::persistence::CredentialStore;
use super::ui::render;
use crate::cli::ProcessArgs;

/// Exit status when processing was blocked on missing credentials.
const NEEDS_CREDENTIALS: u8 = 2;

const RESPONSE_MARGIN: Duration = Duration::from_secs(1);

pub fn process(
    settings: ApiSettings,
    store: CredentialStore,
    args: ProcessArgs,
) -> anyhow::Result<ExitCode> {
    let service_account = args
        .service_account_file
        .as_deref()
        .map(read_service_account)
        .transpose()?;
    let (candidates, unreadable) = collect_candidates(&args.files);
    let offered = candidates.len();

    let hydration_wait = response_wait(&settings);
    let runner = EffectRunner::new(settings, store.clone())
        .context("failed to start the request engine")?;
    let mut session = Session::new(runner, io::stdout());

    session.dispatch(Msg::CredentialsRestored(store.load()))?;
    session.dispatch(Msg::Started)?;
    if !session.wait_for(hydration_wait, is_hydration)? {
        app_debug!("Credential endpoint did not answer within {:?}", hydration_wait);
    }
    if let Some(api_key) = args.api_key {
        session.dispatch(Msg::ApiKeyChanged(api_key))?;
    }
    if let Some(json) = service_account {
        session.dispatch(Msg::ServiceAccountChanged(json))?;
    }

    session.dispatch(Msg::FilesAdded(candidates))?;
    session.dispatch(Msg::SheetLinkChanged(args.sheet))?;
    session.dispatch(Msg::OutputFormatSelected(args.format.into()))?;

    for line in &unreadable {
        session.print(&format!("Skipped {line}"))?;
    }
    let accepted = session.view().file_count;
    if accepted < offered {
        session.print(&format!(
            "Skipped {} unsupported file(s)",
            offered - accepted
        ))?;
    }
    session.show()?;
    if !session.view().can_process {
        return Ok(ExitCode::FAILURE);
    }

    session.dispatch(Msg::ProcessClicked)?;
    if session.current_view() != View::Processing {
        return Ok(ExitCode::from(NEEDS_CREDENTIALS));
    }

    let finished = session.run_to_completion()?;
    app_info!("Processing finished in view {:?}", finished);
    Ok(if finished == View::Success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn save_credentials(
    settings: ApiSettings,
    store: CredentialStore,
    api_key: String,
    service_account_file: &Path,
) -> anyhow::Result<ExitCode> {
    let json = read_service_account(service_account_file)?;
    let wait = response_wait(&settings);
    let runner =
        EffectRunner::new(settings, store).context("failed to start the request engine")?;
    let mut session = Session::new(runner, io::stdout());

    session.dispatch(Msg::OpenSettings)?;
    session.dispatch(Msg::ApiKeyChanged(api_key))?;
    session.dispatch(Msg::ServiceAccountChanged(json))?;
    session.show()?;

    session.dispatch(Msg::SaveCredentialsClicked)?;
    if session.view().credentials_status.is_some() {
        return Ok(ExitCode::FAILURE);
    }

    session.print("Saving credentials...")?;
    if !session.wait_for(wait, is_save_result)? {
        session.print(SAVE_FAILED_MESSAGE)?;
        return Ok(ExitCode::FAILURE);
    }

    let saved = session.view().credentials_status.as_deref() == Some(SAVED_CREDENTIALS_MESSAGE);
    Ok(if saved {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn show_credentials(store: &CredentialStore) -> anyhow::Result<ExitCode> {
    let credentials = store.load();
    let mut out = io::stdout().lock();
    writeln!(out, "Store: {}", store.path().display())?;
    for line in render::credential_lines(&credentials) {
        writeln!(out, "{line}")?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints the dashboard for `files` without contacting the server.
pub fn estimate(store: &CredentialStore, files: &[PathBuf]) -> anyhow::Result<ExitCode> {
    let (candidates, unreadable) = collect_candidates(files);
    let (state, _) = update(AppState::new(), Msg::CredentialsRestored(store.load()));
    let (state, _) = update(state, Msg::FilesAdded(candidates));

    let mut out = io::stdout().lock();
    for line in &unreadable {
        writeln!(out, "Skipped {line}")?;
    }
    for line in render::render(&state.view()) {
        writeln!(out, "{line}")?;
    }
    Ok(ExitCode::SUCCESS)
}

/// How long to wait for a credential endpoint answer. The engine reports its
/// own timeout; the margin only covers scheduling.
fn response_wait(settings: &ApiSettings) -> Duration {
    settings.credentials_timeout + RESPONSE_MARGIN
}

fn read_service_account(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read service account file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_waits_outlast_the_engine_timeout() {
        let settings = ApiSettings::default();
        assert_eq!(
            response_wait(&settings),
            settings.credentials_timeout + RESPONSE_MARGIN
        );
        assert!(response_wait(&settings) > settings.credentials_timeout);
    }
}
