mod app;
mod commands;
mod effects;
mod files;
mod persistence;
mod ui;

use std::process::ExitCode;

use anyhow::Context;
use quotation_engine::ApiSettings;

use crate::cli::{Cli, Command, CredentialsCommand};
use persistence::CredentialStore;

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let store_dir = cli.store_dir.unwrap_or_else(CredentialStore::default_dir);
    let store = CredentialStore::new(store_dir);

    match cli.command {
        Command::Process(args) => {
            let settings = api_settings(cli.api_base_url.as_deref())?;
            commands::process(settings, store, args)
        }
        Command::Credentials(CredentialsCommand::Save {
            api_key,
            service_account_file,
        }) => {
            let settings = api_settings(cli.api_base_url.as_deref())?;
            commands::save_credentials(settings, store, api_key, &service_account_file)
        }
        Command::Credentials(CredentialsCommand::Show) => commands::show_credentials(&store),
        Command::Estimate { files } => commands::estimate(&store, &files),
    }
}

/// Environment first, then the command-line override.
fn api_settings(override_url: Option<&str>) -> anyhow::Result<ApiSettings> {
    let settings = match override_url {
        Some(url) => ApiSettings::default()
            .with_base_url(url)
            .context("invalid --api-base-url")?,
        None => ApiSettings::from_env().context("invalid QUOTATION_API_BASE_URL")?,
    };
    Ok(settings)
}
