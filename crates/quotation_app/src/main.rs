mod cli;
mod platform;

use std::process::ExitCode;

use app_logging::app_info;
use clap::Parser;
use log::LevelFilter;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    app_logging::initialize(cli.log.into(), level, &app_logging::default_log_path());
    app_info!("quotation {} starting", env!("CARGO_PKG_VERSION"));

    platform::run(cli)
}
