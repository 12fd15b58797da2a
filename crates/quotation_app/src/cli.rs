use std::path::PathBuf;

use app_logging::LogDestination;
use clap::{Args, Parser, Subcommand, ValueEnum};
use quotation_core::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "quotation",
    version,
    about = "Upload quotation documents to the processing service"
)]
pub struct Cli {
    /// Processing service base URL. Overrides QUOTATION_API_BASE_URL.
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Directory holding the local credential store.
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::File, global = true)]
    pub log: LogTarget,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload files and wait for the extracted results.
    Process(ProcessArgs),
    /// Manage the Google credentials sent with each upload.
    #[command(subcommand)]
    Credentials(CredentialsCommand),
    /// Show which files would be uploaded and how long it should take.
    Estimate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// PDF or image files to upload.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Google Sheet link or id to write results into.
    #[arg(long, default_value = "")]
    pub sheet: String,

    #[arg(long, value_enum, default_value_t = FormatArg::Excel)]
    pub format: FormatArg,

    /// Google API key for this run only.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Service account JSON file for this run only.
    #[arg(long)]
    pub service_account_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CredentialsCommand {
    /// Save credentials on the server, then locally.
    Save {
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        service_account_file: PathBuf,
    },
    /// Print the locally stored credentials, masked.
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Excel,
    GoogleSheet,
    Both,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Excel => OutputFormat::Excel,
            FormatArg::GoogleSheet => OutputFormat::GoogleSheet,
            FormatArg::Both => OutputFormat::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
