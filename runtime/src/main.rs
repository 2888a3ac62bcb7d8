//! `ntub-attendance` binary entry point.

use anyhow::Result;
use clap::Parser;
use ntub_attendance::cli::attendance_cmd::{self, RunOptions, RunStatus};
use ntub_attendance::cli::output::{self, OutputOptions};
use ntub_attendance::config::{self, PortalConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status when the portal rejects the credentials.
const EXIT_LOGIN_REJECTED: u8 = 2;

/// Exit status for network, file, and parse failures.
const EXIT_FATAL: u8 = 1;

/// Log into the NTUB portal and print your absence records.
#[derive(Parser, Debug)]
#[command(name = "ntub-attendance", version, about)]
struct Cli {
    /// Portal origin.
    #[arg(long, env = "NTUB_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Credential file [default: ~/.ntub-attendance.json].
    #[arg(long, env = "NTUB_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Account to log in as, overriding the stored one.
    #[arg(long, short = 'u', env = "NTUB_USERNAME")]
    username: Option<String>,

    /// Never offer to save typed-in credentials.
    #[arg(long)]
    no_save: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Omit the student number header.
    #[arg(long, short)]
    quiet: bool,

    /// Log requests and parsing details to stderr.
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn into_options(self) -> Result<RunOptions> {
        let mut config = PortalConfig::with_base_url(&self.base_url)?;
        if let Some(path) = self.credentials {
            config.credentials_path = path;
        }

        Ok(RunOptions {
            config,
            username: self.username.filter(|u| !u.is_empty()),
            offer_save: !self.no_save,
            output: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
        })
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let directive = if verbose {
        "ntub_attendance=debug"
    } else {
        "ntub_attendance=warn"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        output::print_error(&e);
        return ExitCode::from(EXIT_FATAL);
    }

    let opts = match cli.into_options() {
        Ok(opts) => opts,
        Err(e) => {
            output::print_error(&e);
            return ExitCode::from(EXIT_FATAL);
        }
    };
    match attendance_cmd::run(&opts).await {
        Ok(RunStatus::Done) => ExitCode::SUCCESS,
        Ok(RunStatus::LoginRejected) => ExitCode::from(EXIT_LOGIN_REJECTED),
        Err(e) => {
            output::print_error(&e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
