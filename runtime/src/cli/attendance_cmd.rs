//! `ntub-attendance`: log in and print the absence report.

use crate::acquisition::auth::{LoginOutcome, SessionAuthenticator};
use crate::acquisition::document::HtmlParser;
use crate::cli::output::{self, OutputOptions};
use crate::cli::prompt;
use crate::config::PortalConfig;
use crate::extraction::attendance::{AttendanceReport, RecordExtractor};
use crate::trust::credentials::{CredentialStore, Credentials};
use anyhow::Result;
use tracing::info;

/// Settings for one run, assembled from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: PortalConfig,
    /// Account to use instead of the stored one.
    pub username: Option<String>,
    /// Offer to save credentials that were typed in.
    pub offer_save: bool,
    pub output: OutputOptions,
}

/// How a run ended when no fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Done,
    LoginRejected,
}

/// Result of the login + report fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Report(AttendanceReport),
    LoginRejected,
}

/// Authenticate with `credentials` and, if the portal accepts them, extract
/// the absence report on the same session.
pub async fn fetch_report(
    config: &PortalConfig,
    credentials: &Credentials,
) -> Result<FetchOutcome> {
    let parser = HtmlParser;
    let authenticator = SessionAuthenticator::new(config, &parser);

    let session = match authenticator.authenticate(credentials).await? {
        LoginOutcome::Authenticated(session) => session,
        LoginOutcome::Rejected { .. } => return Ok(FetchOutcome::LoginRejected),
    };

    let report = RecordExtractor::new(config, &parser).extract(&session).await?;
    info!(records = report.records.len(), "report extracted");
    Ok(FetchOutcome::Report(report))
}

/// Resolve credentials (file, flag, prompt), then fetch and print.
pub async fn run(opts: &RunOptions) -> Result<RunStatus> {
    let store = CredentialStore::new(&opts.config.credentials_path);
    let mut credentials = store.load()?;

    if let Some(username) = &opts.username {
        if *username != credentials.username {
            // The stored password belongs to another account.
            credentials.username = username.clone();
            credentials.password.clear();
        }
    }

    let entered = prompt::fill_missing(&mut credentials)?;
    if entered && opts.offer_save && prompt::confirm_save()? {
        store.save(&credentials)?;
        info!(path = %store.path().display(), "credentials saved");
    }

    match fetch_report(&opts.config, &credentials).await? {
        FetchOutcome::Report(report) => {
            output::print_report(&credentials.username, &report, opts.output);
            Ok(RunStatus::Done)
        }
        FetchOutcome::LoginRejected => {
            output::print_login_failed(opts.output);
            Ok(RunStatus::LoginRejected)
        }
    }
}
