//! Error types for the portal client.
//!
//! Every variant here is a fatal infrastructure error: the run stops and the
//! message is shown to the user. A rejected login is not an error; it is the
//! `LoginOutcome::Rejected` value returned by the authenticator.

use std::path::PathBuf;

/// Convenience alias used throughout the library.
pub type Result<T, E = PortalError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Transport failure: connect, TLS, redirect loop, body read.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The portal answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The configured portal origin is not a usable URL.
    #[error("invalid portal base URL `{url}`: {reason}")]
    BaseUrl { url: String, reason: String },

    /// A CSS selector in the configuration could not be compiled.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    /// A data row did not have one cell per schema column.
    #[error("attendance row {row} has {found} cells, expected {expected}")]
    MalformedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// The totals element is missing or does not contain the `：` separator.
    #[error("summary element `{selector}` is missing or has no `：` separator")]
    SummaryMissing { selector: String },

    /// The credential file exists but could not be read or written.
    #[error("credential file {}: {source}", .path.display())]
    CredentialIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The credential file is not the expected JSON object.
    #[error("credential file {} is malformed: {source}", .path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PortalError {
    pub(crate) fn http(url: &str, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_row_message() {
        let err = PortalError::MalformedRow {
            row: 2,
            found: 3,
            expected: 4,
        };
        assert_eq!(err.to_string(), "attendance row 2 has 3 cells, expected 4");
    }

    #[test]
    fn test_summary_missing_message_names_selector() {
        let err = PortalError::SummaryMissing {
            selector: "#total".to_string(),
        };
        assert!(err.to_string().contains("#total"));
    }
}
