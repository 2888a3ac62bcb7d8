//! Portal configuration threaded through every component.
//!
//! All site-specific constants live here so the authenticator and the
//! extractor never reach for global state.

use crate::error::{PortalError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default portal origin.
pub const DEFAULT_BASE_URL: &str = "http://ntcbadm.ntub.edu.tw";

/// Login form page; the form POSTs back to itself.
pub const LOGIN_PATH: &str = "/login.aspx";

/// Page the portal redirects to only after a successful login.
pub const LANDING_PATH: &str = "/Portal/indexSTD.aspx";

/// Absence report page.
pub const REPORT_PATH: &str = "/StdAff/STDWeb/ABS_SearchSACP.aspx";

/// Credential file name under the home directory.
pub const CREDENTIALS_FILE_NAME: &str = ".ntub-attendance.json";

/// Everything the components need to talk to one portal instance.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Origin without trailing slash, e.g. `http://ntcbadm.ntub.edu.tw`.
    pub base_url: String,
    pub login_path: String,
    pub landing_path: String,
    pub report_path: String,
    /// Form field that receives the account name.
    pub username_field: String,
    /// Form field that receives the password.
    pub password_field: String,
    /// `class` values of real data rows in the report table.
    pub row_classes: Vec<String>,
    /// Selector of the totals element on the report page.
    pub summary_selector: String,
    pub credentials_path: PathBuf,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: LOGIN_PATH.to_string(),
            landing_path: LANDING_PATH.to_string(),
            report_path: REPORT_PATH.to_string(),
            username_field: "UserID".to_string(),
            password_field: "PWD".to_string(),
            row_classes: vec!["RowStyle".to_string(), "AlternatingRowStyle".to_string()],
            summary_selector: "#ctl00_ContentPlaceHolder1_Lab_count".to_string(),
            credentials_path: default_credentials_path(),
            user_agent: format!("ntub-attendance/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }
}

impl PortalConfig {
    /// Default configuration pointed at another origin (a mirror or a test server).
    ///
    /// The origin is stored in the canonical form reqwest reports final URLs
    /// in (lowercase scheme and host, default port dropped), so the landing
    /// URL can be compared byte for byte.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(base_url).map_err(|e| PortalError::BaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(PortalError::BaseUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            ..Self::default()
        })
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, self.login_path)
    }

    pub fn landing_url(&self) -> String {
        format!("{}{}", self.base_url, self.landing_path)
    }

    pub fn report_url(&self) -> String {
        format!("{}{}", self.base_url, self.report_path)
    }
}

/// `~/.ntub-attendance.json`, falling back to the working directory when no
/// home directory is known.
pub fn default_credentials_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CREDENTIALS_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let config = PortalConfig::default();
        assert_eq!(config.login_url(), "http://ntcbadm.ntub.edu.tw/login.aspx");
        assert_eq!(
            config.landing_url(),
            "http://ntcbadm.ntub.edu.tw/Portal/indexSTD.aspx"
        );
        assert_eq!(
            config.report_url(),
            "http://ntcbadm.ntub.edu.tw/StdAff/STDWeb/ABS_SearchSACP.aspx"
        );
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let config = PortalConfig::with_base_url("http://127.0.0.1:8080/").unwrap();
        assert_eq!(config.login_url(), "http://127.0.0.1:8080/login.aspx");
        assert_eq!(config.username_field, "UserID");
        assert_eq!(config.password_field, "PWD");
    }

    #[test]
    fn test_with_base_url_canonicalizes_origin() {
        let config = PortalConfig::with_base_url("HTTP://Host:80/").unwrap();
        assert_eq!(config.base_url, "http://host");
        assert_eq!(config.landing_url(), "http://host/Portal/indexSTD.aspx");

        let config = PortalConfig::with_base_url("https://NTCBADM.ntub.edu.tw:443").unwrap();
        assert_eq!(config.login_url(), "https://ntcbadm.ntub.edu.tw/login.aspx");

        let config = PortalConfig::with_base_url("http://127.0.0.1:8080/mirror/").unwrap();
        assert_eq!(
            config.report_url(),
            "http://127.0.0.1:8080/mirror/StdAff/STDWeb/ABS_SearchSACP.aspx"
        );
    }

    #[test]
    fn test_with_base_url_rejects_unparsable_url() {
        for bad in ["ntcbadm.ntub.edu.tw", "http://", "mailto:someone@ntub.edu.tw"] {
            let err = PortalConfig::with_base_url(bad).unwrap_err();
            assert!(matches!(err, PortalError::BaseUrl { .. }), "{bad}");
        }
    }

    #[test]
    fn test_default_credentials_file_name() {
        let path = default_credentials_path();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(CREDENTIALS_FILE_NAME)
        );
    }
}
