//! NTUB portal client: form login and absence report extraction.
//!
//! [`acquisition::auth::SessionAuthenticator`] logs in and yields an
//! [`acquisition::http_session::AuthenticatedSession`];
//! [`extraction::attendance::RecordExtractor`] reads the absence report with
//! it.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod trust;

pub use config::PortalConfig;
pub use error::PortalError;
