//! Portal credentials and the JSON file they are remembered in.

use crate::error::{PortalError, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Account name and password for the portal login form.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Both fields are present, so no prompting is needed.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `{"username": ..., "password": ...}` stored at a fixed path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read stored credentials. A missing file yields empty credentials.
    pub fn load(&self) -> Result<Credentials> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored credentials");
                return Ok(Credentials::default());
            }
            Err(source) => {
                return Err(PortalError::CredentialIo {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let credentials = serde_json::from_str(&raw).map_err(|source| PortalError::Credentials {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "loaded stored credentials");
        Ok(credentials)
    }

    /// Write credentials as four-space-indented JSON with a trailing newline,
    /// replacing any previous content.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        credentials
            .serialize(&mut ser)
            .map_err(|source| PortalError::Credentials {
                path: self.path.clone(),
                source,
            })?;
        buf.push(b'\n');

        std::fs::write(&self.path, buf).map_err(|source| PortalError::CredentialIo {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials {
            username: "10846001".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("absent.json"));

        let creds = store.load().unwrap();
        assert_eq!(creds, Credentials::default());
        assert!(!creds.is_complete());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("creds.json"));

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_save_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("creds.json"));

        store.save(&sample()).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            raw,
            "{\n    \"username\": \"10846001\",\n    \"password\": \"hunter2\"\n}\n"
        );
    }

    #[test]
    fn test_save_truncates_longer_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("creds.json"));
        std::fs::write(store.path(), "x".repeat(500)).unwrap();

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("creds.json"));
        std::fs::write(store.path(), "{ not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, PortalError::Credentials { .. }));
    }

    #[test]
    fn test_partial_file_loads_missing_fields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("creds.json"));
        std::fs::write(store.path(), r#"{"username": "10846001"}"#).unwrap();

        let creds = store.load().unwrap();
        assert_eq!(creds.username, "10846001");
        assert!(creds.password.is_empty());
        assert!(!creds.is_complete());
    }

    #[test]
    fn test_debug_redacts_password() {
        let shown = format!("{:?}", sample());
        assert!(shown.contains("10846001"));
        assert!(!shown.contains("hunter2"));
    }
}
