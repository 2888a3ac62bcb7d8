//! Form login against the portal.
//!
//! The login page is an ASP.NET form carrying hidden state fields
//! (`__VIEWSTATE`, `__EVENTVALIDATION`, ...). Every named input is harvested
//! as-is, the two credential fields are overwritten, and the form is posted
//! back on a fresh cookie session. The portal signals success only by where
//! the redirect chain ends, so the final URL is compared against the landing
//! page exactly.

use crate::acquisition::document::{Document, DocumentParser};
use crate::acquisition::http_client::{DocumentFetcher, HttpClient};
use crate::acquisition::http_session::AuthenticatedSession;
use crate::config::PortalConfig;
use crate::error::Result;
use crate::trust::credentials::Credentials;
use std::collections::HashMap;
use tracing::{debug, info};

// ---- Form fields ------------------------------------------------------------

/// Name → value pairs submitted with the login form. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFieldSet {
    fields: HashMap<String, String>,
}

impl FormFieldSet {
    /// Insert or replace a field, returning the previous value.
    pub fn set(&mut self, name: &str, value: &str) -> Option<String> {
        self.fields.insert(name.to_string(), value.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// Overwrite the configured username and password fields.
    pub fn apply_credentials(&mut self, config: &PortalConfig, credentials: &Credentials) {
        self.set(&config.username_field, &credentials.username);
        self.set(&config.password_field, &credentials.password);
    }
}

/// Collect every `input` with a non-empty `name`; a missing `value` becomes `""`.
pub fn harvest_form_fields(doc: &dyn Document) -> Result<FormFieldSet> {
    let mut form = FormFieldSet::default();
    for input in doc.select("input")? {
        let Some(name) = input.attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        let value = input.attr("value").unwrap_or_default();
        form.set(&name, &value);
    }
    Ok(form)
}

/// Exact string comparison: no trailing-slash, case, or query normalization.
pub fn is_landing_url(final_url: &str, landing_url: &str) -> bool {
    final_url == landing_url
}

// ---- Authenticator ----------------------------------------------------------

/// Result of a login attempt that reached the portal.
#[derive(Debug)]
pub enum LoginOutcome {
    /// The redirect chain ended on the landing page.
    Authenticated(AuthenticatedSession),
    /// The portal did not accept the credentials; the session was discarded.
    Rejected { final_url: String },
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

pub struct SessionAuthenticator<'a> {
    config: &'a PortalConfig,
    parser: &'a dyn DocumentParser,
}

impl<'a> SessionAuthenticator<'a> {
    pub fn new(config: &'a PortalConfig, parser: &'a dyn DocumentParser) -> Self {
        Self { config, parser }
    }

    /// Log in over HTTP. The login page is read with a throwaway client and
    /// the form is posted on a new client whose cookie jar becomes the session.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let anonymous = HttpClient::new(self.config)?;
        let session = HttpClient::new(self.config)?;
        self.authenticate_with(&anonymous, Box::new(session), credentials).await
    }

    /// Same as [`authenticate`](Self::authenticate) with caller-supplied fetchers.
    ///
    /// `session` must start with an empty cookie jar; on success it is moved
    /// into the returned [`AuthenticatedSession`], otherwise it is dropped.
    pub async fn authenticate_with(
        &self,
        anonymous: &dyn DocumentFetcher,
        session: Box<dyn DocumentFetcher>,
        credentials: &Credentials,
    ) -> Result<LoginOutcome> {
        let login_url = self.config.login_url();
        let page = anonymous.get(&login_url).await?;

        let mut form = {
            let doc = self.parser.parse(&page.body);
            harvest_form_fields(doc.as_ref())?
        };
        debug!(fields = form.len(), "harvested login form");
        form.apply_credentials(self.config, credentials);

        let landed = session.post_form(&login_url, &form).await?;
        let landing_url = self.config.landing_url();

        if is_landing_url(&landed.final_url, &landing_url) {
            info!(username = %credentials.username, "login accepted");
            Ok(LoginOutcome::Authenticated(AuthenticatedSession::new(
                &credentials.username,
                session,
            )))
        } else {
            info!(
                username = %credentials.username,
                final_url = %landed.final_url,
                "login rejected"
            );
            Ok(LoginOutcome::Rejected {
                final_url: landed.final_url,
            })
        }
    }
}

// ---- Tests ------------------------------------------------------------------
