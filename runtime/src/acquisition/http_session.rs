//! Authenticated portal session.
//!
//! An `AuthenticatedSession` wraps the fetcher whose cookie jar received the
//! login cookies. It is only constructed by the authenticator after the login
//! redirect landed on the expected page, and it lives for one process run.

use crate::acquisition::http_client::{DocumentFetcher, FetchedPage};
use crate::error::Result;

pub struct AuthenticatedSession {
    username: String,
    fetcher: Box<dyn DocumentFetcher>,
}

impl AuthenticatedSession {
    pub(crate) fn new(username: &str, fetcher: Box<dyn DocumentFetcher>) -> Self {
        Self {
            username: username.to_string(),
            fetcher,
        }
    }

    /// Account the session was opened for.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// GET a page with the session's cookies attached.
    pub async fn get(&self, url: &str) -> Result<FetchedPage> {
        self.fetcher.get(url).await
    }
}

impl std::fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
