//! HTTP transport with an isolated cookie jar.
//!
//! Each `HttpClient` owns its own cookie store, so a fresh client is a fresh
//! session. Redirects are followed with reqwest's default policy and the
//! final URL is reported back to the caller.

use crate::acquisition::auth::FormFieldSet;
use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use tracing::debug;

/// A fetched page after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL of the last response in the redirect chain.
    pub final_url: String,
    pub status: u16,
    pub body: String,
}

/// GET / form-POST capability used by the authenticator and the extractor.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedPage>;

    /// POST `form` as `application/x-www-form-urlencoded`, following redirects.
    ///
    /// Only the final URL and status matter for a login, so implementations
    /// may return an empty body.
    async fn post_form(&self, url: &str, form: &FormFieldSet) -> Result<FetchedPage>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client with an empty cookie jar.
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| PortalError::http(&config.base_url, e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpClient {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        debug!(url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortalError::http(url, e))?;

        let final_url = resp.url().to_string();
        let status = resp.status();
        if !status.is_success() {
            return Err(PortalError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| PortalError::http(url, e))?;
        debug!(url = %final_url, bytes = body.len(), "fetched");
        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            body,
        })
    }

    async fn post_form(&self, url: &str, form: &FormFieldSet) -> Result<FetchedPage> {
        debug!(url, fields = form.len(), "POST form");
        let resp = self
            .client
            .post(url)
            .form(form.as_map())
            .send()
            .await
            .map_err(|e| PortalError::http(url, e))?;

        let page = FetchedPage {
            final_url: resp.url().to_string(),
            status: resp.status().as_u16(),
            body: String::new(),
        };
        // Release the connection without reading the body.
        drop(resp);

        debug!(url = %page.final_url, status = page.status, "login redirect chain finished");
        Ok(page)
    }
}
