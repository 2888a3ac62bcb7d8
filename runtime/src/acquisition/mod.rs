//! Talking to the portal: HTTP transport, HTML documents, and form login.

pub mod auth;
pub mod document;
pub mod http_client;
pub mod http_session;
