//! HTTP client abstraction for fetching remote repository data.
//!
//! This module provides a trait-based abstraction over HTTP clients, enabling
//! dependency injection and easy mocking in tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;

/// User agent sent with every request. The GitHub API rejects requests
/// without one.
pub const USER_AGENT: &str = concat!("repoterm/", env!("CARGO_PKG_VERSION"));

/// Trait for HTTP communication with external APIs.
///
/// This abstraction allows injecting mock HTTP clients for testing without
/// making real network requests.
///
/// # Example
///
/// ```ignore
/// use repoterm::http_client::{HttpClient, ReqwestHttpClient};
///
/// let client = ReqwestHttpClient::new();
/// let body = client.get_text(
///     "https://api.github.com/users/octocat/repos",
///     &[("Accept", "application/json")],
/// ).await?;
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a GET request and returns the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body cannot be read.
    async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String>;
}

/// HTTP client implementation using reqwest.
///
/// This is the default production implementation that makes real HTTP requests.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String> {
        let mut request = self.client.get(url).header("User-Agent", USER_AGENT);

        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("server answered with status {}", status));
        }
        Ok(response.text().await?)
    }
}
