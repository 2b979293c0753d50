// src/utils/http.rs

//! HTTP client utilities and the page-fetch seam.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ProfileError, Result};
use crate::models::FetchConfig;

/// The engine's only collaborator contract: fetch one page body.
///
/// Connection pooling, proxying, cookie jars, retries and backoff all live
/// behind this trait. Tests substitute counting or canned implementations.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> Result<String>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Default fetcher over a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> Result<String> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProfileError::fetch(url, format!("status {status}")));
        }
        Ok(response.text().await?)
    }
}
