//! Reader API client.
//!
//! The Reader API turns any web page into plain text/Markdown: a `GET` of
//! `<endpoint><url>` returns the page content as the response body.
//! [`ContentReader`] is the seam the intake pipeline depends on, so tests
//! and alternative extractors can stand in for the HTTP client.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::ReaderConfig;
use crate::error::IntakeError;

/// Source of page content for a URL.
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Fetch the text content of `url`.
    async fn read(&self, url: &str) -> Result<String>;
}

/// HTTP client for the Reader API.
pub struct ReaderClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl ReaderClient {
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = config.api_key();
        if api_key.is_none() {
            warn!(
                env = %config.api_key_env,
                "no Reader API key set; requests are unauthenticated and may be rate limited"
            );
        }

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            max_retries: config.max_retries,
        })
    }

    fn request_url(&self, url: &str) -> String {
        format!("{}{}", self.endpoint, url.trim())
    }
}

#[async_trait]
impl ContentReader for ReaderClient {
    /// Retry strategy (only when `max_retries > 0`):
    /// - HTTP 429 or 5xx → retry with exponential backoff
    /// - other HTTP 4xx → fail immediately
    /// - network error → retry
    async fn read(&self, url: &str) -> Result<String> {
        let target = self.request_url(url);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // 1s, 2s, 4s, ... capped at 32s
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                debug!(attempt, ?delay, "retrying reader request");
                tokio::time::sleep(delay).await;
            }

            let mut req = self.client.get(&target);
            if let Some(key) = &self.api_key {
                req = req.header("Authorization", format!("Bearer {}", key));
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(%status, url = %target, "reader response");

                    if status.is_success() {
                        return Ok(response.text().await?);
                    }

                    let body = response.text().await.unwrap_or_default();
                    let err = IntakeError::Reader {
                        status: status.as_u16(),
                        body: body.trim().to_string(),
                    };

                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(err.into());
                        continue;
                    }

                    bail!(err);
                }
                Err(e) => {
                    last_err = Some(anyhow::Error::new(e).context(format!(
                        "request to reader API failed for {}",
                        url
                    )));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("reader request failed after retries")))
    }
}
