use std::time::Duration;

use reqwest::Client;
use skuscout_core::error::AppError;
use skuscout_core::traits::Fetcher;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; SkuScout/0.1)";

/// HTTP fetcher using reqwest.
///
/// Downloads raw HTML with a bounded per-request timeout. Any non-2xx
/// status is reported as an error so callers can skip the page.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout: Duration,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Self::build(timeout, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(self, user_agent: &str) -> Result<Self, AppError> {
        Self::build(self.timeout, user_agent)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build(timeout: Duration, user_agent: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self { client, timeout })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout)
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })
    }
}
