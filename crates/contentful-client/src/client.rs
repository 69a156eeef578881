use std::time::Duration;

use async_trait::async_trait;
use contentful_config::{ProviderConfig, SecretString};
use contentful_core::{Backoff, ContentfulError};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::transport::{ApiRequest, ApiResponse, Transport, VERSION_HEADER};

const RATE_LIMIT_RESET_HEADER: &str = "X-Contentful-RateLimit-Reset";

/// Content Management API client over reqwest.
///
/// Every status code is handed back to the caller. Only transient failures are
/// retried here: connection errors for any request (nothing reached the
/// server), timeouts for reads, and `429 Too Many Requests`. Conflicts are
/// never retried.
pub struct CmaClient {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
    retry: Backoff,
}

impl CmaClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ContentfulError> {
        let http = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .user_agent(config.http.user_agent.clone())
            .build()
            .map_err(|e| ContentfulError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.cma_token.clone(),
            retry: config.http.retry_backoff(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<reqwest::Response, reqwest::Error> {
        let mut req = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .bearer_auth(self.token.expose())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, request.content_type);

        if let Some(version) = request.version {
            req = req.header(VERSION_HEADER, version.to_string());
        }
        for (name, value) in &request.headers {
            req = req.header(*name, value);
        }
        if let Some(body) = &request.body {
            req = req.body(body.to_string());
        }
        req.send().await
    }

    fn retryable(request: &ApiRequest, err: &reqwest::Error) -> bool {
        err.is_connect() || (err.is_timeout() && request.is_idempotent())
    }
}

#[async_trait]
impl Transport for CmaClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ContentfulError> {
        let mut attempt: u32 = 0;
        loop {
            let last_attempt = attempt + 1 >= self.retry.max_attempts;
            trace!(request = %request.describe(), version = ?request.version, attempt, "sending request");

            match self.send_once(&request).await {
                Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS && !last_attempt => {
                    let wait = rate_limit_reset(&resp)
                        .map(|d| d.min(self.retry.max_interval))
                        .unwrap_or_else(|| self.retry.delay(attempt));
                    warn!(
                        request = %request.describe(),
                        wait_ms = wait.as_millis() as u64,
                        "rate limited, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Ok(resp) => return decode(resp).await,
                Err(err) if Self::retryable(&request, &err) && !last_attempt => {
                    let wait = self.retry.delay(attempt);
                    warn!(
                        request = %request.describe(),
                        error = %err,
                        wait_ms = wait.as_millis() as u64,
                        "transient network failure, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => {
                    return Err(ContentfulError::transport(format!(
                        "{} failed: {}",
                        request.describe(),
                        error_chain(&err)
                    )));
                }
            }
            attempt += 1;
        }
    }
}

async fn decode(resp: reqwest::Response) -> Result<ApiResponse, ContentfulError> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| ContentfulError::transport(format!("failed to read response body: {e}")))?;
    debug!(status = status.as_u16(), bytes = text.len(), "received response");

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Ok(ApiResponse::new(status, body))
}

fn rate_limit_reset(resp: &reqwest::Response) -> Option<Duration> {
    resp.headers()
        .get(RATE_LIMIT_RESET_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        msg.push_str(": ");
        msg.push_str(&inner.to_string());
        source = inner.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::CMA_CONTENT_TYPE;

    #[test]
    fn url_joins_without_double_slash() {
        let config = ProviderConfig::new("t").with_base_url("https://api.contentful.com/");
        let client = CmaClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.contentful.com");
        assert_eq!(client.url("/spaces/x"), "https://api.contentful.com/spaces/x");
        assert_eq!(client.url("spaces/x"), "https://api.contentful.com/spaces/x");
    }

    #[test]
    fn default_content_type_is_versioned_media_type() {
        assert_eq!(ApiRequest::get("/x").content_type, CMA_CONTENT_TYPE);
    }
}
