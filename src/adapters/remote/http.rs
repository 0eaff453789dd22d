//! HTTP client for the enrollment service.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  /enrollments` returns `{"enrollments": [...]}`
//! - `POST /enrollments` with `{"courseId", "progressPercent"}` returns
//!   `{"enrollment": {...}}`
//! - `DELETE /enrollments?courseId=...`
//!
//! Network errors and 5xx responses are retried with exponential backoff;
//! everything else fails immediately.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::RemoteConfig;
use crate::domain::enrollment::CourseProgress;
use crate::domain::foundation::{CourseId, Percentage};
use crate::ports::{RemoteEnrollmentStore, RemoteError};

/// Configuration for the HTTP enrollment store.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL of the API, without the `/enrollments` suffix.
    pub base_url: String,
    /// Bearer token identifying the signed-in user.
    session_token: Option<Secret<String>>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt on transient failures.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_base_delay: Duration,
}

impl HttpStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: None,
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(250),
        }
    }

    /// Builds the client config from the `remote` section, if a base URL is set.
    pub fn from_remote_config(remote: &RemoteConfig) -> Option<Self> {
        let base_url = remote.base_url.as_deref()?;
        let mut config = Self::new(base_url)
            .with_timeout(remote.timeout())
            .with_max_retries(remote.max_retries)
            .with_retry_base_delay(remote.retry_base_delay());
        config.session_token = remote.session_token.clone();
        Some(config)
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(Secret::new(token.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Backoff before retry number `retry` (0-based).
    fn backoff(&self, retry: u32) -> Duration {
        self.retry_base_delay.saturating_mul(1u32 << retry.min(16))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertRequest<'a> {
    course_id: &'a str,
    progress_percent: u8,
}

#[derive(Deserialize)]
struct ListResponse {
    enrollments: Vec<CourseProgress>,
}

#[derive(Deserialize)]
struct UpsertResponse {
    enrollment: CourseProgress,
}

/// Enrollment store backed by the HTTP API.
pub struct HttpEnrollmentStore {
    config: HttpStoreConfig,
    client: Client,
}

impl HttpEnrollmentStore {
    pub fn new(config: HttpStoreConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn enrollments_url(&self) -> String {
        format!("{}/enrollments", self.config.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.session_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> RemoteError {
        if e.is_timeout() {
            RemoteError::Network(format!(
                "Request timed out after {}s",
                self.config.timeout.as_secs()
            ))
        } else if e.is_connect() {
            RemoteError::Network(format!("Connection failed: {}", e))
        } else {
            RemoteError::Network(e.to_string())
        }
    }

    /// Maps a non-success status onto the error taxonomy.
    async fn handle_response_status(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(RemoteError::Unauthorized),
            500..=599 => Err(RemoteError::Unavailable(format!(
                "Server error {}: {}",
                status, body
            ))),
            _ => Err(RemoteError::InvalidResponse(format!(
                "Unexpected status {}: {}",
                status, body
            ))),
        }
    }

    /// Sends the request built by `build`, retrying transient failures.
    async fn send_with_retry<F>(&self, operation: &str, build: F) -> Result<Response, RemoteError>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut retry_count = 0;
        loop {
            let result = match self.authorized(build()).send().await {
                Ok(response) => Self::handle_response_status(response).await,
                Err(e) => Err(self.map_send_error(e)),
            };

            match result {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    let delay = self.config.backoff(retry_count);
                    tracing::debug!(
                        operation,
                        retry = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying enrollment request: {}",
                        err
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

async fn parse_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, RemoteError> {
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl RemoteEnrollmentStore for HttpEnrollmentStore {
    async fn list(&self) -> Result<Vec<CourseProgress>, RemoteError> {
        let url = self.enrollments_url();
        let response = self
            .send_with_retry("list", || self.client.get(&url))
            .await?;
        let body: ListResponse = parse_json(response).await?;
        Ok(body.enrollments)
    }

    async fn upsert(
        &self,
        course_id: &CourseId,
        progress: Percentage,
    ) -> Result<CourseProgress, RemoteError> {
        let url = self.enrollments_url();
        let payload = UpsertRequest {
            course_id: course_id.as_str(),
            progress_percent: progress.value(),
        };
        let response = self
            .send_with_retry("upsert", || self.client.post(&url).json(&payload))
            .await?;
        let body: UpsertResponse = parse_json(response).await?;
        Ok(body.enrollment)
    }

    async fn delete(&self, course_id: &CourseId) -> Result<(), RemoteError> {
        let url = self.enrollments_url();
        self.send_with_retry("delete", || {
            self.client
                .delete(&url)
                .query(&[("courseId", course_id.as_str())])
        })
        .await?;
        Ok(())
    }
}
