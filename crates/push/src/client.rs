//! The [`PushSender`] seam and its FCM HTTP v1 implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::auth::{ServiceAccountAuth, ServiceAccountKey, TokenSource};
use crate::error::PushError;
use crate::message::{PushMessage, SendRequest};

/// Default FCM API host.
pub const DEFAULT_BASE_URL: &str = "https://fcm.googleapis.com";

/// HTTP request timeout for a single send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can deliver a push message to a device.
///
/// The dispatcher depends on this trait rather than on [`FcmClient`] so the
/// delivery path can be exercised without the network.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Deliver one message. Returns the provider's message identifier.
    async fn send(&self, message: &PushMessage) -> Result<String, PushError>;
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// FCM client configuration.
pub struct FcmConfig {
    pub base_url: String,
    pub project_id: String,
    pub tokens: TokenSource,
}

impl FcmConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default                      |
    /// |----------------------------|----------|------------------------------|
    /// | `FCM_SERVICE_ACCOUNT_PATH` | one of   | --                           |
    /// | `FCM_ACCESS_TOKEN`         | one of   | --                           |
    /// | `FCM_PROJECT_ID`           | with token | key file's `project_id`    |
    /// | `FCM_BASE_URL`             | no       | `https://fcm.googleapis.com` |
    pub fn from_env() -> Result<Self, PushError> {
        let base_url = std::env::var("FCM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let project_override = std::env::var("FCM_PROJECT_ID").ok();

        if let Ok(path) = std::env::var("FCM_SERVICE_ACCOUNT_PATH") {
            let key = ServiceAccountKey::from_file(&path)?;
            let project_id = project_override.unwrap_or_else(|| key.project_id.clone());
            return Ok(Self {
                base_url,
                project_id,
                tokens: TokenSource::ServiceAccount(ServiceAccountAuth::new(key)?),
            });
        }

        let token = std::env::var("FCM_ACCESS_TOKEN").map_err(|_| {
            PushError::Config(
                "either FCM_SERVICE_ACCOUNT_PATH or FCM_ACCESS_TOKEN must be set".into(),
            )
        })?;
        let project_id = project_override.ok_or_else(|| {
            PushError::Config("FCM_PROJECT_ID must be set when using FCM_ACCESS_TOKEN".into())
        })?;

        Ok(Self {
            base_url,
            project_id,
            tokens: TokenSource::Static(token),
        })
    }
}

// ---------------------------------------------------------------------------
// FcmClient
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Sends messages through `projects/{id}/messages:send`.
pub struct FcmClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: TokenSource,
}

impl FcmClient {
    pub fn new(config: FcmConfig) -> Result<Self, PushError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let endpoint = format!(
            "{}/v1/projects/{}/messages:send",
            config.base_url.trim_end_matches('/'),
            config.project_id
        );
        Ok(Self {
            http,
            endpoint,
            tokens: config.tokens,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PushSender for FcmClient {
    async fn send(&self, message: &PushMessage) -> Result<String, PushError> {
        let bearer = self.tokens.access_token().await?;

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(bearer)
            .json(&SendRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(PushError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: SendResponse = response.json().await?;
        tracing::debug!(message_name = %body.name, "FCM accepted message");
        Ok(body.name)
    }
}
