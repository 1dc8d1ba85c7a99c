//! OAuth access tokens for the FCM HTTP v1 API.
//!
//! A Google service-account key signs a short-lived RS256 JWT assertion
//! which is exchanged at the key's token endpoint for a bearer token. The
//! bearer token is cached until shortly before it expires.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::PushError;

/// OAuth scope required to send FCM messages.
pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Lifetime requested for each assertion (Google caps this at one hour).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh the cached token this long before it actually expires.
const REFRESH_MARGIN_SECS: i64 = 60;

const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// The fields of a service-account JSON key file that token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse a key from the JSON text of a service-account file.
    pub fn from_json(json: &str) -> Result<Self, PushError> {
        serde_json::from_str(json)
            .map_err(|e| PushError::Config(format!("invalid service account key: {e}")))
    }

    /// Read and parse a service-account file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PushError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PushError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

/// Claims of the signed assertion sent to the token endpoint.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Build the assertion claims for `key` issued at `now` (Unix seconds).
pub fn assertion_claims(key: &ServiceAccountKey, now: i64) -> AssertionClaims {
    AssertionClaims {
        iss: key.client_email.clone(),
        scope: FCM_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    }
}

/// Sign an RS256 assertion with the key's private key.
pub fn sign_assertion(key: &ServiceAccountKey, now: i64) -> Result<String, PushError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| PushError::Auth(format!("invalid private key: {e}")))?;

    encode(
        &Header::new(Algorithm::RS256),
        &assertion_claims(key, now),
        &encoding_key,
    )
    .map_err(|e| PushError::Auth(format!("failed to sign assertion: {e}")))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    /// Unix seconds after which the token must be refreshed.
    refresh_at: i64,
}

/// Exchanges service-account assertions for bearer tokens, with caching.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey) -> Result<Self, PushError> {
        let http = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            key,
            http,
            cached: Mutex::new(None),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    /// Return a valid bearer token, fetching a fresh one when the cached
    /// token is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, PushError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref().filter(|t| t.refresh_at > now) {
            return Ok(token.value.clone());
        }

        let assertion = sign_assertion(&self.key, now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(PushError::Auth(format!(
                "token endpoint returned HTTP {status}: {text}"
            )));
        }

        let body: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = body.expires_in, "Obtained FCM access token");

        let token = CachedToken {
            value: body.access_token,
            refresh_at: now + body.expires_in - REFRESH_MARGIN_SECS,
        };
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}

/// Where the FCM client gets its bearer token from.
pub enum TokenSource {
    /// A pre-issued token (e.g. from `gcloud auth print-access-token`).
    Static(String),
    /// Tokens minted from a service-account key.
    ServiceAccount(ServiceAccountAuth),
}

impl TokenSource {
    pub async fn access_token(&self) -> Result<String, PushError> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ServiceAccount(auth) => auth.access_token().await,
        }
    }
}
