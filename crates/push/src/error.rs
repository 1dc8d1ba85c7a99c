/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// FCM answered with a non-2xx status.
    #[error("FCM rejected the message (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// An access token could not be obtained.
    #[error("Failed to obtain access token: {0}")]
    Auth(String),

    /// Misconfiguration detected at startup (missing key file, bad JSON).
    #[error("Push configuration error: {0}")]
    Config(String),
}
