/// Errors raised by the device alarm layer.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Reading or writing the local alarm store failed.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored or embedded JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The id is reserved for the heartbeat, or an id derived from it
    /// would overflow.
    #[error("Alarm id {0} is reserved or out of range")]
    InvalidAlarmId(crate::AlarmId),

    /// A host OS call failed.
    #[error("Platform error: {0}")]
    Platform(String),
}
