use thiserror::Error;

/// All the ways things can go wrong in FreshNyam
///
/// Only imports and config loading surface these to callers. Storage and
/// notification failures inside item mutations are logged and swallowed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Snapshot contains item id {0} more than once")]
    DuplicateId(uuid::Uuid),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] freshnyam_store::StoreError),

    #[error("Notification service failed: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
