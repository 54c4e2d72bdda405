use crate::domain::model::Kind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Missing required fields: {}", missing.join(", "))]
    ValidationError { missing: Vec<String> },

    #[error("Failed to write {kind} collection: {message}")]
    StoreWriteError { kind: Kind, message: String },

    #[error("{kind} collection is corrupt: {message}")]
    StoreCorruptError { kind: Kind, message: String },

    #[error("Notification failed: {message}")]
    NotificationError { message: String },

    #[error("{kind} collection cannot be published")]
    NotPublishable { kind: Kind },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

impl SiteError {
    pub fn validation<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SiteError::ValidationError {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// 請求本身有問題 (4xx)，而非伺服器端失敗
    pub fn is_client_error(&self) -> bool {
        matches!(self, SiteError::ValidationError { .. })
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
