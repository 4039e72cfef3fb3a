use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArcadeError {
    #[error("Invalid payload: {0}")]
    Validation(String),

    #[error("No wallet connected")]
    IdentityMissing,

    #[error("Reward issuance failed ({kind}): {message}")]
    RewardIssuance { kind: String, message: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Upstream {service} error: {message}")]
    Upstream { service: String, message: String },

    #[error("Operation {operation} timed out")]
    Timeout { operation: String },

    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),

    #[error("Unknown game type: {0}")]
    UnknownGame(String),

    #[error("Badge template not found: {0}")]
    BadgeNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ArcadeError {
    /// Errors raised by the durable store. The service treats these as non-fatal.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            ArcadeError::Persistence(_) | ArcadeError::DatabaseError(_) | ArcadeError::SerializationError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
