use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Database error: {0}")]
    SqlError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("missing grouping key: record at index {index} has no io_id")]
    MissingGroupingKey { index: usize },

    #[error("missing transaction id: record at index {index} has no trx_id")]
    MissingTrxId { index: usize },

    #[error("{message}")]
    ExecutionError {
        message: String,
        description: String,
        item_index: usize,
    },
}

pub type Result<T> = std::result::Result<T, RouterError>;
