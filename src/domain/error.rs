//! Domain error types.

/// Top-level error type for invtracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("investment {id} not found")]
    NotFound { id: i64 },

    #[error("path id {path} does not match body id {body}")]
    IdMismatch { path: i64, body: i64 },

    #[error("invalid investment: {reason}")]
    InvalidRecord { reason: String },

    #[error("invalid paging: {reason}")]
    InvalidPage { reason: String },

    #[error("invalid date for {field}: {value}")]
    InvalidDate { field: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// True for errors caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TrackerError::NotFound { .. }
                | TrackerError::IdMismatch { .. }
                | TrackerError::InvalidRecord { .. }
                | TrackerError::InvalidPage { .. }
                | TrackerError::InvalidDate { .. }
        )
    }
}

impl From<&TrackerError> for std::process::ExitCode {
    fn from(err: &TrackerError) -> Self {
        let code: u8 = match err {
            TrackerError::Io(_) => 1,
            TrackerError::ConfigParse { .. }
            | TrackerError::ConfigMissing { .. }
            | TrackerError::ConfigInvalid { .. } => 2,
            TrackerError::Database { .. } | TrackerError::DatabaseQuery { .. } => 3,
            TrackerError::IdMismatch { .. }
            | TrackerError::InvalidRecord { .. }
            | TrackerError::InvalidPage { .. }
            | TrackerError::InvalidDate { .. } => 4,
            TrackerError::NotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
