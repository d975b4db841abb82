use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LeaseLensError {
    #[error("history data is unreadable: {reason}")]
    CorruptData { reason: String },

    #[error("history schema version {version} is newer than this build supports")]
    UnsupportedSchema { version: u32 },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid upload: {reason}")]
    InvalidUpload { reason: String },

    /// `reason` is logged, not shown to the user.
    #[error("Could not connect to the analysis service. Is it running?")]
    RemoteUnavailable { reason: String },

    #[error("Error: {}", detail.as_deref().unwrap_or("An unknown error occurred."))]
    RemoteRejected { status: u16, detail: Option<String> },

    #[error("no analysis with id {id}")]
    RecordNotFound { id: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LeaseLensError {
    /// True for failures where the persisted history should be treated as empty.
    pub fn is_recoverable_load_failure(&self) -> bool {
        matches!(
            self,
            LeaseLensError::CorruptData { .. } | LeaseLensError::UnsupportedSchema { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LeaseLensError>;
