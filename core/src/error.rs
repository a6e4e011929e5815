use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReelError>;

#[derive(Error, Debug)]
pub enum ReelError {
    /// Rejected before any side effect took place.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The reel store could not be reached or the query failed.
    #[error("storage failure: {0}")]
    StorageFailure(String),

    /// The external encoder failed; `diagnostics` carries its stderr.
    #[error("render failure: {diagnostics}")]
    RenderFailure { diagnostics: String },
}

impl ReelError {
    pub fn render(diagnostics: impl Into<String>) -> Self {
        Self::RenderFailure { diagnostics: diagnostics.into() }
    }
}

impl From<sled::Error> for ReelError {
    fn from(e: sled::Error) -> Self {
        Self::StorageFailure(e.to_string())
    }
}

impl From<bincode::Error> for ReelError {
    fn from(e: bincode::Error) -> Self {
        Self::StorageFailure(format!("corrupt reel record: {e}"))
    }
}

impl From<std::io::Error> for ReelError {
    fn from(e: std::io::Error) -> Self {
        Self::StorageFailure(e.to_string())
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidInput(e.to_string())
    }
}
