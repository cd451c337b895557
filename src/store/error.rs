use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("saved view {0} not found")]
    ViewNotFound(String),

    #[error("saved view {0} belongs to another user")]
    NotViewOwner(String),
}
