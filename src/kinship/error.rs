use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, KinshipError>;

#[derive(Debug, Error)]
pub enum KinshipError {
    /// A required parameter was missing or malformed; nothing was traversed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The edge or people store could not answer.
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl KinshipError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
