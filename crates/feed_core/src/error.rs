use thiserror::Error;

/// Why a fetch completed without adding items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("page size must be greater than zero")]
    InvalidPageSize,
    #[error("request cancelled")]
    Cancelled,
    #[error("response superseded by a refresh")]
    Superseded,
}

/// Caller contract violations on the read API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("index {index} out of range for feed of {len} items")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("item not found in feed")]
    NotFound,
}
