use thiserror::Error;

/// Domain errors for dispatch operations.
///
/// Variants map one-to-one onto wire status codes at the HTTP edge
/// (see `server::error::ApiError`), so domain code never touches axum types.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The caller's input is malformed or out of range.
    #[error("{0}")]
    Validation(String),

    /// The named entity does not exist, or the caller has no business knowing
    /// whether it does.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The operation raced a concurrent state change and lost.
    #[error("{0}")]
    Conflict(String),

    /// The backing store could not be reached or the query failed.
    #[error("storage unavailable")]
    StorageUnavailable(#[from] anyhow::Error),
}
