#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or missing request fields. Always a 400.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No owning organisation/template for the caller. Surfaced as 400
    /// by convention; a few paths return 404 (handled at the API layer).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Illegal state transition.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bearer token missing, invalid, or resolving to no active client.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The external wallet system returned non-2xx or was unreachable.
    /// Never retried here; the upstream text is embedded in the response.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
