//! Error types for the lookout poller.

/// Top-level error type for the notification poller.
///
/// Deliberately small: a failed poll is a feed error, a failed state
/// read/write is a store error, and being offline is a detected state, not
/// an error. Nothing here is fatal; every failure path leaves the poller
/// able to resume on the next alarm, message, or connectivity event.
#[derive(Debug, thiserror::Error)]
pub enum LookoutError {
    /// Notification feed fetch or decode error.
    #[error("feed error: {0}")]
    Feed(String),

    /// Persisted state read/write error.
    #[error("store error: {0}")]
    Store(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LookoutError>;
