//! Download operation errors: conditions that abort without an outcome.

use thiserror::Error;

/// Error raised when a download cannot produce a classified outcome at all.
///
/// Everything the server can legitimately answer with (bad token, restricted
/// file, 403, 503, any other status) is a `DownloadOutcome`, not an error.
/// Only a malformed URL, a transport failure, or a sink write failure aborts
/// the operation.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The download URL could not be assembled from configuration and
    /// request. Raised before any network I/O.
    #[error("invalid download URL: {0}")]
    InvalidUrl(String),

    /// The transport could not complete the request (DNS, connect, TLS, or a
    /// connection failure mid-body).
    #[error("transport error: {0}")]
    Transport(#[from] curl::Error),

    /// Writing to a destination sink failed. Bytes already written to other
    /// sinks are not rolled back.
    #[error("sink write failed: {0}")]
    Sink(#[source] std::io::Error),
}
