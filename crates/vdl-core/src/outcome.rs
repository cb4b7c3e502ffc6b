//! Terminal download outcomes.

use std::fmt;

/// Final status of one download invocation.
///
/// These are classified results of a round trip the server answered, not
/// errors; `DownloadError` covers the conditions that abort instead. The set
/// is closed: callers can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadStatus {
    /// Body relayed to every sink in full (possibly zero bytes).
    Ok,
    /// 200 response whose body was the invalid-auth-token sentinel.
    WrongAuthToken,
    /// 200 response whose body was the restricted sentinel: downloads of
    /// this file are disabled.
    Restricted,
    /// HTTP 403.
    PermissionsError,
    /// HTTP 503: the service is temporarily unavailable.
    ServiceUnavailable,
    /// Any other HTTP status.
    Failed,
    /// Cancellation was observed before the body was exhausted.
    Cancelled,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Ok => "ok",
            DownloadStatus::WrongAuthToken => "wrong_auth_token",
            DownloadStatus::Restricted => "restricted",
            DownloadStatus::PermissionsError => "permissions_error",
            DownloadStatus::ServiceUnavailable => "service_unavailable",
            DownloadStatus::Failed => "failed",
            DownloadStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one download invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub status: DownloadStatus,
    /// Cumulative body bytes written to every sink. Excludes drained bytes,
    /// so an error-sentinel body reports zero.
    pub bytes_transferred: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_is_stable() {
        assert_eq!(DownloadStatus::Ok.to_string(), "ok");
        assert_eq!(DownloadStatus::WrongAuthToken.to_string(), "wrong_auth_token");
        assert_eq!(DownloadStatus::ServiceUnavailable.to_string(), "service_unavailable");
        assert_eq!(DownloadStatus::Cancelled.to_string(), "cancelled");
    }
}
