//! Response classification: HTTP status code plus in-band error sniffing.
//!
//! The storage API reports some errors as a 200 response whose body is a
//! short plain-text sentinel instead of file bytes. The relay probes the
//! first bytes of a 200 body and matches them here before committing to a
//! transfer. Pure functions, no I/O.

use crate::outcome::DownloadStatus;

/// Body sentinel sent with HTTP 200 when the auth token is not valid.
pub const WRONG_AUTH_TOKEN: &str = "wrong_auth_token";
/// Body sentinel sent with HTTP 200 when downloads of the file are disabled.
pub const RESTRICTED: &str = "restricted";

/// Matches a body probe against the known error sentinels.
///
/// The probe is decoded as UTF-8 (lossily) and trimmed of surrounding
/// whitespace; only a whole-probe exact match counts. Returns `None` for
/// ordinary file content. A short file whose entire probe trims to a
/// sentinel is reported as that error; the in-band scheme cannot tell the
/// two apart, an accepted limitation.
pub fn sniff_error_token(probe: &[u8]) -> Option<DownloadStatus> {
    let text = String::from_utf8_lossy(probe);
    match text.trim() {
        WRONG_AUTH_TOKEN => Some(DownloadStatus::WrongAuthToken),
        RESTRICTED => Some(DownloadStatus::Restricted),
        _ => None,
    }
}

/// Maps the HTTP status code and the sniffed sentinel (if any) to a final
/// download status. 503 wins outright; a sentinel is only meaningful on 200.
/// Cancellation is applied by the orchestrator afterwards and overrides
/// `Ok` only.
pub fn classify_response(code: u32, sniffed: Option<DownloadStatus>) -> DownloadStatus {
    match code {
        503 => DownloadStatus::ServiceUnavailable,
        200 => sniffed.unwrap_or(DownloadStatus::Ok),
        403 => DownloadStatus::PermissionsError,
        _ => DownloadStatus::Failed,
    }
}
