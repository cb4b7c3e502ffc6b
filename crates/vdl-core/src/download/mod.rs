//! Download execution: one authenticated GET relayed to caller sinks.
//!
//! One invocation means one fresh curl easy handle with connection reuse
//! disabled and one classified `DownloadOutcome`. Anything the server can
//! legitimately answer with (bad token, restricted file, 403, 503, other
//! statuses) is an outcome, not an error; `DownloadError` is reserved for
//! malformed URLs, transport failures, and sink write failures.

mod relay;

use std::io::Write;
use std::time::Duration;

use curl::easy::{Easy2, List};
use tokio::sync::mpsc;

use crate::classify::classify_response;
use crate::config::VdlConfig;
use crate::control::CancelToken;
use crate::error::DownloadError;
use crate::outcome::{DownloadOutcome, DownloadStatus};
use crate::progress::{ProgressEvent, ProgressNotifier, PROGRESS_UPDATE_INTERVAL};
use crate::request::{build_download_url, DownloadRequest};

use relay::{RelayHandler, DOWNLOAD_CHUNK_SIZE};

/// Transport-level connect timeout; there is no deadline on the transfer
/// itself.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Redirect hop bound; the endpoint occasionally bounces through a CDN host.
const MAX_REDIRECTIONS: u32 = 10;

/// One-shot download engine.
///
/// Holds the configuration, the optional progress channel, and the
/// cancellation token for a single transfer. The token is sticky, so create
/// a new value for each download rather than reusing one.
pub struct FileDownload {
    config: VdlConfig,
    progress_tx: Option<mpsc::Sender<ProgressEvent>>,
    cancel: CancelToken,
}

impl FileDownload {
    pub fn new(config: VdlConfig) -> Self {
        Self {
            config,
            progress_tx: None,
            cancel: CancelToken::new(),
        }
    }

    /// Register the channel progress events are posted into.
    ///
    /// Events are throttled to one per `PROGRESS_UPDATE_INTERVAL`, plus one
    /// final unthrottled event when the transfer completes with any bytes
    /// written. Without a registered channel progress dispatch is a no-op.
    pub fn set_progress_sender(&mut self, tx: mpsc::Sender<ProgressEvent>) {
        self.progress_tx = Some(tx);
    }

    /// Token for cancelling this download from another thread.
    ///
    /// Observed once per delivered chunk; the in-flight request is then
    /// aborted at the transport level.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Executes the download, relaying the body to every sink in lock-step.
    ///
    /// Blocks the calling thread for the duration of the transfer. Sinks are
    /// flushed on the `Ok` and `Cancelled` paths; every other path leaves
    /// sink lifecycle to the caller. Errors only for a malformed URL, a
    /// transport failure, or a sink write failure.
    pub fn execute<W: Write>(
        &mut self,
        request: &DownloadRequest,
        sinks: &mut [W],
    ) -> Result<DownloadOutcome, DownloadError> {
        let url = build_download_url(&self.config, request)?;
        if self.config.http_logging {
            tracing::debug!("GET {url}");
            tracing::debug!("user-agent: {}", self.config.user_agent);
        }

        let mut notifier = match &self.progress_tx {
            Some(tx) => ProgressNotifier::new(tx.clone(), PROGRESS_UPDATE_INTERVAL),
            None => ProgressNotifier::disabled(),
        };
        let handler = RelayHandler::new(
            sinks,
            &mut notifier,
            self.cancel.clone(),
            self.config.http_logging,
        );

        let mut easy = Easy2::new(handler);
        easy.url(url.as_str())?;
        easy.useragent(&self.config.user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        easy.forbid_reuse(true)?;
        easy.buffer_size(DOWNLOAD_CHUNK_SIZE)?;
        easy.connect_timeout(CONNECT_TIMEOUT)?;

        let mut headers = List::new();
        headers.append("Connection: close")?;
        headers.append(&format!("Accept-Language: {}", self.config.accept_language))?;
        easy.http_headers(headers)?;

        if let Err(e) = easy.perform() {
            if e.is_write_error() {
                let handler = easy.get_mut();
                if let Some(io_err) = handler.sink_error.take() {
                    return Err(DownloadError::Sink(io_err));
                }
                if handler.stop.is_none() {
                    return Err(DownloadError::Transport(e));
                }
                // Cancellation and 503 abort the transfer on purpose; both
                // are classified below.
            } else {
                return Err(DownloadError::Transport(e));
            }
        }

        let code = easy.response_code()?;
        if self.config.http_logging {
            tracing::debug!("HTTP response code: {code}");
        }

        let handler = easy.get_mut();
        let bytes_transferred = handler.bytes_transferred;
        let mut status = classify_response(code, handler.sniffed);
        if status == DownloadStatus::Ok && self.cancel.is_cancelled() {
            status = DownloadStatus::Cancelled;
        }

        match status {
            DownloadStatus::Ok => {
                if bytes_transferred > 0 {
                    handler.finish_progress();
                }
                handler.flush_sinks().map_err(DownloadError::Sink)?;
            }
            DownloadStatus::Cancelled => {
                handler.flush_sinks().map_err(DownloadError::Sink)?;
            }
            _ => {}
        }

        tracing::debug!(status = %status, bytes = bytes_transferred, "download finished");
        Ok(DownloadOutcome {
            status,
            bytes_transferred,
        })
    }
}
