//! Easy2 handler for one download transfer.
//!
//! Captures the status line, probes the first bytes of a 200 body for
//! in-band error sentinels, and fans accepted chunks out to every sink in
//! lock-step. Aborts the transfer (write of 0) on cancellation, on a 503,
//! and on sink write failure; the orchestrator inspects the handler
//! afterwards to tell those apart.

use std::io::Write;
use std::str;

use crate::classify::sniff_error_token;
use crate::control::CancelToken;
use crate::outcome::DownloadStatus;
use crate::progress::ProgressNotifier;

/// Upper bound on bytes probed for an error sentinel in a 200 body.
pub(super) const ERROR_PROBE_SIZE: usize = 100;
/// Receive buffer size: body chunks arrive at most this large.
pub(super) const DOWNLOAD_CHUNK_SIZE: usize = 4096;

/// What the relay does with delivered body bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayPhase {
    /// No body byte seen yet; the first chunk is probed for error sentinels.
    Probe,
    /// Real file content: every chunk goes to every sink.
    Stream,
    /// Consume without writing (error-sentinel body).
    Drain,
}

/// Why the relay told curl to stop the transfer early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RelayStop {
    /// Cancellation token observed at a chunk boundary.
    Cancelled,
    /// 503 response; the body is left untouched.
    ServiceUnavailable,
    /// A sink write failed; the error is in `sink_error`.
    SinkWrite,
}

/// Handler state for one transfer. Implements curl's Handler for Easy2.
pub(super) struct RelayHandler<'a, W> {
    sinks: &'a mut [W],
    notifier: &'a mut ProgressNotifier,
    cancel: CancelToken,
    http_logging: bool,
    /// Status code from the most recent status line; redirect hops replace it.
    pub(super) status: Option<u32>,
    phase: RelayPhase,
    /// Error sentinel matched by the probe, if any.
    pub(super) sniffed: Option<DownloadStatus>,
    /// Cumulative bytes written to every sink.
    pub(super) bytes_transferred: u64,
    pub(super) stop: Option<RelayStop>,
    pub(super) sink_error: Option<std::io::Error>,
}

impl<'a, W: Write> RelayHandler<'a, W> {
    pub(super) fn new(
        sinks: &'a mut [W],
        notifier: &'a mut ProgressNotifier,
        cancel: CancelToken,
        http_logging: bool,
    ) -> Self {
        Self {
            sinks,
            notifier,
            cancel,
            http_logging,
            status: None,
            phase: RelayPhase::Probe,
            sniffed: None,
            bytes_transferred: 0,
            stop: None,
            sink_error: None,
        }
    }

    /// One final unthrottled progress emission with the closing byte count.
    pub(super) fn finish_progress(&mut self) {
        self.notifier.force(self.bytes_transferred);
    }

    /// Flush every sink. First failure wins; remaining sinks are left as-is.
    pub(super) fn flush_sinks(&mut self) -> std::io::Result<()> {
        for sink in self.sinks.iter_mut() {
            sink.flush()?;
        }
        Ok(())
    }

    fn relay_chunk(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.write_all(data) {
                self.sink_error = Some(e);
                self.stop = Some(RelayStop::SinkWrite);
                return Ok(0);
            }
        }
        self.bytes_transferred += data.len() as u64;
        self.notifier.offer(self.bytes_transferred);
        Ok(data.len())
    }
}

impl<W: Write> curl::easy::Handler for RelayHandler<'_, W> {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                self.status = parse_status_line(line);
            }
            if self.http_logging && !line.is_empty() {
                tracing::debug!("response header: {line}");
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        if self.cancel.is_cancelled() {
            self.stop = Some(RelayStop::Cancelled);
            return Ok(0);
        }
        match self.status {
            Some(503) => {
                self.stop = Some(RelayStop::ServiceUnavailable);
                return Ok(0);
            }
            Some(200) => {}
            // Non-200 bodies (and redirect-hop bodies) are drained unwritten.
            _ => return Ok(data.len()),
        }
        match self.phase {
            RelayPhase::Probe => {
                let probe = &data[..data.len().min(ERROR_PROBE_SIZE)];
                if let Some(status) = sniff_error_token(probe) {
                    self.sniffed = Some(status);
                    self.phase = RelayPhase::Drain;
                    return Ok(data.len());
                }
                self.phase = RelayPhase::Stream;
                self.relay_chunk(data)
            }
            RelayPhase::Stream => self.relay_chunk(data),
            RelayPhase::Drain => Ok(data.len()),
        }
    }
}

/// Extracts the numeric code from an HTTP status line ("HTTP/1.1 200 OK").
pub(super) fn parse_status_line(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
