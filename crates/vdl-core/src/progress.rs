//! Throttled progress notification, decoupled from the transfer thread.
//!
//! The relay offers a snapshot after each delivered chunk; emissions are
//! rate-limited to one per `PROGRESS_UPDATE_INTERVAL` on the monotonic clock
//! and posted with a non-blocking `try_send`, so listener code never stalls
//! the transfer. The final post-completion event bypasses the gate.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

/// Minimum interval between throttled progress emissions.
pub const PROGRESS_UPDATE_INTERVAL: Duration = Duration::from_millis(300);

/// Snapshot of cumulative bytes written to every sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub bytes_transferred: u64,
}

/// Rate gate plus channel for one download invocation.
///
/// With no sender registered every call is a no-op, so the relay can offer
/// unconditionally.
#[derive(Debug)]
pub struct ProgressNotifier {
    tx: Option<mpsc::Sender<ProgressEvent>>,
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressNotifier {
    /// Notifier without a listener; all emissions are dropped.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            last_emit: None,
            min_interval: PROGRESS_UPDATE_INTERVAL,
        }
    }

    /// Notifier posting into `tx`, emitting at most once per `min_interval`.
    pub fn new(tx: mpsc::Sender<ProgressEvent>, min_interval: Duration) -> Self {
        Self {
            tx: Some(tx),
            last_emit: None,
            min_interval,
        }
    }

    /// Throttled emission. Posts if at least `min_interval` elapsed since
    /// the previous emission; the first offer always posts.
    pub fn offer(&mut self, bytes_transferred: u64) {
        if self.tx.is_none() {
            return;
        }
        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.min_interval {
                return;
            }
        }
        self.last_emit = Some(now);
        self.send(bytes_transferred);
    }

    /// Unthrottled emission for the final post-completion snapshot.
    pub fn force(&mut self, bytes_transferred: u64) {
        self.send(bytes_transferred);
    }

    fn send(&self, bytes_transferred: u64) {
        if let Some(tx) = &self.tx {
            // try_send: a full channel drops the snapshot rather than
            // blocking the transfer thread.
            let _ = tx.try_send(ProgressEvent { bytes_transferred });
        }
    }
}
