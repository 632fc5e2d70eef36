//! Upload progress reporting.
//!
//! The upload body stream only bumps an atomic counter. A poller on the
//! blocking pool reads that counter on an interval and hands snapshots to the
//! caller's callback, so a slow callback never holds up the async executor
//! driving the bytes. The poller stops when the body stream is dropped or when
//! the upload call finishes, whichever comes first.

use crate::types::{ProgressInfo, ProgressTracker};
use bytes::Bytes;
use futures::stream::{Stream, TryStreamExt};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;
use tracing::{trace, warn};

/// Callback invoked with progress snapshots during an upload.
pub type ProgressCallback = Arc<dyn Fn(&ProgressInfo) + Send + Sync>;

/// Default delay between two progress callbacks
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// Deliver one last snapshot, then stop
    Finish,
    /// Stop without any further callback
    Abandon,
}

/// Sends [`Signal::Finish`] when dropped.
struct FinishOnDrop(Sender<Signal>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        let _ = self.0.send(Signal::Finish);
    }
}

/// Progress state of one upload, before polling has started.
pub(crate) struct ProgressSession {
    tracker: Arc<ProgressTracker>,
    stop_tx: Sender<Signal>,
    stop_rx: Receiver<Signal>,
}

impl ProgressSession {
    pub(crate) fn new(total_bytes: u64) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();
        Self {
            tracker: Arc::new(ProgressTracker::new(total_bytes)),
            stop_tx,
            stop_rx,
        }
    }

    /// Wrap a reader into a byte stream that feeds this session's counter.
    /// Dropping the stream tells the poller to finish.
    pub(crate) fn tracked_stream<R>(
        &self,
        reader: R,
    ) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        let tracker = Arc::clone(&self.tracker);
        let on_close = FinishOnDrop(self.stop_tx.clone());
        ReaderStream::new(reader).inspect_ok(move |chunk| {
            let _on_close = &on_close;
            tracker.record(chunk.len() as u64);
        })
    }

    /// Start polling on the blocking pool.
    pub(crate) fn start(self, callback: ProgressCallback, interval: Duration) -> ProgressPoller {
        let Self {
            tracker,
            stop_tx,
            stop_rx,
        } = self;

        let handle = tokio::task::spawn_blocking(move || {
            poll_loop(&tracker, callback.as_ref(), interval, &stop_rx)
        });

        ProgressPoller {
            stop_tx,
            handle: Some(handle),
        }
    }
}

fn poll_loop(
    tracker: &ProgressTracker,
    callback: &(dyn Fn(&ProgressInfo) + Send + Sync),
    interval: Duration,
    stop_rx: &Receiver<Signal>,
) {
    loop {
        callback(&tracker.snapshot());

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(Signal::Finish) => break,
            Ok(Signal::Abandon) | Err(RecvTimeoutError::Disconnected) => {
                trace!("Progress poller abandoned");
                return;
            }
        }
    }

    let last = tracker.snapshot();
    trace!(
        uploaded_bytes = last.uploaded_bytes,
        total_bytes = last.total_bytes,
        "Progress poller stopped"
    );
    callback(&last);
}

/// Handle on a running progress poller.
///
/// Call [`finish`](Self::finish) on every exit path of the upload. Dropping
/// the handle instead (the upload future was cancelled) stops polling
/// without a final snapshot.
pub(crate) struct ProgressPoller {
    stop_tx: Sender<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressPoller {
    /// Stop polling and wait until the final snapshot has been delivered.
    pub(crate) async fn finish(mut self) {
        let _ = self.stop_tx.send(Signal::Finish);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Progress callback task failed");
            }
        }
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.stop_tx.send(Signal::Abandon);
        }
    }
}
