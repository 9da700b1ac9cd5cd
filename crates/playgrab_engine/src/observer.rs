//! Session-wide network observer feeding a bounded pending queue.
//!
//! Correlation downstream is by arrival order only: the observer does not
//! know which control, if any, caused a request. A request left in the queue
//! by one control is handed to whichever control polls next.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use futures_util::StreamExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::RequestStream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub url: String,
    /// Arrival order among matching requests, dropped ones included.
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverStats {
    pub accepted: u64,
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ObserverStats {
        ObserverStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Creates a bounded queue. A capacity of zero is treated as one.
pub fn pending_queue(capacity: usize) -> (QueueProducer, PendingQueue) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let counters = Arc::new(Counters::default());
    (
        QueueProducer {
            tx,
            counters: counters.clone(),
        },
        PendingQueue { rx },
    )
}

/// Producing half; never blocks.
#[derive(Debug)]
pub struct QueueProducer {
    tx: mpsc::Sender<CapturedRequest>,
    counters: Arc<Counters>,
}

impl QueueProducer {
    /// Enqueues `url` if there is room. When the queue is full the new item is
    /// discarded and the queued items stay as they are. Returns whether the
    /// item was kept.
    pub fn offer(&self, url: String) -> bool {
        let sequence = self.counters.accepted.load(Ordering::Relaxed)
            + self.counters.dropped.load(Ordering::Relaxed);
        match self.tx.try_send(CapturedRequest { url, sequence }) {
            Ok(()) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(request)) | Err(TrySendError::Closed(request)) => {
                engine_trace!("pending queue rejected {}", request.url);
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn stats(&self) -> ObserverStats {
        self.counters.snapshot()
    }
}

/// Consuming half, owned by the session loop.
#[derive(Debug)]
pub struct PendingQueue {
    rx: mpsc::Receiver<CapturedRequest>,
}

impl PendingQueue {
    /// Waits up to `window` for one queued request and removes it.
    ///
    /// Returns `None` when the window elapses first, or when the producer is
    /// gone and nothing is left.
    pub async fn next_within(&mut self, window: Duration) -> Option<CapturedRequest> {
        match tokio::time::timeout(window, self.rx.recv()).await {
            Ok(Some(request)) => Some(request),
            Ok(None) => {
                engine_debug!("pending queue closed while waiting for a request");
                None
            }
            Err(_elapsed) => None,
        }
    }

    /// Removes one queued request without waiting.
    pub fn try_next(&mut self) -> Option<CapturedRequest> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Long-lived subscription that filters outgoing requests by host substring.
///
/// Installed once per session; runs until [`NetworkObserver::shutdown`] or
/// until it is dropped.
pub struct NetworkObserver {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl NetworkObserver {
    /// Spawns the observer on the current runtime and returns it together with
    /// the queue it fills.
    pub fn install(
        requests: RequestStream,
        target_host: impl Into<String>,
        capacity: usize,
    ) -> (Self, PendingQueue) {
        let (producer, queue) = pending_queue(capacity);
        (Self::spawn(requests, target_host.into(), producer), queue)
    }

    fn spawn(mut requests: RequestStream, target_host: String, producer: QueueProducer) -> Self {
        let cancel = CancellationToken::new();
        let counters = producer.counters.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    next = requests.next() => match next {
                        Some(url) => {
                            if url.contains(&target_host) {
                                producer.offer(url);
                            }
                        }
                        None => {
                            engine_debug!("request stream ended");
                            break;
                        }
                    },
                }
            }
        });

        Self {
            cancel,
            task: Some(task),
            counters,
        }
    }

    pub fn stats(&self) -> ObserverStats {
        self.counters.snapshot()
    }

    /// Stops the subscription and waits for the observer task to finish.
    pub async fn shutdown(mut self) -> ObserverStats {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.stats()
    }
}

impl Drop for NetworkObserver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
