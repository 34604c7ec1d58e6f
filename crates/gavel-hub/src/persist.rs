//! Chat persistence gateway.
//!
//! Decouples durable archival from the hot fan-out path. The router hands
//! an accepted [`ChatMessage`] to [`PersistenceGateway::enqueue`] (a
//! non-blocking `try_send`) and moves on; a single worker task drains the
//! queue and writes through the [`ChatStore`] collaborator, retrying
//! `StorageUnavailable` with exponential backoff up to the configured
//! budget. Exhaustion is logged and reported to the [`AlertSink`]; the
//! message was already delivered live, so what is lost is history, not
//! delivery.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use gavel_core::{AlertSink, ChatMessage, ChatStore, RetryConfig, StorageError};

/// Fire-and-forget handle to the archival worker.
pub struct PersistenceGateway {
    tx: Mutex<Option<mpsc::Sender<ChatMessage>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    alerts: Arc<dyn AlertSink>,
}

impl PersistenceGateway {
    /// Spawn the worker task and return the gateway.
    #[must_use]
    pub fn spawn(
        store: Arc<dyn ChatStore>,
        alerts: Arc<dyn AlertSink>,
        retry: RetryConfig,
        queue_capacity: usize,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<ChatMessage>(queue_capacity);
        let worker_alerts = Arc::clone(&alerts);
        let worker = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                persist_with_retry(&*store, &*worker_alerts, &retry, &message).await;
            }
            debug!("persistence worker drained and stopped");
        });
        Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            alerts,
        }
    }

    /// Hand a message to the worker without blocking.
    ///
    /// Returns `false` if the queue is full or the gateway is closed; the
    /// message's history is then lost (alerted), but its live delivery
    /// already happened.
    pub fn enqueue(&self, message: ChatMessage) -> bool {
        let Some(tx) = self.tx.lock().clone() else {
            return false;
        };
        match tx.try_send(message) {
            Ok(()) => true,
            Err(err) => {
                let message = match err {
                    mpsc::error::TrySendError::Full(m)
                    | mpsc::error::TrySendError::Closed(m) => m,
                };
                warn!(
                    message_id = %message.message_id,
                    "persistence queue rejected message, history lost"
                );
                counter!("chat_persist_failures_total").increment(1);
                self.alerts.chat_archive_failed(
                    &message,
                    0,
                    &StorageError::Unavailable("persistence queue full".into()),
                );
                false
            }
        }
    }

    /// Stop accepting new messages and wait for in-flight writes.
    ///
    /// Messages already accepted are still written (or alerted); sender
    /// disconnects never cancel them.
    pub async fn close(&self) {
        let tx = self.tx.lock().take();
        drop(tx);
        let worker = self.worker.lock().take();
        if let Some(handle) = worker {
            let _ = handle.await;
        }
    }
}

/// Write one message, retrying transient failures within the budget.
async fn persist_with_retry(
    store: &dyn ChatStore,
    alerts: &dyn AlertSink,
    retry: &RetryConfig,
    message: &ChatMessage,
) {
    let mut attempt: u32 = 0;
    loop {
        match store.persist(message).await {
            Ok(()) => {
                debug!(message_id = %message.message_id, attempt, "chat message archived");
                return;
            }
            Err(err @ StorageError::Unavailable(_)) => {
                if attempt >= retry.max_retries {
                    counter!("chat_persist_failures_total").increment(1);
                    alerts.chat_archive_failed(message, attempt + 1, &err);
                    return;
                }
                let delay = retry.delay_ms(attempt, rand::random::<f64>());
                warn!(
                    message_id = %message.message_id,
                    attempt,
                    delay_ms = delay,
                    error = %err,
                    "archive write failed, backing off"
                );
                counter!("chat_persist_retries_total").increment(1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
