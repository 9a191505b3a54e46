//! The `/log_stream` producer queue.
//!
//! A build tool pushes event records in; a viewer long-polls them out.
//! The queue always opens with a `StartupParams` record. Each poll waits
//! until at least one record is queued, then takes everything queued so
//! far. Once the producer calls [`ProducerQueue::finish`], the next poll
//! takes the remaining records plus the `{"quit_key": " "}` sentinel, and
//! every poll after that is refused.

use std::collections::VecDeque;
use std::time::Duration;

use buildscope_types::event::STARTUP_PARAMS;
use serde_json::{Value, json};
use tokio::sync::{Mutex, Notify};
use tracing::debug;

use crate::error::ObserverError;

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<Value>,
    /// No more pushes; the next drain appends the sentinel.
    closing: bool,
    /// The sentinel went out.
    done: bool,
}

/// FIFO of raw event records waiting to be long-polled.
#[derive(Debug)]
pub struct ProducerQueue {
    state: Mutex<QueueState>,
    ready: Notify,
}

impl ProducerQueue {
    /// Create a queue holding only the opening `StartupParams` record.
    pub fn new(respire_details_dir: Option<&str>) -> Self {
        let mut params = serde_json::Map::new();
        if let Some(dir) = respire_details_dir {
            params.insert("respire_details_dir".to_owned(), Value::from(dir));
        }
        let mut pending = VecDeque::new();
        pending.push_back(json!({ "type": STARTUP_PARAMS, "params": params }));

        Self {
            state: Mutex::new(QueueState {
                pending,
                ..QueueState::default()
            }),
            ready: Notify::new(),
        }
    }

    /// Append records in order and wake waiting polls.
    ///
    /// Returns the number of records queued.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::StreamClosed`] after [`finish`](Self::finish).
    pub async fn push(&self, records: Vec<Value>) -> Result<usize, ObserverError> {
        let mut state = self.state.lock().await;
        if state.closing {
            return Err(ObserverError::StreamClosed);
        }
        let count = records.len();
        state.pending.extend(records);
        drop(state);

        if count > 0 {
            self.ready.notify_waiters();
        }
        Ok(count)
    }

    /// Close the queue to new records. Returns `false` if it was already
    /// closed.
    pub async fn finish(&self) -> bool {
        let mut state = self.state.lock().await;
        let newly_closed = !state.closing;
        state.closing = true;
        drop(state);

        self.ready.notify_waiters();
        newly_closed
    }

    /// Wait up to `hold` for records, then take all of them.
    ///
    /// Returns an empty batch if `hold` passes with nothing queued.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::StreamDone`] once the sentinel was delivered.
    pub async fn next_batch(&self, hold: Duration) -> Result<Vec<Value>, ObserverError> {
        let deadline = tokio::time::Instant::now() + hold;
        loop {
            // Registered before the check so a push in between still wakes us.
            let ready = self.ready.notified();
            {
                let mut state = self.state.lock().await;
                if state.done {
                    return Err(ObserverError::StreamDone);
                }
                if !state.pending.is_empty() || state.closing {
                    let mut batch: Vec<Value> = state.pending.drain(..).collect();
                    if state.closing {
                        state.done = true;
                        batch.push(json!({ "quit_key": " " }));
                    }
                    debug!(records = batch.len(), final_batch = state.done, "Drained producer queue");
                    return Ok(batch);
                }
            }
            if tokio::time::timeout_at(deadline, ready).await.is_err() {
                return Ok(Vec::new());
            }
        }
    }

    /// Number of records waiting to be polled.
    pub async fn queued(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Whether the sentinel was delivered.
    pub async fn is_done(&self) -> bool {
        self.state.lock().await.done
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const HOLD: Duration = Duration::from_secs(30);

    #[tokio::test]
    async fn opens_with_startup_params() {
        let queue = ProducerQueue::new(Some("/out/.respire"));
        let batch = queue.next_batch(HOLD).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0]["type"], "StartupParams");
        assert_eq!(batch[0]["params"]["respire_details_dir"], "/out/.respire");
    }

    #[tokio::test]
    async fn startup_params_without_details_dir_are_empty() {
        let queue = ProducerQueue::new(None);
        let batch = queue.next_batch(HOLD).await.unwrap();
        assert_eq!(batch[0]["params"], json!({}));
    }

    #[tokio::test]
    async fn drains_everything_queued() {
        let queue = ProducerQueue::new(None);
        queue
            .push(vec![json!({"id": "1", "type": "ParsingStarting"})])
            .await
            .unwrap();
        queue
            .push(vec![json!({"id": "2", "type": "ParsingStarting"})])
            .await
            .unwrap();

        assert_eq!(queue.next_batch(HOLD).await.unwrap().len(), 3);
        assert_eq!(queue.queued().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_hold_returns_an_empty_batch() {
        let queue = ProducerQueue::new(None);
        queue.next_batch(HOLD).await.unwrap();
        let batch = queue.next_batch(Duration::from_secs(5)).await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn waiting_poll_wakes_on_push() {
        let queue = Arc::new(ProducerQueue::new(None));
        queue.next_batch(HOLD).await.unwrap();

        let poll = tokio::spawn({
            let queue = Arc::clone(&queue);
            async move { queue.next_batch(HOLD).await }
        });
        tokio::task::yield_now().await;
        queue
            .push(vec![json!({"id": "7", "type": "ExecutingCommand"})])
            .await
            .unwrap();

        let batch = poll.await.unwrap().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0]["id"], "7");
    }

    #[tokio::test]
    async fn finish_appends_sentinel_then_refuses() {
        let queue = ProducerQueue::new(None);
        queue
            .push(vec![json!({"id": "1", "type": "ProcessingComplete"})])
            .await
            .unwrap();
        assert!(queue.finish().await);
        assert!(!queue.finish().await);

        let batch = queue.next_batch(HOLD).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[2], json!({"quit_key": " "}));
        assert!(queue.is_done().await);

        assert!(matches!(
            queue.next_batch(HOLD).await,
            Err(ObserverError::StreamDone)
        ));
    }

    #[tokio::test]
    async fn push_after_finish_is_rejected() {
        let queue = ProducerQueue::new(None);
        queue.finish().await;
        assert!(matches!(
            queue.push(vec![json!({"type": "ParsingStarting"})]).await,
            Err(ObserverError::StreamClosed)
        ));
    }
}
