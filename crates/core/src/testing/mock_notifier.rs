//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::notifier::{Delivery, Notifier, NotifyError};

/// Mock implementation of the Notifier trait.
///
/// Records every message it is asked to send, so tests can assert the
/// notifier was (or was not) invoked.
///
/// # Example
///
/// ```rust,ignore
/// use triage_core::testing::MockNotifier;
///
/// let notifier = MockNotifier::new();
/// notifier.set_fail_always(3).await;
///
/// // ... run the processor ...
///
/// assert_eq!(notifier.call_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockNotifier {
    messages: Arc<RwLock<Vec<String>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<NotifyError>>>,
    /// Retries reported by the next successful call.
    next_retries: Arc<RwLock<u32>>,
    /// If set, every call fails as exhausted after this many attempts.
    fail_always: Arc<RwLock<Option<u32>>>,
    /// Simulated delivery latency.
    delay: Arc<RwLock<Duration>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            next_retries: Arc::new(RwLock::new(0)),
            fail_always: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Messages received so far, in call order.
    pub async fn recorded_messages(&self) -> Vec<String> {
        self.messages.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: NotifyError) {
        *self.next_error.write().await = Some(error);
    }

    /// Configure the next successful call to report `retries`.
    pub async fn set_next_retries(&self, retries: u32) {
        *self.next_retries.write().await = retries;
    }

    /// Make every call fail as if all `attempts` were used.
    pub async fn set_fail_always(&self, attempts: u32) {
        *self.fail_always.write().await = Some(attempts);
    }

    /// Restore normal delivery.
    pub async fn set_healthy(&self) {
        *self.fail_always.write().await = None;
        *self.next_error.write().await = None;
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Most calls that were ever running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn notify(&self, message: &str) -> Result<Delivery, NotifyError> {
        self.messages.write().await.push(message.to_string());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(attempts) = *self.fail_always.read().await {
            return Err(NotifyError::RetriesExhausted {
                attempts,
                last_error: "mock delivery failure".to_string(),
            });
        }

        let retries = std::mem::take(&mut *self.next_retries.write().await);
        Ok(Delivery { retries })
    }
}
