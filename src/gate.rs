//! Concurrency gate for browser sessions
//!
//! Each capture launches a full headless Chrome process, so unbounded
//! concurrency would exhaust the host. The gate caps simultaneous capture
//! runs at a configured maximum; excess requests queue in arrival order
//! until a slot frees or the queue wait times out.

use crate::ScreenshotError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

/// One held capture slot.
///
/// The slot is returned to the gate when the lease drops, so it is
/// released on every exit path of a capture attempt, including failure
/// and timeout.
#[derive(Debug)]
pub struct Lease {
    _permit: OwnedSemaphorePermit,
}

/// Bounds the number of simultaneously active capture runs.
pub struct CaptureGate {
    semaphore: Arc<Semaphore>,
    max_slots: usize,
    queue_timeout: std::time::Duration,
}

impl CaptureGate {
    pub fn new(max_slots: usize, queue_timeout: std::time::Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_slots)),
            max_slots,
            queue_timeout,
        }
    }

    /// Wait for a capture slot.
    ///
    /// Waiters are served in arrival order (tokio semaphore FIFO). Fails
    /// with `ServiceBusy` if no slot frees within the queue timeout.
    pub async fn acquire(&self) -> Result<Lease, ScreenshotError> {
        let acquire = self.semaphore.clone().acquire_owned();
        match timeout(self.queue_timeout, acquire).await {
            Ok(Ok(permit)) => Ok(Lease { _permit: permit }),
            // The semaphore is never closed while the gate is alive.
            Ok(Err(_)) => Err(ScreenshotError::Internal(
                "capture gate semaphore closed".to_string(),
            )),
            Err(_) => Err(ScreenshotError::ServiceBusy(self.queue_timeout)),
        }
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    /// Slots currently free; in-flight captures hold the difference.
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}
