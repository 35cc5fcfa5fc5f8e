//! Callback-style completion for spawned calls.
//!
//! [`CallHandle`] guards the single delivery of a call's outcome: exactly one
//! of the success or error callbacks runs, at most once, and `cancel` only
//! ever suppresses a delivery that has not started yet.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::task::JoinHandle;

const PENDING: u8 = 0;
const DELIVERED: u8 = 1;
const CANCELLED: u8 = 2;

/// Shared between a [`CallHandle`] and its task; whoever moves it out of
/// `PENDING` first decides whether a callback runs.
#[derive(Debug, Default)]
pub(crate) struct DeliveryGate(AtomicU8);

impl DeliveryGate {
    /// Claim the right to deliver. Succeeds at most once, and never after a
    /// cancel.
    pub(crate) fn claim(&self) -> bool {
        self.transition(DELIVERED)
    }

    fn cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Handle to a call started with
/// [`TwirpClient::invoke_with_callbacks`](crate::TwirpClient::invoke_with_callbacks).
///
/// Dropping the handle detaches the call; it still completes and delivers.
#[derive(Debug)]
pub struct CallHandle {
    gate: Arc<DeliveryGate>,
    task: JoinHandle<bool>,
}

impl CallHandle {
    pub(crate) fn new(gate: Arc<DeliveryGate>, task: JoinHandle<bool>) -> Self {
        Self { gate, task }
    }

    /// Cancel the call if its outcome has not been delivered yet.
    ///
    /// Returns `true` when this call suppressed the delivery. Once a
    /// callback has started, or after a previous cancel, this is a no-op
    /// returning `false`.
    pub fn cancel(&self) -> bool {
        if self.gate.cancel() {
            // No callback can run any more.
            self.task.abort();
            true
        } else {
            false
        }
    }

    /// Whether the call's task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the call to finish.
    ///
    /// Returns `true` if a callback ran, `false` if the call was cancelled
    /// first. A panic inside a callback is resumed here.
    pub async fn join(self) -> bool {
        match self.task.await {
            Ok(delivered) => delivered,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => false,
        }
    }
}
