//! # Sync Events
//!
//! Completion messages from request tasks to the frame thread.
//!
//! ```text
//! ┌──────────────┐   SyncEvent    ┌──────────────┐
//! │ tokio task   │──────────────> │ frame thread │──> EntityStore
//! │ step+agents  │   (bounded)    │ drain_events │
//! └──────────────┘                └──────────────┘
//! ```

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parkview_shared::{AgentRoster, StepResponse};
use tracing::warn;

use crate::error::TransportError;
use crate::transport::Endpoint;

/// Outcome of one sync request.
#[derive(Debug)]
pub enum SyncEvent {
    /// The model stepped and the new roster is ready to merge.
    Stepped {
        /// Step response
        step: StepResponse,
        /// Roster fetched after the step
        roster: AgentRoster,
    },
    /// A request failed; nothing to merge.
    Failed {
        /// Endpoint that failed
        endpoint: Endpoint,
        /// Cause
        error: TransportError,
    },
}

/// Creates the task → frame channel.
pub(crate) fn channel(capacity: usize) -> (EventSender, Receiver<SyncEvent>) {
    let (sender, receiver) = bounded(capacity.max(1));
    (EventSender { sender }, receiver)
}

/// Sending half, cloned into each request task.
#[derive(Clone, Debug)]
pub(crate) struct EventSender {
    sender: Sender<SyncEvent>,
}

impl EventSender {
    /// Posts an event without blocking. Returns `false` if it was dropped.
    pub(crate) fn send(&self, event: SyncEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("sync event channel full, dropping event");
                false
            }
            // Engine dropped mid-request.
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}
