//! Per-queue signal value reservation.

use super::{QueueKind, SyncToken};

/// The CPU side of every queue's fence: the next value to signal.
///
/// Completion is not tracked here. The backend reports each queue's
/// completed value; this type only guarantees that the values handed out on
/// a queue are strictly increasing.
#[derive(Debug, Clone)]
pub struct QueueTimelines {
    next_values: [u64; QueueKind::COUNT],
}

impl Default for QueueTimelines {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueTimelines {
    /// Fresh timelines; the first reserved value on every queue is 1.
    pub fn new() -> Self {
        Self {
            next_values: [1; QueueKind::COUNT],
        }
    }

    /// Reserve the next signal value on `queue`.
    pub fn reserve(&mut self, queue: QueueKind) -> SyncToken {
        let slot = &mut self.next_values[queue.index()];
        let token = SyncToken::new(queue, *slot);
        *slot += 1;
        token
    }

    /// The last value reserved on `queue` (value 0 if none yet).
    pub fn most_recent(&self, queue: QueueKind) -> SyncToken {
        SyncToken::new(queue, self.next_values[queue.index()] - 1)
    }

    /// The last reserved token of every queue.
    pub fn most_recent_all(&self) -> [SyncToken; QueueKind::COUNT] {
        QueueKind::ALL.map(|queue| self.most_recent(queue))
    }

    /// Returns true if `token` was handed out by these timelines.
    pub fn was_reserved(&self, token: SyncToken) -> bool {
        token.value < self.next_values[token.queue.index()]
    }
}
