//! Queues and sync tokens.
//!
//! Every hardware queue owns one timeline: a counter that only moves forward.
//! Submitting to a queue reserves the next value on its timeline and signals
//! it when the work finishes. A [`SyncToken`] names one such value, meaning
//! "everything submitted to this queue up to and including this point".
//!
//! ```text
//!   Graphics  ──1──────2──────3──▶   completed = 2
//!   Compute   ──1──2─────────────▶   completed = 2
//!   Copy      ──1────────────────▶   completed = 0
//!
//!   {Graphics, 3}  pending
//!   {Compute, 2}   complete
//! ```
//!
//! There is no implicit ordering between queues. A submission that consumes
//! another queue's output must name the producer's token as a dependency.

mod timeline;

pub use timeline::QueueTimelines;

use std::fmt;

/// Hardware queue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum QueueKind {
    /// Graphics queue; can execute everything.
    Graphics = 0,
    /// Async compute queue.
    Compute = 1,
    /// Transfer-only queue.
    Copy = 2,
}

impl QueueKind {
    /// Number of queue kinds.
    pub const COUNT: usize = 3;

    /// All queue kinds in index order.
    pub const ALL: [QueueKind; Self::COUNT] = [Self::Graphics, Self::Compute, Self::Copy];

    /// Dense index for per-queue arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Graphics => "graphics",
            Self::Compute => "compute",
            Self::Copy => "copy",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A point on one queue's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyncToken {
    /// Queue the token belongs to.
    pub queue: QueueKind,
    /// Timeline value signalled when the work completes.
    pub value: u64,
}

impl SyncToken {
    /// Create a token.
    pub const fn new(queue: QueueKind, value: u64) -> Self {
        Self { queue, value }
    }

    /// Token that is complete before anything is submitted.
    pub const fn initial(queue: QueueKind) -> Self {
        Self { queue, value: 0 }
    }
}

impl fmt::Display for SyncToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.queue, self.value)
    }
}

static_assertions::assert_impl_all!(SyncToken: Send, Sync, Copy);
static_assertions::const_assert_eq!(QueueKind::ALL.len(), QueueKind::COUNT);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_indices_are_dense() {
        for (i, queue) in QueueKind::ALL.iter().enumerate() {
            assert_eq!(queue.index(), i);
        }
    }

    #[test]
    fn test_token_display() {
        let token = SyncToken::new(QueueKind::Compute, 7);
        assert_eq!(token.to_string(), "compute#7");
        assert_eq!(SyncToken::initial(QueueKind::Copy).value, 0);
    }
}
