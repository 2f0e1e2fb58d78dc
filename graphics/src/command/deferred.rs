//! Per-queue batch of command lists waiting for the frame boundary.

use super::CommandListId;
use crate::sync::{QueueKind, QueueTimelines, SyncToken};

#[derive(Debug, Default)]
struct PendingQueue {
    lists: Vec<CommandListId>,
    token: Option<SyncToken>,
}

/// Lists of `DeferToPresent` contexts, submitted together later.
///
/// The first list deferred on a queue reserves that queue's next signal
/// value; every list joining the batch afterwards shares it. Nothing else may
/// be submitted on the queue until the batch is, or signal values would stop
/// increasing.
#[derive(Debug, Default)]
pub struct DeferredBatch {
    queues: [PendingQueue; QueueKind::COUNT],
}

impl DeferredBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a closed list to `queue`'s batch and return the batch token.
    pub fn push(
        &mut self,
        queue: QueueKind,
        list: CommandListId,
        timelines: &mut QueueTimelines,
    ) -> SyncToken {
        let pending = &mut self.queues[queue.index()];
        let token = *pending.token.get_or_insert_with(|| timelines.reserve(queue));
        pending.lists.push(list);
        token
    }

    /// Token reserved by `queue`'s batch, if it has one.
    pub fn reserved(&self, queue: QueueKind) -> Option<SyncToken> {
        self.queues[queue.index()].token
    }

    /// Returns true if `token` will only be signalled once a batch is submitted.
    pub fn holds(&self, token: SyncToken) -> bool {
        self.reserved(token.queue)
            .is_some_and(|reserved| token.value >= reserved.value)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(|pending| pending.token.is_none())
    }

    /// Take `queue`'s batch for submission.
    pub fn take(&mut self, queue: QueueKind) -> Option<(Vec<CommandListId>, SyncToken)> {
        let pending = &mut self.queues[queue.index()];
        let token = pending.token.take()?;
        Some((std::mem::take(&mut pending.lists), token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::command::CommandListPool;

    fn ids(count: usize, queue: QueueKind) -> Vec<CommandListId> {
        let mut backend = DummyBackend::new();
        let mut pool = CommandListPool::<DummyBackend>::new();
        (0..count)
            .map(|_| {
                let id = pool.acquire(&mut backend, queue);
                pool.open(id);
                id
            })
            .collect()
    }

    #[test]
    fn test_contexts_share_token() {
        let mut timelines = QueueTimelines::new();
        let mut batch = DeferredBatch::new();
        let lists = ids(2, QueueKind::Graphics);

        let first = batch.push(QueueKind::Graphics, lists[0], &mut timelines);
        let second = batch.push(QueueKind::Graphics, lists[1], &mut timelines);
        assert_eq!(first, second);
        assert_eq!(first.value, 1);
        assert!(batch.holds(first));

        let (taken, token) = batch.take(QueueKind::Graphics).unwrap();
        assert_eq!(taken, lists);
        assert_eq!(token, first);
        assert!(batch.is_empty());
        assert!(!batch.holds(first));
    }

    #[test]
    fn test_queues_are_independent() {
        let mut timelines = QueueTimelines::new();
        let mut batch = DeferredBatch::new();
        timelines.reserve(QueueKind::Compute);
        let list = ids(1, QueueKind::Compute)[0];

        let token = batch.push(QueueKind::Compute, list, &mut timelines);
        assert_eq!(token, SyncToken::new(QueueKind::Compute, 2));
        assert!(batch.reserved(QueueKind::Graphics).is_none());
        assert!(!batch.holds(SyncToken::new(QueueKind::Compute, 1)));
        assert!(batch.take(QueueKind::Copy).is_none());
    }
}
