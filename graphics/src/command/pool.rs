//! Per-queue pool of native command lists.

use crate::backend::{Backend, CommandEncoder};
use crate::error::fatal;
use crate::sync::{QueueKind, SyncToken};

/// Identifies a list inside a [`CommandListPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandListId {
    queue: QueueKind,
    index: usize,
}

impl CommandListId {
    pub fn queue(self) -> QueueKind {
        self.queue
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ListState {
    Available,
    Recording,
    Closed,
    Submitted(Vec<SyncToken>),
}

struct Slot<L> {
    list: L,
    state: ListState,
}

/// Owns every native command list and tracks where each one is in its
/// `Available → Recording → Closed → Submitted → Available` cycle.
pub struct CommandListPool<B: Backend> {
    queues: [Vec<Slot<B::CommandList>>; QueueKind::COUNT],
}

impl<B: Backend> Default for CommandListPool<B> {
    fn default() -> Self {
        Self {
            queues: std::array::from_fn(|_| Vec::new()),
        }
    }
}

impl<B: Backend> CommandListPool<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lists created for `queue`.
    pub fn len(&self, queue: QueueKind) -> usize {
        self.queues[queue.index()].len()
    }

    /// Number of lists of `queue` ready for reuse.
    pub fn available(&self, queue: QueueKind) -> usize {
        self.queues[queue.index()]
            .iter()
            .filter(|slot| slot.state == ListState::Available)
            .count()
    }

    /// Take an available list of `queue`, creating one if none is free.
    pub fn acquire(&mut self, backend: &mut B, queue: QueueKind) -> CommandListId {
        let slots = &mut self.queues[queue.index()];
        if let Some(index) = slots.iter().position(|slot| slot.state == ListState::Available) {
            return CommandListId { queue, index };
        }
        let list = match backend.create_command_list(queue) {
            Ok(list) => list,
            Err(err) => fatal!("Failed to create a {queue} command list: {err}"),
        };
        slots.push(Slot {
            list,
            state: ListState::Available,
        });
        log::trace!("Created {queue} command list #{}", slots.len() - 1);
        CommandListId {
            queue,
            index: slots.len() - 1,
        }
    }

    /// Reset the list and start recording.
    ///
    /// Valid from the available and closed states only.
    pub fn open(&mut self, id: CommandListId) {
        let slot = self.slot_mut(id);
        match slot.state {
            ListState::Available | ListState::Closed => {}
            ListState::Recording => fatal!("Opening {id:?} while it is already open"),
            ListState::Submitted(_) => fatal!("Opening {id:?} while the GPU may still use it"),
        }
        slot.list.open();
        slot.state = ListState::Recording;
    }

    /// Finish recording.
    pub fn close(&mut self, id: CommandListId) {
        let slot = self.slot_mut(id);
        if slot.state != ListState::Recording {
            fatal!("Closing {id:?} which is not open ({:?})", slot.state);
        }
        slot.list.close();
        slot.state = ListState::Closed;
    }

    /// Return a closed list that was never submitted.
    pub fn release(&mut self, id: CommandListId) {
        let slot = self.slot_mut(id);
        if slot.state != ListState::Closed {
            fatal!("Releasing {id:?} which is not closed ({:?})", slot.state);
        }
        slot.state = ListState::Available;
    }

    /// Record that the list was submitted and is in use until `tokens` complete.
    pub fn mark_submitted(&mut self, id: CommandListId, tokens: Vec<SyncToken>) {
        let slot = self.slot_mut(id);
        if slot.state != ListState::Closed {
            fatal!("Submitting {id:?} which is not closed ({:?})", slot.state);
        }
        slot.state = ListState::Submitted(tokens);
    }

    /// Make lists whose submissions completed available again. Returns how
    /// many were reclaimed.
    pub fn reclaim(&mut self, backend: &B) -> usize {
        let mut reclaimed = 0;
        for slot in self.queues.iter_mut().flatten() {
            let complete = match &slot.state {
                ListState::Submitted(tokens) => tokens
                    .iter()
                    .all(|token| backend.completed_value(token.queue) >= token.value),
                _ => false,
            };
            if complete {
                slot.state = ListState::Available;
                reclaimed += 1;
            }
        }
        reclaimed
    }

    pub fn list(&self, id: CommandListId) -> &B::CommandList {
        &self.slot(id).list
    }

    pub fn list_mut(&mut self, id: CommandListId) -> &mut B::CommandList {
        &mut self.slot_mut(id).list
    }

    fn slot(&self, id: CommandListId) -> &Slot<B::CommandList> {
        match self.queues[id.queue.index()].get(id.index) {
            Some(slot) => slot,
            None => fatal!("Unknown command list {id:?}"),
        }
    }

    fn slot_mut(&mut self, id: CommandListId) -> &mut Slot<B::CommandList> {
        match self.queues[id.queue.index()].get_mut(id.index) {
            Some(slot) => slot,
            None => fatal!("Unknown command list {id:?}"),
        }
    }
}
