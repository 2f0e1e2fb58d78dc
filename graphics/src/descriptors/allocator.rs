//! Fixed-capacity bindless slot allocation.

use vexel_core::IndexAllocator;

use super::{BindlessHandle, DescriptorKind};
use crate::backend::Backend;
use crate::config::DescriptorCapacities;
use crate::error::fatal;

/// Slot allocator for one descriptor table.
#[derive(Debug)]
pub struct BindlessAllocator {
    kind: DescriptorKind,
    slots: IndexAllocator,
}

impl BindlessAllocator {
    /// Allocator over `capacity` slots of `kind`.
    pub fn new(kind: DescriptorKind, capacity: u32) -> Self {
        Self {
            kind,
            slots: IndexAllocator::new(capacity),
        }
    }

    /// Table category.
    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    /// Table size.
    pub fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    /// Number of allocated slots.
    pub fn allocated(&self) -> u32 {
        self.slots.len()
    }

    /// Take a free slot.
    ///
    /// Running out of slots is fatal: the table cannot grow without
    /// re-uploading every descriptor already handed out.
    pub fn allocate(&mut self) -> BindlessHandle {
        match self.slots.allocate() {
            Some((index, generation)) => BindlessHandle::new(index, generation, self.kind),
            None => fatal!(
                "Ran out of {:?} descriptors ({} slots in use)",
                self.kind,
                self.slots.capacity()
            ),
        }
    }

    /// Release a slot. Returns false if `handle` was already stale.
    pub fn free(&mut self, handle: BindlessHandle) -> bool {
        debug_assert_eq!(handle.kind, self.kind);
        self.slots.free(handle.index, handle.generation)
    }

    /// Returns true if `handle` still names a live slot.
    pub fn is_valid(&self, handle: BindlessHandle) -> bool {
        handle.kind == self.kind && self.slots.is_valid(handle.index, handle.generation)
    }
}

/// One [`BindlessAllocator`] per [`DescriptorKind`].
#[derive(Debug)]
pub struct DescriptorPool {
    allocators: [BindlessAllocator; DescriptorKind::COUNT],
}

impl DescriptorPool {
    /// Pool with the given table sizes.
    pub fn new(capacities: &DescriptorCapacities) -> Self {
        Self {
            allocators: DescriptorKind::ALL
                .map(|kind| BindlessAllocator::new(kind, capacities.get(kind))),
        }
    }

    /// Allocator of one table.
    pub fn allocator(&self, kind: DescriptorKind) -> &BindlessAllocator {
        &self.allocators[kind.index()]
    }

    /// Take a slot in `kind`'s table. Fatal when the table is full.
    pub fn allocate_static_descriptor(&mut self, kind: DescriptorKind) -> BindlessHandle {
        let handle = self.allocators[kind.index()].allocate();
        log::trace!("Allocated {handle:?}");
        handle
    }

    /// Release a slot and point it at a null descriptor.
    ///
    /// Freeing a stale handle is a contract violation.
    pub fn free_static_descriptor<B: Backend>(&mut self, backend: &mut B, handle: BindlessHandle) {
        if !self.allocators[handle.kind.index()].free(handle) {
            fatal!("Freeing stale bindless handle {handle:?}");
        }
        backend.write_null_descriptor(handle);
        log::trace!("Freed {handle:?}");
    }

    /// Release a slot whose descriptor was never written.
    pub(crate) fn discard(&mut self, handle: BindlessHandle) {
        self.allocators[handle.kind.index()].free(handle);
    }

    /// Returns true if `handle` still names a live slot.
    pub fn is_valid(&self, handle: BindlessHandle) -> bool {
        self.allocators[handle.kind.index()].is_valid(handle)
    }
}
