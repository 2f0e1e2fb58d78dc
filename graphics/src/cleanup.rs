//! Deferred destruction of native objects.
//!
//! Destroying a resource the GPU may still read is undefined behaviour, so
//! nothing is released at the point of the client's `destroy_*` call. The
//! object goes into the [`CleanupQueue`] together with the tokens it must
//! outlive, and is released at the first cleanup checkpoint that observes all
//! of them complete.

use std::collections::VecDeque;

use crate::backend::Backend;
use crate::descriptors::{BindlessHandle, DescriptorPool};
use crate::sync::SyncToken;

/// A native object waiting for the GPU to let go of it.
pub enum CleanupResource<B: Backend> {
    Texture {
        native: B::Texture,
        views: Vec<BindlessHandle>,
    },
    Buffer {
        native: B::Buffer,
        views: Vec<BindlessHandle>,
    },
    Pipeline(B::Pipeline),
}

impl<B: Backend> CleanupResource<B> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Texture { .. } => "texture",
            Self::Buffer { .. } => "buffer",
            Self::Pipeline(_) => "pipeline",
        }
    }
}

/// One queued release.
pub struct CleanupEntry<B: Backend> {
    pub resource: CleanupResource<B>,
    /// Every token must be complete before the release.
    pub not_before: Vec<SyncToken>,
}

/// FIFO of pending releases.
pub struct CleanupQueue<B: Backend> {
    entries: VecDeque<CleanupEntry<B>>,
}

impl<B: Backend> Default for CleanupQueue<B> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<B: Backend> CleanupQueue<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue `resource` for release once every token in `not_before` is complete.
    pub fn push(&mut self, resource: CleanupResource<B>, not_before: impl Into<Vec<SyncToken>>) {
        let not_before = not_before.into();
        log::trace!("Queued {} for cleanup after {:?}", resource.kind(), not_before);
        self.entries.push_back(CleanupEntry {
            resource,
            not_before,
        });
    }

    /// Release every entry whose tokens are complete. Returns how many were
    /// released.
    ///
    /// Each entry is checked on its own, so an entry waiting on a slow queue
    /// does not hold back entries behind it.
    pub fn flush(&mut self, backend: &mut B, descriptors: &mut DescriptorPool) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        let pending = std::mem::take(&mut self.entries);
        let mut released = 0;
        for entry in pending {
            let complete = entry
                .not_before
                .iter()
                .all(|token| backend.completed_value(token.queue) >= token.value);
            if complete {
                Self::release(backend, descriptors, entry.resource);
                released += 1;
            } else {
                self.entries.push_back(entry);
            }
        }
        if released > 0 {
            log::trace!("Cleanup released {released}, {} pending", self.entries.len());
        }
        released
    }

    /// Release everything without checking tokens. Only valid once the
    /// device is idle.
    pub fn release_all(&mut self, backend: &mut B, descriptors: &mut DescriptorPool) {
        for entry in std::mem::take(&mut self.entries) {
            Self::release(backend, descriptors, entry.resource);
        }
    }

    fn release(backend: &mut B, descriptors: &mut DescriptorPool, resource: CleanupResource<B>) {
        match resource {
            CleanupResource::Texture { native, views } => {
                Self::free_views(backend, descriptors, views);
                backend.destroy_texture(native);
            }
            CleanupResource::Buffer { native, views } => {
                Self::free_views(backend, descriptors, views);
                backend.destroy_buffer(native);
            }
            CleanupResource::Pipeline(pipeline) => backend.destroy_pipeline(pipeline),
        }
    }

    fn free_views(backend: &mut B, descriptors: &mut DescriptorPool, views: Vec<BindlessHandle>) {
        for view in views {
            // Views replaced while the resource was alive are already free.
            if descriptors.is_valid(view) {
                descriptors.free_static_descriptor(backend, view);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CommandEncoder, DummyBackend};
    use crate::config::DescriptorCapacities;
    use crate::descriptors::DescriptorKind;
    use crate::sync::QueueKind;
    use crate::types::{BufferDescriptor, BufferUsage};

    fn buffer(backend: &mut DummyBackend) -> CleanupResource<DummyBackend> {
        let native = backend
            .create_buffer(&BufferDescriptor::new(16, BufferUsage::STORAGE))
            .unwrap();
        CleanupResource::Buffer {
            native,
            views: Vec::new(),
        }
    }

    fn submit_empty(backend: &mut DummyBackend, queue: QueueKind, signal: u64) {
        let mut list = backend.create_command_list(queue).unwrap();
        list.open();
        list.close();
        backend.submit(queue, &[&list], &[], signal).unwrap();
    }

    #[test]
    fn test_not_released_before_token() {
        let mut backend = DummyBackend::with_manual_execution();
        let mut pool = DescriptorPool::new(&DescriptorCapacities::uniform(4));
        let mut queue = CleanupQueue::new();

        let resource = buffer(&mut backend);
        submit_empty(&mut backend, QueueKind::Graphics, 1);
        queue.push(resource, vec![SyncToken::new(QueueKind::Graphics, 1)]);

        for _ in 0..5 {
            assert_eq!(queue.flush(&mut backend, &mut pool), 0);
        }
        assert_eq!(backend.stats().buffers_destroyed, 0);

        backend.execute_all();
        assert_eq!(queue.flush(&mut backend, &mut pool), 1);
        assert_eq!(backend.stats().buffers_destroyed, 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_all_tokens_required() {
        let mut backend = DummyBackend::with_manual_execution();
        let mut pool = DescriptorPool::new(&DescriptorCapacities::uniform(4));
        let mut queue = CleanupQueue::new();

        let resource = buffer(&mut backend);
        submit_empty(&mut backend, QueueKind::Graphics, 1);
        submit_empty(&mut backend, QueueKind::Copy, 1);
        queue.push(
            resource,
            vec![
                SyncToken::new(QueueKind::Graphics, 1),
                SyncToken::new(QueueKind::Copy, 1),
            ],
        );

        backend.execute_queue(QueueKind::Graphics);
        assert_eq!(queue.flush(&mut backend, &mut pool), 0);
        backend.execute_queue(QueueKind::Copy);
        assert_eq!(queue.flush(&mut backend, &mut pool), 1);
    }

    #[test]
    fn test_out_of_order_completion() {
        let mut backend = DummyBackend::with_manual_execution();
        let mut pool = DescriptorPool::new(&DescriptorCapacities::uniform(4));
        let mut queue = CleanupQueue::new();

        let slow = buffer(&mut backend);
        let fast = buffer(&mut backend);
        submit_empty(&mut backend, QueueKind::Compute, 1);
        submit_empty(&mut backend, QueueKind::Copy, 1);
        queue.push(slow, vec![SyncToken::new(QueueKind::Compute, 1)]);
        queue.push(fast, vec![SyncToken::new(QueueKind::Copy, 1)]);

        backend.execute_queue(QueueKind::Copy);
        assert_eq!(queue.flush(&mut backend, &mut pool), 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_views_freed_with_resource() {
        let mut backend = DummyBackend::new();
        let mut pool = DescriptorPool::new(&DescriptorCapacities::uniform(4));
        let mut queue = CleanupQueue::new();

        let view = pool.allocate_static_descriptor(DescriptorKind::StorageBuffer);
        let native = backend
            .create_buffer(&BufferDescriptor::new(16, BufferUsage::STORAGE))
            .unwrap();
        queue.push(
            CleanupResource::Buffer {
                native,
                views: vec![view],
            },
            vec![SyncToken::initial(QueueKind::Graphics)],
        );

        assert_eq!(queue.flush(&mut backend, &mut pool), 1);
        assert!(!pool.is_valid(view));
        assert_eq!(backend.stats().null_descriptor_writes, 1);
    }
}
