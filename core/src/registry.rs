//! Arena of values addressed by generational handles.
//!
//! [`Registry`] is the single owner of everything stored in it. Callers keep
//! [`Handle`]s, never references, and a handle whose slot has been removed
//! simply stops resolving.
//!
//! The second type parameter picks the handle's marker type. It defaults to
//! the value type, but containers of generic values (say, a backend-specific
//! texture record) can expose handles typed by a plain marker instead:
//!
//! ```
//! use vexel_core::handle::Handle;
//! use vexel_core::registry::Registry;
//!
//! enum Mesh {}
//! struct GpuMesh<B> { backend: B }
//!
//! let mut meshes: Registry<GpuMesh<u8>, Mesh> = Registry::new();
//! let handle: Handle<Mesh> = meshes.insert(GpuMesh { backend: 1 });
//! assert_eq!(meshes.get(handle).map(|m| m.backend), Some(1));
//! ```

use crate::handle::Handle;
use crate::index_allocator::IndexAllocator;

const MIN_GROWTH: u32 = 16;

/// Slot-based container handing out [`Handle<M>`]s.
#[derive(Debug)]
pub struct Registry<T, M = T> {
    indices: IndexAllocator,
    values: Vec<Option<T>>,
    _marker: std::marker::PhantomData<fn() -> M>,
}

impl<T, M> Default for Registry<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, M> Registry<T, M> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty registry with room for `capacity` values before growing.
    pub fn with_capacity(capacity: u32) -> Self {
        let mut values = Vec::with_capacity(capacity as usize);
        values.resize_with(capacity as usize, || None);
        Self {
            indices: IndexAllocator::new(capacity),
            values,
            _marker: std::marker::PhantomData,
        }
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.indices.len() as usize
    }

    /// Returns true if the registry holds no values.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Store a value and return its handle.
    pub fn insert(&mut self, value: T) -> Handle<M> {
        let (index, generation) = match self.indices.allocate() {
            Some(slot) => slot,
            None => {
                let growth = self.indices.capacity().max(MIN_GROWTH);
                self.indices.grow(growth);
                self.values.resize_with(self.indices.capacity() as usize, || None);
                log::trace!(
                    "Registry grown to {} slots",
                    self.indices.capacity()
                );
                // Growth always leaves at least one free index.
                match self.indices.allocate() {
                    Some(slot) => slot,
                    None => unreachable!("registry growth produced no free slot"),
                }
            }
        };
        self.values[index as usize] = Some(value);
        Handle::new(index, generation)
    }

    /// Returns true if `handle` refers to a live value.
    pub fn contains(&self, handle: Handle<M>) -> bool {
        self.indices.is_valid(handle.index(), handle.generation())
    }

    /// Borrow the value behind `handle`.
    pub fn get(&self, handle: Handle<M>) -> Option<&T> {
        if !self.contains(handle) {
            return None;
        }
        self.values[handle.index() as usize].as_ref()
    }

    /// Mutably borrow the value behind `handle`.
    pub fn get_mut(&mut self, handle: Handle<M>) -> Option<&mut T> {
        if !self.contains(handle) {
            return None;
        }
        self.values[handle.index() as usize].as_mut()
    }

    /// Take the value out and invalidate `handle` and all its copies.
    pub fn remove(&mut self, handle: Handle<M>) -> Option<T> {
        if !self.indices.free(handle.index(), handle.generation()) {
            return None;
        }
        self.values[handle.index() as usize].take()
    }

    /// Iterate over live values with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<M>, &T)> + '_ {
        self.indices.iter_live().filter_map(|(index, generation)| {
            self.values[index as usize]
                .as_ref()
                .map(|value| (Handle::new(index, generation), value))
        })
    }

    /// Remove every value, returning them in index order.
    ///
    /// All outstanding handles become invalid.
    pub fn drain(&mut self) -> Vec<T> {
        let live: Vec<(u32, u8)> = self.indices.iter_live().collect();
        live.into_iter()
            .filter_map(|(index, generation)| self.remove(Handle::new(index, generation)))
            .collect()
    }
}
