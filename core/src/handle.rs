//! Generational handles.
//!
//! A [`Handle<T>`] is a small copyable value naming one slot of an
//! [`IndexAllocator`](crate::index_allocator::IndexAllocator) or
//! [`Registry`](crate::registry::Registry). It pairs the slot index with the
//! generation the slot had when the handle was produced. Freeing a slot bumps
//! its generation, so every outstanding copy of the old handle stops resolving
//! without anyone having to find and clear them.
//!
//! # Example
//!
//! ```
//! use vexel_core::registry::Registry;
//!
//! let mut registry = Registry::<&str>::new();
//! let handle = registry.insert("albedo");
//! assert_eq!(registry.get(handle), Some(&"albedo"));
//!
//! registry.remove(handle);
//! let other = registry.insert("normal");
//!
//! // The stale handle no longer resolves, even after later inserts.
//! assert!(!registry.contains(handle));
//! assert_eq!(registry.get(handle), None);
//! assert_eq!(registry.get(other), Some(&"normal"));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Index plus generation, typed by what it points at.
///
/// `T` is only a marker: handles to different kinds of objects cannot be mixed
/// up, but the handle itself never owns or borrows a `T`.
pub struct Handle<T> {
    index: u32,
    generation: u8,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// A handle that no allocator ever produces.
    pub const INVALID: Self = Self::new(u32::MAX, u8::MAX);

    /// Build a handle from raw parts.
    pub const fn new(index: u32, generation: u8) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation the slot had when this handle was produced.
    pub const fn generation(self) -> u8 {
        self.generation
    }

    /// Returns true for [`Handle::INVALID`].
    pub const fn is_invalid(self) -> bool {
        self.index == u32::MAX && self.generation == u8::MAX
    }

    /// Reinterpret the handle as pointing at another marker type.
    pub const fn cast<U>(self) -> Handle<U> {
        Handle::new(self.index, self.generation)
    }
}

// Manual impls: deriving would put bounds on `T`.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            return write!(f, "Handle(invalid)");
        }
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

static_assertions::assert_impl_all!(Handle<String>: Send, Sync, Copy);
static_assertions::assert_eq_size!(Handle<String>, u64);
