//! Bindless descriptor management.
//!
//! Shaders reach resources through indices into large descriptor tables, one
//! table per [`DescriptorKind`]. An index is handed out as a
//! [`BindlessHandle`] that also carries the slot's generation, so a handle
//! kept after its slot was freed (and maybe reused) is recognisably stale.
//!
//! Freed slots are overwritten with a null descriptor: a shader that still
//! reads a dangling index sees zeros instead of whatever the slot holds next.
//!
//! Views are cached per resource in a [`ViewCache`], keyed by everything that
//! distinguishes one view from another, so asking for the same view twice
//! returns the same handle.

mod allocator;
mod view;

pub use allocator::{BindlessAllocator, DescriptorPool};
pub use view::{
    BufferBinding, BufferViewKey, BufferViewUsage, TextureBinding, TextureViewDimension,
    TextureViewKey, TextureViewUsage, ViewCache,
};

use std::fmt;

/// Descriptor table category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DescriptorKind {
    /// Read-only textures.
    SampledTexture = 0,
    /// Read-write textures.
    StorageTexture = 1,
    /// Constant buffers.
    UniformBuffer = 2,
    /// Read-write buffers.
    StorageBuffer = 3,
}

impl DescriptorKind {
    /// Number of categories.
    pub const COUNT: usize = 4;

    /// All categories in index order.
    pub const ALL: [DescriptorKind; Self::COUNT] = [
        Self::SampledTexture,
        Self::StorageTexture,
        Self::UniformBuffer,
        Self::StorageBuffer,
    ];

    /// Dense index for per-category arrays.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Generation-checked index into one descriptor table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindlessHandle {
    pub index: u32,
    pub generation: u8,
    pub kind: DescriptorKind,
}

impl BindlessHandle {
    /// Build a handle from its parts.
    pub const fn new(index: u32, generation: u8, kind: DescriptorKind) -> Self {
        Self {
            index,
            generation,
            kind,
        }
    }

    /// Value passed to shaders.
    pub const fn shader_index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for BindlessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bindless({:?} {}v{})", self.kind, self.index, self.generation)
    }
}

static_assertions::assert_impl_all!(BindlessHandle: Send, Sync, Copy);
