//! Buffer types and descriptors.

use super::MemoryLocality;
use bitflags::bitflags;

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be used as a uniform buffer.
        const UNIFORM = 1 << 2;
        /// Buffer can be used as a storage buffer.
        const STORAGE = 1 << 3;
        /// Buffer can be used as an indirect buffer.
        const INDIRECT = 1 << 4;
        /// Buffer can be copied from.
        const COPY_SRC = 1 << 5;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 6;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Usage flags.
    pub usage: BufferUsage,
    /// Memory placement.
    pub locality: MemoryLocality,
}

impl BufferDescriptor {
    /// Create a new device-local buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
            locality: MemoryLocality::GpuOnly,
        }
    }

    /// Descriptor for a CPU-written staging buffer.
    pub fn staging(size: u64) -> Self {
        Self::new(size, BufferUsage::COPY_SRC).with_locality(MemoryLocality::CpuWrite)
    }

    /// Descriptor for a CPU-read readback buffer.
    pub fn readback(size: u64) -> Self {
        Self::new(size, BufferUsage::COPY_DST).with_locality(MemoryLocality::CpuRead)
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the memory placement.
    pub fn with_locality(mut self, locality: MemoryLocality) -> Self {
        self.locality = locality;
        self
    }

    /// Human-readable name for logs.
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or("<unnamed buffer>")
    }
}
