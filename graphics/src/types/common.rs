//! Common types shared across the graphics system.

// ============================================================================
// Extent3d
// ============================================================================

/// 3D extent for textures and copy regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3d {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth in pixels (1 for 2D textures).
    pub depth: u32,
}

impl Extent3d {
    /// Create a new 2D extent.
    pub fn new_2d(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 1,
        }
    }

    /// Create a new 3D extent.
    pub fn new_3d(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Extent of mip level `mip`, clamped to one texel per axis.
    pub fn mip_extent(&self, mip: u32) -> Self {
        Self {
            width: (self.width >> mip).max(1),
            height: (self.height >> mip).max(1),
            depth: (self.depth >> mip).max(1),
        }
    }

    /// Returns true if any axis is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }
}

// ============================================================================
// ClearValue
// ============================================================================

/// Clear value for render targets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ClearValue {
    /// No clear operation.
    #[default]
    None,
    /// Clear color attachment with RGBA values.
    Color { r: f32, g: f32, b: f32, a: f32 },
    /// Clear depth and stencil attachments.
    DepthStencil { depth: f32, stencil: u32 },
}

impl ClearValue {
    /// Create a color clear value.
    pub fn color(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::Color { r, g, b, a }
    }

    /// Create a depth clear value with a zero stencil.
    pub fn depth(value: f32) -> Self {
        Self::DepthStencil {
            depth: value,
            stencil: 0,
        }
    }
}

// ============================================================================
// MemoryLocality
// ============================================================================

/// Where a buffer's memory lives and which side may touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryLocality {
    /// Device local, not mappable.
    #[default]
    GpuOnly,
    /// Host visible, written by the CPU (staging, per-frame constants).
    CpuWrite,
    /// Host visible, read by the CPU (readback).
    CpuRead,
}

impl MemoryLocality {
    /// Returns true if the CPU can map this memory.
    pub fn is_cpu_visible(self) -> bool {
        !matches!(self, Self::GpuOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_extent_clamps() {
        let extent = Extent3d::new_2d(16, 4);
        assert_eq!(extent.mip_extent(1), Extent3d::new_2d(8, 2));
        assert_eq!(extent.mip_extent(3), Extent3d::new_2d(2, 1));
        assert_eq!(extent.mip_extent(10), Extent3d::new_2d(1, 1));
    }

    #[test]
    fn test_locality_visibility() {
        assert!(!MemoryLocality::GpuOnly.is_cpu_visible());
        assert!(MemoryLocality::CpuWrite.is_cpu_visible());
        assert!(MemoryLocality::CpuRead.is_cpu_visible());
    }
}
