//! Resource state tracking and barrier batching.
//!
//! Every texture and buffer carries the state it was last transitioned to.
//! Requesting a new state produces a barrier from the tracked state to the
//! requested one, or nothing at all if the two are equal. The tracked state is
//! updated as soon as the transition is requested, so it always describes the
//! state the GPU will be in once everything recorded so far has executed.
//!
//! # Components
//!
//! 1. [`TextureState`] / [`BufferState`] - the `(sync, access, layout)` vocabulary
//! 2. [`TextureStateTracker`] - uniform or per-subresource state of one texture
//! 3. [`BarrierBatch`] - pending barriers, merged before they reach the backend

mod barriers;
mod tracker;

pub use barriers::{
    BarrierBatch, BufferBarrier, TextureBarrier, can_merge, merge_texture_barriers,
};
pub use tracker::{TextureStateTracker, TrackingMode};

use crate::sync::QueueKind;

/// Pipeline stage a barrier waits on or blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BarrierSync {
    /// No stage; used for resources nothing has touched yet.
    #[default]
    None,
    VertexInput,
    VertexShader,
    PixelShader,
    DepthStencil,
    ComputeShader,
    RayTracing,
    Copy,
    RenderTarget,
    DrawIndirect,
    Host,
    AllGraphics,
    AllCommands,
}

/// Kind of memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BarrierAccess {
    /// Nothing accessed the resource.
    #[default]
    NoAccess,
    IndirectCommandRead,
    VertexInputRead,
    UniformRead,
    ShaderRead,
    ShaderReadWrite,
    RenderTarget,
    DepthStencilRead,
    DepthStencilWrite,
    CopySource,
    CopyDest,
    HostRead,
    HostWrite,
}

impl BarrierAccess {
    /// Returns true if the access writes memory.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Self::ShaderReadWrite
                | Self::RenderTarget
                | Self::DepthStencilWrite
                | Self::CopyDest
                | Self::HostWrite
        )
    }
}

/// Memory layout of a texture subresource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureLayout {
    /// Contents undefined; any layout may follow.
    #[default]
    Undefined,
    /// General purpose layout.
    Common,
    RenderTarget,
    DepthStencilWrite,
    DepthStencilRead,
    ShaderResource,
    UnorderedAccess,
    CopySource,
    CopyDest,
    /// Ready to be handed to the presentation engine.
    Present,
}

impl TextureLayout {
    /// Returns true if a queue of kind `queue` can use this layout.
    ///
    /// Copy queues are limited to transfer layouts, compute queues add shader
    /// access, graphics queues accept everything.
    pub fn is_supported_on(self, queue: QueueKind) -> bool {
        let transfer = matches!(
            self,
            Self::Undefined | Self::Common | Self::CopySource | Self::CopyDest
        );
        match queue {
            QueueKind::Graphics => true,
            QueueKind::Compute => {
                transfer || matches!(self, Self::ShaderResource | Self::UnorderedAccess)
            }
            QueueKind::Copy => transfer,
        }
    }
}

/// Tracked state of a texture subresource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureState {
    pub sync: BarrierSync,
    pub access: BarrierAccess,
    pub layout: TextureLayout,
}

impl TextureState {
    /// State of a texture nothing has touched.
    pub const UNDEFINED: Self = Self::new(
        BarrierSync::None,
        BarrierAccess::NoAccess,
        TextureLayout::Undefined,
    );
    pub const COMMON: Self = Self::new(
        BarrierSync::AllCommands,
        BarrierAccess::NoAccess,
        TextureLayout::Common,
    );
    pub const RENDER_TARGET: Self = Self::new(
        BarrierSync::RenderTarget,
        BarrierAccess::RenderTarget,
        TextureLayout::RenderTarget,
    );
    pub const DEPTH_WRITE: Self = Self::new(
        BarrierSync::DepthStencil,
        BarrierAccess::DepthStencilWrite,
        TextureLayout::DepthStencilWrite,
    );
    pub const DEPTH_READ: Self = Self::new(
        BarrierSync::DepthStencil,
        BarrierAccess::DepthStencilRead,
        TextureLayout::DepthStencilRead,
    );
    pub const PIXEL_SHADER_READ: Self = Self::new(
        BarrierSync::PixelShader,
        BarrierAccess::ShaderRead,
        TextureLayout::ShaderResource,
    );
    pub const COMPUTE_SHADER_READ: Self = Self::new(
        BarrierSync::ComputeShader,
        BarrierAccess::ShaderRead,
        TextureLayout::ShaderResource,
    );
    pub const UNORDERED_ACCESS: Self = Self::new(
        BarrierSync::ComputeShader,
        BarrierAccess::ShaderReadWrite,
        TextureLayout::UnorderedAccess,
    );
    pub const COPY_SOURCE: Self = Self::new(
        BarrierSync::Copy,
        BarrierAccess::CopySource,
        TextureLayout::CopySource,
    );
    pub const COPY_DEST: Self = Self::new(
        BarrierSync::Copy,
        BarrierAccess::CopyDest,
        TextureLayout::CopyDest,
    );
    pub const PRESENT: Self = Self::new(
        BarrierSync::AllGraphics,
        BarrierAccess::NoAccess,
        TextureLayout::Present,
    );

    /// Build a state from its parts.
    pub const fn new(sync: BarrierSync, access: BarrierAccess, layout: TextureLayout) -> Self {
        Self {
            sync,
            access,
            layout,
        }
    }
}

/// Tracked state of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferState {
    pub sync: BarrierSync,
    pub access: BarrierAccess,
}

impl BufferState {
    /// State of a buffer nothing has touched.
    pub const UNDEFINED: Self = Self::new(BarrierSync::None, BarrierAccess::NoAccess);
    pub const VERTEX: Self = Self::new(BarrierSync::VertexInput, BarrierAccess::VertexInputRead);
    pub const INDEX: Self = Self::new(BarrierSync::VertexInput, BarrierAccess::VertexInputRead);
    pub const UNIFORM: Self = Self::new(BarrierSync::AllCommands, BarrierAccess::UniformRead);
    pub const SHADER_READ: Self = Self::new(BarrierSync::AllCommands, BarrierAccess::ShaderRead);
    pub const UNORDERED_ACCESS: Self = Self::new(
        BarrierSync::ComputeShader,
        BarrierAccess::ShaderReadWrite,
    );
    pub const INDIRECT: Self = Self::new(
        BarrierSync::DrawIndirect,
        BarrierAccess::IndirectCommandRead,
    );
    pub const COPY_SOURCE: Self = Self::new(BarrierSync::Copy, BarrierAccess::CopySource);
    pub const COPY_DEST: Self = Self::new(BarrierSync::Copy, BarrierAccess::CopyDest);

    /// Build a state from its parts.
    pub const fn new(sync: BarrierSync, access: BarrierAccess) -> Self {
        Self { sync, access }
    }
}

/// A rectangular block of mips and array slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubresourceRange {
    pub base_mip: u16,
    pub mip_count: u16,
    pub base_slice: u16,
    pub slice_count: u16,
}

impl SubresourceRange {
    /// Build a range.
    pub const fn new(base_mip: u16, mip_count: u16, base_slice: u16, slice_count: u16) -> Self {
        Self {
            base_mip,
            mip_count,
            base_slice,
            slice_count,
        }
    }

    /// Every subresource of a texture with the given counts.
    pub const fn full(mips: u16, slices: u16) -> Self {
        Self::new(0, mips, 0, slices)
    }

    /// Mips `[base, base + count)` of one slice.
    pub const fn mips(base_mip: u16, mip_count: u16, slice: u16) -> Self {
        Self::new(base_mip, mip_count, slice, 1)
    }

    /// One mip of one slice.
    pub const fn single(mip: u16, slice: u16) -> Self {
        Self::new(mip, 1, slice, 1)
    }

    /// One past the last mip, saturating at `u16::MAX`.
    pub const fn mip_end(&self) -> u16 {
        self.base_mip.saturating_add(self.mip_count)
    }

    /// One past the last slice, saturating at `u16::MAX`.
    pub const fn slice_end(&self) -> u16 {
        self.base_slice.saturating_add(self.slice_count)
    }

    /// Returns true if this range covers every subresource of a texture.
    pub const fn covers(&self, mips: u16, slices: u16) -> bool {
        self.base_mip == 0
            && self.mip_count >= mips
            && self.base_slice == 0
            && self.slice_count >= slices
    }

    /// Returns true if the range fits inside a texture with the given counts.
    pub const fn fits(&self, mips: u16, slices: u16) -> bool {
        let (Some(mip_end), Some(slice_end)) = (
            self.base_mip.checked_add(self.mip_count),
            self.base_slice.checked_add(self.slice_count),
        ) else {
            return false;
        };
        self.mip_count > 0 && self.slice_count > 0 && mip_end <= mips && slice_end <= slices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_layout_support() {
        assert!(TextureLayout::CopyDest.is_supported_on(QueueKind::Copy));
        assert!(!TextureLayout::ShaderResource.is_supported_on(QueueKind::Copy));
        assert!(TextureLayout::UnorderedAccess.is_supported_on(QueueKind::Compute));
        assert!(!TextureLayout::RenderTarget.is_supported_on(QueueKind::Compute));
        assert!(TextureLayout::Present.is_supported_on(QueueKind::Graphics));
    }

    #[test]
    fn test_subresource_range_bounds() {
        let range = SubresourceRange::mips(1, 2, 3);
        assert_eq!(range.mip_end(), 3);
        assert_eq!(range.slice_end(), 4);
        assert!(range.fits(3, 4));
        assert!(!range.fits(2, 4));
        assert!(!range.covers(3, 4));
        assert!(SubresourceRange::full(3, 4).covers(3, 4));
    }

    #[test]
    fn test_overflowing_range_does_not_fit() {
        let range = SubresourceRange::mips(u16::MAX, 2, 0);
        assert!(!range.fits(u16::MAX, 1));
        assert_eq!(range.mip_end(), u16::MAX);

        let slices = SubresourceRange::new(0, 1, 1, u16::MAX);
        assert!(!slices.fits(1, u16::MAX));
    }

    #[test]
    fn test_write_accesses() {
        assert!(BarrierAccess::CopyDest.is_write());
        assert!(!BarrierAccess::ShaderRead.is_write());
        assert_eq!(TextureState::default(), TextureState::UNDEFINED);
    }
}
