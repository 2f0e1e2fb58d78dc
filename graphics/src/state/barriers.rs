//! Barrier records and batching.
//!
//! Barriers are collected in a [`BarrierBatch`] while commands are recorded
//! and handed to the backend right before the next command that depends on
//! them. On the way out, runs of texture barriers that differ only in their
//! subresource range are merged when the ranges are contiguous.
//!
//! ```text
//!   mip 0 [U → CD]   mip 1 [U → CD]   mip 3 [U → CD]
//!          └──────── merged ──────┘          │
//!   mips 0..2 [U → CD]                mip 3 [U → CD]
//! ```

use super::{BufferState, SubresourceRange, TextureState};
use crate::resources::{BufferHandle, TextureHandle};

/// A state change for a range of texture subresources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBarrier {
    pub texture: TextureHandle,
    pub range: SubresourceRange,
    pub src: TextureState,
    pub dst: TextureState,
}

impl TextureBarrier {
    /// Build a barrier.
    pub fn new(
        texture: TextureHandle,
        range: SubresourceRange,
        src: TextureState,
        dst: TextureState,
    ) -> Self {
        Self {
            texture,
            range,
            src,
            dst,
        }
    }
}

/// A whole-buffer state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferBarrier {
    pub buffer: BufferHandle,
    pub src: BufferState,
    pub dst: BufferState,
}

/// Returns true if `b` can be folded into `a`.
///
/// Both must target the same texture with identical before and after states,
/// and their ranges must be contiguous: the same slices with adjacent mip
/// runs, or the same mips with adjacent slice runs.
pub fn can_merge(a: &TextureBarrier, b: &TextureBarrier) -> bool {
    if a.texture != b.texture || a.src != b.src || a.dst != b.dst {
        return false;
    }
    let (ra, rb) = (a.range, b.range);

    let same_slices = ra.base_slice == rb.base_slice && ra.slice_count == rb.slice_count;
    if same_slices && (ra.mip_end() == rb.base_mip || rb.mip_end() == ra.base_mip) {
        return true;
    }

    let same_mips = ra.base_mip == rb.base_mip && ra.mip_count == rb.mip_count;
    same_mips && (ra.slice_end() == rb.base_slice || rb.slice_end() == ra.base_slice)
}

fn merge(a: &TextureBarrier, b: &TextureBarrier) -> TextureBarrier {
    let (ra, rb) = (a.range, b.range);
    let range = if ra.base_slice == rb.base_slice && ra.slice_count == rb.slice_count {
        SubresourceRange::new(
            ra.base_mip.min(rb.base_mip),
            ra.mip_count + rb.mip_count,
            ra.base_slice,
            ra.slice_count,
        )
    } else {
        SubresourceRange::new(
            ra.base_mip,
            ra.mip_count,
            ra.base_slice.min(rb.base_slice),
            ra.slice_count + rb.slice_count,
        )
    };
    TextureBarrier { range, ..*a }
}

/// Merge adjacent barriers greedily, left to right.
///
/// Each barrier is compared against the accumulated barrier before it only,
/// so the relative order of unrelated barriers is preserved.
pub fn merge_texture_barriers(barriers: &[TextureBarrier]) -> Vec<TextureBarrier> {
    let mut merged: Vec<TextureBarrier> = Vec::with_capacity(barriers.len());
    for barrier in barriers {
        match merged.last_mut() {
            Some(last) if can_merge(last, barrier) => *last = merge(last, barrier),
            _ => merged.push(*barrier),
        }
    }
    merged
}

/// Barriers waiting to be recorded.
#[derive(Debug, Default)]
pub struct BarrierBatch {
    textures: Vec<TextureBarrier>,
    buffers: Vec<BufferBarrier>,
}

impl BarrierBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the batch has no barriers.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.buffers.is_empty()
    }

    /// Number of pending barriers, before merging.
    pub fn len(&self) -> usize {
        self.textures.len() + self.buffers.len()
    }

    /// Pending texture barriers, for trackers to append to.
    pub fn textures_mut(&mut self) -> &mut Vec<TextureBarrier> {
        &mut self.textures
    }

    /// Queue a buffer barrier unless it is a no-op.
    pub fn push_buffer(&mut self, buffer: BufferHandle, src: BufferState, dst: BufferState) {
        if src == dst {
            return;
        }
        self.buffers.push(BufferBarrier { buffer, src, dst });
    }

    /// Take every pending barrier, texture barriers merged.
    pub fn take(&mut self) -> (Vec<TextureBarrier>, Vec<BufferBarrier>) {
        let textures = merge_texture_barriers(&self.textures);
        self.textures.clear();
        (textures, std::mem::take(&mut self.buffers))
    }

    /// Drop every pending barrier.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.buffers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barrier(texture: u32, range: SubresourceRange) -> TextureBarrier {
        TextureBarrier::new(
            TextureHandle::new(texture, 0),
            range,
            TextureState::UNDEFINED,
            TextureState::COPY_DEST,
        )
    }

    #[test]
    fn test_barrier_batch_empty() {
        let mut batch = BarrierBatch::new();
        assert!(batch.is_empty());
        let (textures, buffers) = batch.take();
        assert!(textures.is_empty() && buffers.is_empty());
    }

    #[test]
    fn test_adjacent_mips_merge() {
        let merged = merge_texture_barriers(&[
            barrier(0, SubresourceRange::mips(0, 1, 0)),
            barrier(0, SubresourceRange::mips(1, 1, 0)),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].range, SubresourceRange::mips(0, 2, 0));
    }

    #[test]
    fn test_non_adjacent_mips_do_not_merge() {
        let merged = merge_texture_barriers(&[
            barrier(0, SubresourceRange::mips(0, 1, 0)),
            barrier(0, SubresourceRange::mips(2, 1, 0)),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_reverse_order_mips_merge() {
        let merged = merge_texture_barriers(&[
            barrier(0, SubresourceRange::mips(1, 1, 0)),
            barrier(0, SubresourceRange::mips(0, 1, 0)),
        ]);
        assert_eq!(merged, vec![barrier(0, SubresourceRange::mips(0, 2, 0))]);
    }

    #[test]
    fn test_adjacent_slices_merge() {
        let merged = merge_texture_barriers(&[
            barrier(0, SubresourceRange::new(0, 2, 0, 1)),
            barrier(0, SubresourceRange::new(0, 2, 1, 1)),
            barrier(0, SubresourceRange::new(0, 2, 2, 1)),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].range, SubresourceRange::new(0, 2, 0, 3));
    }

    #[test]
    fn test_greedy_run_of_mips() {
        let ranges: Vec<_> = (0..5)
            .map(|mip| barrier(0, SubresourceRange::single(mip, 0)))
            .collect();
        let merged = merge_texture_barriers(&ranges);
        assert_eq!(merged, vec![barrier(0, SubresourceRange::mips(0, 5, 0))]);
    }

    #[test]
    fn test_different_textures_do_not_merge() {
        let merged = merge_texture_barriers(&[
            barrier(0, SubresourceRange::mips(0, 1, 0)),
            barrier(1, SubresourceRange::mips(1, 1, 0)),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_different_states_do_not_merge() {
        let a = barrier(0, SubresourceRange::mips(0, 1, 0));
        let mut b = barrier(0, SubresourceRange::mips(1, 1, 0));
        b.src = TextureState::COPY_SOURCE;
        assert!(!can_merge(&a, &b));
    }

    #[test]
    fn test_diagonal_ranges_do_not_merge() {
        let a = barrier(0, SubresourceRange::single(0, 0));
        let b = barrier(0, SubresourceRange::single(1, 1));
        assert!(!can_merge(&a, &b));
    }

    #[test]
    fn test_buffer_barrier_skip_same_state() {
        let mut batch = BarrierBatch::new();
        let buffer = BufferHandle::new(0, 0);
        batch.push_buffer(buffer, BufferState::COPY_DEST, BufferState::COPY_DEST);
        assert!(batch.is_empty());
        batch.push_buffer(buffer, BufferState::COPY_DEST, BufferState::SHADER_READ);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_take_merges_and_empties() {
        let mut batch = BarrierBatch::new();
        batch.textures_mut().push(barrier(0, SubresourceRange::single(0, 0)));
        batch.textures_mut().push(barrier(0, SubresourceRange::single(1, 0)));
        let (textures, _) = batch.take();
        assert_eq!(textures.len(), 1);
        assert!(batch.is_empty());
    }
}
