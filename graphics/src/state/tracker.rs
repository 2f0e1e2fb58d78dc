//! Per-texture state tracking.
//!
//! A texture starts with one state for all of its subresources. The first
//! transition that touches only part of the texture splits the state into one
//! entry per `(mip, slice)`. Once a transition leaves every subresource in the
//! same state again (always the case after a whole-texture transition), the
//! tracker collapses back to a single state, so stale per-subresource entries
//! never outlive a full transition.

use super::{SubresourceRange, TextureBarrier, TextureState};
use crate::error::fatal;
use crate::resources::TextureHandle;

/// How a tracker currently stores state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    /// One state for the whole texture.
    Uniform,
    /// One state per `(mip, slice)`.
    Granular,
}

#[derive(Debug, Clone)]
enum States {
    Uniform(TextureState),
    Granular(Vec<TextureState>),
}

/// Last requested state of every subresource of one texture.
#[derive(Debug, Clone)]
pub struct TextureStateTracker {
    mips: u16,
    slices: u16,
    states: States,
}

impl TextureStateTracker {
    /// Tracker for a texture nothing has touched yet.
    pub fn new(mips: u16, slices: u16) -> Self {
        Self {
            mips,
            slices,
            states: States::Uniform(TextureState::UNDEFINED),
        }
    }

    /// Current storage mode.
    pub fn mode(&self) -> TrackingMode {
        match self.states {
            States::Uniform(_) => TrackingMode::Uniform,
            States::Granular(_) => TrackingMode::Granular,
        }
    }

    /// Range covering every subresource.
    pub fn full_range(&self) -> SubresourceRange {
        SubresourceRange::full(self.mips, self.slices)
    }

    /// State shared by every subresource, if there is one.
    pub fn uniform_state(&self) -> Option<TextureState> {
        match self.states {
            States::Uniform(state) => Some(state),
            States::Granular(_) => None,
        }
    }

    /// State of one subresource.
    pub fn state(&self, mip: u16, slice: u16) -> TextureState {
        match &self.states {
            States::Uniform(state) => *state,
            States::Granular(states) => states[self.index(mip, slice)],
        }
    }

    /// Forget everything and treat the texture as holding `state`.
    ///
    /// Emits nothing; used when the real contents were discarded outside the
    /// tracker's view.
    pub fn reset(&mut self, state: TextureState) {
        self.states = States::Uniform(state);
    }

    /// Request `new` for every subresource in `range`.
    ///
    /// Barriers for subresources whose state actually changes are appended to
    /// `out`. The tracked state is updated before returning.
    pub fn transition(
        &mut self,
        texture: TextureHandle,
        range: SubresourceRange,
        new: TextureState,
        out: &mut Vec<TextureBarrier>,
    ) {
        if !range.fits(self.mips, self.slices) {
            fatal!(
                "Transition range {:?} is outside texture {:?} ({} mips, {} slices)",
                range,
                texture,
                self.mips,
                self.slices
            );
        }
        let covers_all = range.covers(self.mips, self.slices);

        match &mut self.states {
            States::Uniform(old) => {
                let old = *old;
                if old == new {
                    return;
                }
                out.push(TextureBarrier::new(texture, range, old, new));
                if covers_all {
                    self.states = States::Uniform(new);
                } else {
                    let mut states = vec![old; usize::from(self.mips) * usize::from(self.slices)];
                    self.fill(&mut states, range, new);
                    self.states = States::Granular(states);
                }
            }
            States::Granular(states) => {
                for slice in range.base_slice..range.slice_end() {
                    for mip in range.base_mip..range.mip_end() {
                        let index = usize::from(slice) * usize::from(self.mips) + usize::from(mip);
                        let old = states[index];
                        if old != new {
                            out.push(TextureBarrier::new(
                                texture,
                                SubresourceRange::single(mip, slice),
                                old,
                                new,
                            ));
                            states[index] = new;
                        }
                    }
                }
                let first = states[0];
                if states.iter().all(|state| *state == first) {
                    self.states = States::Uniform(first);
                }
            }
        }
    }

    fn fill(&self, states: &mut [TextureState], range: SubresourceRange, state: TextureState) {
        for slice in range.base_slice..range.slice_end() {
            for mip in range.base_mip..range.mip_end() {
                states[self.index(mip, slice)] = state;
            }
        }
    }

    fn index(&self, mip: u16, slice: u16) -> usize {
        usize::from(slice) * usize::from(self.mips) + usize::from(mip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture() -> TextureHandle {
        TextureHandle::new(0, 0)
    }

    #[test]
    fn test_same_state_emits_nothing() {
        let mut tracker = TextureStateTracker::new(4, 1);
        let mut out = Vec::new();
        tracker.transition(texture(), tracker.full_range(), TextureState::COPY_DEST, &mut out);
        assert_eq!(out.len(), 1);

        out.clear();
        tracker.transition(texture(), tracker.full_range(), TextureState::COPY_DEST, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_first_transition_starts_from_undefined() {
        let mut tracker = TextureStateTracker::new(1, 1);
        let mut out = Vec::new();
        tracker.transition(texture(), tracker.full_range(), TextureState::RENDER_TARGET, &mut out);
        assert_eq!(out[0].src, TextureState::UNDEFINED);
        assert_eq!(out[0].dst, TextureState::RENDER_TARGET);
    }

    #[test]
    fn test_partial_transition_promotes_to_granular() {
        let mut tracker = TextureStateTracker::new(3, 2);
        let mut out = Vec::new();
        tracker.transition(
            texture(),
            SubresourceRange::mips(1, 1, 0),
            TextureState::COPY_DEST,
            &mut out,
        );
        assert_eq!(tracker.mode(), TrackingMode::Granular);
        assert_eq!(tracker.state(1, 0), TextureState::COPY_DEST);
        assert_eq!(tracker.state(0, 0), TextureState::UNDEFINED);
        assert_eq!(tracker.state(1, 1), TextureState::UNDEFINED);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].range, SubresourceRange::mips(1, 1, 0));
    }

    #[test]
    fn test_partial_transition_to_current_state_stays_uniform() {
        let mut tracker = TextureStateTracker::new(3, 1);
        let mut out = Vec::new();
        tracker.transition(texture(), SubresourceRange::single(1, 0), TextureState::UNDEFINED, &mut out);
        assert!(out.is_empty());
        assert_eq!(tracker.mode(), TrackingMode::Uniform);
    }

    #[test]
    fn test_full_transition_demotes_to_uniform() {
        let mut tracker = TextureStateTracker::new(2, 1);
        let mut out = Vec::new();
        tracker.transition(texture(), SubresourceRange::single(0, 0), TextureState::COPY_SOURCE, &mut out);
        out.clear();

        tracker.transition(texture(), tracker.full_range(), TextureState::PIXEL_SHADER_READ, &mut out);
        assert_eq!(tracker.mode(), TrackingMode::Uniform);
        assert_eq!(tracker.uniform_state(), Some(TextureState::PIXEL_SHADER_READ));

        // Each subresource transitions from its own previous state.
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].src, TextureState::COPY_SOURCE);
        assert_eq!(out[1].src, TextureState::UNDEFINED);
    }

    #[test]
    fn test_partial_transitions_converging_demote() {
        let mut tracker = TextureStateTracker::new(2, 1);
        let mut out = Vec::new();
        tracker.transition(texture(), SubresourceRange::single(0, 0), TextureState::COPY_DEST, &mut out);
        tracker.transition(texture(), SubresourceRange::single(1, 0), TextureState::COPY_DEST, &mut out);
        assert_eq!(tracker.mode(), TrackingMode::Uniform);
        assert_eq!(tracker.uniform_state(), Some(TextureState::COPY_DEST));
    }

    #[test]
    fn test_reset_discards_granular_state() {
        let mut tracker = TextureStateTracker::new(2, 2);
        let mut out = Vec::new();
        tracker.transition(texture(), SubresourceRange::single(0, 1), TextureState::COPY_DEST, &mut out);
        tracker.reset(TextureState::UNDEFINED);
        assert_eq!(tracker.mode(), TrackingMode::Uniform);
        assert_eq!(tracker.state(0, 1), TextureState::UNDEFINED);
    }

    #[test]
    #[should_panic(expected = "outside texture")]
    fn test_out_of_range_transition_is_fatal() {
        let mut tracker = TextureStateTracker::new(1, 1);
        let mut out = Vec::new();
        tracker.transition(texture(), SubresourceRange::single(2, 0), TextureState::COPY_DEST, &mut out);
    }
}
