//! Resource records owned by the graphics facade.
//!
//! Textures and buffers live in [`Registry`](vexel_core::Registry) arenas.
//! Clients hold [`TextureHandle`]s and [`BufferHandle`]s; the records below,
//! with the backend's native object, tracked state and cached views, never
//! leave the facade.

use vexel_core::{Handle, Registry};

use crate::backend::Backend;
use crate::descriptors::{BindlessHandle, BufferViewKey, TextureViewKey, ViewCache};
use crate::error::fatal;
use crate::state::{BufferState, TextureStateTracker};
use crate::types::{BufferDescriptor, TextureDescriptor};

/// Marker for texture handles.
#[derive(Debug)]
pub enum TextureMarker {}

/// Marker for buffer handles.
#[derive(Debug)]
pub enum BufferMarker {}

/// Handle to a texture created through the facade.
pub type TextureHandle = Handle<TextureMarker>;

/// Handle to a buffer created through the facade.
pub type BufferHandle = Handle<BufferMarker>;

pub(crate) type TextureRegistry<B> = Registry<TextureEntry<B>, TextureMarker>;
pub(crate) type BufferRegistry<B> = Registry<BufferEntry<B>, BufferMarker>;

/// A live texture.
pub(crate) struct TextureEntry<B: Backend> {
    pub native: B::Texture,
    pub desc: TextureDescriptor,
    pub tracker: TextureStateTracker,
    pub views: ViewCache<TextureViewKey>,
}

impl<B: Backend> TextureEntry<B> {
    pub fn new(native: B::Texture, desc: TextureDescriptor) -> Self {
        let tracker = TextureStateTracker::new(desc.mip_level_count as u16, desc.array_layers as u16);
        Self {
            native,
            desc,
            tracker,
            views: ViewCache::new(),
        }
    }

    /// Split into what the cleanup queue needs to release later.
    pub fn into_parts(self) -> (B::Texture, Vec<BindlessHandle>) {
        (self.native, self.views.into_handles())
    }
}

/// A live buffer.
pub(crate) struct BufferEntry<B: Backend> {
    pub native: B::Buffer,
    pub desc: BufferDescriptor,
    pub state: BufferState,
    pub views: ViewCache<BufferViewKey>,
}

impl<B: Backend> BufferEntry<B> {
    pub fn new(native: B::Buffer, desc: BufferDescriptor) -> Self {
        Self {
            native,
            desc,
            state: BufferState::UNDEFINED,
            views: ViewCache::new(),
        }
    }

    pub fn into_parts(self) -> (B::Buffer, Vec<BindlessHandle>) {
        (self.native, self.views.into_handles())
    }
}

// Lookups that treat a stale handle as a contract violation. Free functions so
// callers can borrow one registry while holding other facade fields.

pub(crate) fn texture_entry<B: Backend>(
    textures: &TextureRegistry<B>,
    handle: TextureHandle,
) -> &TextureEntry<B> {
    match textures.get(handle) {
        Some(entry) => entry,
        None => fatal!("Use of invalid texture handle {handle:?}"),
    }
}

pub(crate) fn texture_entry_mut<B: Backend>(
    textures: &mut TextureRegistry<B>,
    handle: TextureHandle,
) -> &mut TextureEntry<B> {
    match textures.get_mut(handle) {
        Some(entry) => entry,
        None => fatal!("Use of invalid texture handle {handle:?}"),
    }
}

pub(crate) fn buffer_entry<B: Backend>(
    buffers: &BufferRegistry<B>,
    handle: BufferHandle,
) -> &BufferEntry<B> {
    match buffers.get(handle) {
        Some(entry) => entry,
        None => fatal!("Use of invalid buffer handle {handle:?}"),
    }
}

pub(crate) fn buffer_entry_mut<B: Backend>(
    buffers: &mut BufferRegistry<B>,
    handle: BufferHandle,
) -> &mut BufferEntry<B> {
    match buffers.get_mut(handle) {
        Some(entry) => entry,
        None => fatal!("Use of invalid buffer handle {handle:?}"),
    }
}
