//! View keys and per-resource view caches.

use std::collections::HashMap;
use std::hash::Hash;

use super::{BindlessHandle, DescriptorKind, DescriptorPool};
use crate::error::GraphicsError;
use crate::resources::{BufferHandle, TextureHandle};
use crate::state::SubresourceRange;
use crate::types::{BufferDescriptor, BufferUsage, TextureDescriptor, TextureDimension, TextureFormat, TextureUsage};

// ============================================================================
// Texture views
// ============================================================================

/// How a shader accesses a texture view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureViewUsage {
    /// Read through a sampler or load.
    Sampled,
    /// Read-write storage image.
    Storage,
}

impl TextureViewUsage {
    /// Descriptor table the view lives in.
    pub fn descriptor_kind(self) -> DescriptorKind {
        match self {
            Self::Sampled => DescriptorKind::SampledTexture,
            Self::Storage => DescriptorKind::StorageTexture,
        }
    }

    /// Texture usage flag the texture must have been created with.
    pub fn required_usage(self) -> TextureUsage {
        match self {
            Self::Sampled => TextureUsage::TEXTURE_BINDING,
            Self::Storage => TextureUsage::STORAGE_BINDING,
        }
    }
}

/// Shape a view presents to shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureViewDimension {
    D2,
    D2Array,
    D3,
    Cube,
    CubeArray,
}

impl TextureViewDimension {
    /// Natural view dimension for a texture.
    pub fn for_texture(desc: &TextureDescriptor) -> Self {
        match desc.dimension {
            TextureDimension::D2 if desc.array_layers > 1 => Self::D2Array,
            TextureDimension::D2 => Self::D2,
            TextureDimension::D3 => Self::D3,
            TextureDimension::Cube if desc.array_layers > 6 => Self::CubeArray,
            TextureDimension::Cube => Self::Cube,
        }
    }
}

/// Everything that distinguishes one texture view from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureViewKey {
    pub usage: TextureViewUsage,
    pub dimension: TextureViewDimension,
    pub format: TextureFormat,
    pub range: SubresourceRange,
}

/// A request for a bindless texture view.
///
/// Unset fields default to the texture's own format and shape, all mips and
/// all slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
    pub texture: TextureHandle,
    pub usage: TextureViewUsage,
    pub dimension: Option<TextureViewDimension>,
    pub format: Option<TextureFormat>,
    pub mips: Option<(u16, u16)>,
    pub slices: Option<(u16, u16)>,
}

impl TextureBinding {
    /// Sampled view of the whole texture.
    pub fn sampled(texture: TextureHandle) -> Self {
        Self::new(texture, TextureViewUsage::Sampled)
    }

    /// Storage view of the whole texture.
    pub fn storage(texture: TextureHandle) -> Self {
        Self::new(texture, TextureViewUsage::Storage)
    }

    fn new(texture: TextureHandle, usage: TextureViewUsage) -> Self {
        Self {
            texture,
            usage,
            dimension: None,
            format: None,
            mips: None,
            slices: None,
        }
    }

    /// Restrict to mips `[base, base + count)`.
    pub fn with_mips(mut self, base: u16, count: u16) -> Self {
        self.mips = Some((base, count));
        self
    }

    /// Restrict to slices `[base, base + count)`.
    pub fn with_slices(mut self, base: u16, count: u16) -> Self {
        self.slices = Some((base, count));
        self
    }

    /// Reinterpret the texture in another format.
    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Override the view dimension.
    pub fn with_dimension(mut self, dimension: TextureViewDimension) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Resolve defaults against the texture and validate the request.
    pub fn resolve(&self, desc: &TextureDescriptor) -> Result<TextureViewKey, GraphicsError> {
        let required = self.usage.required_usage();
        let format = self.format.unwrap_or(desc.format);
        if !desc.usage.contains(required) || !format.supports_usage(required) {
            return Err(GraphicsError::UnsupportedFormat {
                format,
                usage: required,
            });
        }

        let mips = desc.mip_level_count as u16;
        let slices = desc.array_layers as u16;
        let (base_mip, mip_count) = self.mips.unwrap_or((0, mips));
        let (base_slice, slice_count) = self.slices.unwrap_or((0, slices));
        let range = SubresourceRange::new(base_mip, mip_count, base_slice, slice_count);
        if !range.fits(mips, slices) {
            return Err(GraphicsError::InvalidParameter(format!(
                "view range {range:?} is outside texture '{}'",
                desc.name()
            )));
        }

        Ok(TextureViewKey {
            usage: self.usage,
            dimension: self
                .dimension
                .unwrap_or_else(|| TextureViewDimension::for_texture(desc)),
            format,
            range,
        })
    }
}

// ============================================================================
// Buffer views
// ============================================================================

/// How a shader accesses a buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferViewUsage {
    /// Constant buffer.
    Uniform,
    /// Read-write structured (stride > 0) or raw (stride 0) buffer.
    Storage,
}

impl BufferViewUsage {
    /// Descriptor table the view lives in.
    pub fn descriptor_kind(self) -> DescriptorKind {
        match self {
            Self::Uniform => DescriptorKind::UniformBuffer,
            Self::Storage => DescriptorKind::StorageBuffer,
        }
    }

    /// Buffer usage flag the buffer must have been created with.
    pub fn required_usage(self) -> BufferUsage {
        match self {
            Self::Uniform => BufferUsage::UNIFORM,
            Self::Storage => BufferUsage::STORAGE,
        }
    }
}

/// Everything that distinguishes one buffer view from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferViewKey {
    pub usage: BufferViewUsage,
    pub stride: u32,
    pub offset: u64,
    pub range: u64,
}

/// A request for a bindless buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferBinding {
    pub buffer: BufferHandle,
    pub usage: BufferViewUsage,
    pub stride: u32,
    pub offset: u64,
    pub size: Option<u64>,
}

impl BufferBinding {
    /// Uniform view of the whole buffer.
    pub fn uniform(buffer: BufferHandle) -> Self {
        Self {
            buffer,
            usage: BufferViewUsage::Uniform,
            stride: 0,
            offset: 0,
            size: None,
        }
    }

    /// Structured storage view with elements of `stride` bytes.
    pub fn storage(buffer: BufferHandle, stride: u32) -> Self {
        Self {
            buffer,
            usage: BufferViewUsage::Storage,
            stride,
            offset: 0,
            size: None,
        }
    }

    /// Restrict to `size` bytes starting at `offset`.
    pub fn with_range(mut self, offset: u64, size: u64) -> Self {
        self.offset = offset;
        self.size = Some(size);
        self
    }

    /// Resolve defaults against the buffer and validate the request.
    pub fn resolve(&self, desc: &BufferDescriptor) -> Result<BufferViewKey, GraphicsError> {
        let required = self.usage.required_usage();
        if !desc.usage.contains(required) {
            return Err(GraphicsError::UnsupportedBufferUsage(required));
        }
        let range = self.size.unwrap_or(desc.size.saturating_sub(self.offset));
        let end = self.offset.checked_add(range);
        if range == 0 || end.is_none_or(|end| end > desc.size) {
            return Err(GraphicsError::InvalidParameter(format!(
                "view of {range} bytes at offset {} is outside buffer '{}' of {} bytes",
                self.offset,
                desc.name(),
                desc.size
            )));
        }
        if self.stride > 0 && range % u64::from(self.stride) != 0 {
            return Err(GraphicsError::InvalidParameter(format!(
                "view range {range} is not a multiple of stride {}",
                self.stride
            )));
        }
        Ok(BufferViewKey {
            usage: self.usage,
            stride: self.stride,
            offset: self.offset,
            range,
        })
    }
}

// ============================================================================
// ViewCache
// ============================================================================

/// Bindless views already created for one resource.
#[derive(Debug)]
pub struct ViewCache<K> {
    entries: HashMap<K, BindlessHandle>,
}

impl<K> Default for ViewCache<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> ViewCache<K> {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached views.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no view was created yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached handle for `key`, if it is still valid.
    pub fn get_valid(&self, key: &K, pool: &DescriptorPool) -> Option<BindlessHandle> {
        self.entries
            .get(key)
            .copied()
            .filter(|handle| pool.is_valid(*handle))
    }

    /// Return the cached view for `key` or create it.
    ///
    /// `write` fills the freshly allocated slot. If it fails, the slot goes
    /// back to the pool and nothing is cached.
    pub fn get_or_create(
        &mut self,
        key: K,
        kind: DescriptorKind,
        pool: &mut DescriptorPool,
        write: impl FnOnce(BindlessHandle) -> Result<(), GraphicsError>,
    ) -> Result<BindlessHandle, GraphicsError> {
        if let Some(handle) = self.get_valid(&key, pool) {
            return Ok(handle);
        }
        let handle = pool.allocate_static_descriptor(kind);
        if let Err(err) = write(handle) {
            pool.discard(handle);
            return Err(err);
        }
        self.entries.insert(key, handle);
        Ok(handle)
    }

    /// Give up the cache, returning every handle it held.
    pub fn into_handles(self) -> Vec<BindlessHandle> {
        self.entries.into_values().collect()
    }
}
