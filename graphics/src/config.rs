//! Configuration for [`GraphicsBackend`](crate::GraphicsBackend).

use crate::descriptors::DescriptorKind;
use crate::error::GraphicsError;
use crate::types::{Extent3d, TextureFormat};

/// Default number of frames that may be in flight.
pub const DEFAULT_FRAMES_IN_FLIGHT: u8 = 2;

/// Upper bound on frames in flight.
pub const MAX_FRAMES_IN_FLIGHT: u8 = 3;

/// Fixed size of every descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorCapacities {
    pub sampled_textures: u32,
    pub storage_textures: u32,
    pub uniform_buffers: u32,
    pub storage_buffers: u32,
}

impl DescriptorCapacities {
    /// Capacity of one table.
    pub fn get(&self, kind: DescriptorKind) -> u32 {
        match kind {
            DescriptorKind::SampledTexture => self.sampled_textures,
            DescriptorKind::StorageTexture => self.storage_textures,
            DescriptorKind::UniformBuffer => self.uniform_buffers,
            DescriptorKind::StorageBuffer => self.storage_buffers,
        }
    }

    /// The same capacity for every table.
    pub fn uniform(capacity: u32) -> Self {
        Self {
            sampled_textures: capacity,
            storage_textures: capacity,
            uniform_buffers: capacity,
            storage_buffers: capacity,
        }
    }
}

impl Default for DescriptorCapacities {
    fn default() -> Self {
        Self {
            sampled_textures: 65_536,
            storage_textures: 16_384,
            uniform_buffers: 16_384,
            storage_buffers: 65_536,
        }
    }
}

/// Present textures the facade allocates when a swap chain is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapChainConfig {
    pub extent: Extent3d,
    pub format: TextureFormat,
}

impl SwapChainConfig {
    /// Swap chain of `width` x `height` in `format`.
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            extent: Extent3d::new_2d(width, height),
            format,
        }
    }
}

/// Settings fixed for the lifetime of a [`GraphicsBackend`](crate::GraphicsBackend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsConfig {
    /// How many presents may be outstanding before `present` blocks.
    pub frames_in_flight: u8,
    /// Present to a swap chain. Without one there is no frame boundary and
    /// every context is submitted immediately.
    pub swap_chain: Option<SwapChainConfig>,
    /// Descriptor table sizes.
    pub descriptor_capacities: DescriptorCapacities,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: DEFAULT_FRAMES_IN_FLIGHT,
            swap_chain: None,
            descriptor_capacities: DescriptorCapacities::default(),
        }
    }
}

impl GraphicsConfig {
    /// Default configuration, headless.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set frames in flight.
    pub fn with_frames_in_flight(mut self, frames: u8) -> Self {
        self.frames_in_flight = frames;
        self
    }

    /// Present to a swap chain.
    pub fn with_swap_chain(mut self, swap_chain: SwapChainConfig) -> Self {
        self.swap_chain = Some(swap_chain);
        self
    }

    /// Set descriptor table sizes.
    pub fn with_descriptor_capacities(mut self, capacities: DescriptorCapacities) -> Self {
        self.descriptor_capacities = capacities;
        self
    }

    /// Check the configuration for values no backend can honour.
    pub fn validate(&self) -> Result<(), GraphicsError> {
        if self.frames_in_flight == 0 || self.frames_in_flight > MAX_FRAMES_IN_FLIGHT {
            return Err(GraphicsError::InvalidParameter(format!(
                "frames in flight must be between 1 and {MAX_FRAMES_IN_FLIGHT}, got {}",
                self.frames_in_flight
            )));
        }
        for kind in DescriptorKind::ALL {
            if self.descriptor_capacities.get(kind) == 0 {
                return Err(GraphicsError::InvalidParameter(format!(
                    "descriptor capacity for {kind:?} must not be zero"
                )));
            }
        }
        if self
            .swap_chain
            .is_some_and(|swap_chain| swap_chain.extent.is_empty())
        {
            return Err(GraphicsError::InvalidParameter(
                "swap chain extent must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GraphicsConfig::default().validate().is_ok());
        assert_eq!(GraphicsConfig::default().frames_in_flight, 2);
    }

    #[test]
    fn test_rejects_zero_frames() {
        let config = GraphicsConfig::new().with_frames_in_flight(0);
        assert!(matches!(
            config.validate(),
            Err(GraphicsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut capacities = DescriptorCapacities::default();
        capacities.uniform_buffers = 0;
        let config = GraphicsConfig::new().with_descriptor_capacities(capacities);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_swap_chain() {
        let config =
            GraphicsConfig::new().with_swap_chain(SwapChainConfig::new(0, 720, TextureFormat::Bgra8Unorm));
        assert!(config.validate().is_err());
    }
}
