//! Shared setup for the integration tests.
//!
//! Every test runs against the in-process [`DummyBackend`], in one of two
//! execution modes: work completing as soon as it is submitted, or queues
//! that only advance when the test steps them.

#![allow(dead_code)]

use vexel_graphics::{
    BufferDescriptor, BufferHandle, BufferUsage, DummyBackend, GraphicsBackend, GraphicsConfig,
    PipelineKey, ShaderKey, ShaderStage, SwapChainConfig, TextureDescriptor, TextureFormat,
    TextureHandle, TextureUsage,
};

pub const SWAP_CHAIN_WIDTH: u32 = 8;
pub const SWAP_CHAIN_HEIGHT: u32 = 8;
pub const SWAP_CHAIN_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// How the dummy queues advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// Work completes when it is submitted.
    Immediate,
    /// Work completes when the test steps the queues or waits.
    Manual,
}

impl Execution {
    pub fn backend(self) -> DummyBackend {
        match self {
            Execution::Immediate => DummyBackend::new(),
            Execution::Manual => DummyBackend::with_manual_execution(),
        }
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Facade without a swap chain.
pub fn headless(execution: Execution) -> GraphicsBackend<DummyBackend> {
    init_logger();
    GraphicsBackend::new(execution.backend(), GraphicsConfig::new())
        .expect("headless facade should initialize")
}

/// Facade presenting to a simulated swap chain of `images` back buffers.
pub fn with_swap_chain(execution: Execution, frames_in_flight: u8, images: u32) -> GraphicsBackend<DummyBackend> {
    init_logger();
    let backend = execution
        .backend()
        .with_swap_chain(images, SWAP_CHAIN_WIDTH, SWAP_CHAIN_HEIGHT, SWAP_CHAIN_FORMAT);
    let config = GraphicsConfig::new()
        .with_frames_in_flight(frames_in_flight)
        .with_swap_chain(SwapChainConfig::new(SWAP_CHAIN_WIDTH, SWAP_CHAIN_HEIGHT, SWAP_CHAIN_FORMAT));
    GraphicsBackend::new(backend, config).expect("facade with swap chain should initialize")
}

/// Compute pipeline over a shader with published bytecode.
pub fn compute_pipeline(gfx: &mut GraphicsBackend<DummyBackend>, name: &str) -> PipelineKey {
    let shader = ShaderKey::new(name, ShaderStage::Compute);
    gfx.set_shader_bytecode(shader.clone(), name.as_bytes().to_vec());
    PipelineKey::compute(shader)
}

/// Sampled, copyable 2D texture.
pub fn texture(gfx: &mut GraphicsBackend<DummyBackend>, width: u32, height: u32, mips: u32) -> TextureHandle {
    gfx.create_texture(
        TextureDescriptor::new_2d(
            width,
            height,
            TextureFormat::Rgba8Unorm,
            TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_SRC | TextureUsage::COPY_DST,
        )
        .with_mip_levels(mips),
    )
    .expect("texture should be created")
}

/// GPU-only storage buffer usable as copy source and destination.
pub fn storage_buffer(gfx: &mut GraphicsBackend<DummyBackend>, size: u64) -> BufferHandle {
    gfx.create_buffer(BufferDescriptor::new(
        size,
        BufferUsage::STORAGE | BufferUsage::COPY_SRC | BufferUsage::COPY_DST,
    ))
    .expect("buffer should be created")
}

/// `count` floats counting up from zero.
pub fn float_sequence(count: usize) -> Vec<f32> {
    (0..count).map(|i| i as f32).collect()
}

/// Recognisable byte pattern.
pub fn byte_pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}
