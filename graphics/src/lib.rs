//! # Vexel Graphics
//!
//! Execution and resource-lifetime core of the Vexel RHI. It sits between a
//! renderer and a native graphics API and owns the parts every explicit API
//! leaves to the application:
//!
//! - [`GraphicsBackend`]: the facade owning resources, queues and frame pacing
//! - [`CommandContext`]: scoped command recording with automatic barriers
//! - [`SyncToken`]: per-queue timeline values for CPU and cross-queue waits
//! - [`state`]: resource state tracking with barrier elision and merging
//! - [`descriptors`]: generation-checked bindless descriptor tables
//! - [`pipeline`]: version-checked pipeline cache
//! - [`cleanup`]: deferred destruction tied to GPU progress
//! - [`backend`]: the native backend contract and an in-process [`DummyBackend`]
//!
//! ## Example
//!
//! ```ignore
//! use vexel_graphics::{
//!     BufferDescriptor, BufferUsage, DummyBackend, GraphicsBackend, GraphicsConfig, QueueKind,
//!     SubmissionPolicy,
//! };
//!
//! let mut gfx = GraphicsBackend::new(DummyBackend::new(), GraphicsConfig::new())?;
//! let buffer = gfx.create_buffer(BufferDescriptor::new(256, BufferUsage::STORAGE | BufferUsage::COPY_DST))?;
//!
//! let mut ctx = gfx.begin_scoped_command_context(QueueKind::Copy, SubmissionPolicy::Immediate, &[]);
//! ctx.enqueue_data_upload(buffer, 0, &[0u8; 256])?;
//! let tokens = ctx.end();
//! gfx.wait_for_tokens_on_cpu(&tokens);
//! ```

pub mod backend;
pub mod cleanup;
pub mod command;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod graphics;
pub mod pipeline;
pub mod profiling;
pub mod resources;
pub mod state;
pub mod sync;
pub mod types;

// Re-export main types for convenience
pub use backend::{Backend, BackendCapabilities, CommandEncoder, DummyBackend};
pub use command::{CommandContext, RenderTarget, SubmissionPolicy};
pub use config::{DescriptorCapacities, GraphicsConfig, SwapChainConfig};
pub use descriptors::{BindlessHandle, BufferBinding, DescriptorKind, TextureBinding};
pub use error::GraphicsError;
pub use graphics::GraphicsBackend;
pub use pipeline::{GraphicsPipelineKey, PipelineBindPoint, PipelineKey, ShaderKey, ShaderStage};
pub use resources::{BufferHandle, TextureHandle};
pub use state::{BufferState, SubresourceRange, TextureState};
pub use sync::{QueueKind, SyncToken};
pub use types::{
    BufferDescriptor, BufferUsage, ClearValue, Extent3d, MemoryLocality, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsage,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version. Optional; nothing depends on it.
pub fn init() {
    log::info!("Vexel Graphics v{} initialized", VERSION);
}
