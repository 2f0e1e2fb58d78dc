//! Backend abstraction layer.
//!
//! The core never talks to a native API directly. Everything it needs from a
//! driver goes through two traits:
//!
//! - [`Backend`]: the device. Creates and destroys native objects, submits
//!   command lists to queues, reports fence progress, writes descriptors and
//!   drives the swap chain.
//! - [`CommandEncoder`]: one native command list. Records barriers, binds,
//!   draws, dispatches and copies.
//!
//! Both are used through generics, so a concrete backend is chosen at compile
//! time and calls are statically dispatched. [`DummyBackend`] is the in-process
//! implementation used by tests; native backends live in their own crates.
//!
//! # Ownership
//!
//! Native objects are plain values owned by the facade's registries. The
//! backend never keeps a second reference to them: `destroy_*` receives the
//! object by value, and is only called once every queue has finished with it.

pub mod dummy;

pub use dummy::{DummyBackend, DummyBuffer, DummyCommandList, DummyPipeline, DummyStats, DummyTexture};

use crate::descriptors::{BindlessHandle, BufferViewKey, TextureViewKey};
use crate::error::GraphicsError;
use crate::pipeline::{PipelineBindPoint, PipelineKey, ShaderBytecode};
use crate::state::{BufferState, SubresourceRange, TextureState};
use crate::sync::{QueueKind, SyncToken};
use crate::types::{BufferDescriptor, ClearValue, Extent3d, TextureDescriptor, TextureFormat};

/// What a backend can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendCapabilities {
    /// A swap chain exists, so there is a frame boundary to defer work to.
    pub swap_chain: bool,
    /// Number of swap chain images.
    pub back_buffer_count: u32,
    /// Size of the swap chain images.
    pub back_buffer_extent: Extent3d,
    /// Format of the swap chain images.
    pub back_buffer_format: TextureFormat,
    /// `trace_rays` is supported.
    pub ray_tracing: bool,
}

/// A texture barrier resolved to the native object.
#[derive(Debug)]
pub struct NativeTextureBarrier<'a, T> {
    pub texture: &'a T,
    pub range: SubresourceRange,
    pub src: TextureState,
    pub dst: TextureState,
}

/// A buffer barrier resolved to the native object.
#[derive(Debug)]
pub struct NativeBufferBarrier<'a, B> {
    pub buffer: &'a B,
    pub src: BufferState,
    pub dst: BufferState,
}

/// One attachment of a rendering scope.
#[derive(Debug)]
pub struct NativeAttachment<'a, T> {
    pub texture: &'a T,
    pub mip: u16,
    pub slice: u16,
    /// Clear on load, or keep the previous contents.
    pub clear: Option<ClearValue>,
}

/// Records commands into one native command list.
///
/// Lists are reused: `open` discards whatever was recorded before. The
/// open/close state machine is enforced by the command list pool, so
/// implementations may assume calls arrive in a valid order.
pub trait CommandEncoder {
    type Texture;
    type Buffer;
    type Pipeline;

    /// Queue the list was created for.
    fn queue(&self) -> QueueKind;

    /// Reset and start recording.
    fn open(&mut self);

    /// Finish recording.
    fn close(&mut self);

    /// Record texture state transitions as one native call.
    fn texture_barriers(&mut self, barriers: &[NativeTextureBarrier<'_, Self::Texture>]);

    /// Record buffer state transitions as one native call.
    fn buffer_barriers(&mut self, barriers: &[NativeBufferBarrier<'_, Self::Buffer>]);

    /// Bind a pipeline.
    fn set_pipeline(&mut self, pipeline: &Self::Pipeline);

    /// Bind the bindless resource layout for a bind point.
    fn set_layout(&mut self, bind_point: PipelineBindPoint);

    /// Set the root/push constants of the bound layout, typically bindless
    /// indices.
    fn set_layout_resources(&mut self, bind_point: PipelineBindPoint, constants: &[u32]);

    /// Begin a rendering scope.
    fn begin_rendering(
        &mut self,
        colors: &[NativeAttachment<'_, Self::Texture>],
        depth: Option<NativeAttachment<'_, Self::Texture>>,
    );

    /// End the current rendering scope.
    fn end_rendering(&mut self);

    /// Clear a range of a texture outside of a rendering scope.
    fn clear_texture(&mut self, texture: &Self::Texture, range: SubresourceRange, value: ClearValue);

    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);

    #[allow(clippy::too_many_arguments)]
    fn draw_indexed(
        &mut self,
        index_buffer: &Self::Buffer,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    );

    fn dispatch(&mut self, x: u32, y: u32, z: u32);

    fn trace_rays(&mut self, width: u32, height: u32, depth: u32);

    /// Copy `size` bytes between buffers.
    fn copy_buffer(
        &mut self,
        src: &Self::Buffer,
        src_offset: u64,
        dst: &Self::Buffer,
        dst_offset: u64,
        size: u64,
    );

    /// Copy whole subresources between textures of the same shape.
    fn copy_texture(
        &mut self,
        src: &Self::Texture,
        src_range: SubresourceRange,
        dst: &Self::Texture,
        dst_range: SubresourceRange,
    );

    /// Fill one subresource from tightly packed buffer data at `offset`.
    fn copy_buffer_to_texture(
        &mut self,
        src: &Self::Buffer,
        offset: u64,
        dst: &Self::Texture,
        mip: u16,
        slice: u16,
    );

    /// Write one subresource, tightly packed, into a buffer at `offset`.
    fn copy_texture_to_buffer(
        &mut self,
        src: &Self::Texture,
        mip: u16,
        slice: u16,
        dst: &Self::Buffer,
        offset: u64,
    );
}

/// A native device.
pub trait Backend: Sized + 'static {
    type Texture;
    type Buffer;
    type Pipeline;
    type CommandList: CommandEncoder<
            Texture = Self::Texture,
            Buffer = Self::Buffer,
            Pipeline = Self::Pipeline,
        >;

    /// Backend name for logs.
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> BackendCapabilities;

    // ------------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------------

    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<Self::Texture, GraphicsError>;

    fn destroy_texture(&mut self, texture: Self::Texture);

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> Result<Self::Buffer, GraphicsError>;

    fn destroy_buffer(&mut self, buffer: Self::Buffer);

    /// Write CPU-visible buffer memory.
    fn write_buffer(
        &mut self,
        buffer: &Self::Buffer,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GraphicsError>;

    /// Read CPU-visible buffer memory into `out`.
    fn read_buffer(
        &self,
        buffer: &Self::Buffer,
        offset: u64,
        out: &mut [u8],
    ) -> Result<(), GraphicsError>;

    // ------------------------------------------------------------------------
    // Queues
    // ------------------------------------------------------------------------

    fn create_command_list(&mut self, queue: QueueKind) -> Result<Self::CommandList, GraphicsError>;

    /// Submit closed lists to `queue`.
    ///
    /// Execution waits until every token in `waits` is reached, and `signal`
    /// is written to the queue's fence once the lists complete. Signal values
    /// are strictly increasing per queue.
    fn submit(
        &mut self,
        queue: QueueKind,
        lists: &[&Self::CommandList],
        waits: &[SyncToken],
        signal: u64,
    ) -> Result<(), GraphicsError>;

    /// Last value the queue's fence reached.
    fn completed_value(&self, queue: QueueKind) -> u64;

    /// Block until the queue's fence reaches `value`.
    fn wait_for_value(&mut self, queue: QueueKind, value: u64);

    // ------------------------------------------------------------------------
    // Pipelines
    // ------------------------------------------------------------------------

    fn compile_pipeline(
        &mut self,
        key: &PipelineKey,
        shaders: &[&ShaderBytecode],
    ) -> Result<Self::Pipeline, GraphicsError>;

    fn destroy_pipeline(&mut self, pipeline: Self::Pipeline);

    // ------------------------------------------------------------------------
    // Descriptors
    // ------------------------------------------------------------------------

    /// Create the view described by `view` and write it to `slot`.
    fn write_texture_descriptor(
        &mut self,
        slot: BindlessHandle,
        texture: &Self::Texture,
        view: &TextureViewKey,
    ) -> Result<(), GraphicsError>;

    /// Create the view described by `view` and write it to `slot`.
    fn write_buffer_descriptor(
        &mut self,
        slot: BindlessHandle,
        buffer: &Self::Buffer,
        view: &BufferViewKey,
    ) -> Result<(), GraphicsError>;

    /// Point `slot` at a descriptor that reads zeros.
    fn write_null_descriptor(&mut self, slot: BindlessHandle);

    // ------------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------------

    /// Index of the next swap chain image, or `None` while the swap chain is
    /// unusable (minimised window, pending resize).
    fn acquire_back_buffer(&mut self) -> Option<u32>;

    fn back_buffer(&self, index: u32) -> &Self::Texture;

    /// Queue the image for display. Called after the graphics queue work that
    /// fills it was submitted.
    fn present(&mut self, index: u32) -> Result<(), GraphicsError>;
}
