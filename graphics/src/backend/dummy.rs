//! In-process backend for tests and headless tooling.
//!
//! Nothing here touches a GPU. Buffers and textures are byte vectors, command
//! lists record a small command enum, and each queue is a FIFO of submissions
//! that executes in order once its waits are satisfied. Copies really move
//! bytes, so data written through a staging buffer can be read back; every
//! other command only bumps a counter in [`DummyStats`].
//!
//! By default work executes as soon as it is submitted. Tests that need to
//! observe in-flight work use [`DummyBackend::with_manual_execution`] and step
//! queues with [`execute_queue`](DummyBackend::execute_queue).

use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    Backend, BackendCapabilities, CommandEncoder, NativeAttachment, NativeBufferBarrier,
    NativeTextureBarrier,
};
use crate::descriptors::{BindlessHandle, BufferViewKey, DescriptorKind, TextureViewKey};
use crate::error::{GraphicsError, fatal};
use crate::pipeline::{PipelineBindPoint, PipelineKey, ShaderBytecode};
use crate::state::SubresourceRange;
use crate::sync::{QueueKind, SyncToken};
use crate::types::{BufferDescriptor, ClearValue, Extent3d, TextureDescriptor, TextureFormat};

type Memory = Arc<Mutex<Vec<u8>>>;

// ============================================================================
// Native objects
// ============================================================================

/// Buffer memory.
#[derive(Debug, Clone)]
pub struct DummyBuffer {
    id: u64,
    memory: Memory,
}

impl DummyBuffer {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Snapshot of the current contents.
    pub fn contents(&self) -> Vec<u8> {
        self.memory.lock().clone()
    }
}

/// Texture memory, one tightly packed byte vector per subresource.
#[derive(Debug, Clone)]
pub struct DummyTexture {
    id: u64,
    format: TextureFormat,
    mips: u16,
    slices: u16,
    subresources: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl DummyTexture {
    fn new(id: u64, desc: &TextureDescriptor) -> Self {
        let mips = desc.mip_level_count as u16;
        let slices = desc.array_layers as u16;
        let subresources: Vec<Vec<u8>> = (0..slices)
            .flat_map(|_| {
                (0..desc.mip_level_count)
                    .map(|mip| vec![0u8; desc.subresource_byte_size(mip) as usize])
            })
            .collect();
        Self {
            id,
            format: desc.format,
            mips,
            slices,
            subresources: Arc::new(Mutex::new(subresources)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Snapshot of one subresource.
    pub fn subresource(&self, mip: u16, slice: u16) -> Vec<u8> {
        self.subresources.lock()[self.index(mip, slice)].clone()
    }

    fn index(&self, mip: u16, slice: u16) -> usize {
        if mip >= self.mips || slice >= self.slices {
            fatal!(
                "DummyBackend: subresource ({mip}, {slice}) is outside texture #{}",
                self.id
            );
        }
        usize::from(slice) * usize::from(self.mips) + usize::from(mip)
    }

    fn indices(&self, range: SubresourceRange) -> Vec<usize> {
        let mut indices = Vec::new();
        for slice in range.base_slice..range.slice_end() {
            for mip in range.base_mip..range.mip_end() {
                indices.push(self.index(mip, slice));
            }
        }
        indices
    }
}

/// A compiled pipeline.
#[derive(Debug, Clone)]
pub struct DummyPipeline {
    id: u64,
    bind_point: PipelineBindPoint,
}

impl DummyPipeline {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn bind_point(&self) -> PipelineBindPoint {
        self.bind_point
    }
}

/// What a descriptor slot currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DummyDescriptor {
    Null,
    Texture { texture: u64, view: TextureViewKey },
    Buffer { buffer: u64, view: BufferViewKey },
}

/// Counters of everything the backend did.
///
/// Command counters are bumped when a submission executes, not when it is
/// recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DummyStats {
    pub textures_created: u64,
    pub textures_destroyed: u64,
    pub buffers_created: u64,
    pub buffers_destroyed: u64,
    pub pipelines_compiled: u64,
    pub pipelines_destroyed: u64,
    pub command_lists_created: u64,
    pub submissions: u64,
    pub executed_submissions: u64,
    pub texture_barrier_calls: u64,
    pub texture_barriers: u64,
    pub buffer_barrier_calls: u64,
    pub buffer_barriers: u64,
    pub pipeline_binds: u64,
    pub layout_binds: u64,
    pub render_passes: u64,
    pub draws: u64,
    pub dispatches: u64,
    pub trace_rays: u64,
    pub clears: u64,
    pub copies: u64,
    pub descriptor_writes: u64,
    pub null_descriptor_writes: u64,
    pub presents: u64,
}

// ============================================================================
// Command lists
// ============================================================================

#[derive(Debug, Clone)]
enum DummyCommand {
    TextureBarriers(usize),
    BufferBarriers(usize),
    SetPipeline,
    SetLayout,
    BeginRendering,
    EndRendering,
    Clear {
        texture: DummyTexture,
        range: SubresourceRange,
        value: ClearValue,
    },
    Draw,
    Dispatch,
    TraceRays,
    CopyBuffer {
        src: Memory,
        src_offset: u64,
        dst: Memory,
        dst_offset: u64,
        size: u64,
    },
    CopyTexture {
        src: DummyTexture,
        src_range: SubresourceRange,
        dst: DummyTexture,
        dst_range: SubresourceRange,
    },
    CopyBufferToTexture {
        src: Memory,
        offset: u64,
        dst: DummyTexture,
        mip: u16,
        slice: u16,
    },
    CopyTextureToBuffer {
        src: DummyTexture,
        mip: u16,
        slice: u16,
        dst: Memory,
        offset: u64,
    },
}

/// Recorded commands of one list.
#[derive(Debug)]
pub struct DummyCommandList {
    queue: QueueKind,
    commands: Vec<DummyCommand>,
    recording: bool,
}

impl DummyCommandList {
    /// Number of commands recorded since the last `open`.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandEncoder for DummyCommandList {
    type Texture = DummyTexture;
    type Buffer = DummyBuffer;
    type Pipeline = DummyPipeline;

    fn queue(&self) -> QueueKind {
        self.queue
    }

    fn open(&mut self) {
        self.commands.clear();
        self.recording = true;
    }

    fn close(&mut self) {
        self.recording = false;
    }

    fn texture_barriers(&mut self, barriers: &[NativeTextureBarrier<'_, DummyTexture>]) {
        self.commands.push(DummyCommand::TextureBarriers(barriers.len()));
    }

    fn buffer_barriers(&mut self, barriers: &[NativeBufferBarrier<'_, DummyBuffer>]) {
        self.commands.push(DummyCommand::BufferBarriers(barriers.len()));
    }

    fn set_pipeline(&mut self, _pipeline: &DummyPipeline) {
        self.commands.push(DummyCommand::SetPipeline);
    }

    fn set_layout(&mut self, _bind_point: PipelineBindPoint) {
        self.commands.push(DummyCommand::SetLayout);
    }

    fn set_layout_resources(&mut self, _bind_point: PipelineBindPoint, _constants: &[u32]) {}

    fn begin_rendering(
        &mut self,
        colors: &[NativeAttachment<'_, DummyTexture>],
        depth: Option<NativeAttachment<'_, DummyTexture>>,
    ) {
        self.commands.push(DummyCommand::BeginRendering);
        for attachment in colors.iter().chain(depth.as_ref()) {
            if let Some(value) = attachment.clear {
                self.commands.push(DummyCommand::Clear {
                    texture: attachment.texture.clone(),
                    range: SubresourceRange::single(attachment.mip, attachment.slice),
                    value,
                });
            }
        }
    }

    fn end_rendering(&mut self) {
        self.commands.push(DummyCommand::EndRendering);
    }

    fn clear_texture(&mut self, texture: &DummyTexture, range: SubresourceRange, value: ClearValue) {
        self.commands.push(DummyCommand::Clear {
            texture: texture.clone(),
            range,
            value,
        });
    }

    fn draw(&mut self, _vertex_count: u32, _instance_count: u32, _first_vertex: u32, _first_instance: u32) {
        self.commands.push(DummyCommand::Draw);
    }

    fn draw_indexed(
        &mut self,
        _index_buffer: &DummyBuffer,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _base_vertex: i32,
        _first_instance: u32,
    ) {
        self.commands.push(DummyCommand::Draw);
    }

    fn dispatch(&mut self, _x: u32, _y: u32, _z: u32) {
        self.commands.push(DummyCommand::Dispatch);
    }

    fn trace_rays(&mut self, _width: u32, _height: u32, _depth: u32) {
        self.commands.push(DummyCommand::TraceRays);
    }

    fn copy_buffer(&mut self, src: &DummyBuffer, src_offset: u64, dst: &DummyBuffer, dst_offset: u64, size: u64) {
        self.commands.push(DummyCommand::CopyBuffer {
            src: src.memory.clone(),
            src_offset,
            dst: dst.memory.clone(),
            dst_offset,
            size,
        });
    }

    fn copy_texture(
        &mut self,
        src: &DummyTexture,
        src_range: SubresourceRange,
        dst: &DummyTexture,
        dst_range: SubresourceRange,
    ) {
        self.commands.push(DummyCommand::CopyTexture {
            src: src.clone(),
            src_range,
            dst: dst.clone(),
            dst_range,
        });
    }

    fn copy_buffer_to_texture(&mut self, src: &DummyBuffer, offset: u64, dst: &DummyTexture, mip: u16, slice: u16) {
        self.commands.push(DummyCommand::CopyBufferToTexture {
            src: src.memory.clone(),
            offset,
            dst: dst.clone(),
            mip,
            slice,
        });
    }

    fn copy_texture_to_buffer(&mut self, src: &DummyTexture, mip: u16, slice: u16, dst: &DummyBuffer, offset: u64) {
        self.commands.push(DummyCommand::CopyTextureToBuffer {
            src: src.clone(),
            mip,
            slice,
            dst: dst.memory.clone(),
            offset,
        });
    }
}

// ============================================================================
// Queues
// ============================================================================

#[derive(Debug)]
struct Submission {
    commands: Vec<DummyCommand>,
    waits: Vec<SyncToken>,
    signal: u64,
}

#[derive(Debug, Default)]
struct DummyQueue {
    pending: VecDeque<Submission>,
    completed: u64,
    last_signal: u64,
}

#[derive(Debug)]
struct DummySwapChain {
    extent: Extent3d,
    format: TextureFormat,
    images: Vec<DummyTexture>,
    next: u32,
    valid: bool,
}

// ============================================================================
// DummyBackend
// ============================================================================

/// Backend that simulates queues and memory in process.
#[derive(Debug)]
pub struct DummyBackend {
    auto_execute: bool,
    queues: [DummyQueue; QueueKind::COUNT],
    execution_log: Vec<SyncToken>,
    descriptors: HashMap<(DescriptorKind, u32), DummyDescriptor>,
    swap_chain: Option<DummySwapChain>,
    stats: DummyStats,
    next_id: u64,
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyBackend {
    /// Backend that executes work as soon as it is submitted.
    pub fn new() -> Self {
        log::info!("DummyBackend: created");
        Self {
            auto_execute: true,
            queues: Default::default(),
            execution_log: Vec::new(),
            descriptors: HashMap::new(),
            swap_chain: None,
            stats: DummyStats::default(),
            next_id: 1,
        }
    }

    /// Backend whose queues only advance through [`execute_queue`](Self::execute_queue),
    /// [`execute_all`](Self::execute_all) or a CPU wait.
    pub fn with_manual_execution() -> Self {
        Self {
            auto_execute: false,
            ..Self::new()
        }
    }

    /// Simulate a swap chain of `image_count` images.
    pub fn with_swap_chain(mut self, image_count: u32, width: u32, height: u32, format: TextureFormat) -> Self {
        let desc = TextureDescriptor::new_2d(width, height, format, crate::types::TextureUsage::COPY_DST)
            .with_label("back buffer");
        let images: Vec<DummyTexture> = (0..image_count)
            .map(|_| {
                let id = self.alloc_id();
                DummyTexture::new(id, &desc)
            })
            .collect();
        self.swap_chain = Some(DummySwapChain {
            extent: desc.size,
            format,
            images,
            next: 0,
            valid: true,
        });
        self
    }

    /// Counters so far.
    pub fn stats(&self) -> DummyStats {
        self.stats
    }

    /// Tokens in the order their submissions finished.
    pub fn execution_log(&self) -> &[SyncToken] {
        &self.execution_log
    }

    /// Submissions waiting to execute on `queue`.
    pub fn pending_submissions(&self, queue: QueueKind) -> usize {
        self.queues[queue.index()].pending.len()
    }

    /// Current content of a descriptor slot.
    pub fn descriptor(&self, handle: BindlessHandle) -> Option<&DummyDescriptor> {
        self.descriptors.get(&(handle.kind, handle.index))
    }

    /// Mark the swap chain usable or not, as a window resize would.
    pub fn set_swap_chain_valid(&mut self, valid: bool) {
        if let Some(swap_chain) = self.swap_chain.as_mut() {
            swap_chain.valid = valid;
        }
    }

    /// Execute the oldest submission on `queue` if its waits are satisfied.
    ///
    /// Returns false if the queue is empty or blocked.
    pub fn execute_queue(&mut self, queue: QueueKind) -> bool {
        let ready = match self.queues[queue.index()].pending.front() {
            Some(submission) => submission
                .waits
                .iter()
                .all(|wait| self.queues[wait.queue.index()].completed >= wait.value),
            None => false,
        };
        if !ready {
            return false;
        }
        let Some(submission) = self.queues[queue.index()].pending.pop_front() else {
            return false;
        };
        for command in &submission.commands {
            self.execute(command);
        }
        self.queues[queue.index()].completed = submission.signal;
        self.stats.executed_submissions += 1;
        self.execution_log.push(SyncToken::new(queue, submission.signal));
        log::trace!("DummyBackend: {queue} reached {}", submission.signal);
        true
    }

    /// Execute everything that can make progress. Returns true if anything ran.
    pub fn execute_all(&mut self) -> bool {
        let mut progressed = false;
        loop {
            let mut any = false;
            for queue in QueueKind::ALL {
                while self.execute_queue(queue) {
                    any = true;
                }
            }
            if !any {
                return progressed;
            }
            progressed = true;
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn execute(&mut self, command: &DummyCommand) {
        let stats = &mut self.stats;
        match command {
            DummyCommand::TextureBarriers(count) => {
                stats.texture_barrier_calls += 1;
                stats.texture_barriers += *count as u64;
            }
            DummyCommand::BufferBarriers(count) => {
                stats.buffer_barrier_calls += 1;
                stats.buffer_barriers += *count as u64;
            }
            DummyCommand::SetPipeline => stats.pipeline_binds += 1,
            DummyCommand::SetLayout => stats.layout_binds += 1,
            DummyCommand::BeginRendering => stats.render_passes += 1,
            DummyCommand::EndRendering => {}
            DummyCommand::Clear { texture, range, value } => {
                stats.clears += 1;
                let texel = clear_texel(texture.format, *value);
                let indices = texture.indices(*range);
                let mut subresources = texture.subresources.lock();
                for index in indices {
                    for chunk in subresources[index].chunks_exact_mut(texel.len()) {
                        chunk.copy_from_slice(&texel);
                    }
                }
            }
            DummyCommand::Draw => stats.draws += 1,
            DummyCommand::Dispatch => stats.dispatches += 1,
            DummyCommand::TraceRays => stats.trace_rays += 1,
            DummyCommand::CopyBuffer {
                src,
                src_offset,
                dst,
                dst_offset,
                size,
            } => {
                stats.copies += 1;
                let data = {
                    let src = src.lock();
                    src[span(*src_offset, *size, src.len())].to_vec()
                };
                let mut dst = dst.lock();
                let len = dst.len();
                dst[span(*dst_offset, *size, len)].copy_from_slice(&data);
            }
            DummyCommand::CopyTexture {
                src,
                src_range,
                dst,
                dst_range,
            } => {
                stats.copies += 1;
                if src_range.mip_count != dst_range.mip_count || src_range.slice_count != dst_range.slice_count {
                    fatal!("DummyBackend: texture copy between ranges of different shape");
                }
                let data: Vec<Vec<u8>> = {
                    let subresources = src.subresources.lock();
                    src.indices(*src_range)
                        .into_iter()
                        .map(|index| subresources[index].clone())
                        .collect()
                };
                let indices = dst.indices(*dst_range);
                let mut subresources = dst.subresources.lock();
                for (index, bytes) in indices.into_iter().zip(data) {
                    if subresources[index].len() != bytes.len() {
                        fatal!("DummyBackend: texture copy between subresources of different size");
                    }
                    subresources[index] = bytes;
                }
            }
            DummyCommand::CopyBufferToTexture {
                src,
                offset,
                dst,
                mip,
                slice,
            } => {
                stats.copies += 1;
                let index = dst.index(*mip, *slice);
                let mut subresources = dst.subresources.lock();
                let size = subresources[index].len() as u64;
                let src = src.lock();
                subresources[index].copy_from_slice(&src[span(*offset, size, src.len())]);
            }
            DummyCommand::CopyTextureToBuffer {
                src,
                mip,
                slice,
                dst,
                offset,
            } => {
                stats.copies += 1;
                let data = src.subresource(*mip, *slice);
                let mut dst = dst.lock();
                let len = dst.len();
                dst[span(*offset, data.len() as u64, len)].copy_from_slice(&data);
            }
        }
    }
}

fn span(offset: u64, size: u64, len: usize) -> Range<usize> {
    let end = offset.saturating_add(size);
    if end > len as u64 {
        fatal!("DummyBackend: access [{offset}, {end}) is outside {len} bytes");
    }
    offset as usize..end as usize
}

/// One texel of `format` holding `value`, as the hardware would store it.
///
/// A color clear on a depth format, or a depth clear on a color format,
/// writes zeroes.
fn clear_texel(format: TextureFormat, value: ClearValue) -> Vec<u8> {
    use TextureFormat as F;

    let zero = || vec![0u8; format.block_size() as usize];
    match value {
        ClearValue::None => zero(),
        ClearValue::Color { r, g, b, a } => match format {
            F::R8Unorm => vec![unorm8(r)],
            F::R8Snorm => vec![(r.clamp(-1.0, 1.0) * 127.0).round() as i8 as u8],
            F::R8Uint => vec![r as u8],
            F::R16Float => half::f16::from_f32(r).to_le_bytes().to_vec(),
            F::Rg8Unorm => vec![unorm8(r), unorm8(g)],
            F::R32Float => r.to_le_bytes().to_vec(),
            F::R32Uint => (r as u32).to_le_bytes().to_vec(),
            F::Rgba8Unorm => vec![unorm8(r), unorm8(g), unorm8(b), unorm8(a)],
            F::Bgra8Unorm => vec![unorm8(b), unorm8(g), unorm8(r), unorm8(a)],
            F::Rgba8UnormSrgb => vec![srgb8(r), srgb8(g), srgb8(b), unorm8(a)],
            F::Bgra8UnormSrgb => vec![srgb8(b), srgb8(g), srgb8(r), unorm8(a)],
            F::Rgba16Float => [r, g, b, a]
                .into_iter()
                .flat_map(|channel| half::f16::from_f32(channel).to_le_bytes())
                .collect(),
            F::Rgba32Float => [r, g, b, a]
                .into_iter()
                .flat_map(f32::to_le_bytes)
                .collect(),
            F::Depth16Unorm | F::Depth24PlusStencil8 | F::Depth32Float => zero(),
        },
        ClearValue::DepthStencil { depth, stencil } => match format {
            F::Depth16Unorm => ((depth.clamp(0.0, 1.0) * 65535.0).round() as u16)
                .to_le_bytes()
                .to_vec(),
            F::Depth24PlusStencil8 => {
                let depth = (depth.clamp(0.0, 1.0) * 16_777_215.0).round() as u32;
                (depth | (stencil.min(0xFF) << 24)).to_le_bytes().to_vec()
            }
            F::Depth32Float => depth.to_le_bytes().to_vec(),
            _ => zero(),
        },
    }
}

fn unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn srgb8(linear: f32) -> u8 {
    let linear = linear.clamp(0.0, 1.0);
    let encoded = if linear <= 0.003_130_8 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    };
    unorm8(encoded)
}

impl Backend for DummyBackend {
    type Texture = DummyTexture;
    type Buffer = DummyBuffer;
    type Pipeline = DummyPipeline;
    type CommandList = DummyCommandList;

    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            swap_chain: self.swap_chain.is_some(),
            back_buffer_count: self
                .swap_chain
                .as_ref()
                .map_or(0, |swap_chain| swap_chain.images.len() as u32),
            back_buffer_extent: self
                .swap_chain
                .as_ref()
                .map_or(Extent3d::default(), |swap_chain| swap_chain.extent),
            back_buffer_format: self
                .swap_chain
                .as_ref()
                .map_or(TextureFormat::default(), |swap_chain| swap_chain.format),
            ray_tracing: true,
        }
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<DummyTexture, GraphicsError> {
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{}x{})",
            desc.label,
            desc.size.width,
            desc.size.height,
            desc.size.depth
        );
        let id = self.alloc_id();
        self.stats.textures_created += 1;
        Ok(DummyTexture::new(id, desc))
    }

    fn destroy_texture(&mut self, texture: DummyTexture) {
        log::trace!("DummyBackend: destroying texture #{}", texture.id);
        self.stats.textures_destroyed += 1;
    }

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> Result<DummyBuffer, GraphicsError> {
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            desc.label,
            desc.size
        );
        let size = usize::try_from(desc.size).map_err(|_| GraphicsError::OutOfMemory)?;
        let id = self.alloc_id();
        self.stats.buffers_created += 1;
        Ok(DummyBuffer {
            id,
            memory: Arc::new(Mutex::new(vec![0u8; size])),
        })
    }

    fn destroy_buffer(&mut self, buffer: DummyBuffer) {
        log::trace!("DummyBackend: destroying buffer #{}", buffer.id);
        self.stats.buffers_destroyed += 1;
    }

    fn write_buffer(&mut self, buffer: &DummyBuffer, offset: u64, data: &[u8]) -> Result<(), GraphicsError> {
        log::trace!(
            "DummyBackend: write_buffer #{} offset={} len={}",
            buffer.id,
            offset,
            data.len()
        );
        let mut memory = buffer.memory.lock();
        let range = checked_span(offset, data.len() as u64, memory.len())?;
        memory[range].copy_from_slice(data);
        Ok(())
    }

    fn read_buffer(&self, buffer: &DummyBuffer, offset: u64, out: &mut [u8]) -> Result<(), GraphicsError> {
        log::trace!(
            "DummyBackend: read_buffer #{} offset={} len={}",
            buffer.id,
            offset,
            out.len()
        );
        let memory = buffer.memory.lock();
        let range = checked_span(offset, out.len() as u64, memory.len())?;
        out.copy_from_slice(&memory[range]);
        Ok(())
    }

    fn create_command_list(&mut self, queue: QueueKind) -> Result<DummyCommandList, GraphicsError> {
        self.stats.command_lists_created += 1;
        Ok(DummyCommandList {
            queue,
            commands: Vec::new(),
            recording: false,
        })
    }

    fn submit(
        &mut self,
        queue: QueueKind,
        lists: &[&DummyCommandList],
        waits: &[SyncToken],
        signal: u64,
    ) -> Result<(), GraphicsError> {
        let state = &mut self.queues[queue.index()];
        if signal <= state.last_signal {
            fatal!(
                "DummyBackend: {queue} signal {signal} does not follow {}",
                state.last_signal
            );
        }
        let mut commands = Vec::new();
        for list in lists {
            if list.recording || list.queue != queue {
                fatal!("DummyBackend: list submitted to {queue} is open or belongs to {}", list.queue);
            }
            commands.extend(list.commands.iter().cloned());
        }
        log::trace!(
            "DummyBackend: submit {} lists to {queue}, waits {:?}, signal {signal}",
            lists.len(),
            waits
        );
        state.last_signal = signal;
        state.pending.push_back(Submission {
            commands,
            waits: waits.to_vec(),
            signal,
        });
        self.stats.submissions += 1;
        if self.auto_execute {
            self.execute_all();
        }
        Ok(())
    }

    fn completed_value(&self, queue: QueueKind) -> u64 {
        self.queues[queue.index()].completed
    }

    fn wait_for_value(&mut self, queue: QueueKind, value: u64) {
        while self.queues[queue.index()].completed < value {
            if !self.execute_all() {
                fatal!(
                    "DummyBackend: {queue} can never reach {value} (completed {})",
                    self.queues[queue.index()].completed
                );
            }
        }
    }

    fn compile_pipeline(
        &mut self,
        key: &PipelineKey,
        shaders: &[&ShaderBytecode],
    ) -> Result<DummyPipeline, GraphicsError> {
        if let Some(empty) = shaders.iter().find(|shader| shader.code.is_empty()) {
            return Err(GraphicsError::PipelineCompilationFailed {
                pipeline: key.label(),
                message: format!("entry point '{}' has empty bytecode", empty.entry_point),
            });
        }
        let id = self.alloc_id();
        self.stats.pipelines_compiled += 1;
        log::trace!("DummyBackend: compiled pipeline #{id} '{}'", key.label());
        Ok(DummyPipeline {
            id,
            bind_point: key.bind_point(),
        })
    }

    fn destroy_pipeline(&mut self, pipeline: DummyPipeline) {
        log::trace!("DummyBackend: destroying pipeline #{}", pipeline.id);
        self.stats.pipelines_destroyed += 1;
    }

    fn write_texture_descriptor(
        &mut self,
        slot: BindlessHandle,
        texture: &DummyTexture,
        view: &TextureViewKey,
    ) -> Result<(), GraphicsError> {
        self.stats.descriptor_writes += 1;
        self.descriptors.insert(
            (slot.kind, slot.index),
            DummyDescriptor::Texture {
                texture: texture.id,
                view: *view,
            },
        );
        Ok(())
    }

    fn write_buffer_descriptor(
        &mut self,
        slot: BindlessHandle,
        buffer: &DummyBuffer,
        view: &BufferViewKey,
    ) -> Result<(), GraphicsError> {
        self.stats.descriptor_writes += 1;
        self.descriptors.insert(
            (slot.kind, slot.index),
            DummyDescriptor::Buffer {
                buffer: buffer.id,
                view: *view,
            },
        );
        Ok(())
    }

    fn write_null_descriptor(&mut self, slot: BindlessHandle) {
        self.stats.null_descriptor_writes += 1;
        self.descriptors.insert((slot.kind, slot.index), DummyDescriptor::Null);
    }

    fn acquire_back_buffer(&mut self) -> Option<u32> {
        let swap_chain = self.swap_chain.as_mut()?;
        if !swap_chain.valid || swap_chain.images.is_empty() {
            return None;
        }
        let index = swap_chain.next;
        swap_chain.next = (index + 1) % swap_chain.images.len() as u32;
        Some(index)
    }

    fn back_buffer(&self, index: u32) -> &DummyTexture {
        match self
            .swap_chain
            .as_ref()
            .and_then(|swap_chain| swap_chain.images.get(index as usize))
        {
            Some(image) => image,
            None => fatal!("DummyBackend: no back buffer {index}"),
        }
    }

    fn present(&mut self, index: u32) -> Result<(), GraphicsError> {
        log::trace!("DummyBackend: present back buffer {index}");
        self.stats.presents += 1;
        Ok(())
    }
}

fn checked_span(offset: u64, size: u64, len: usize) -> Result<Range<usize>, GraphicsError> {
    let end = offset.saturating_add(size);
    if end > len as u64 {
        return Err(GraphicsError::InvalidParameter(format!(
            "access [{offset}, {end}) is outside {len} bytes"
        )));
    }
    Ok(offset as usize..end as usize)
}
