//! Command recording and submission.
//!
//! A [`CommandContext`] is the only way to record GPU work. It is created by
//! [`GraphicsBackend::begin_scoped_command_context`] for one queue and one
//! [`SubmissionPolicy`], records into a pooled native command list, and is
//! submitted when it ends (explicitly with [`CommandContext::end`], or on
//! drop).
//!
//! Every command goes through the facade's bookkeeping on the way:
//!
//! - state transitions go through each resource's tracker, and the resulting
//!   barriers are batched and merged right before the next command
//! - pipelines come from the pipeline cache; a draw or dispatch without a
//!   usable pipeline is skipped with a warning
//! - copies, render targets and index buffers are transitioned to the state
//!   the command needs
//!
//! # Submission
//!
//! | Policy | Ends with | Token complete |
//! |--------|-----------|----------------|
//! | `Immediate` | a submission to the queue | once the GPU finishes it |
//! | `DeferToPresent` | the list joining the queue's deferred batch | after the next `present` or `flush_gpu` submits the batch |
//!
//! A deferred context is submitted immediately anyway when it has
//! dependencies, or when there is no swap chain to defer to.

mod deferred;
mod pool;

pub use deferred::DeferredBatch;
pub use pool::{CommandListId, CommandListPool};

use crate::backend::{Backend, CommandEncoder, NativeAttachment, NativeBufferBarrier, NativeTextureBarrier};
use crate::cleanup::CleanupResource;
use crate::descriptors::{BindlessHandle, BufferBinding, TextureBinding};
use crate::error::{GraphicsError, fatal, not_implemented};
use crate::graphics::GraphicsBackend;
use crate::pipeline::{PipelineBindPoint, PipelineKey};
use crate::resources::{
    BufferHandle, BufferRegistry, TextureHandle, TextureRegistry, buffer_entry, buffer_entry_mut,
    texture_entry, texture_entry_mut,
};
use crate::state::{BarrierBatch, BufferBarrier, BufferState, SubresourceRange, TextureBarrier, TextureState};
use crate::sync::{QueueKind, SyncToken};
use crate::types::{BufferDescriptor, BufferUsage, ClearValue};

/// When a context's work is handed to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPolicy {
    /// Submit when the context ends.
    #[default]
    Immediate,
    /// Join the queue's deferred batch, submitted at the next frame boundary.
    DeferToPresent,
}

/// One attachment of a rendering scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    pub texture: TextureHandle,
    pub mip: u16,
    pub slice: u16,
    /// Clear on load instead of keeping the contents.
    pub clear: Option<ClearValue>,
}

impl RenderTarget {
    /// Mip 0, slice 0, contents kept.
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            mip: 0,
            slice: 0,
            clear: None,
        }
    }

    pub fn with_subresource(mut self, mip: u16, slice: u16) -> Self {
        self.mip = mip;
        self.slice = slice;
        self
    }

    pub fn with_clear(mut self, value: ClearValue) -> Self {
        self.clear = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PipelineBinding {
    /// `set_pipeline` was never called.
    None,
    /// The last requested pipeline has no usable object.
    Unusable(PipelineKey),
    Bound(PipelineKey),
}

/// Records GPU work for one queue.
///
/// Holds the facade mutably for its whole lifetime.
pub struct CommandContext<'g, B: Backend> {
    gfx: &'g mut GraphicsBackend<B>,
    queue: QueueKind,
    policy: SubmissionPolicy,
    dependencies: Vec<SyncToken>,
    list: CommandListId,
    barriers: BarrierBatch,
    temporaries: Vec<CleanupResource<B>>,
    pipeline: PipelineBinding,
    layout: Option<PipelineBindPoint>,
    rendering: bool,
    commands: usize,
    ended: bool,
}

impl<'g, B: Backend> CommandContext<'g, B> {
    pub(crate) fn new(
        gfx: &'g mut GraphicsBackend<B>,
        queue: QueueKind,
        policy: SubmissionPolicy,
        dependencies: &[SyncToken],
    ) -> Self {
        let list = gfx.command_lists.acquire(&mut gfx.backend, queue);
        gfx.command_lists.open(list);
        Self {
            gfx,
            queue,
            policy,
            dependencies: dependencies.to_vec(),
            list,
            barriers: BarrierBatch::new(),
            temporaries: Vec::new(),
            pipeline: PipelineBinding::None,
            layout: None,
            rendering: false,
            commands: 0,
            ended: false,
        }
    }

    pub fn queue(&self) -> QueueKind {
        self.queue
    }

    pub fn policy(&self) -> SubmissionPolicy {
        self.policy
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Request `state` for the whole texture.
    pub fn transition_texture(&mut self, texture: TextureHandle, state: TextureState) {
        let range = texture_entry(&self.gfx.textures, texture).tracker.full_range();
        self.transition_texture_range(texture, range, state);
    }

    /// Request `state` for a range of subresources.
    pub fn transition_texture_range(
        &mut self,
        texture: TextureHandle,
        range: SubresourceRange,
        state: TextureState,
    ) {
        if !state.layout.is_supported_on(self.queue) {
            fatal!(
                "Layout {:?} requested for {texture:?} is not supported on the {} queue",
                state.layout,
                self.queue
            );
        }
        let entry = texture_entry_mut(&mut self.gfx.textures, texture);
        entry
            .tracker
            .transition(texture, range, state, self.barriers.textures_mut());
    }

    /// Request several whole-texture states at once. Barriers from the whole
    /// batch are merged together.
    pub fn transition_textures(&mut self, transitions: &[(TextureHandle, TextureState)]) {
        for (texture, state) in transitions {
            self.transition_texture(*texture, *state);
        }
    }

    /// Request `state` for a buffer.
    pub fn transition_buffer(&mut self, buffer: BufferHandle, state: BufferState) {
        let entry = buffer_entry_mut(&mut self.gfx.buffers, buffer);
        let old = std::mem::replace(&mut entry.state, state);
        self.barriers.push_buffer(buffer, old, state);
    }

    /// Record every pending barrier.
    pub fn flush_barriers(&mut self) {
        if self.barriers.is_empty() {
            return;
        }
        let (textures, buffers) = self.barriers.take();
        let gfx = &mut *self.gfx;
        let list = gfx.command_lists.list_mut(self.list);
        record_texture_barriers::<B>(list, &gfx.textures, &textures);
        record_buffer_barriers::<B>(list, &gfx.buffers, &buffers);
        self.commands += 1;
    }

    // ------------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------------

    /// Bindless handle of a texture view, created on first use.
    pub fn bind_texture(&mut self, binding: TextureBinding) -> Result<BindlessHandle, GraphicsError> {
        self.gfx.get_bindless_handle(binding)
    }

    /// Bindless handle of a buffer view, created on first use.
    pub fn bind_buffer(&mut self, binding: BufferBinding) -> Result<BindlessHandle, GraphicsError> {
        self.gfx.get_buffer_bindless_handle(binding)
    }

    /// Bind the pipeline for `key`. Returns false if it has no usable
    /// pipeline; draws and dispatches are then skipped until another pipeline
    /// is set.
    pub fn set_pipeline(&mut self, key: &PipelineKey) -> bool {
        let bind_point = key.bind_point();
        if !bind_point.is_supported_on(self.queue) {
            fatal!("{bind_point:?} pipeline '{}' set on the {} queue", key.label(), self.queue);
        }
        if let PipelineBinding::Bound(bound) = &self.pipeline {
            if bound == key {
                return true;
            }
        }

        let gfx = &mut *self.gfx;
        let retire_after = gfx.timelines.most_recent_all();
        let pipeline = gfx.pipelines.get_pipeline(
            key,
            &mut gfx.backend,
            &gfx.shaders,
            &gfx.layout,
            &mut gfx.cleanup,
            &retire_after,
        );
        let Some(pipeline) = pipeline else {
            self.pipeline = PipelineBinding::Unusable(key.clone());
            return false;
        };

        let list = gfx.command_lists.list_mut(self.list);
        list.set_pipeline(pipeline);
        if self.layout != Some(bind_point) {
            list.set_layout(bind_point);
            self.layout = Some(bind_point);
        }
        self.pipeline = PipelineBinding::Bound(key.clone());
        self.commands += 1;
        true
    }

    /// Set the layout constants (bindless indices) for `bind_point`.
    pub fn set_layout_resources(&mut self, bind_point: PipelineBindPoint, constants: &[u32]) {
        let list = self.gfx.command_lists.list_mut(self.list);
        if self.layout != Some(bind_point) {
            list.set_layout(bind_point);
            self.layout = Some(bind_point);
        }
        list.set_layout_resources(bind_point, constants);
        self.commands += 1;
    }

    fn pipeline_ready(&self, bind_point: PipelineBindPoint, what: &str) -> bool {
        match &self.pipeline {
            PipelineBinding::None => fatal!("{what} recorded without a pipeline"),
            PipelineBinding::Unusable(key) => {
                log::warn!("Skipping {what}: pipeline '{}' is not usable", key.label());
                false
            }
            PipelineBinding::Bound(key) => {
                if key.bind_point() != bind_point {
                    fatal!("{what} recorded with {:?} pipeline '{}' bound", key.bind_point(), key.label());
                }
                true
            }
        }
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Begin a rendering scope. Attachments are transitioned to render target
    /// and depth write states.
    pub fn begin_rendering(&mut self, colors: &[RenderTarget], depth: Option<RenderTarget>) {
        if self.queue != QueueKind::Graphics {
            fatal!("Rendering on the {} queue", self.queue);
        }
        if self.rendering {
            fatal!("Rendering scope begun twice");
        }
        for target in colors {
            let range = SubresourceRange::single(target.mip, target.slice);
            self.transition_texture_range(target.texture, range, TextureState::RENDER_TARGET);
        }
        if let Some(target) = depth {
            let range = SubresourceRange::single(target.mip, target.slice);
            self.transition_texture_range(target.texture, range, TextureState::DEPTH_WRITE);
        }
        self.flush_barriers();

        let gfx = &mut *self.gfx;
        let native_colors: Vec<_> = colors
            .iter()
            .map(|target| native_attachment(&gfx.textures, target))
            .collect();
        let native_depth = depth
            .as_ref()
            .map(|target| native_attachment(&gfx.textures, target));
        gfx.command_lists
            .list_mut(self.list)
            .begin_rendering(&native_colors, native_depth);
        self.rendering = true;
        self.commands += 1;
    }

    pub fn end_rendering(&mut self) {
        if !self.rendering {
            fatal!("end_rendering without a rendering scope");
        }
        self.gfx.command_lists.list_mut(self.list).end_rendering();
        self.rendering = false;
        self.commands += 1;
    }

    /// Draw with the bound graphics pipeline. Returns false if skipped.
    pub fn draw(&mut self, vertex_count: u32, instance_count: u32) -> bool {
        if !self.rendering {
            fatal!("Draw outside of a rendering scope");
        }
        if !self.pipeline_ready(PipelineBindPoint::Graphics, "draw") {
            return false;
        }
        self.flush_barriers();
        self.gfx
            .command_lists
            .list_mut(self.list)
            .draw(vertex_count, instance_count, 0, 0);
        self.commands += 1;
        true
    }

    /// Indexed draw. The index buffer is transitioned to the index state.
    pub fn draw_indexed(&mut self, index_buffer: BufferHandle, index_count: u32, instance_count: u32) -> bool {
        if !self.rendering {
            fatal!("Draw outside of a rendering scope");
        }
        if !self.pipeline_ready(PipelineBindPoint::Graphics, "draw") {
            return false;
        }
        self.transition_buffer(index_buffer, BufferState::INDEX);
        self.flush_barriers();
        let gfx = &mut *self.gfx;
        let native = &buffer_entry(&gfx.buffers, index_buffer).native;
        gfx.command_lists
            .list_mut(self.list)
            .draw_indexed(native, index_count, instance_count, 0, 0, 0);
        self.commands += 1;
        true
    }

    /// Dispatch with the bound compute pipeline. Returns false if skipped.
    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) -> bool {
        if self.rendering {
            fatal!("Dispatch inside a rendering scope");
        }
        if !self.pipeline_ready(PipelineBindPoint::Compute, "dispatch") {
            return false;
        }
        self.flush_barriers();
        self.gfx.command_lists.list_mut(self.list).dispatch(x, y, z);
        self.commands += 1;
        true
    }

    /// Trace rays with the bound ray tracing pipeline. Returns false if skipped.
    pub fn trace_rays(&mut self, width: u32, height: u32, depth: u32) -> bool {
        if !self.gfx.capabilities.ray_tracing {
            not_implemented!("trace_rays on backend '{}'", self.gfx.backend.name());
        }
        if !self.pipeline_ready(PipelineBindPoint::RayTracing, "trace_rays") {
            return false;
        }
        self.flush_barriers();
        self.gfx
            .command_lists
            .list_mut(self.list)
            .trace_rays(width, height, depth);
        self.commands += 1;
        true
    }

    /// Clear a whole texture outside of a rendering scope.
    pub fn clear_texture(&mut self, texture: TextureHandle, value: ClearValue) {
        if self.rendering {
            fatal!("clear_texture inside a rendering scope");
        }
        let entry = texture_entry(&self.gfx.textures, texture);
        let range = entry.tracker.full_range();
        let state = if entry.desc.format.is_depth_stencil() {
            TextureState::DEPTH_WRITE
        } else {
            TextureState::COPY_DEST
        };
        self.transition_texture_range(texture, range, state);
        self.flush_barriers();
        let gfx = &mut *self.gfx;
        let native = &texture_entry(&gfx.textures, texture).native;
        gfx.command_lists
            .list_mut(self.list)
            .clear_texture(native, range, value);
        self.commands += 1;
    }

    // ------------------------------------------------------------------------
    // Copies
    // ------------------------------------------------------------------------

    /// Copy `size` bytes between two buffers.
    pub fn copy_buffer(
        &mut self,
        src: BufferHandle,
        src_offset: u64,
        dst: BufferHandle,
        dst_offset: u64,
        size: u64,
    ) {
        if src == dst {
            fatal!("Copy within buffer {src:?}");
        }
        self.check_buffer_access(src, src_offset, size, BufferUsage::COPY_SRC);
        self.check_buffer_access(dst, dst_offset, size, BufferUsage::COPY_DST);
        self.transition_buffer(src, BufferState::COPY_SOURCE);
        self.transition_buffer(dst, BufferState::COPY_DEST);
        self.flush_barriers();

        let gfx = &mut *self.gfx;
        let src_native = &buffer_entry(&gfx.buffers, src).native;
        let dst_native = &buffer_entry(&gfx.buffers, dst).native;
        gfx.command_lists
            .list_mut(self.list)
            .copy_buffer(src_native, src_offset, dst_native, dst_offset, size);
        self.commands += 1;
    }

    /// Copy every subresource of `src` into `dst`. Both must have the same shape.
    pub fn copy_texture(&mut self, src: TextureHandle, dst: TextureHandle) {
        let range = texture_entry(&self.gfx.textures, src).tracker.full_range();
        self.copy_texture_range(src, range, dst, range);
    }

    /// Copy subresources between textures.
    pub fn copy_texture_range(
        &mut self,
        src: TextureHandle,
        src_range: SubresourceRange,
        dst: TextureHandle,
        dst_range: SubresourceRange,
    ) {
        if src == dst {
            fatal!("Copy within texture {src:?}");
        }
        if src_range.mip_count != dst_range.mip_count || src_range.slice_count != dst_range.slice_count {
            fatal!("Texture copy between ranges {src_range:?} and {dst_range:?} of different shape");
        }
        self.transition_texture_range(src, src_range, TextureState::COPY_SOURCE);
        self.transition_texture_range(dst, dst_range, TextureState::COPY_DEST);
        self.flush_barriers();

        let gfx = &mut *self.gfx;
        let src_native = &texture_entry(&gfx.textures, src).native;
        let dst_native = &texture_entry(&gfx.textures, dst).native;
        gfx.command_lists
            .list_mut(self.list)
            .copy_texture(src_native, src_range, dst_native, dst_range);
        self.commands += 1;
    }

    /// Fill one texture subresource from tightly packed buffer data.
    pub fn copy_buffer_to_texture(
        &mut self,
        src: BufferHandle,
        offset: u64,
        dst: TextureHandle,
        mip: u16,
        slice: u16,
    ) {
        let size = texture_entry(&self.gfx.textures, dst)
            .desc
            .subresource_byte_size(u32::from(mip));
        self.check_buffer_access(src, offset, size, BufferUsage::COPY_SRC);
        self.transition_buffer(src, BufferState::COPY_SOURCE);
        self.transition_texture_range(dst, SubresourceRange::single(mip, slice), TextureState::COPY_DEST);
        self.flush_barriers();

        let gfx = &mut *self.gfx;
        let src_native = &buffer_entry(&gfx.buffers, src).native;
        let dst_native = &texture_entry(&gfx.textures, dst).native;
        gfx.command_lists
            .list_mut(self.list)
            .copy_buffer_to_texture(src_native, offset, dst_native, mip, slice);
        self.commands += 1;
    }

    /// Write one texture subresource, tightly packed, into a buffer.
    pub fn copy_texture_to_buffer(
        &mut self,
        src: TextureHandle,
        mip: u16,
        slice: u16,
        dst: BufferHandle,
        offset: u64,
    ) {
        let size = texture_entry(&self.gfx.textures, src)
            .desc
            .subresource_byte_size(u32::from(mip));
        self.check_buffer_access(dst, offset, size, BufferUsage::COPY_DST);
        self.transition_texture_range(src, SubresourceRange::single(mip, slice), TextureState::COPY_SOURCE);
        self.transition_buffer(dst, BufferState::COPY_DEST);
        self.flush_barriers();

        let gfx = &mut *self.gfx;
        let src_native = &texture_entry(&gfx.textures, src).native;
        let dst_native = &buffer_entry(&gfx.buffers, dst).native;
        gfx.command_lists
            .list_mut(self.list)
            .copy_texture_to_buffer(src_native, mip, slice, dst_native, offset);
        self.commands += 1;
    }

    /// Upload `data` into `dst` at `offset` through a staging buffer.
    ///
    /// The staging buffer lives until this context's work completes.
    pub fn enqueue_data_upload(
        &mut self,
        dst: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GraphicsError> {
        if data.is_empty() {
            return Ok(());
        }
        let size = data.len() as u64;
        let desc = &buffer_entry(&self.gfx.buffers, dst).desc;
        if !desc.usage.contains(BufferUsage::COPY_DST) {
            return Err(GraphicsError::UnsupportedBufferUsage(BufferUsage::COPY_DST));
        }
        if offset.saturating_add(size) > desc.size {
            return Err(GraphicsError::InvalidParameter(format!(
                "upload of {size} bytes at {offset} overflows buffer '{}' of {} bytes",
                desc.name(),
                desc.size
            )));
        }

        let staging = self.create_staging(data)?;
        self.transition_buffer(dst, BufferState::COPY_DEST);
        self.flush_barriers();

        let gfx = &mut *self.gfx;
        let dst_native = &buffer_entry(&gfx.buffers, dst).native;
        gfx.command_lists
            .list_mut(self.list)
            .copy_buffer(&staging, 0, dst_native, offset, size);
        self.commands += 1;
        self.keep_until_complete(staging);
        Ok(())
    }

    /// Upload one texture subresource through a staging buffer.
    pub fn enqueue_texture_upload(
        &mut self,
        dst: TextureHandle,
        mip: u16,
        slice: u16,
        data: &[u8],
    ) -> Result<(), GraphicsError> {
        let desc = &texture_entry(&self.gfx.textures, dst).desc;
        let expected = desc.subresource_byte_size(u32::from(mip));
        if data.len() as u64 != expected {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture '{}' mip {mip} takes {expected} bytes, got {}",
                desc.name(),
                data.len()
            )));
        }

        let staging = self.create_staging(data)?;
        self.transition_texture_range(dst, SubresourceRange::single(mip, slice), TextureState::COPY_DEST);
        self.flush_barriers();

        let gfx = &mut *self.gfx;
        let dst_native = &texture_entry(&gfx.textures, dst).native;
        gfx.command_lists
            .list_mut(self.list)
            .copy_buffer_to_texture(&staging, 0, dst_native, mip, slice);
        self.commands += 1;
        self.keep_until_complete(staging);
        Ok(())
    }

    fn create_staging(&mut self, data: &[u8]) -> Result<B::Buffer, GraphicsError> {
        let backend = &mut self.gfx.backend;
        let desc = BufferDescriptor::staging(data.len() as u64).with_label("upload staging");
        let staging = backend.create_buffer(&desc)?;
        if let Err(err) = backend.write_buffer(&staging, 0, data) {
            backend.destroy_buffer(staging);
            return Err(err);
        }
        Ok(staging)
    }

    fn keep_until_complete(&mut self, buffer: B::Buffer) {
        self.temporaries.push(CleanupResource::Buffer {
            native: buffer,
            views: Vec::new(),
        });
    }

    fn check_buffer_access(&self, buffer: BufferHandle, offset: u64, size: u64, usage: BufferUsage) {
        let desc = &buffer_entry(&self.gfx.buffers, buffer).desc;
        if !desc.usage.contains(usage) {
            fatal!("Buffer '{}' was not created with {usage:?}", desc.name());
        }
        if offset.saturating_add(size) > desc.size {
            fatal!(
                "Access [{offset}, {}) is outside buffer '{}' of {} bytes",
                offset.saturating_add(size),
                desc.name(),
                desc.size
            );
        }
    }

    // ------------------------------------------------------------------------
    // End
    // ------------------------------------------------------------------------

    /// Close the context and hand its work to the GPU according to its
    /// policy. Returns the tokens that complete with it.
    pub fn end(mut self) -> Vec<SyncToken> {
        self.finish()
    }

    fn finish(&mut self) -> Vec<SyncToken> {
        self.ended = true;
        if self.rendering {
            fatal!("Command context ended inside a rendering scope");
        }
        self.flush_barriers();

        let gfx = &mut *self.gfx;
        gfx.command_lists.close(self.list);

        if self.commands == 0 && self.dependencies.is_empty() {
            log::debug!("Empty {} context, nothing submitted", self.queue);
            gfx.command_lists.release(self.list);
            return vec![gfx.timelines.most_recent(self.queue)];
        }

        let defer = self.policy == SubmissionPolicy::DeferToPresent
            && self.dependencies.is_empty()
            && gfx.has_frame_boundary();
        if self.policy == SubmissionPolicy::DeferToPresent && !defer {
            log::debug!("Deferred {} context submitted immediately", self.queue);
        }

        let token = if defer {
            gfx.deferred.push(self.queue, self.list, &mut gfx.timelines)
        } else {
            gfx.submit_lists(self.queue, &[self.list], &self.dependencies)
        };

        for resource in self.temporaries.drain(..) {
            gfx.cleanup.push(resource, vec![token]);
        }
        if !defer {
            gfx.cleanup_checkpoint();
        }
        vec![token]
    }
}

impl<B: Backend> Drop for CommandContext<'_, B> {
    fn drop(&mut self) {
        if !self.ended && !std::thread::panicking() {
            self.finish();
        }
    }
}

fn native_attachment<'a, B: Backend>(
    textures: &'a TextureRegistry<B>,
    target: &RenderTarget,
) -> NativeAttachment<'a, B::Texture> {
    NativeAttachment {
        texture: &texture_entry(textures, target.texture).native,
        mip: target.mip,
        slice: target.slice,
        clear: target.clear,
    }
}

/// Resolve texture barriers to native objects and record them as one call.
pub(crate) fn record_texture_barriers<B: Backend>(
    list: &mut B::CommandList,
    textures: &TextureRegistry<B>,
    barriers: &[TextureBarrier],
) {
    if barriers.is_empty() {
        return;
    }
    let native: Vec<_> = barriers
        .iter()
        .map(|barrier| NativeTextureBarrier {
            texture: &texture_entry(textures, barrier.texture).native,
            range: barrier.range,
            src: barrier.src,
            dst: barrier.dst,
        })
        .collect();
    log::trace!("Recording {} texture barriers", native.len());
    list.texture_barriers(&native);
}

/// Resolve buffer barriers to native objects and record them as one call.
pub(crate) fn record_buffer_barriers<B: Backend>(
    list: &mut B::CommandList,
    buffers: &BufferRegistry<B>,
    barriers: &[BufferBarrier],
) {
    if barriers.is_empty() {
        return;
    }
    let native: Vec<_> = barriers
        .iter()
        .map(|barrier| NativeBufferBarrier {
            buffer: &buffer_entry(buffers, barrier.buffer).native,
            src: barrier.src,
            dst: barrier.dst,
        })
        .collect();
    log::trace!("Recording {} buffer barriers", native.len());
    list.buffer_barriers(&native);
}
