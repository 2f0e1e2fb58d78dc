//! The graphics facade.
//!
//! [`GraphicsBackend`] owns the backend and every piece of bookkeeping around
//! it:
//!
//! - texture and buffer registries, with per-resource state and views
//! - the bindless descriptor tables
//! - shaders, the resource layout version and the pipeline cache
//! - per-queue timelines, the deferred batch and the command list pool
//! - the cleanup queue
//! - the present textures and frame pacing
//!
//! It is constructed once and passed by reference; nothing is global.
//!
//! # Example
//!
//! ```ignore
//! let mut gfx = GraphicsBackend::new(DummyBackend::new(), GraphicsConfig::new())?;
//! let buffer = gfx.create_buffer(BufferDescriptor::new(400, BufferUsage::STORAGE | BufferUsage::COPY_DST))?;
//!
//! let mut ctx = gfx.begin_scoped_command_context(QueueKind::Copy, SubmissionPolicy::Immediate, &[]);
//! ctx.enqueue_data_upload(buffer, 0, bytemuck::cast_slice(&data))?;
//! let tokens = ctx.end();
//!
//! gfx.wait_for_tokens_on_cpu(&tokens);
//! ```

use bytemuck::Pod;
use vexel_core::{frame_mark, profile_scope};

use crate::backend::{Backend, BackendCapabilities, CommandEncoder, NativeTextureBarrier};
use crate::cleanup::{CleanupQueue, CleanupResource};
use crate::command::{
    CommandContext, CommandListId, CommandListPool, DeferredBatch, SubmissionPolicy,
    record_texture_barriers,
};
use crate::config::GraphicsConfig;
use crate::descriptors::{BindlessHandle, BufferBinding, DescriptorPool, TextureBinding};
use crate::error::{GraphicsError, fatal};
use crate::profiling;
use crate::pipeline::{
    PipelineStateCache, ResourceLayout, ShaderErrorCallback, ShaderKey, ShaderStore,
};
use crate::resources::{
    BufferEntry, BufferHandle, BufferRegistry, TextureEntry, TextureHandle, TextureRegistry,
    buffer_entry, buffer_entry_mut, texture_entry, texture_entry_mut,
};
use crate::state::{BarrierAccess, BufferState, SubresourceRange, TextureState};
use crate::sync::{QueueKind, QueueTimelines, SyncToken};
use crate::types::{
    BufferDescriptor, ClearValue, TextureDescriptor, TextureDimension, TextureUsage,
};

/// Usage of the textures the client renders into before `present`.
const PRESENT_TEXTURE_USAGE: TextureUsage = TextureUsage::RENDER_ATTACHMENT
    .union(TextureUsage::COPY_SRC)
    .union(TextureUsage::COPY_DST)
    .union(TextureUsage::TEXTURE_BINDING);

/// Owns a backend and everything needed to drive it safely.
pub struct GraphicsBackend<B: Backend> {
    pub(crate) backend: B,
    pub(crate) config: GraphicsConfig,
    pub(crate) capabilities: BackendCapabilities,
    pub(crate) textures: TextureRegistry<B>,
    pub(crate) buffers: BufferRegistry<B>,
    pub(crate) descriptors: DescriptorPool,
    pub(crate) pipelines: PipelineStateCache<B>,
    pub(crate) shaders: ShaderStore,
    pub(crate) layout: ResourceLayout,
    pub(crate) cleanup: CleanupQueue<B>,
    pub(crate) command_lists: CommandListPool<B>,
    pub(crate) deferred: DeferredBatch,
    pub(crate) timelines: QueueTimelines,
    frame_index: u64,
    present_tokens: Vec<Option<SyncToken>>,
    present_textures: Vec<TextureHandle>,
}

impl<B: Backend> GraphicsBackend<B> {
    /// Wrap `backend`.
    ///
    /// Fails if the configuration is invalid or asks for a swap chain the
    /// backend does not have, or whose size or format differs from the
    /// backend's back buffers.
    pub fn new(backend: B, config: GraphicsConfig) -> Result<Self, GraphicsError> {
        config.validate()?;
        let capabilities = backend.capabilities();
        if let Some(swap_chain) = &config.swap_chain {
            if !capabilities.swap_chain {
                return Err(GraphicsError::InitializationFailed(format!(
                    "backend '{}' has no swap chain to present to",
                    backend.name()
                )));
            }
            if swap_chain.extent != capabilities.back_buffer_extent
                || swap_chain.format != capabilities.back_buffer_format
            {
                return Err(GraphicsError::InitializationFailed(format!(
                    "swap chain {:?} {:?} does not match back buffers {:?} {:?}",
                    swap_chain.extent,
                    swap_chain.format,
                    capabilities.back_buffer_extent,
                    capabilities.back_buffer_format
                )));
            }
        }

        let frames = usize::from(config.frames_in_flight);
        let mut gfx = Self {
            descriptors: DescriptorPool::new(&config.descriptor_capacities),
            backend,
            config,
            capabilities,
            textures: TextureRegistry::new(),
            buffers: BufferRegistry::new(),
            pipelines: PipelineStateCache::new(),
            shaders: ShaderStore::new(),
            layout: ResourceLayout::new(),
            cleanup: CleanupQueue::new(),
            command_lists: CommandListPool::new(),
            deferred: DeferredBatch::new(),
            timelines: QueueTimelines::new(),
            frame_index: 0,
            present_tokens: Vec::new(),
            present_textures: Vec::new(),
        };

        if let Some(swap_chain) = gfx.config.swap_chain {
            for frame in 0..frames {
                let desc = TextureDescriptor::new_2d(
                    swap_chain.extent.width,
                    swap_chain.extent.height,
                    swap_chain.format,
                    PRESENT_TEXTURE_USAGE,
                )
                .with_label(format!("present texture {frame}"));
                let handle = gfx.create_texture(desc)?;
                gfx.present_textures.push(handle);
            }
            gfx.present_tokens = vec![None; frames];
        }

        log::info!(
            "GraphicsBackend: created on '{}' ({} frames in flight, swap chain: {})",
            gfx.backend.name(),
            frames,
            gfx.config.swap_chain.is_some()
        );
        Ok(gfx)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct access to the backend, for test hooks and native interop.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    pub fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    /// Returns true if deferred work has a present to be flushed at.
    pub(crate) fn has_frame_boundary(&self) -> bool {
        self.config.swap_chain.is_some()
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Create a texture. It starts in the undefined state.
    pub fn create_texture(&mut self, desc: TextureDescriptor) -> Result<TextureHandle, GraphicsError> {
        validate_texture(&desc)?;
        let native = self.backend.create_texture(&desc)?;
        log::trace!(
            "GraphicsBackend: created texture '{}' {}x{}x{}, {} mips, {} layers",
            desc.name(),
            desc.size.width,
            desc.size.height,
            desc.size.depth,
            desc.mip_level_count,
            desc.array_layers
        );
        Ok(self.textures.insert(TextureEntry::new(native, desc)))
    }

    /// Create a buffer. It starts in the undefined state.
    pub fn create_buffer(&mut self, desc: BufferDescriptor) -> Result<BufferHandle, GraphicsError> {
        if desc.size == 0 {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer '{}' has zero size",
                desc.name()
            )));
        }
        if desc.usage.is_empty() {
            return Err(GraphicsError::UnsupportedBufferUsage(desc.usage));
        }
        let native = self.backend.create_buffer(&desc)?;
        log::trace!(
            "GraphicsBackend: created buffer '{}' ({} bytes, {:?})",
            desc.name(),
            desc.size,
            desc.locality
        );
        Ok(self.buffers.insert(BufferEntry::new(native, desc)))
    }

    /// Destroy a texture once every queue is done with it.
    ///
    /// The handle is invalid immediately. Its bindless views stay allocated
    /// until the cleanup entry is released, so shaders already in flight
    /// keep reading the texture.
    pub fn destroy_texture(&mut self, handle: TextureHandle) {
        if self.present_textures.contains(&handle) {
            fatal!("Present texture {handle:?} is owned by the facade");
        }
        let Some(entry) = self.textures.remove(handle) else {
            fatal!("Destroying invalid texture handle {handle:?}");
        };
        log::trace!("GraphicsBackend: destroying texture '{}'", entry.desc.name());
        let (native, views) = entry.into_parts();
        self.cleanup.push(
            CleanupResource::Texture { native, views },
            self.timelines.most_recent_all(),
        );
    }

    /// Destroy a buffer once every queue is done with it.
    pub fn destroy_buffer(&mut self, handle: BufferHandle) {
        let Some(entry) = self.buffers.remove(handle) else {
            fatal!("Destroying invalid buffer handle {handle:?}");
        };
        log::trace!("GraphicsBackend: destroying buffer '{}'", entry.desc.name());
        let (native, views) = entry.into_parts();
        self.cleanup.push(
            CleanupResource::Buffer { native, views },
            self.timelines.most_recent_all(),
        );
    }

    pub fn is_texture_valid(&self, handle: TextureHandle) -> bool {
        self.textures.contains(handle)
    }

    pub fn is_buffer_valid(&self, handle: BufferHandle) -> bool {
        self.buffers.contains(handle)
    }

    pub fn texture_descriptor(&self, handle: TextureHandle) -> &TextureDescriptor {
        &texture_entry(&self.textures, handle).desc
    }

    pub fn buffer_descriptor(&self, handle: BufferHandle) -> &BufferDescriptor {
        &buffer_entry(&self.buffers, handle).desc
    }

    /// Tracked state of one texture subresource.
    pub fn texture_state(&self, handle: TextureHandle, mip: u16, slice: u16) -> TextureState {
        texture_entry(&self.textures, handle).tracker.state(mip, slice)
    }

    pub fn buffer_state(&self, handle: BufferHandle) -> BufferState {
        buffer_entry(&self.buffers, handle).state
    }

    // ========================================================================
    // Mapping
    // ========================================================================

    /// Write bytes into a CPU-visible buffer.
    pub fn write_buffer(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> Result<(), GraphicsError> {
        let entry = buffer_entry(&self.buffers, handle);
        if !entry.desc.locality.is_cpu_visible() {
            return Err(GraphicsError::ResourceNotMappable(entry.desc.name().to_string()));
        }
        self.backend.write_buffer(&entry.native, offset, data)
    }

    /// Read bytes from a CPU-visible buffer.
    ///
    /// The caller is responsible for waiting on the work that wrote them.
    pub fn read_buffer(&self, handle: BufferHandle, offset: u64, out: &mut [u8]) -> Result<(), GraphicsError> {
        let entry = buffer_entry(&self.buffers, handle);
        if !entry.desc.locality.is_cpu_visible() {
            return Err(GraphicsError::ResourceNotMappable(entry.desc.name().to_string()));
        }
        self.backend.read_buffer(&entry.native, offset, out)
    }

    /// Write a slice of plain values into a CPU-visible buffer.
    pub fn write_buffer_pod<T: Pod>(&mut self, handle: BufferHandle, offset: u64, data: &[T]) -> Result<(), GraphicsError> {
        self.write_buffer(handle, offset, bytemuck::cast_slice(data))
    }

    /// Read `count` plain values from a CPU-visible buffer.
    pub fn read_buffer_pod<T: Pod>(&self, handle: BufferHandle, offset: u64, count: usize) -> Result<Vec<T>, GraphicsError> {
        let mut values = vec![T::zeroed(); count];
        self.read_buffer(handle, offset, bytemuck::cast_slice_mut(&mut values))?;
        Ok(values)
    }

    // ========================================================================
    // Bindless
    // ========================================================================

    /// Bindless handle of a texture view, created on first request.
    pub fn get_bindless_handle(&mut self, binding: TextureBinding) -> Result<BindlessHandle, GraphicsError> {
        let entry = texture_entry_mut(&mut self.textures, binding.texture);
        let key = binding.resolve(&entry.desc)?;
        let backend = &mut self.backend;
        let native = &entry.native;
        entry.views.get_or_create(key, key.usage.descriptor_kind(), &mut self.descriptors, |slot| {
            backend.write_texture_descriptor(slot, native, &key)
        })
    }

    /// Bindless handle of a buffer view, created on first request.
    pub fn get_buffer_bindless_handle(&mut self, binding: BufferBinding) -> Result<BindlessHandle, GraphicsError> {
        let entry = buffer_entry_mut(&mut self.buffers, binding.buffer);
        let key = binding.resolve(&entry.desc)?;
        let backend = &mut self.backend;
        let native = &entry.native;
        entry.views.get_or_create(key, key.usage.descriptor_kind(), &mut self.descriptors, |slot| {
            backend.write_buffer_descriptor(slot, native, &key)
        })
    }

    pub fn is_bindless_handle_valid(&self, handle: BindlessHandle) -> bool {
        self.descriptors.is_valid(handle)
    }

    pub fn descriptors(&self) -> &DescriptorPool {
        &self.descriptors
    }

    // ========================================================================
    // Shaders and pipelines
    // ========================================================================

    /// Publish new bytecode for a shader. Pipelines using it are rebuilt on
    /// their next use.
    pub fn set_shader_bytecode(&mut self, key: ShaderKey, code: impl Into<std::sync::Arc<[u8]>>) -> u64 {
        self.shaders.set_shader_bytecode(key, code)
    }

    /// Record a failed shader compilation. Pipelines using the shader become
    /// unusable until new bytecode arrives.
    pub fn report_shader_error(&mut self, key: ShaderKey, message: impl Into<String>) -> u64 {
        self.shaders.report_shader_error(key, message)
    }

    /// Receive shader errors at the next cleanup checkpoint instead of the log.
    pub fn set_shader_error_callback(&mut self, callback: ShaderErrorCallback) {
        self.shaders.set_error_callback(callback);
    }

    /// Force every pipeline to be rebuilt on its next use.
    pub fn invalidate_resource_layout(&mut self) {
        self.layout.invalidate();
        log::debug!("Resource layout invalidated (version {})", self.layout.version());
    }

    pub fn pipeline_cache(&self) -> &PipelineStateCache<B> {
        &self.pipelines
    }

    // ========================================================================
    // Command contexts and submission
    // ========================================================================

    /// Start recording on `queue`. Work runs after every token in
    /// `dependencies` completes.
    pub fn begin_scoped_command_context(
        &mut self,
        queue: QueueKind,
        policy: SubmissionPolicy,
        dependencies: &[SyncToken],
    ) -> CommandContext<'_, B> {
        CommandContext::new(self, queue, policy, dependencies)
    }

    /// Submit closed lists to `queue` now.
    ///
    /// Deferred batches are submitted first where ordering needs it: the
    /// queue's own batch, and any batch holding a waited-on token.
    pub(crate) fn submit_lists(
        &mut self,
        queue: QueueKind,
        lists: &[CommandListId],
        waits: &[SyncToken],
    ) -> SyncToken {
        if self.deferred.reserved(queue).is_some() {
            log::debug!("Immediate {queue} submission flushes the deferred batch first");
            self.submit_deferred(queue);
        }
        for wait in waits {
            if !self.timelines.was_reserved(*wait) {
                fatal!("Waiting on {wait}, which was never submitted");
            }
            if self.deferred.holds(*wait) {
                log::debug!("Submission waits on deferred {wait}, flushing it early");
                self.submit_deferred(wait.queue);
            }
        }

        let token = self.timelines.reserve(queue);
        self.submit_reserved(queue, lists, waits, token);
        token
    }

    fn submit_reserved(
        &mut self,
        queue: QueueKind,
        lists: &[CommandListId],
        waits: &[SyncToken],
        token: SyncToken,
    ) {
        profile_scope!("submit");
        let native: Vec<&B::CommandList> = lists.iter().map(|id| self.command_lists.list(*id)).collect();
        if let Err(err) = self.backend.submit(queue, &native, waits, token.value) {
            fatal!("Submission of {token} failed: {err}");
        }
        log::trace!("Submitted {} lists as {token} waiting on {waits:?}", lists.len());
        for id in lists {
            self.command_lists.mark_submitted(*id, vec![token]);
        }
    }

    /// Submit `queue`'s deferred batch, if any.
    pub fn submit_deferred(&mut self, queue: QueueKind) {
        if let Some((lists, token)) = self.deferred.take(queue) {
            self.submit_reserved(queue, &lists, &[], token);
        }
    }

    /// Submit every deferred batch.
    pub fn submit_all_deferred(&mut self) {
        for queue in QueueKind::ALL {
            self.submit_deferred(queue);
        }
    }

    // ========================================================================
    // Synchronization
    // ========================================================================

    /// Returns true if the GPU finished the work behind `token`. Never blocks.
    pub fn is_token_complete(&self, token: SyncToken) -> bool {
        self.backend.completed_value(token.queue) >= token.value
    }

    pub fn are_tokens_complete(&self, tokens: &[SyncToken]) -> bool {
        tokens.iter().all(|token| self.is_token_complete(*token))
    }

    /// Latest token reserved on every queue.
    pub fn most_recent_tokens(&self) -> [SyncToken; QueueKind::COUNT] {
        self.timelines.most_recent_all()
    }

    /// Block until `token` completes, then run the cleanup checkpoint.
    ///
    /// A token held by a deferred batch submits the batch first.
    pub fn wait_for_token_on_cpu(&mut self, token: SyncToken) {
        profile_scope!("wait_for_token_on_cpu");
        if !self.timelines.was_reserved(token) {
            fatal!("Waiting on {token}, which was never submitted");
        }
        if self.deferred.holds(token) {
            log::debug!("CPU wait on deferred {token}, flushing it early");
            self.submit_deferred(token.queue);
        }
        self.backend.wait_for_value(token.queue, token.value);
        self.cleanup_checkpoint();
    }

    /// Block until every token completes.
    pub fn wait_for_tokens_on_cpu(&mut self, tokens: &[SyncToken]) {
        for token in tokens {
            self.wait_for_token_on_cpu(*token);
        }
    }

    /// Submit all deferred work and wait for every queue to drain.
    pub fn flush_gpu(&mut self) {
        profile_scope!("flush_gpu");
        self.submit_all_deferred();
        for token in self.timelines.most_recent_all() {
            self.backend.wait_for_value(token.queue, token.value);
        }
        self.cleanup_checkpoint();
    }

    /// Release what completed work no longer needs, reclaim command lists and
    /// report shader errors.
    pub fn cleanup_checkpoint(&mut self) {
        profile_scope!("cleanup_checkpoint");
        let released = self.cleanup.flush(&mut self.backend, &mut self.descriptors);
        let reclaimed = self.command_lists.reclaim(&self.backend);
        for token in self.timelines.most_recent_all() {
            profiling::plot_queue_backlog(token, self.backend.completed_value(token.queue));
        }
        if released > 0 || reclaimed > 0 {
            log::trace!("Cleanup checkpoint: released {released} resources, reclaimed {reclaimed} lists");
        }
        self.shaders.flush_errors();
    }

    /// Resources waiting for the GPU before they can be released.
    pub fn pending_cleanup(&self) -> usize {
        self.cleanup.len()
    }

    // ========================================================================
    // Present
    // ========================================================================

    /// Number of presents so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Texture the next `present` copies to the swap chain.
    pub fn current_present_texture(&self) -> TextureHandle {
        if self.present_textures.is_empty() {
            fatal!("current_present_texture without a swap chain");
        }
        self.present_textures[self.present_slot()]
    }

    fn present_slot(&self) -> usize {
        (self.frame_index % self.present_textures.len() as u64) as usize
    }

    /// End the frame: submit deferred work, copy the current present texture
    /// to the next back buffer and present it.
    ///
    /// Blocks while `frames_in_flight` presents are still outstanding. If the
    /// swap chain cannot provide an image, deferred work is still submitted
    /// and the frame is skipped.
    pub fn present(&mut self) -> Result<(), GraphicsError> {
        profile_scope!("present");
        if !self.has_frame_boundary() {
            fatal!("present without a swap chain");
        }
        let slot = self.present_slot();
        if let Some(token) = self.present_tokens[slot].take() {
            self.wait_for_token_on_cpu(token);
        }

        let Some(image) = self.backend.acquire_back_buffer() else {
            log::debug!("No back buffer available, skipping frame {}", self.frame_index);
            self.submit_all_deferred();
            self.cleanup_checkpoint();
            return Ok(());
        };
        self.submit_all_deferred();

        let texture = self.present_textures[slot];
        let list = self.command_lists.acquire(&mut self.backend, QueueKind::Graphics);
        self.command_lists.open(list);
        self.record_present(list, texture, image);
        self.command_lists.close(list);

        let token = self.submit_lists(QueueKind::Graphics, &[list], &[]);
        self.present_tokens[slot] = Some(token);
        self.backend.present(image)?;

        self.frame_index += 1;
        self.cleanup_checkpoint();
        frame_mark!();
        Ok(())
    }

    fn record_present(&mut self, list: CommandListId, texture: TextureHandle, image: u32) {
        let mut barriers = Vec::new();
        let entry = texture_entry_mut(&mut self.textures, texture);
        let range = entry.tracker.full_range();
        let never_written = entry
            .tracker
            .uniform_state()
            .is_some_and(|state| state.access == BarrierAccess::NoAccess);

        if never_written {
            entry
                .tracker
                .transition(texture, range, TextureState::COPY_DEST, &mut barriers);
            let clear = match entry.desc.clear_value {
                ClearValue::None => ClearValue::color(0.0, 0.0, 0.0, 1.0),
                value => value,
            };
            let encoder = self.command_lists.list_mut(list);
            record_texture_barriers::<B>(encoder, &self.textures, &barriers);
            encoder.clear_texture(&texture_entry(&self.textures, texture).native, range, clear);
            barriers.clear();
        }

        texture_entry_mut(&mut self.textures, texture).tracker.transition(
            texture,
            range,
            TextureState::COPY_SOURCE,
            &mut barriers,
        );
        let encoder = self.command_lists.list_mut(list);
        record_texture_barriers::<B>(encoder, &self.textures, &barriers);

        let back_buffer = self.backend.back_buffer(image);
        let whole = SubresourceRange::full(1, 1);
        encoder.texture_barriers(&[NativeTextureBarrier {
            texture: back_buffer,
            range: whole,
            src: TextureState::UNDEFINED,
            dst: TextureState::COPY_DEST,
        }]);
        encoder.copy_texture(&texture_entry(&self.textures, texture).native, range, back_buffer, whole);
        encoder.texture_barriers(&[NativeTextureBarrier {
            texture: back_buffer,
            range: whole,
            src: TextureState::COPY_DEST,
            dst: TextureState::PRESENT,
        }]);
    }
}

impl<B: Backend> Drop for GraphicsBackend<B> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        self.flush_gpu();
        self.cleanup.release_all(&mut self.backend, &mut self.descriptors);

        let textures = self.textures.drain();
        let buffers = self.buffers.drain();
        let (texture_count, buffer_count) = (textures.len(), buffers.len());
        for entry in textures {
            let (native, views) = entry.into_parts();
            for view in views {
                self.descriptors.free_static_descriptor(&mut self.backend, view);
            }
            self.backend.destroy_texture(native);
        }
        for entry in buffers {
            let (native, views) = entry.into_parts();
            for view in views {
                self.descriptors.free_static_descriptor(&mut self.backend, view);
            }
            self.backend.destroy_buffer(native);
        }
        let pipelines: Vec<_> = self.pipelines.drain().collect();
        for pipeline in pipelines {
            self.backend.destroy_pipeline(pipeline);
        }
        log::info!(
            "GraphicsBackend: destroyed ({texture_count} textures, {buffer_count} buffers still alive)"
        );
    }
}

static_assertions::assert_impl_all!(GraphicsBackend<crate::backend::DummyBackend>: Send);

fn validate_texture(desc: &TextureDescriptor) -> Result<(), GraphicsError> {
    if desc.size.is_empty() {
        return Err(GraphicsError::InvalidParameter(format!(
            "texture '{}' has an empty extent",
            desc.name()
        )));
    }
    if desc.mip_level_count == 0 || desc.mip_level_count > desc.max_mip_levels() {
        return Err(GraphicsError::InvalidParameter(format!(
            "texture '{}' asks for {} mips, at most {} fit",
            desc.name(),
            desc.mip_level_count,
            desc.max_mip_levels()
        )));
    }
    if desc.array_layers == 0 || desc.array_layers > u32::from(u16::MAX) {
        return Err(GraphicsError::InvalidParameter(format!(
            "texture '{}' has {} array layers",
            desc.name(),
            desc.array_layers
        )));
    }
    match desc.dimension {
        TextureDimension::Cube if desc.array_layers % 6 != 0 => {
            return Err(GraphicsError::InvalidParameter(format!(
                "cube texture '{}' needs a multiple of 6 layers, got {}",
                desc.name(),
                desc.array_layers
            )));
        }
        TextureDimension::D3 if desc.array_layers != 1 => {
            return Err(GraphicsError::InvalidParameter(format!(
                "volume texture '{}' cannot be an array",
                desc.name()
            )));
        }
        _ => {}
    }
    if !desc.format.supports_usage(desc.usage) {
        return Err(GraphicsError::UnsupportedFormat {
            format: desc.format,
            usage: desc.usage,
        });
    }
    Ok(())
}
