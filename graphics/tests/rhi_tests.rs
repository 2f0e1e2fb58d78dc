//! Integration tests for the execution and resource-lifetime core.
//!
//! # Test Categories
//!
//! - **Round trip**: upload through staging, copy on the GPU, read back
//! - **Synchronization**: token monotonicity and cross-queue dependencies
//! - **Submission policy**: deferred work and the frame boundary
//! - **Lifetimes**: deferred cleanup and handle generations
//! - **Pipelines**: staleness and shader errors
//! - **Present**: frame pacing and back buffer contents
//!
//! All of them run on the dummy backend, in immediate and manual execution
//! where the difference matters.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use rstest::rstest;

use common::{
    Execution, SWAP_CHAIN_HEIGHT, SWAP_CHAIN_WIDTH, byte_pattern, compute_pipeline, float_sequence,
    headless, storage_buffer, texture, with_swap_chain,
};
use vexel_graphics::backend::Backend;
use vexel_graphics::pipeline::ShaderError;
use vexel_graphics::{
    BufferDescriptor, BufferState, ClearValue, QueueKind, ShaderKey, ShaderStage,
    SubmissionPolicy, SubresourceRange, SyncToken, TextureBinding, TextureState,
};

// ============================================================================
// Round trip
// ============================================================================

/// Upload 0..99 as floats, copy them on the GPU into a readback buffer and
/// read them back.
#[rstest]
#[case::immediate(Execution::Immediate)]
#[case::manual(Execution::Manual)]
fn test_float_round_trip(#[case] execution: Execution) {
    let mut gfx = headless(execution);
    let values = float_sequence(100);
    let size = (values.len() * std::mem::size_of::<f32>()) as u64;
    let buffer = storage_buffer(&mut gfx, size);
    let readback = gfx
        .create_buffer(BufferDescriptor::readback(size).with_label("readback"))
        .unwrap();

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Copy, SubmissionPolicy::Immediate, &[]);
    ctx.enqueue_data_upload(buffer, 0, bytemuck::cast_slice(&values))
        .unwrap();
    ctx.copy_buffer(buffer, 0, readback, 0, size);
    let tokens = ctx.end();

    if execution == Execution::Manual {
        assert!(!gfx.are_tokens_complete(&tokens));
    }
    gfx.wait_for_tokens_on_cpu(&tokens);
    assert!(gfx.are_tokens_complete(&tokens));

    let read: Vec<f32> = gfx.read_buffer_pod(readback, 0, values.len()).unwrap();
    assert_eq!(read, values);
    // The staging buffer went away with the completed work.
    assert_eq!(gfx.pending_cleanup(), 0);
}

#[test]
fn test_texture_upload_and_readback() {
    let mut gfx = headless(Execution::Immediate);
    let tex = texture(&mut gfx, 4, 4, 2);
    let readback = gfx.create_buffer(BufferDescriptor::readback(16)).unwrap();
    let pattern = byte_pattern(16);

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Copy, SubmissionPolicy::Immediate, &[]);
    ctx.enqueue_texture_upload(tex, 1, 0, &pattern).unwrap();
    ctx.copy_texture_to_buffer(tex, 1, 0, readback, 0);
    let tokens = ctx.end();
    gfx.wait_for_tokens_on_cpu(&tokens);

    let mut read = vec![0u8; 16];
    gfx.read_buffer(readback, 0, &mut read).unwrap();
    assert_eq!(read, pattern);
    assert_eq!(gfx.texture_state(tex, 1, 0), TextureState::COPY_SOURCE);
    assert_eq!(gfx.texture_state(tex, 0, 0), TextureState::UNDEFINED);
}

#[rstest]
#[case::white(ClearValue::color(1.0, 1.0, 1.0, 1.0), [255, 255, 255, 255])]
#[case::teal(ClearValue::color(0.0, 0.5, 0.5, 1.0), [0, 128, 128, 255])]
fn test_cleared_texture_reads_back_clear_color(#[case] value: ClearValue, #[case] expected: [u8; 4]) {
    let mut gfx = headless(Execution::Immediate);
    let tex = texture(&mut gfx, 1, 1, 1);
    let readback = gfx.create_buffer(BufferDescriptor::readback(4)).unwrap();

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::Immediate, &[]);
    ctx.clear_texture(tex, value);
    ctx.copy_texture_to_buffer(tex, 0, 0, readback, 0);
    let tokens = ctx.end();
    gfx.wait_for_tokens_on_cpu(&tokens);

    let mut read = [0u8; 4];
    gfx.read_buffer(readback, 0, &mut read).unwrap();
    assert_eq!(read, expected);
}

// ============================================================================
// Synchronization
// ============================================================================

#[rstest]
#[case::graphics(QueueKind::Graphics)]
#[case::compute(QueueKind::Compute)]
#[case::copy(QueueKind::Copy)]
fn test_token_monotonicity(#[case] queue: QueueKind) {
    let mut gfx = headless(Execution::Manual);
    let buffer = storage_buffer(&mut gfx, 64);

    let mut tokens = Vec::new();
    for i in 0..5 {
        let state = if i % 2 == 0 {
            BufferState::COPY_DEST
        } else {
            BufferState::COPY_SOURCE
        };
        let mut ctx = gfx.begin_scoped_command_context(queue, SubmissionPolicy::Immediate, &[]);
        ctx.transition_buffer(buffer, state);
        tokens.extend(ctx.end());
    }

    let values: Vec<u64> = tokens.iter().map(|token| token.value).collect();
    assert_eq!(values, vec![1, 2, 3, 4, 5]);
    assert!(tokens.iter().all(|token| token.queue == queue));
    assert!(tokens.iter().all(|token| !gfx.is_token_complete(*token)));

    gfx.backend_mut().execute_queue(queue);
    assert!(gfx.is_token_complete(tokens[0]));
    assert!(!gfx.is_token_complete(tokens[1]));
}

/// Graphics work waiting on compute work never runs before it.
#[test]
fn test_dependency_ordering() {
    let mut gfx = headless(Execution::Manual);
    let pipeline = compute_pipeline(&mut gfx, "simulate");
    let target = texture(&mut gfx, 4, 4, 1);

    let mut compute = gfx.begin_scoped_command_context(QueueKind::Compute, SubmissionPolicy::Immediate, &[]);
    assert!(compute.set_pipeline(&pipeline));
    assert!(compute.dispatch(8, 1, 1));
    let produced = compute.end();

    let mut graphics = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::Immediate, &produced);
    graphics.clear_texture(target, ClearValue::color(0.0, 0.0, 0.0, 1.0));
    let consumed = graphics.end();

    let backend = gfx.backend_mut();
    assert!(!backend.execute_queue(QueueKind::Graphics), "graphics ran before its dependency");
    assert!(backend.execute_queue(QueueKind::Compute));
    assert!(backend.execute_queue(QueueKind::Graphics));
    assert_eq!(backend.execution_log(), &[produced[0], consumed[0]]);
}

#[test]
fn test_flush_gpu_drains_every_queue() {
    let mut gfx = headless(Execution::Manual);
    let buffer = storage_buffer(&mut gfx, 64);
    let mut tokens = Vec::new();
    for queue in QueueKind::ALL {
        let mut ctx = gfx.begin_scoped_command_context(queue, SubmissionPolicy::Immediate, &[]);
        ctx.enqueue_data_upload(buffer, 0, &[queue.index() as u8; 4])
            .unwrap();
        tokens.extend(ctx.end());
    }
    assert!(!gfx.are_tokens_complete(&tokens));

    gfx.flush_gpu();
    assert!(gfx.are_tokens_complete(&tokens));
    assert_eq!(gfx.most_recent_tokens().to_vec(), tokens);
}

// ============================================================================
// Submission policy
// ============================================================================

#[test]
fn test_deferred_context_completes_at_present() {
    let mut gfx = with_swap_chain(Execution::Immediate, 2, 2);
    let tex = texture(&mut gfx, 4, 4, 1);

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::DeferToPresent, &[]);
    ctx.clear_texture(tex, ClearValue::color(1.0, 0.0, 0.0, 1.0));
    let tokens = ctx.end();

    // Polling does not flush the batch.
    gfx.cleanup_checkpoint();
    assert!(!gfx.are_tokens_complete(&tokens));
    assert_eq!(gfx.backend().stats().submissions, 0);

    gfx.present().unwrap();
    assert!(gfx.are_tokens_complete(&tokens));
}

#[test]
fn test_deferred_contexts_share_one_submission() {
    let mut gfx = with_swap_chain(Execution::Immediate, 2, 2);
    let first_tex = texture(&mut gfx, 4, 4, 1);
    let second_tex = texture(&mut gfx, 4, 4, 1);

    let mut tokens = Vec::new();
    for tex in [first_tex, second_tex] {
        let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::DeferToPresent, &[]);
        ctx.clear_texture(tex, ClearValue::color(0.0, 0.0, 1.0, 1.0));
        tokens.extend(ctx.end());
    }
    assert_eq!(tokens[0], tokens[1]);

    gfx.flush_gpu();
    assert!(gfx.are_tokens_complete(&tokens));
    assert_eq!(gfx.backend().stats().submissions, 1);
}

#[test]
fn test_deferred_without_swap_chain_submits_immediately() {
    let mut gfx = headless(Execution::Immediate);
    let tex = texture(&mut gfx, 4, 4, 1);
    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::DeferToPresent, &[]);
    ctx.clear_texture(tex, ClearValue::color(0.0, 0.0, 0.0, 0.0));
    let tokens = ctx.end();
    assert!(gfx.are_tokens_complete(&tokens));
}

#[test]
fn test_deferred_with_dependency_submits_immediately() {
    let mut gfx = with_swap_chain(Execution::Immediate, 2, 2);
    let buffer = storage_buffer(&mut gfx, 16);
    let mut upload = gfx.begin_scoped_command_context(QueueKind::Copy, SubmissionPolicy::Immediate, &[]);
    upload.enqueue_data_upload(buffer, 0, &[1, 2, 3, 4]).unwrap();
    let uploaded = upload.end();

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Compute, SubmissionPolicy::DeferToPresent, &uploaded);
    ctx.transition_buffer(buffer, BufferState::SHADER_READ);
    let tokens = ctx.end();
    assert!(gfx.are_tokens_complete(&tokens));
}

/// An immediate submission after deferred work on the same queue keeps the
/// queue's signal values increasing.
#[test]
fn test_immediate_after_deferred_keeps_order() {
    let mut gfx = with_swap_chain(Execution::Manual, 2, 2);
    let tex = texture(&mut gfx, 4, 4, 1);

    let mut deferred = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::DeferToPresent, &[]);
    deferred.clear_texture(tex, ClearValue::color(0.0, 1.0, 0.0, 1.0));
    let deferred_tokens = deferred.end();

    let mut immediate = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::Immediate, &[]);
    immediate.transition_texture(tex, TextureState::PIXEL_SHADER_READ);
    let immediate_tokens = immediate.end();

    assert!(deferred_tokens[0].value < immediate_tokens[0].value);
    gfx.backend_mut().execute_all();
    assert_eq!(gfx.backend().execution_log(), &[deferred_tokens[0], immediate_tokens[0]]);
}

#[test]
fn test_cpu_wait_on_deferred_token_flushes_batch() {
    let mut gfx = with_swap_chain(Execution::Immediate, 2, 2);
    let tex = texture(&mut gfx, 4, 4, 1);
    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::DeferToPresent, &[]);
    ctx.clear_texture(tex, ClearValue::color(0.0, 0.0, 0.0, 1.0));
    let tokens = ctx.end();

    gfx.wait_for_tokens_on_cpu(&tokens);
    assert!(gfx.are_tokens_complete(&tokens));
}

// ============================================================================
// Empty contexts
// ============================================================================

#[rstest]
#[case::immediate(SubmissionPolicy::Immediate)]
#[case::deferred(SubmissionPolicy::DeferToPresent)]
fn test_empty_context_returns_most_recent_token(#[case] policy: SubmissionPolicy) {
    let mut gfx = with_swap_chain(Execution::Immediate, 2, 2);
    let buffer = storage_buffer(&mut gfx, 16);
    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Compute, SubmissionPolicy::Immediate, &[]);
    ctx.transition_buffer(buffer, BufferState::UNORDERED_ACCESS);
    let previous = ctx.end();

    let tokens = gfx.begin_scoped_command_context(QueueKind::Compute, policy, &[]).end();
    assert_eq!(tokens, previous);
    assert_eq!(gfx.backend().stats().submissions, 1);
}

#[test]
fn test_dropped_context_is_submitted() {
    let mut gfx = headless(Execution::Manual);
    let buffer = storage_buffer(&mut gfx, 16);
    {
        let mut ctx = gfx.begin_scoped_command_context(QueueKind::Copy, SubmissionPolicy::Immediate, &[]);
        ctx.transition_buffer(buffer, BufferState::COPY_DEST);
    }
    assert_eq!(gfx.backend().pending_submissions(QueueKind::Copy), 1);
    assert_eq!(gfx.most_recent_tokens()[QueueKind::Copy.index()], SyncToken::new(QueueKind::Copy, 1));
}

// ============================================================================
// Barriers
// ============================================================================

#[test]
fn test_transition_to_current_state_emits_nothing() {
    let mut gfx = headless(Execution::Immediate);
    let tex = texture(&mut gfx, 4, 4, 1);

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::Immediate, &[]);
    ctx.transition_texture(tex, TextureState::PIXEL_SHADER_READ);
    ctx.end();
    let before = gfx.backend().stats();

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::Immediate, &[]);
    ctx.transition_texture(tex, TextureState::PIXEL_SHADER_READ);
    ctx.end();

    let after = gfx.backend().stats();
    assert_eq!(after.texture_barriers, before.texture_barriers);
    assert_eq!(after.submissions, before.submissions);
}

#[test]
fn test_adjacent_mip_transitions_merge() {
    let mut gfx = headless(Execution::Immediate);
    let tex = texture(&mut gfx, 8, 8, 3);

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::Immediate, &[]);
    ctx.transition_texture_range(tex, SubresourceRange::mips(0, 1, 0), TextureState::COPY_DEST);
    ctx.transition_texture_range(tex, SubresourceRange::mips(1, 1, 0), TextureState::COPY_DEST);
    ctx.end();

    let stats = gfx.backend().stats();
    assert_eq!(stats.texture_barrier_calls, 1);
    assert_eq!(stats.texture_barriers, 1);
    assert_eq!(gfx.texture_state(tex, 2, 0), TextureState::UNDEFINED);
}

#[test]
fn test_copy_transitions_automatically() {
    let mut gfx = headless(Execution::Immediate);
    let src = texture(&mut gfx, 4, 4, 1);
    let dst = texture(&mut gfx, 4, 4, 1);

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Copy, SubmissionPolicy::Immediate, &[]);
    ctx.copy_texture(src, dst);
    ctx.end();

    assert_eq!(gfx.texture_state(src, 0, 0), TextureState::COPY_SOURCE);
    assert_eq!(gfx.texture_state(dst, 0, 0), TextureState::COPY_DEST);
    // Both transitions went out in one call.
    assert_eq!(gfx.backend().stats().texture_barrier_calls, 1);
}

// ============================================================================
// Lifetimes
// ============================================================================

#[test]
fn test_destroyed_texture_outlives_its_work() {
    let mut gfx = headless(Execution::Manual);
    let tex = texture(&mut gfx, 4, 4, 1);
    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::Immediate, &[]);
    ctx.clear_texture(tex, ClearValue::color(0.0, 0.0, 0.0, 1.0));
    let tokens = ctx.end();

    gfx.destroy_texture(tex);
    for _ in 0..10 {
        gfx.cleanup_checkpoint();
        assert_eq!(gfx.backend().stats().textures_destroyed, 0);
    }
    assert!(!gfx.are_tokens_complete(&tokens));

    gfx.backend_mut().execute_all();
    gfx.cleanup_checkpoint();
    assert_eq!(gfx.backend().stats().textures_destroyed, 1);
}

#[test]
fn test_stale_handles_stay_invalid_after_reuse() {
    let mut gfx = headless(Execution::Immediate);
    let first = texture(&mut gfx, 4, 4, 1);
    let first_view = gfx.get_bindless_handle(TextureBinding::sampled(first)).unwrap();

    gfx.destroy_texture(first);
    gfx.cleanup_checkpoint();

    let second = texture(&mut gfx, 4, 4, 1);
    let second_view = gfx.get_bindless_handle(TextureBinding::sampled(second)).unwrap();

    assert!(!gfx.is_texture_valid(first));
    assert!(gfx.is_texture_valid(second));
    assert_ne!(first, second);
    assert!(!gfx.is_bindless_handle_valid(first_view));
    assert!(gfx.is_bindless_handle_valid(second_view));
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn test_shader_update_rebuilds_and_retires_pipeline() {
    let mut gfx = headless(Execution::Manual);
    let pipeline = compute_pipeline(&mut gfx, "blur");

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Compute, SubmissionPolicy::Immediate, &[]);
    assert!(ctx.set_pipeline(&pipeline));
    assert!(ctx.dispatch(1, 1, 1));
    ctx.end();

    gfx.set_shader_bytecode(ShaderKey::new("blur", ShaderStage::Compute), b"blur v2".to_vec());
    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Compute, SubmissionPolicy::Immediate, &[]);
    assert!(ctx.set_pipeline(&pipeline));
    assert!(ctx.dispatch(1, 1, 1));
    ctx.end();

    let stats = gfx.backend().stats();
    assert_eq!(stats.pipelines_compiled, 2);
    // The first dispatch may still be running.
    assert_eq!(stats.pipelines_destroyed, 0);

    gfx.flush_gpu();
    assert_eq!(gfx.backend().stats().pipelines_destroyed, 1);
}

#[test]
fn test_shader_error_skips_work_and_reaches_callback() {
    let mut gfx = headless(Execution::Immediate);
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    gfx.set_shader_error_callback(Box::new(move |error: &ShaderError| {
        sink.lock().push(error.message.clone());
    }));

    let pipeline = compute_pipeline(&mut gfx, "broken");
    gfx.report_shader_error(ShaderKey::new("broken", ShaderStage::Compute), "missing semicolon");

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Compute, SubmissionPolicy::Immediate, &[]);
    assert!(!ctx.set_pipeline(&pipeline));
    assert!(!ctx.dispatch(1, 1, 1));
    ctx.end();

    assert_eq!(gfx.backend().stats().dispatches, 0);
    gfx.cleanup_checkpoint();
    assert_eq!(*errors.lock(), vec!["missing semicolon".to_string()]);
}

#[test]
fn test_layout_invalidation_rebuilds_pipeline() {
    let mut gfx = headless(Execution::Immediate);
    let pipeline = compute_pipeline(&mut gfx, "cull");

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Compute, SubmissionPolicy::Immediate, &[]);
    ctx.set_pipeline(&pipeline);
    ctx.end();
    gfx.invalidate_resource_layout();
    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Compute, SubmissionPolicy::Immediate, &[]);
    ctx.set_pipeline(&pipeline);
    ctx.end();

    assert_eq!(gfx.pipeline_cache().build_count(), 2);
}

// ============================================================================
// Present
// ============================================================================

#[test]
fn test_present_copies_present_texture_to_back_buffer() {
    let mut gfx = with_swap_chain(Execution::Immediate, 2, 2);
    let present_texture = gfx.current_present_texture();
    let pattern = byte_pattern((SWAP_CHAIN_WIDTH * SWAP_CHAIN_HEIGHT * 4) as usize);

    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::DeferToPresent, &[]);
    ctx.enqueue_texture_upload(present_texture, 0, 0, &pattern)
        .unwrap();
    ctx.end();
    gfx.present().unwrap();

    let stats = gfx.backend().stats();
    assert_eq!(stats.presents, 1);
    assert_eq!(stats.clears, 0);
    assert_eq!(gfx.frame_index(), 1);
    assert_eq!(gfx.backend().back_buffer(0).subresource(0, 0), pattern);
    assert_ne!(gfx.current_present_texture(), present_texture);
}

#[test]
fn test_unwritten_present_texture_is_cleared() {
    let mut gfx = with_swap_chain(Execution::Immediate, 2, 2);
    gfx.present().unwrap();
    assert_eq!(gfx.backend().stats().clears, 1);

    let opaque_black = [0u8, 0, 0, 255].repeat((SWAP_CHAIN_WIDTH * SWAP_CHAIN_HEIGHT) as usize);
    assert_eq!(gfx.backend().back_buffer(0).subresource(0, 0), opaque_black);
}

#[test]
fn test_present_paces_frames() {
    let mut gfx = with_swap_chain(Execution::Manual, 1, 2);
    gfx.present().unwrap();
    assert_eq!(gfx.backend().pending_submissions(QueueKind::Graphics), 1);

    // One frame in flight: the second present waits for the first.
    gfx.present().unwrap();
    assert_eq!(gfx.backend().execution_log(), &[SyncToken::new(QueueKind::Graphics, 1)]);
    assert_eq!(gfx.backend().pending_submissions(QueueKind::Graphics), 1);
}

#[test]
fn test_invalid_swap_chain_still_submits_deferred_work() {
    let mut gfx = with_swap_chain(Execution::Immediate, 2, 2);
    let tex = texture(&mut gfx, 4, 4, 1);
    let mut ctx = gfx.begin_scoped_command_context(QueueKind::Graphics, SubmissionPolicy::DeferToPresent, &[]);
    ctx.clear_texture(tex, ClearValue::color(0.0, 0.0, 0.0, 1.0));
    let tokens = ctx.end();

    gfx.backend_mut().set_swap_chain_valid(false);
    gfx.present().unwrap();

    assert!(gfx.are_tokens_complete(&tokens));
    assert_eq!(gfx.backend().stats().presents, 0);
    assert_eq!(gfx.frame_index(), 0);
}

#[test]
#[should_panic(expected = "owned by the facade")]
fn test_destroying_present_texture_is_fatal() {
    let mut gfx = with_swap_chain(Execution::Immediate, 2, 2);
    let present_texture = gfx.current_present_texture();
    gfx.destroy_texture(present_texture);
}
