//! # Vexel Core
//!
//! Backend-independent building blocks for the Vexel RHI:
//!
//! - [`handle::Handle`]: copyable index + generation pair
//! - [`index_allocator::IndexAllocator`]: generational free list over a bounded index space
//! - [`registry::Registry`]: arena owning values addressed by handles
//! - [`profiling`]: optional Tracy instrumentation

pub mod handle;
pub mod index_allocator;
pub mod profiling;
pub mod registry;

pub use handle::Handle;
pub use index_allocator::IndexAllocator;
pub use registry::Registry;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
