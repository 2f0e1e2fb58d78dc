//! Graphics error types.
//!
//! Recoverable failures (unsupported formats, pipeline compile errors,
//! unmappable memory) are returned as [`GraphicsError`]. Contract violations
//! (double open, stale handles, presenting without a swap chain, descriptor
//! exhaustion) are not errors the caller can handle: they go through
//! [`fatal!`], which logs and panics. Known gaps go through
//! [`not_implemented!`] so they are never mistaken for either.

use thiserror::Error;

use crate::types::{BufferUsage, TextureFormat, TextureUsage};

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicsError {
    /// Failed to initialize the graphics system.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
    /// A texture format cannot be used the requested way.
    #[error("format {format:?} does not support usage {usage:?}")]
    UnsupportedFormat {
        format: TextureFormat,
        usage: TextureUsage,
    },
    /// A buffer usage combination is not supported.
    #[error("unsupported buffer usage {0:?}")]
    UnsupportedBufferUsage(BufferUsage),
    /// A pipeline failed to compile.
    #[error("pipeline '{pipeline}' failed to compile: {message}")]
    PipelineCompilationFailed { pipeline: String, message: String },
    /// A shader has no usable bytecode yet.
    #[error("shader '{0}' has no compiled bytecode")]
    ShaderUnavailable(String),
    /// CPU access was requested on GPU-only memory.
    #[error("resource '{0}' is not CPU visible")]
    ResourceNotMappable(String),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
}

/// Abort on a contract violation.
///
/// Logs the formatted message at error level, then panics with it.
macro_rules! fatal {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        log::error!("{message}");
        panic!("{message}")
    }};
}

/// Abort on a path the backend knowingly does not support yet.
macro_rules! not_implemented {
    ($($arg:tt)*) => {{
        let message = format!("not implemented: {}", format_args!($($arg)*));
        log::error!("{message}");
        panic!("{message}")
    }};
}

pub(crate) use fatal;
pub(crate) use not_implemented;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::OutOfMemory;
        assert_eq!(err.to_string(), "out of GPU memory");

        let err = GraphicsError::PipelineCompilationFailed {
            pipeline: "gbuffer".to_string(),
            message: "missing entry point".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "pipeline 'gbuffer' failed to compile: missing entry point"
        );

        let err = GraphicsError::UnsupportedFormat {
            format: TextureFormat::Depth32Float,
            usage: TextureUsage::STORAGE_BINDING,
        };
        assert!(err.to_string().contains("Depth32Float"));
    }

    #[test]
    #[should_panic(expected = "handle 3 is stale")]
    fn test_fatal_panics_with_message() {
        fatal!("handle {} is stale", 3);
    }

    #[test]
    #[should_panic(expected = "not implemented: dynamic descriptors")]
    fn test_not_implemented_prefix() {
        not_implemented!("dynamic descriptors");
    }
}
