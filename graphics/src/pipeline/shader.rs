//! Compiled shader bookkeeping.
//!
//! Shader compilation happens outside this crate. The [`ShaderStore`] only
//! receives results: bytecode when a compile succeeds, an error message when
//! it fails. Either way the shader's version moves forward, which is what the
//! pipeline cache watches to know when a pipeline must be rebuilt.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Pipeline stage a shader runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
    /// Compute shader.
    Compute,
    /// Ray generation shader.
    RayGeneration,
    /// Ray miss shader.
    Miss,
    /// Ray closest-hit shader.
    ClosestHit,
}

/// Identifies one compiled permutation of a shader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderKey {
    /// Source name, e.g. `"postprocess/tonemap"`.
    pub name: String,
    /// Entry point function.
    pub entry_point: String,
    /// Stage.
    pub stage: ShaderStage,
    /// Preprocessor defines, `(name, value)`, in the order given.
    pub defines: Vec<(String, String)>,
}

impl ShaderKey {
    /// Key for `name` with the `main` entry point and no defines.
    pub fn new(name: impl Into<String>, stage: ShaderStage) -> Self {
        Self {
            name: name.into(),
            entry_point: "main".to_string(),
            stage,
            defines: Vec::new(),
        }
    }

    /// Use another entry point.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    /// Add a define.
    pub fn with_define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.push((name.into(), value.into()));
        self
    }
}

impl fmt::Display for ShaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({:?})", self.name, self.entry_point, self.stage)
    }
}

/// Compiled shader code, shared between pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBytecode {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub code: Arc<[u8]>,
}

/// A reported compile failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderError {
    pub shader: ShaderKey,
    pub message: String,
}

/// Callback receiving shader errors at the next cleanup checkpoint.
pub type ShaderErrorCallback = Box<dyn FnMut(&ShaderError) + Send>;

#[derive(Debug, Default)]
struct ShaderEntry {
    version: u64,
    bytecode: Option<ShaderBytecode>,
}

/// Latest bytecode and version of every known shader.
#[derive(Default)]
pub struct ShaderStore {
    entries: HashMap<ShaderKey, ShaderEntry>,
    pending_errors: Vec<ShaderError>,
    error_callback: Option<ShaderErrorCallback>,
}

impl fmt::Debug for ShaderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderStore")
            .field("shaders", &self.entries.len())
            .field("pending_errors", &self.pending_errors.len())
            .field("has_callback", &self.error_callback.is_some())
            .finish()
    }
}

impl ShaderStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install new bytecode for `key` and bump its version.
    pub fn set_shader_bytecode(&mut self, key: ShaderKey, code: impl Into<Arc<[u8]>>) -> u64 {
        let bytecode = ShaderBytecode {
            stage: key.stage,
            entry_point: key.entry_point.clone(),
            code: code.into(),
        };
        let entry = self.entries.entry(key).or_default();
        entry.version += 1;
        entry.bytecode = Some(bytecode);
        entry.version
    }

    /// Record a failed compile of `key`.
    ///
    /// The shader has no usable bytecode afterwards, so pipelines using it
    /// are skipped until a successful compile arrives.
    pub fn report_shader_error(&mut self, key: ShaderKey, message: impl Into<String>) -> u64 {
        let message = message.into();
        let entry = self.entries.entry(key.clone()).or_default();
        entry.version += 1;
        entry.bytecode = None;
        let version = entry.version;
        self.pending_errors.push(ShaderError {
            shader: key,
            message,
        });
        version
    }

    /// Current version of `key`; zero if nothing was ever reported for it.
    pub fn version(&self, key: &ShaderKey) -> u64 {
        self.entries.get(key).map_or(0, |entry| entry.version)
    }

    /// Usable bytecode of `key`.
    pub fn bytecode(&self, key: &ShaderKey) -> Option<&ShaderBytecode> {
        self.entries.get(key).and_then(|entry| entry.bytecode.as_ref())
    }

    /// Number of errors waiting for [`flush_errors`](Self::flush_errors).
    pub fn pending_error_count(&self) -> usize {
        self.pending_errors.len()
    }

    /// Route future errors to `callback` instead of the log.
    pub fn set_error_callback(&mut self, callback: ShaderErrorCallback) {
        self.error_callback = Some(callback);
    }

    /// Deliver queued errors.
    pub fn flush_errors(&mut self) {
        if self.pending_errors.is_empty() {
            return;
        }
        for error in self.pending_errors.drain(..) {
            match self.error_callback.as_mut() {
                Some(callback) => callback(&error),
                None => log::error!("Shader {} failed to compile: {}", error.shader, error.message),
            }
        }
    }
}
