//! Version-checked pipeline cache.

use std::collections::HashMap;

use super::{PipelineKey, ResourceLayout, ShaderBytecode, ShaderStore};
use crate::backend::Backend;
use crate::cleanup::{CleanupQueue, CleanupResource};
use crate::error::GraphicsError;
use crate::sync::SyncToken;

struct CachedPipeline<P> {
    /// `None` when the last build attempt failed.
    pipeline: Option<P>,
    /// Why `pipeline` is `None`.
    error: Option<GraphicsError>,
    shader_versions: Vec<u64>,
    layout_version: u64,
}

/// Maps [`PipelineKey`]s to native pipelines and the dependency versions they
/// were built from.
pub struct PipelineStateCache<B: Backend> {
    entries: HashMap<PipelineKey, CachedPipeline<B::Pipeline>>,
    builds: u64,
}

impl<B: Backend> Default for PipelineStateCache<B> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            builds: 0,
        }
    }
}

impl<B: Backend> PipelineStateCache<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached keys, including failed ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of build attempts so far.
    pub fn build_count(&self) -> u64 {
        self.builds
    }

    /// Why `key` currently has no usable pipeline, if it was requested and
    /// has none.
    pub fn last_error(&self, key: &PipelineKey) -> Option<&GraphicsError> {
        self.entries.get(key).and_then(|entry| entry.error.as_ref())
    }

    /// Return the usable pipeline for `key`, building it if it is missing or
    /// stale.
    ///
    /// A replaced pipeline may still be referenced by submitted command
    /// lists, so it goes to `cleanup` tagged with `retire_after`. `None` means
    /// there is no usable pipeline: a shader has no bytecode, or the build
    /// failed. Failures are remembered until a dependency version moves.
    #[allow(clippy::too_many_arguments)]
    pub fn get_pipeline(
        &mut self,
        key: &PipelineKey,
        backend: &mut B,
        shaders: &ShaderStore,
        layout: &ResourceLayout,
        cleanup: &mut CleanupQueue<B>,
        retire_after: &[SyncToken],
    ) -> Option<&B::Pipeline> {
        let shader_keys = key.shaders();
        let versions: Vec<u64> = shader_keys.iter().map(|shader| shaders.version(shader)).collect();

        let fresh = self.entries.get(key).is_some_and(|entry| {
            entry.layout_version == layout.version() && entry.shader_versions == versions
        });

        if !fresh {
            if let Some(stale) = self.entries.remove(key) {
                if let Some(pipeline) = stale.pipeline {
                    log::debug!("Pipeline '{}' is stale, rebuilding", key.label());
                    cleanup.push(CleanupResource::Pipeline(pipeline), retire_after.to_vec());
                }
            }

            let bytecode: Option<Vec<&ShaderBytecode>> =
                shader_keys.iter().map(|shader| shaders.bytecode(shader)).collect();
            let built = match bytecode {
                Some(bytecode) => {
                    self.builds += 1;
                    backend.compile_pipeline(key, &bytecode).inspect_err(|err| log::error!("{err}"))
                }
                None => {
                    let missing = shader_keys
                        .iter()
                        .find(|shader| shaders.bytecode(shader).is_none())
                        .map_or_else(|| key.label(), |shader| shader.name.clone());
                    let err = GraphicsError::ShaderUnavailable(missing);
                    log::debug!("Pipeline '{}' not built: {err}", key.label());
                    Err(err)
                }
            };
            if built.is_ok() {
                log::trace!("Built pipeline '{}'", key.label());
            }

            let (pipeline, error) = match built {
                Ok(pipeline) => (Some(pipeline), None),
                Err(err) => (None, Some(err)),
            };
            self.entries.insert(
                key.clone(),
                CachedPipeline {
                    pipeline,
                    error,
                    shader_versions: versions,
                    layout_version: layout.version(),
                },
            );
        }

        self.entries.get(key).and_then(|entry| entry.pipeline.as_ref())
    }

    /// Take every cached pipeline out of the cache.
    pub fn drain(&mut self) -> impl Iterator<Item = B::Pipeline> + '_ {
        self.entries.drain().filter_map(|(_, entry)| entry.pipeline)
    }
}
