//! Pipelines and the dependencies they are built from.
//!
//! A pipeline is described by a [`PipelineKey`]: the shaders it uses (by
//! [`ShaderKey`]) plus fixed-function state. Shaders and the bindless
//! [`ResourceLayout`] both carry versions; the [`PipelineStateCache`]
//! records the versions each pipeline was built from and rebuilds it when one
//! moves.
//!
//! ```text
//!   ShaderStore ──version──┐
//!                          ├──► PipelineStateCache ──► Backend::compile_pipeline
//!   ResourceLayout ─version┘            │
//!                                       └─ stale object ──► CleanupQueue
//! ```

mod cache;
mod shader;

pub use cache::PipelineStateCache;
pub use shader::{
    ShaderBytecode, ShaderError, ShaderErrorCallback, ShaderKey, ShaderStage, ShaderStore,
};

use crate::sync::QueueKind;
use crate::types::TextureFormat;

/// Where a pipeline binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineBindPoint {
    Graphics,
    Compute,
    RayTracing,
}

impl PipelineBindPoint {
    /// Returns true if commands for this bind point can run on `queue`.
    pub fn is_supported_on(self, queue: QueueKind) -> bool {
        match self {
            Self::Graphics | Self::RayTracing => queue == QueueKind::Graphics,
            Self::Compute => queue != QueueKind::Copy,
        }
    }
}

/// Primitive assembly mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
    LineList,
    PointList,
}

/// Rasterisation pipeline description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphicsPipelineKey {
    pub vertex: ShaderKey,
    pub fragment: Option<ShaderKey>,
    pub color_formats: Vec<TextureFormat>,
    pub depth_format: Option<TextureFormat>,
    pub topology: PrimitiveTopology,
    pub depth_write: bool,
}

impl GraphicsPipelineKey {
    /// Pipeline writing one color target.
    pub fn new(vertex: ShaderKey, fragment: ShaderKey, color_format: TextureFormat) -> Self {
        Self {
            vertex,
            fragment: Some(fragment),
            color_formats: vec![color_format],
            depth_format: None,
            topology: PrimitiveTopology::default(),
            depth_write: false,
        }
    }

    /// Add a depth target.
    pub fn with_depth(mut self, format: TextureFormat, write: bool) -> Self {
        self.depth_format = Some(format);
        self.depth_write = write;
        self
    }

    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }
}

/// Everything that identifies a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PipelineKey {
    Graphics(GraphicsPipelineKey),
    Compute {
        shader: ShaderKey,
    },
    RayTracing {
        ray_generation: ShaderKey,
        miss: Vec<ShaderKey>,
        closest_hit: Vec<ShaderKey>,
    },
}

impl PipelineKey {
    /// Compute pipeline of a single shader.
    pub fn compute(shader: ShaderKey) -> Self {
        Self::Compute { shader }
    }

    pub fn bind_point(&self) -> PipelineBindPoint {
        match self {
            Self::Graphics(_) => PipelineBindPoint::Graphics,
            Self::Compute { .. } => PipelineBindPoint::Compute,
            Self::RayTracing { .. } => PipelineBindPoint::RayTracing,
        }
    }

    /// Shaders the pipeline is built from, in a stable order.
    pub fn shaders(&self) -> Vec<&ShaderKey> {
        match self {
            Self::Graphics(desc) => std::iter::once(&desc.vertex)
                .chain(desc.fragment.as_ref())
                .collect(),
            Self::Compute { shader } => vec![shader],
            Self::RayTracing {
                ray_generation,
                miss,
                closest_hit,
            } => std::iter::once(ray_generation)
                .chain(miss)
                .chain(closest_hit)
                .collect(),
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> String {
        match self.shaders().first() {
            Some(first) => format!("{:?} {}", self.bind_point(), first.name),
            None => format!("{:?}", self.bind_point()),
        }
    }
}

/// The bindless layout every pipeline is built against.
///
/// Backends rebuild their native layout when descriptor tables change shape;
/// bumping the version makes every cached pipeline stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceLayout {
    version: u64,
}

impl ResourceLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Mark every pipeline built against this layout as stale.
    pub fn invalidate(&mut self) {
        self.version += 1;
    }
}
