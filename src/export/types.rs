use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    animlink::{AnimationLinkEntry, SourceKind, TaxonomyId},
    manifest::AvatarMetadata,
    tensor::TensorPrecision,
    texture::ResizeInterpolation,
};

// ─── Options ──────────────────────────────────────────────────────────────────

/// Which optional component families are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentToggles {
    pub skeletons: bool,
    pub skins: bool,
    pub blendshapes: bool,
    pub animations: bool,
    /// Off by default: LOD output is unreliable for meshes with blendshapes.
    pub lods: bool,
    pub textures: bool,
}

impl Default for ComponentToggles {
    fn default() -> Self {
        Self {
            skeletons: true,
            skins: true,
            blendshapes: true,
            animations: true,
            lods: false,
            textures: true,
        }
    }
}

/// Export configuration shared by the CLI and library callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Uniform scale applied after the axis conversion.
    pub scale: f32,
    /// Store skin weights as external tensors instead of `JOINTS_0`/`WEIGHTS_0`.
    pub use_tensor_weights: bool,
    pub tensor_precision: TensorPrecision,
    pub components: ComponentToggles,
    /// Face ratio per generated LOD level, level 1 first.
    pub lod_ratios: Vec<f32>,
    pub face_taxonomies: Vec<TaxonomyId>,
    pub body_taxonomies: Vec<TaxonomyId>,
    /// Longer-side limit for stored textures; `None` keeps source sizes.
    pub texture_max_size: Option<u32>,
    pub texture_resize_method: ResizeInterpolation,
    pub metadata: AvatarMetadata,
    /// Fixed creation time for reproducible manifests.
    pub created_at: Option<Timestamp>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            use_tensor_weights: true,
            tensor_precision: TensorPrecision::Float32,
            components: ComponentToggles::default(),
            lod_ratios: vec![0.5, 0.2],
            face_taxonomies: vec![TaxonomyId::OpenxrFaceFb2],
            body_taxonomies: vec![TaxonomyId::OpenxrBodyFb],
            texture_max_size: None,
            texture_resize_method: ResizeInterpolation::Bilinear,
            metadata: AvatarMetadata::default(),
            created_at: None,
        }
    }
}

impl ExportOptions {
    /// Configured taxonomies, face first, in configuration order.
    pub fn taxonomies(&self) -> Vec<TaxonomyId> {
        self.face_taxonomies
            .iter()
            .chain(&self.body_taxonomies)
            .copied()
            .collect()
    }
}

// ─── Cancellation ─────────────────────────────────────────────────────────────

/// Cloneable cancellation flag checked between component emissions.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ─── Report ───────────────────────────────────────────────────────────────────

/// Severity level used by validation issues.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single issue noticed during export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub(crate) fn warning(code: &str, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            message,
        }
    }
}

/// Summary of one export run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportReport {
    pub avatar_name: String,
    pub asset_count: usize,
    pub mesh_count: usize,
    pub skin_count: usize,
    pub skeleton_count: usize,
    pub blendshape_count: usize,
    pub animation_count: usize,
    pub texture_count: usize,
    pub total_vertices: usize,
    pub total_faces: usize,
    /// Container paths in write order; the manifest is last.
    pub written_paths: Vec<String>,
    pub animation_links: Vec<AnimationLinkEntry>,
    pub unmatched_sources: Vec<(SourceKind, String)>,
    pub issues: Vec<ValidationIssue>,
}
