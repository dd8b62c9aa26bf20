use thiserror::Error;

use crate::ids::ComponentKind;

/// Broad failure class used by callers to decide how to surface an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The scene description is malformed or inconsistent.
    Input,
    /// Storage, encoding or container failure. Fatal for the run.
    Resource,
    /// The caller requested cancellation between component emissions.
    Cancelled,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("mesh '{mesh}' has no vertices or no faces")]
    EmptyMeshAsset { mesh: String },

    #[error("malformed skin binding on mesh '{mesh}': {reason}")]
    MalformedSkinBinding { mesh: String, reason: String },

    #[error("animation source '{name}' was detected more than once")]
    DuplicateAnimationSource { name: String },

    #[error("invalid scene component '{component}': {reason}")]
    InvalidScene { component: String, reason: String },

    #[error("{kind} '{name}' is referenced before it was emitted")]
    UnresolvedReference { kind: ComponentKind, name: String },

    #[error("{section} references {kind} id {id}, which does not exist")]
    DanglingReference {
        section: String,
        kind: ComponentKind,
        id: u32,
    },

    #[error("LOD strategy changed the vertex schema of mesh '{mesh}': {reason}")]
    LodSchemaMismatch { mesh: String, reason: String },

    #[error("texture digest collision on suffix {suffix}")]
    TextureDigestCollision { suffix: String },

    #[error("asset path '{path}' was written twice")]
    DuplicateAssetPath { path: String },

    #[error("export cancelled")]
    Cancelled,

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GLB error: {0}")]
    Glb(#[from] gltf::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl ExportError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ExportError::EmptyMeshAsset { .. }
            | ExportError::MalformedSkinBinding { .. }
            | ExportError::DuplicateAnimationSource { .. }
            | ExportError::InvalidScene { .. }
            | ExportError::UnresolvedReference { .. }
            | ExportError::LodSchemaMismatch { .. } => ErrorClass::Input,
            ExportError::Cancelled => ErrorClass::Cancelled,
            _ => ErrorClass::Resource,
        }
    }

    pub(crate) fn invalid(component: impl Into<String>, reason: impl Into<String>) -> Self {
        ExportError::InvalidScene {
            component: component.into(),
            reason: reason.into(),
        }
    }
}
