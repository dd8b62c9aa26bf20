//! Normalized, host-independent scene description consumed by the exporter.
//!
//! All geometry is expressed in the source convention (Z-up, Y-forward,
//! right-handed). Conversion to the target convention happens when assets are
//! built, never here.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

// ─── Scene ───────────────────────────────────────────────────────────────────

/// One export input. Immutable for the duration of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub name: String,
    pub meshes: Vec<MeshNode>,
    pub skeletons: Vec<SkeletonNode>,
    pub blendshape_sets: Vec<BlendshapeSet>,
    pub animations: Vec<AnimationClip>,
    pub materials: Vec<MaterialRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshNode {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    /// Empty when the mesh carries no normals.
    pub normals: Vec<[f32; 3]>,
    /// Empty when the mesh carries no texture coordinates.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list.
    pub indices: Vec<u32>,
    pub skin: Option<SkinBinding>,
    pub material: Option<String>,
    /// Grouping tag. Meshes sharing a tag end up in the same asset.
    pub asset: Option<String>,
    /// Ascending V boundaries of atlas tiles, `None` for a single texture.
    pub uv_tiles: Option<Vec<f32>>,
}

impl MeshNode {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }
}

/// Per-vertex joint influences. `joints[v]` and `weights[v]` list the
/// influences of vertex `v`, at most four by convention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinBinding {
    pub skeleton: String,
    pub joints: Vec<Vec<u32>>,
    pub weights: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonNode {
    pub name: String,
    pub joints: Vec<Joint>,
}

impl SkeletonNode {
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|joint| joint.name == name)
    }

    /// Index of the first joint without a parent.
    pub fn root_index(&self) -> Option<usize> {
        self.joints.iter().position(|joint| joint.parent < 0)
    }

    pub fn parent_indices(&self) -> Vec<Option<usize>> {
        self.joints
            .iter()
            .map(|joint| usize::try_from(joint.parent).ok())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint, `-1` for a root.
    pub parent: i32,
    /// Local bind transform relative to the parent, column-major.
    pub bind_transform: [f32; 16],
}

impl Default for Joint {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: -1,
            bind_transform: IDENTITY,
        }
    }
}

pub(crate) const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendshapeSet {
    pub name: String,
    /// Name of the basis mesh.
    pub basis: String,
    pub deltas: Vec<BlendshapeDelta>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendshapeDelta {
    pub name: String,
    pub offsets: Vec<[f32; 3]>,
}

// ─── Animation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationClip {
    pub name: String,
    pub skeleton: String,
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    /// Largest keyframe time over all channels, in seconds.
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|channel| channel.times.iter().copied())
            .fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationChannel {
    pub joint: String,
    pub path: ChannelPath,
    #[serde(default)]
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    /// Flattened keyframe values, `times.len() * path.components()` floats.
    pub values: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPath {
    Translation,
    /// Quaternion keys in `[x, y, z, w]` order.
    Rotation,
    Scale,
}

impl ChannelPath {
    pub fn components(self) -> usize {
        match self {
            ChannelPath::Rotation => 4,
            ChannelPath::Translation | ChannelPath::Scale => 3,
        }
    }

    pub fn as_gltf(self) -> &'static str {
        match self {
            ChannelPath::Translation => "translation",
            ChannelPath::Rotation => "rotation",
            ChannelPath::Scale => "scale",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
}

impl Interpolation {
    pub fn as_gltf(self) -> &'static str {
        match self {
            Interpolation::Linear => "LINEAR",
            Interpolation::Step => "STEP",
        }
    }
}

// ─── Materials ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialRef {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub textures: Vec<TextureAsset>,
}

impl Default for MaterialRef {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            textures: Vec::new(),
        }
    }
}

/// Raw encoded image referenced by a material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureAsset {
    /// Human-readable hint used for the stored file name.
    pub name: String,
    #[serde(default)]
    pub format: TextureFormat,
    #[serde(default)]
    pub channel: TextureChannel,
    /// Encoded bytes. Filled from `path` by [`load_scene`] when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl TextureFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TextureFormat::Png => "png",
            TextureFormat::Jpeg => "jpg",
            TextureFormat::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            TextureFormat::Png => "image/png",
            TextureFormat::Jpeg => "image/jpeg",
            TextureFormat::Webp => "image/webp",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(TextureFormat::Png),
            "jpg" | "jpeg" => Some(TextureFormat::Jpeg),
            "webp" => Some(TextureFormat::Webp),
            _ => None,
        }
    }
}

/// Material slot a texture is bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextureChannel {
    #[default]
    BaseColor,
    Normal,
    MetallicRoughness,
    Occlusion,
    Emissive,
}

impl TextureChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            TextureChannel::BaseColor => "baseColor",
            TextureChannel::Normal => "normal",
            TextureChannel::MetallicRoughness => "metallicRoughness",
            TextureChannel::Occlusion => "occlusion",
            TextureChannel::Emissive => "emissive",
        }
    }
}

// ─── Lookup and validation ───────────────────────────────────────────────────

impl SceneDescription {
    /// Parse a scene from JSON text. Texture paths are left unresolved.
    pub fn from_json_str(text: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshNode> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }

    pub fn skeleton(&self, name: &str) -> Option<&SkeletonNode> {
        self.skeletons.iter().find(|skeleton| skeleton.name == name)
    }

    pub fn material(&self, name: &str) -> Option<&MaterialRef> {
        self.materials.iter().find(|material| material.name == name)
    }

    /// Blendshape sets whose basis is `mesh`, in scene order.
    pub fn blendshapes_for<'a>(&'a self, mesh: &'a str) -> impl Iterator<Item = &'a BlendshapeSet> + 'a {
        self.blendshape_sets
            .iter()
            .filter(move |set| set.basis == mesh)
    }

    /// Checks the structural invariants of every component.
    ///
    /// Empty meshes are not rejected here; the asset builder reports them as
    /// [`ExportError::EmptyMeshAsset`] when they are emitted.
    pub fn validate(&self) -> Result<(), ExportError> {
        ensure_unique("mesh", self.meshes.iter().map(|mesh| mesh.name.as_str()))?;
        ensure_unique(
            "skeleton",
            self.skeletons.iter().map(|skeleton| skeleton.name.as_str()),
        )?;
        ensure_unique(
            "material",
            self.materials.iter().map(|material| material.name.as_str()),
        )?;
        ensure_unique(
            "animation",
            self.animations.iter().map(|clip| clip.name.as_str()),
        )?;

        for skeleton in &self.skeletons {
            validate_skeleton(skeleton)?;
        }
        for mesh in &self.meshes {
            self.validate_mesh(mesh)?;
        }
        for set in &self.blendshape_sets {
            self.validate_blendshape_set(set)?;
        }
        for clip in &self.animations {
            self.validate_animation(clip)?;
        }
        Ok(())
    }

    fn validate_mesh(&self, mesh: &MeshNode) -> Result<(), ExportError> {
        let vertex_count = mesh.vertex_count();
        if !mesh.normals.is_empty() && mesh.normals.len() != vertex_count {
            return Err(ExportError::invalid(
                &mesh.name,
                format!(
                    "{} normals for {} vertices",
                    mesh.normals.len(),
                    vertex_count
                ),
            ));
        }
        if !mesh.uvs.is_empty() && mesh.uvs.len() != vertex_count {
            return Err(ExportError::invalid(
                &mesh.name,
                format!("{} uvs for {} vertices", mesh.uvs.len(), vertex_count),
            ));
        }
        if mesh.indices.len() % 3 != 0 {
            return Err(ExportError::invalid(
                &mesh.name,
                "index count is not a multiple of 3",
            ));
        }
        if let Some(index) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(ExportError::invalid(
                &mesh.name,
                format!("index {} is out of range ({} vertices)", index, vertex_count),
            ));
        }
        if let Some(tiles) = &mesh.uv_tiles {
            if tiles.len() < 2 || tiles.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(ExportError::invalid(
                    &mesh.name,
                    "uv tile boundaries must be ascending with at least two entries",
                ));
            }
        }
        if let Some(material) = &mesh.material {
            if self.material(material).is_none() {
                return Err(ExportError::invalid(
                    &mesh.name,
                    format!("unknown material '{}'", material),
                ));
            }
        }

        if let Some(skin) = &mesh.skin {
            let skeleton = self.skeleton(&skin.skeleton).ok_or_else(|| {
                ExportError::MalformedSkinBinding {
                    mesh: mesh.name.clone(),
                    reason: format!("unknown skeleton '{}'", skin.skeleton),
                }
            })?;
            let joint_count = skeleton.joints.len();
            for (vertex, influences) in skin.joints.iter().enumerate() {
                if let Some(joint) = influences.iter().find(|&&j| j as usize >= joint_count) {
                    return Err(ExportError::MalformedSkinBinding {
                        mesh: mesh.name.clone(),
                        reason: format!(
                            "vertex {} references joint {} but skeleton '{}' has {} joints",
                            vertex, joint, skeleton.name, joint_count
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_blendshape_set(&self, set: &BlendshapeSet) -> Result<(), ExportError> {
        let basis = self.mesh(&set.basis).ok_or_else(|| {
            ExportError::invalid(&set.name, format!("unknown basis mesh '{}'", set.basis))
        })?;
        ensure_unique(
            "blendshape",
            set.deltas.iter().map(|delta| delta.name.as_str()),
        )?;

        for delta in &set.deltas {
            if delta.offsets.len() != basis.vertex_count() {
                return Err(ExportError::invalid(
                    &delta.name,
                    format!(
                        "{} offsets for basis '{}' with {} vertices",
                        delta.offsets.len(),
                        basis.name,
                        basis.vertex_count()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn validate_animation(&self, clip: &AnimationClip) -> Result<(), ExportError> {
        let skeleton = self.skeleton(&clip.skeleton).ok_or_else(|| {
            ExportError::invalid(&clip.name, format!("unknown skeleton '{}'", clip.skeleton))
        })?;

        for channel in &clip.channels {
            if skeleton.joint_index(&channel.joint).is_none() {
                return Err(ExportError::invalid(
                    &clip.name,
                    format!("channel targets unknown joint '{}'", channel.joint),
                ));
            }
            if channel.times.is_empty() {
                return Err(ExportError::invalid(
                    &clip.name,
                    format!("channel on '{}' has no keyframes", channel.joint),
                ));
            }
            let expected = channel.times.len() * channel.path.components();
            if channel.values.len() != expected {
                return Err(ExportError::invalid(
                    &clip.name,
                    format!(
                        "channel on '{}' has {} values, expected {}",
                        channel.joint,
                        channel.values.len(),
                        expected
                    ),
                ));
            }
            if channel.times.windows(2).any(|pair| pair[0] > pair[1]) {
                return Err(ExportError::invalid(
                    &clip.name,
                    format!("channel on '{}' has decreasing keyframe times", channel.joint),
                ));
            }
        }
        Ok(())
    }
}

fn validate_skeleton(skeleton: &SkeletonNode) -> Result<(), ExportError> {
    if skeleton.joints.is_empty() {
        return Err(ExportError::invalid(&skeleton.name, "skeleton has no joints"));
    }
    ensure_unique(
        "joint",
        skeleton.joints.iter().map(|joint| joint.name.as_str()),
    )?;

    for (index, joint) in skeleton.joints.iter().enumerate() {
        if joint.parent >= 0 && joint.parent as usize >= index {
            return Err(ExportError::invalid(
                &skeleton.name,
                format!(
                    "joint '{}' (index {}) has parent {} which does not precede it",
                    joint.name, index, joint.parent
                ),
            ));
        }
        if joint.parent < -1 {
            return Err(ExportError::invalid(
                &skeleton.name,
                format!("joint '{}' has invalid parent {}", joint.name, joint.parent),
            ));
        }
    }
    Ok(())
}

fn ensure_unique<'a>(
    label: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ExportError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(ExportError::invalid(label, format!("{} without a name", label)));
        }
        if !seen.insert(name) {
            return Err(ExportError::invalid(name, format!("duplicate {} name", label)));
        }
    }
    Ok(())
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Load a scene description from a JSON file.
///
/// Texture paths are resolved relative to the scene file and their bytes are
/// read eagerly; the format is inferred from the extension when the path has
/// a known one.
pub fn load_scene(path: &Path) -> Result<SceneDescription> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene file: {}", path.display()))?;
    let mut scene: SceneDescription = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse scene file: {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    for material in &mut scene.materials {
        for texture in &mut material.textures {
            resolve_texture_bytes(texture, base_dir)?;
        }
    }

    scene
        .validate()
        .with_context(|| format!("invalid scene description: {}", path.display()))?;
    Ok(scene)
}

fn resolve_texture_bytes(texture: &mut TextureAsset, base_dir: &Path) -> Result<()> {
    if !texture.data.is_empty() {
        return Ok(());
    }
    let Some(relative) = texture.path.as_ref() else {
        anyhow::bail!("texture '{}' has neither data nor path", texture.name);
    };

    let resolved = base_dir.join(relative);
    texture.data = fs::read(&resolved)
        .with_context(|| format!("failed to read texture: {}", resolved.display()))?;
    if let Some(format) = resolved
        .extension()
        .and_then(|extension| extension.to_str())
        .and_then(TextureFormat::from_extension)
    {
        texture.format = format;
    }
    Ok(())
}
