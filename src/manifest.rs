//! `arf.json` document model.
//!
//! Every cross-reference is an integer component ID. [`Manifest::validate_references`]
//! is run before serialisation so a manifest with dangling indices is never
//! emitted.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::{
    animlink::AnimationLinkEntry,
    error::ExportError,
    ids::ComponentKind,
    scene::TextureChannel,
    tensor::TensorPrecision,
};

pub const ARF_SIGNATURE: &str = "ARF";
pub const ARF_VERSION: &str = "1.0";
/// Container path of the manifest.
/// Media type of dense tensor data entries.
pub const DENSE_TENSOR_TYPE: &str = "application/mpeg.arf.dense";
pub const MANIFEST_PATH: &str = "arf.json";

// ─── Metadata configuration ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for LicenseInfo {
    fn default() -> Self {
        Self {
            name: "All rights reserved".to_string(),
            url: None,
        }
    }
}

/// Caller-supplied avatar metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarMetadata {
    /// Stable avatar id. Derived from the scene name when unset.
    pub avatar_id: Option<String>,
    /// Display name. Falls back to the scene name.
    pub avatar_name: Option<String>,
    pub creator: CreatorInfo,
    pub characteristics: BTreeMap<String, Value>,
    pub license: LicenseInfo,
    pub tags: Vec<String>,
}

impl Default for AvatarMetadata {
    fn default() -> Self {
        let mut characteristics = BTreeMap::new();
        characteristics.insert("age".to_string(), json!(25));
        characteristics.insert("gender".to_string(), json!("unspecified"));
        Self {
            avatar_id: None,
            avatar_name: None,
            creator: CreatorInfo::default(),
            characteristics,
            license: LicenseInfo::default(),
            tags: Vec::new(),
        }
    }
}

/// Avatar id derived from the scene name: first 16 hex chars of its SHA-256.
pub fn derive_avatar_id(scene_name: &str) -> String {
    let digest = hex::encode(Sha256::digest(scene_name.as_bytes()));
    digest[..16].to_string()
}

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub preamble: Preamble,
    pub structure: Structure,
    pub components: Components,
    pub animation_links: Vec<AnimationLinkEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preamble {
    pub signature: String,
    pub version: String,
    pub supported_animations: SupportedAnimations,
    pub metadata: Metadata,
}

/// Taxonomy URNs a consumer can drive this avatar with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedAnimations {
    pub skeletal: Vec<String>,
    #[serde(default)]
    pub facial: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub avatar: AvatarInfo,
    pub creator: CreatorInfo,
    pub characteristics: BTreeMap<String, Value>,
    pub license: LicenseInfo,
    pub tags: Vec<String>,
    /// The only time-varying field of the document.
    pub created: Timestamp,
}

impl Metadata {
    pub fn from_config(config: &AvatarMetadata, scene_name: &str, created: Timestamp) -> Self {
        Self {
            avatar: AvatarInfo {
                id: config
                    .avatar_id
                    .clone()
                    .unwrap_or_else(|| derive_avatar_id(scene_name)),
                name: config
                    .avatar_name
                    .clone()
                    .unwrap_or_else(|| scene_name.to_string()),
            },
            creator: config.creator.clone(),
            characteristics: config.characteristics.clone(),
            license: config.license.clone(),
            tags: config.tags.clone(),
            created,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub assets: Vec<AssetEntry>,
}

/// One avatar part with its levels of detail, finest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    pub id: u32,
    pub name: String,
    pub lods: Vec<LodEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LodEntry {
    pub name: String,
    pub meshes: Vec<u32>,
    pub skins: Vec<u32>,
    pub skeletons: Vec<u32>,
    pub blendshapes: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    pub meshes: Vec<MeshComponent>,
    pub skins: Vec<SkinComponent>,
    pub skeletons: Vec<SkeletonComponent>,
    pub blendshapes: Vec<BlendshapeComponent>,
    pub animations: Vec<AnimationComponent>,
    pub textures: Vec<TextureComponent>,
    pub data: Vec<DataComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshComponent {
    pub id: u32,
    pub name: String,
    pub uri: String,
    pub vertex_count: usize,
    pub face_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Texture component ids used by the mesh material.
    #[serde(default)]
    pub textures: Vec<u32>,
}

/// Skin binding of one mesh.
///
/// In tensor mode `joints` and `weights` are ids into `components.data`. In
/// embedded mode `uri` names the mesh asset that carries `JOINTS_0` /
/// `WEIGHTS_0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinComponent {
    pub id: u32,
    pub name: String,
    pub mesh: u32,
    pub skeleton: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joints: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<TensorPrecision>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub embedded: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonJoint {
    pub name: String,
    pub parent: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonComponent {
    pub id: u32,
    pub name: String,
    pub uri: String,
    pub joints: Vec<SkeletonJoint>,
    /// Index of the root joint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendshapeComponent {
    pub id: u32,
    pub name: String,
    pub uri: String,
    pub mesh: u32,
    pub vertex_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationComponent {
    pub id: u32,
    pub name: String,
    pub uri: String,
    pub skeleton: u32,
    /// Seconds.
    pub duration: f32,
    pub channels: usize,
}

/// A standalone dense tensor file under `data/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataComponent {
    pub id: u32,
    pub name: String,
    pub uri: String,
    #[serde(rename = "type")]
    pub media_type: String,
    /// Component type code stored in the tensor header.
    pub dtype: i32,
    pub shape: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureComponent {
    pub id: u32,
    pub uri: String,
    pub channel: TextureChannel,
    pub mime_type: String,
}

// ─── Validation and output ───────────────────────────────────────────────────

impl Manifest {
    /// Empty manifest with the fixed preamble fields filled in.
    pub fn new(supported_animations: SupportedAnimations, metadata: Metadata) -> Self {
        Self {
            preamble: Preamble {
                signature: ARF_SIGNATURE.to_string(),
                version: ARF_VERSION.to_string(),
                supported_animations,
                metadata,
            },
            structure: Structure::default(),
            components: Components::default(),
            animation_links: Vec::new(),
        }
    }

    /// Checks that component ids match their array positions and that every
    /// index referenced from `structure` or `components` exists.
    pub fn validate_references(&self) -> Result<(), ExportError> {
        let components = &self.components;
        check_positions("components.meshes", components.meshes.iter().map(|c| c.id))?;
        check_positions("components.skins", components.skins.iter().map(|c| c.id))?;
        check_positions("components.skeletons", components.skeletons.iter().map(|c| c.id))?;
        check_positions("components.blendshapes", components.blendshapes.iter().map(|c| c.id))?;
        check_positions("components.animations", components.animations.iter().map(|c| c.id))?;
        check_positions("components.textures", components.textures.iter().map(|c| c.id))?;
        check_positions("components.data", components.data.iter().map(|c| c.id))?;
        check_positions("structure.assets", self.structure.assets.iter().map(|a| a.id))?;

        let counts = |kind: ComponentKind| -> usize {
            match kind {
                ComponentKind::Mesh => components.meshes.len(),
                ComponentKind::Skin => components.skins.len(),
                ComponentKind::Skeleton => components.skeletons.len(),
                ComponentKind::Blendshape => components.blendshapes.len(),
                ComponentKind::Animation => components.animations.len(),
                ComponentKind::Texture => components.textures.len(),
                ComponentKind::Data => components.data.len(),
                ComponentKind::Asset => self.structure.assets.len(),
            }
        };
        let check = |section: String, kind: ComponentKind, id: u32| -> Result<(), ExportError> {
            if (id as usize) < counts(kind) {
                Ok(())
            } else {
                Err(ExportError::DanglingReference { section, kind, id })
            }
        };

        for asset in &self.structure.assets {
            for lod in &asset.lods {
                let section = format!("structure.assets[{}].lods.{}", asset.id, lod.name);
                for &id in &lod.meshes {
                    check(section.clone(), ComponentKind::Mesh, id)?;
                }
                for &id in &lod.skins {
                    check(section.clone(), ComponentKind::Skin, id)?;
                }
                for &id in &lod.skeletons {
                    check(section.clone(), ComponentKind::Skeleton, id)?;
                }
                for &id in &lod.blendshapes {
                    check(section.clone(), ComponentKind::Blendshape, id)?;
                }
            }
        }
        for mesh in &components.meshes {
            for &id in &mesh.textures {
                check(format!("components.meshes[{}]", mesh.id), ComponentKind::Texture, id)?;
            }
        }
        for skin in &components.skins {
            let section = format!("components.skins[{}]", skin.id);
            check(section.clone(), ComponentKind::Mesh, skin.mesh)?;
            check(section.clone(), ComponentKind::Skeleton, skin.skeleton)?;
            for id in skin.joints.into_iter().chain(skin.weights) {
                check(section.clone(), ComponentKind::Data, id)?;
            }
        }
        for blendshape in &components.blendshapes {
            check(
                format!("components.blendshapes[{}]", blendshape.id),
                ComponentKind::Mesh,
                blendshape.mesh,
            )?;
        }
        for animation in &components.animations {
            check(
                format!("components.animations[{}]", animation.id),
                ComponentKind::Skeleton,
                animation.skeleton,
            )?;
        }
        Ok(())
    }

    /// Validates references and serialises the document as pretty UTF-8 JSON.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ExportError> {
        self.validate_references()?;
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ExportError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn check_positions(section: &str, ids: impl Iterator<Item = u32>) -> Result<(), ExportError> {
    for (position, id) in ids.enumerate() {
        if id as usize != position {
            return Err(ExportError::invalid(
                section,
                format!("entry {} carries id {}", position, id),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time() -> Timestamp {
        "2024-05-01T12:00:00Z".parse().expect("timestamp")
    }

    fn manifest_with_skin(skeleton: u32) -> Manifest {
        let metadata = Metadata::from_config(&AvatarMetadata::default(), "Avatar", fixed_time());
        let mut manifest = Manifest::new(SupportedAnimations::default(), metadata);
        manifest.components.meshes.push(MeshComponent {
            id: 0,
            name: "Body".to_string(),
            uri: "meshes/Body.glb".to_string(),
            vertex_count: 3,
            face_count: 1,
            material: None,
            textures: Vec::new(),
        });
        manifest.components.skeletons.push(SkeletonComponent {
            id: 0,
            name: "Armature".to_string(),
            uri: "meshes/Armature_skeleton.glb".to_string(),
            joints: vec![SkeletonJoint {
                name: "Hips".to_string(),
                parent: -1,
            }],
            root: Some(0),
        });
        manifest.components.skins.push(SkinComponent {
            id: 0,
            name: "Body_skin".to_string(),
            mesh: 0,
            skeleton,
            uri: None,
            joints: Some(0),
            weights: Some(1),
            precision: Some(TensorPrecision::Float32),
            embedded: false,
        });
        for (id, name, dtype) in [(0, "Body_skin_joints", 5121), (1, "Body_skin_weights", 5126)] {
            manifest.components.data.push(DataComponent {
                id,
                name: name.to_string(),
                uri: format!("data/{}.bin", name),
                media_type: DENSE_TENSOR_TYPE.to_string(),
                dtype,
                shape: vec![3, 4],
            });
        }
        manifest.structure.assets.push(AssetEntry {
            id: 0,
            name: "body".to_string(),
            lods: vec![LodEntry {
                name: "high_quality".to_string(),
                meshes: vec![0],
                skins: vec![0],
                skeletons: vec![0],
                blendshapes: Vec::new(),
            }],
        });
        manifest
    }

    #[test]
    fn given_consistent_manifest_when_validating_then_references_pass() {
        assert!(manifest_with_skin(0).validate_references().is_ok());
    }

    #[test]
    fn given_skin_with_missing_skeleton_when_validating_then_dangling_reference_is_reported() {
        let result = manifest_with_skin(3).validate_references();

        assert!(matches!(
            result,
            Err(ExportError::DanglingReference {
                kind: ComponentKind::Skeleton,
                id: 3,
                ..
            })
        ));
    }

    #[test]
    fn given_manifest_when_serialising_then_top_level_sections_use_camel_case() {
        let bytes = manifest_with_skin(0).to_json_bytes().expect("serialise");
        let value: Value = serde_json::from_slice(&bytes).expect("json");

        assert_eq!(value["preamble"]["signature"], "ARF");
        assert_eq!(value["preamble"]["version"], "1.0");
        assert_eq!(value["preamble"]["metadata"]["created"], "2024-05-01T12:00:00Z");
        assert!(value["preamble"]["supportedAnimations"]["skeletal"].is_array());
        assert!(value["animationLinks"].is_array());
        assert_eq!(value["components"]["skins"][0]["weights"], 1);
        assert_eq!(value["components"]["data"][1]["type"], DENSE_TENSOR_TYPE);
        assert_eq!(value["components"]["data"][1]["uri"], "data/Body_skin_weights.bin");
        assert!(value["components"]["skins"][0].get("embedded").is_none());
        assert_eq!(value["structure"]["assets"][0]["lods"][0]["meshes"][0], 0);
    }

    #[test]
    fn given_serialised_manifest_when_parsing_back_then_document_is_equal() {
        let manifest = manifest_with_skin(0);
        let bytes = manifest.to_json_bytes().expect("serialise");

        assert_eq!(Manifest::from_json_slice(&bytes).expect("parse"), manifest);
    }

    #[test]
    fn given_no_avatar_id_when_building_metadata_then_id_is_derived_from_scene_name() {
        let metadata = Metadata::from_config(&AvatarMetadata::default(), "Avatar", fixed_time());

        assert_eq!(metadata.avatar.id, derive_avatar_id("Avatar"));
        assert_eq!(metadata.avatar.id.len(), 16);
        assert_eq!(metadata.avatar.name, "Avatar");
        assert_eq!(metadata.characteristics["age"], json!(25));
    }

    #[test]
    fn given_skin_with_missing_weight_tensor_when_validating_then_dangling_data_is_reported() {
        let mut manifest = manifest_with_skin(0);
        manifest.components.data.pop();

        assert!(matches!(
            manifest.validate_references(),
            Err(ExportError::DanglingReference {
                kind: ComponentKind::Data,
                id: 1,
                ..
            })
        ));
    }

    #[test]
    fn given_out_of_order_ids_when_validating_then_error_is_returned() {
        let mut manifest = manifest_with_skin(0);
        manifest.components.meshes[0].id = 1;

        assert!(matches!(
            manifest.validate_references(),
            Err(ExportError::InvalidScene { .. })
        ));
    }
}
