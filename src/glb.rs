//! Isolated binary model assets.
//!
//! Every asset owns its own buffer: a mesh GLB holds one mesh, a blendshape
//! GLB holds one delta, a skeleton GLB holds one joint hierarchy and an
//! animation GLB holds one clip. Nothing from the rest of the scene leaks in.

use std::borrow::Cow;

use gltf::binary::{Glb, Header};
use nalgebra::Matrix4;
use serde_json::{Map, Value, json};

use crate::{
    error::ExportError,
    scene::{AnimationClip, ChannelPath, MaterialRef, MeshNode, SkeletonNode, TextureChannel},
    tensor::{MAX_INFLUENCES, PaddedInfluences},
    transform::{
        UvTiling, compute_world_matrices, convert_matrix, convert_normal, convert_offset,
        convert_position, convert_rotation, convert_scale, convert_uv, decompose_trs,
    },
};

const GENERATOR: &str = concat!("arf-export ", env!("CARGO_PKG_VERSION"));

const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

const COMPONENT_U16: u32 = 5123;
const COMPONENT_U32: u32 = 5125;
const COMPONENT_F32: u32 = 5126;

const MODE_POINTS: u32 = 0;

const SAMPLER_LINEAR: u32 = 9729;
const SAMPLER_LINEAR_MIPMAP_LINEAR: u32 = 9987;
const SAMPLER_REPEAT: u32 = 10497;

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Accumulates glTF JSON sections and one binary chunk.
#[derive(Debug, Default)]
pub struct GlbBuilder {
    bin: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
    nodes: Vec<Value>,
    meshes: Vec<Value>,
    materials: Vec<Value>,
    textures: Vec<Value>,
    images: Vec<Value>,
    samplers: Vec<Value>,
    skins: Vec<Value>,
    animations: Vec<Value>,
    scene_nodes: Vec<usize>,
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a 4-byte aligned buffer view.
    fn push_view(&mut self, bytes: &[u8], target: Option<u32>) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let mut view = json!({
            "buffer": 0,
            "byteOffset": self.bin.len(),
            "byteLength": bytes.len(),
        });
        if let Some(target) = target {
            view["target"] = json!(target);
        }
        self.bin.extend_from_slice(bytes);
        self.buffer_views.push(view);
        self.buffer_views.len() - 1
    }

    fn push_accessor(
        &mut self,
        bytes: &[u8],
        component_type: u32,
        accessor_type: &str,
        count: usize,
        target: Option<u32>,
    ) -> usize {
        let view = self.push_view(bytes, target);
        self.accessors.push(json!({
            "bufferView": view,
            "componentType": component_type,
            "count": count,
            "type": accessor_type,
        }));
        self.accessors.len() - 1
    }

    fn set_bounds(&mut self, accessor: usize, min: Vec<f32>, max: Vec<f32>) {
        self.accessors[accessor]["min"] = json!(min);
        self.accessors[accessor]["max"] = json!(max);
    }

    pub fn push_vec3(&mut self, values: &[[f32; 3]], with_bounds: bool) -> usize {
        let bytes = f32_bytes(values.iter().flatten().copied());
        let accessor = self.push_accessor(&bytes, COMPONENT_F32, "VEC3", values.len(), Some(ARRAY_BUFFER));
        if with_bounds && !values.is_empty() {
            let (min, max) = bounds(values);
            self.set_bounds(accessor, min.to_vec(), max.to_vec());
        }
        accessor
    }

    pub fn push_vec2(&mut self, values: &[[f32; 2]]) -> usize {
        let bytes = f32_bytes(values.iter().flatten().copied());
        self.push_accessor(&bytes, COMPONENT_F32, "VEC2", values.len(), Some(ARRAY_BUFFER))
    }

    pub fn push_indices(&mut self, indices: &[u32]) -> usize {
        let mut bytes = Vec::with_capacity(indices.len() * 4);
        for index in indices {
            bytes.extend_from_slice(&index.to_le_bytes());
        }
        self.push_accessor(
            &bytes,
            COMPONENT_U32,
            "SCALAR",
            indices.len(),
            Some(ELEMENT_ARRAY_BUFFER),
        )
    }

    /// Keyframe times; animation inputs always carry bounds.
    pub fn push_times(&mut self, times: &[f32]) -> usize {
        let bytes = f32_bytes(times.iter().copied());
        let accessor = self.push_accessor(&bytes, COMPONENT_F32, "SCALAR", times.len(), None);
        let min = times.iter().copied().fold(f32::INFINITY, f32::min);
        let max = times.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        self.set_bounds(accessor, vec![min], vec![max]);
        accessor
    }

    pub fn push_floats(&mut self, values: &[f32], accessor_type: &str, count: usize) -> usize {
        let bytes = f32_bytes(values.iter().copied());
        self.push_accessor(&bytes, COMPONENT_F32, accessor_type, count, None)
    }

    pub fn push_mat4(&mut self, matrices: &[Matrix4<f32>]) -> usize {
        let bytes = f32_bytes(matrices.iter().flat_map(|m| m.as_slice().iter().copied()));
        self.push_accessor(&bytes, COMPONENT_F32, "MAT4", matrices.len(), None)
    }

    pub fn push_joints_u16(&mut self, joints: &[[u16; MAX_INFLUENCES]]) -> usize {
        let mut bytes = Vec::with_capacity(joints.len() * MAX_INFLUENCES * 2);
        for joint in joints.iter().flatten() {
            bytes.extend_from_slice(&joint.to_le_bytes());
        }
        self.push_accessor(&bytes, COMPONENT_U16, "VEC4", joints.len(), Some(ARRAY_BUFFER))
    }

    pub fn push_weights(&mut self, weights: &[[f32; MAX_INFLUENCES]]) -> usize {
        let bytes = f32_bytes(weights.iter().flatten().copied());
        self.push_accessor(&bytes, COMPONENT_F32, "VEC4", weights.len(), Some(ARRAY_BUFFER))
    }

    pub fn add_node(&mut self, node: Value) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn add_mesh(&mut self, mesh: Value) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_skin(&mut self, skin: Value) -> usize {
        self.skins.push(skin);
        self.skins.len() - 1
    }

    pub fn add_animation(&mut self, animation: Value) -> usize {
        self.animations.push(animation);
        self.animations.len() - 1
    }

    pub fn add_scene_root(&mut self, node: usize) {
        self.scene_nodes.push(node);
    }

    /// Adds a PBR material whose textures live outside the asset.
    ///
    /// `textures` pairs each bound channel with the relative URI of its
    /// deduplicated file.
    pub fn add_material(&mut self, material: &MaterialRef, textures: &[(TextureChannel, String)]) -> usize {
        let mut pbr = json!({
            "baseColorFactor": material.base_color,
            "metallicFactor": material.metallic,
            "roughnessFactor": material.roughness,
        });
        let mut entry = json!({
            "name": material.name,
            "alphaMode": "OPAQUE",
            "doubleSided": true,
        });

        for (channel, uri) in textures {
            let texture = self.add_texture(uri);
            let info = json!({ "index": texture });
            match channel {
                TextureChannel::BaseColor => pbr["baseColorTexture"] = info,
                TextureChannel::MetallicRoughness => pbr["metallicRoughnessTexture"] = info,
                TextureChannel::Normal => entry["normalTexture"] = info,
                TextureChannel::Occlusion => entry["occlusionTexture"] = info,
                TextureChannel::Emissive => {
                    entry["emissiveTexture"] = info;
                    entry["emissiveFactor"] = json!([1.0, 1.0, 1.0]);
                }
            }
        }
        entry["pbrMetallicRoughness"] = pbr;

        self.materials.push(entry);
        self.materials.len() - 1
    }

    fn add_texture(&mut self, uri: &str) -> usize {
        if self.samplers.is_empty() {
            self.samplers.push(json!({
                "magFilter": SAMPLER_LINEAR,
                "minFilter": SAMPLER_LINEAR_MIPMAP_LINEAR,
                "wrapS": SAMPLER_REPEAT,
                "wrapT": SAMPLER_REPEAT,
            }));
        }
        let image = match self.images.iter().position(|image| image["uri"] == uri) {
            Some(existing) => existing,
            None => {
                self.images.push(json!({ "uri": uri }));
                self.images.len() - 1
            }
        };
        self.textures.push(json!({ "sampler": 0, "source": image }));
        self.textures.len() - 1
    }

    /// Serializes the document and binary chunk into GLB bytes.
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut root = Map::new();
        root.insert("asset".to_string(), json!({ "version": "2.0", "generator": GENERATOR }));

        let has_bin = !self.bin.is_empty();
        if has_bin {
            root.insert("buffers".to_string(), json!([{ "byteLength": self.bin.len() }]));
        }
        for (key, section) in [
            ("bufferViews", self.buffer_views),
            ("accessors", self.accessors),
            ("nodes", self.nodes),
            ("meshes", self.meshes),
            ("materials", self.materials),
            ("textures", self.textures),
            ("images", self.images),
            ("samplers", self.samplers),
            ("skins", self.skins),
            ("animations", self.animations),
        ] {
            if !section.is_empty() {
                root.insert(key.to_string(), Value::Array(section));
            }
        }
        if !self.scene_nodes.is_empty() {
            root.insert("scene".to_string(), json!(0));
            root.insert("scenes".to_string(), json!([{ "nodes": self.scene_nodes }]));
        }

        let json_bytes = serde_json::to_vec(&Value::Object(root))?;
        let glb = Glb {
            header: Header {
                magic: *b"glTF",
                version: 2,
                length: 0,
            },
            json: Cow::Owned(json_bytes),
            bin: has_bin.then_some(Cow::Owned(self.bin)),
        };

        let mut out = Vec::new();
        glb.to_writer(&mut out)?;
        Ok(out)
    }
}

fn f32_bytes(values: impl Iterator<Item = f32>) -> Vec<u8> {
    let mut bytes = Vec::new();
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn bounds(values: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for value in values {
        for axis in 0..3 {
            min[axis] = min[axis].min(value[axis]);
            max[axis] = max[axis].max(value[axis]);
        }
    }
    (min, max)
}

// ─── Skeleton helpers ────────────────────────────────────────────────────────

/// Joint nodes and inverse bind matrices of one skeleton in target space.
struct SkeletonNodes {
    joint_nodes: Vec<usize>,
    root_nodes: Vec<usize>,
}

/// Converted local bind matrices of every joint.
fn converted_locals(skeleton: &SkeletonNode, scale: f32) -> Vec<Matrix4<f32>> {
    skeleton
        .joints
        .iter()
        .map(|joint| convert_matrix(&Matrix4::from_column_slice(&joint.bind_transform), scale))
        .collect()
}

/// Adds one node per joint (TRS from the converted bind transform) and wires
/// the hierarchy.
fn add_joint_nodes(builder: &mut GlbBuilder, skeleton: &SkeletonNode, scale: f32) -> SkeletonNodes {
    let locals = converted_locals(skeleton, scale);
    let first = builder.nodes.len();

    let mut joint_nodes = Vec::with_capacity(skeleton.joints.len());
    for (joint, local) in skeleton.joints.iter().zip(&locals) {
        let (translation, rotation, scale) = decompose_trs(local);
        joint_nodes.push(builder.add_node(json!({
            "name": joint.name,
            "translation": translation,
            "rotation": rotation,
            "scale": scale,
        })));
    }

    let mut root_nodes = Vec::new();
    for (index, parent) in skeleton.parent_indices().into_iter().enumerate() {
        match parent {
            Some(parent) => {
                let parent_node = &mut builder.nodes[first + parent];
                match parent_node.get_mut("children").and_then(Value::as_array_mut) {
                    Some(children) => children.push(json!(first + index)),
                    None => parent_node["children"] = json!([first + index]),
                }
            }
            None => root_nodes.push(first + index),
        }
    }

    SkeletonNodes {
        joint_nodes,
        root_nodes,
    }
}

/// Inverse bind matrices in target space, in joint order.
///
/// Each joint's bind pose is its accumulated world matrix; a joint whose
/// world matrix is singular fails the whole skeleton.
pub fn inverse_bind_matrices(skeleton: &SkeletonNode, scale: f32) -> Result<Vec<Matrix4<f32>>, ExportError> {
    let locals = converted_locals(skeleton, scale);
    let worlds = compute_world_matrices(&locals, &skeleton.parent_indices());

    skeleton
        .joints
        .iter()
        .zip(worlds)
        .map(|(joint, world)| {
            world.try_inverse().ok_or_else(|| {
                ExportError::invalid(
                    &skeleton.name,
                    format!("bind transform of joint '{}' is not invertible", joint.name),
                )
            })
        })
        .collect()
}

fn add_skin(
    builder: &mut GlbBuilder,
    skeleton: &SkeletonNode,
    nodes: &SkeletonNodes,
    scale: f32,
) -> Result<usize, ExportError> {
    let matrices = inverse_bind_matrices(skeleton, scale)?;
    let ibm = builder.push_mat4(&matrices);

    let mut skin = json!({
        "name": skeleton.name,
        "inverseBindMatrices": ibm,
        "joints": nodes.joint_nodes,
    });
    if let Some(&root) = nodes.root_nodes.first() {
        skin["skeleton"] = json!(root);
    }
    Ok(builder.add_skin(skin))
}

// ─── Asset builders ──────────────────────────────────────────────────────────

/// Material bound to a mesh asset, with texture URIs relative to the asset.
#[derive(Debug, Clone)]
pub struct MaterialBinding<'a> {
    pub material: &'a MaterialRef,
    pub textures: Vec<(TextureChannel, String)>,
}

/// Skin data embedded with native `JOINTS_0` / `WEIGHTS_0` attributes.
#[derive(Debug, Clone)]
pub struct EmbeddedSkin<'a> {
    pub skeleton: &'a SkeletonNode,
    pub influences: PaddedInfluences,
}

#[derive(Debug, Clone, Default)]
pub struct MeshAssetOptions<'a> {
    pub scale: f32,
    pub material: Option<MaterialBinding<'a>>,
    pub embedded_skin: Option<EmbeddedSkin<'a>>,
}

/// Builds the GLB for one mesh.
///
/// Geometry is converted to the target convention and V is flipped, per tile
/// when the mesh declares atlas tiles. Skin weights are left out unless
/// `embedded_skin` is set.
pub fn build_mesh_asset(mesh: &MeshNode, options: &MeshAssetOptions<'_>) -> Result<Vec<u8>, ExportError> {
    if mesh.is_empty() {
        return Err(ExportError::EmptyMeshAsset {
            mesh: mesh.name.clone(),
        });
    }

    let mut builder = GlbBuilder::new();
    let scale = options.scale;

    let positions: Vec<[f32; 3]> = mesh
        .positions
        .iter()
        .map(|&position| convert_position(position, scale))
        .collect();
    let mut attributes = Map::new();
    attributes.insert("POSITION".to_string(), json!(builder.push_vec3(&positions, true)));

    if !mesh.normals.is_empty() {
        let normals: Vec<[f32; 3]> = mesh.normals.iter().map(|&normal| convert_normal(normal)).collect();
        attributes.insert("NORMAL".to_string(), json!(builder.push_vec3(&normals, false)));
    }
    if !mesh.uvs.is_empty() {
        let tiling = match &mesh.uv_tiles {
            Some(boundaries) => UvTiling::Tiles(boundaries.clone()),
            None => UvTiling::Single,
        };
        let uvs: Vec<[f32; 2]> = mesh.uvs.iter().map(|&uv| convert_uv(uv, &tiling)).collect();
        attributes.insert("TEXCOORD_0".to_string(), json!(builder.push_vec2(&uvs)));
    }

    let skin = match &options.embedded_skin {
        Some(embedded) => {
            let (joints, weights) = embedded_attributes(&mesh.name, embedded)?;
            attributes.insert("JOINTS_0".to_string(), json!(builder.push_joints_u16(&joints)));
            attributes.insert("WEIGHTS_0".to_string(), json!(builder.push_weights(&weights)));

            let nodes = add_joint_nodes(&mut builder, embedded.skeleton, scale);
            let skin = add_skin(&mut builder, embedded.skeleton, &nodes, scale)?;
            for &root in &nodes.root_nodes {
                builder.add_scene_root(root);
            }
            Some(skin)
        }
        None => None,
    };

    let indices = builder.push_indices(&mesh.indices);
    let mut primitive = json!({
        "attributes": Value::Object(attributes),
        "indices": indices,
    });
    if let Some(binding) = &options.material {
        primitive["material"] = json!(builder.add_material(binding.material, &binding.textures));
    }

    let mesh_index = builder.add_mesh(json!({
        "name": mesh.name,
        "primitives": [primitive],
    }));
    let mut node = json!({ "name": mesh.name, "mesh": mesh_index });
    if let Some(skin) = skin {
        node["skin"] = json!(skin);
    }
    let node = builder.add_node(node);
    builder.add_scene_root(node);

    builder.finish()
}

fn embedded_attributes(
    mesh: &str,
    embedded: &EmbeddedSkin<'_>,
) -> Result<(Vec<[u16; MAX_INFLUENCES]>, Vec<[f32; MAX_INFLUENCES]>), ExportError> {
    let mut joints = Vec::with_capacity(embedded.influences.joints.len());
    for slots in &embedded.influences.joints {
        let mut narrowed = [0u16; MAX_INFLUENCES];
        for (slot, &joint) in slots.iter().enumerate() {
            narrowed[slot] = u16::try_from(joint).map_err(|_| ExportError::MalformedSkinBinding {
                mesh: mesh.to_string(),
                reason: format!("joint {} does not fit JOINTS_0", joint),
            })?;
        }
        joints.push(narrowed);
    }

    // Native skinning expects weights summing to one.
    let weights = embedded
        .influences
        .weights
        .iter()
        .map(|slots| {
            let total: f32 = slots.iter().sum();
            if total > 0.0 {
                slots.map(|weight| weight / total)
            } else {
                *slots
            }
        })
        .collect();

    Ok((joints, weights))
}

/// Builds the GLB for one blendshape delta: per-vertex position offsets as a
/// point primitive, in basis vertex order.
pub fn build_blendshape_asset(name: &str, offsets: &[[f32; 3]], scale: f32) -> Result<Vec<u8>, ExportError> {
    if offsets.is_empty() {
        return Err(ExportError::EmptyMeshAsset {
            mesh: name.to_string(),
        });
    }

    let mut builder = GlbBuilder::new();
    let converted: Vec<[f32; 3]> = offsets
        .iter()
        .map(|&offset| convert_offset(offset, scale))
        .collect();
    let position = builder.push_vec3(&converted, true);

    let mesh = builder.add_mesh(json!({
        "name": name,
        "primitives": [{
            "attributes": { "POSITION": position },
            "mode": MODE_POINTS,
        }],
    }));
    let node = builder.add_node(json!({ "name": name, "mesh": mesh }));
    builder.add_scene_root(node);

    builder.finish()
}

/// Builds the GLB for one skeleton: the joint hierarchy plus a skin carrying
/// inverse bind matrices.
pub fn build_skeleton_asset(skeleton: &SkeletonNode, scale: f32) -> Result<Vec<u8>, ExportError> {
    let mut builder = GlbBuilder::new();
    let nodes = add_joint_nodes(&mut builder, skeleton, scale);
    add_skin(&mut builder, skeleton, &nodes, scale)?;
    for &root in &nodes.root_nodes {
        builder.add_scene_root(root);
    }
    builder.finish()
}

/// Builds the GLB for one animation clip targeting the joints of `skeleton`.
pub fn build_animation_asset(
    clip: &AnimationClip,
    skeleton: &SkeletonNode,
    scale: f32,
) -> Result<Vec<u8>, ExportError> {
    let mut builder = GlbBuilder::new();
    let nodes = add_joint_nodes(&mut builder, skeleton, scale);
    for &root in &nodes.root_nodes {
        builder.add_scene_root(root);
    }

    let mut samplers = Vec::with_capacity(clip.channels.len());
    let mut channels = Vec::with_capacity(clip.channels.len());
    for channel in &clip.channels {
        let joint = skeleton.joint_index(&channel.joint).ok_or_else(|| {
            ExportError::invalid(&clip.name, format!("unknown joint '{}'", channel.joint))
        })?;

        let width = channel.path.components();
        let values: Vec<f32> = channel
            .values
            .chunks_exact(width)
            .flat_map(|key| match channel.path {
                ChannelPath::Translation => convert_position([key[0], key[1], key[2]], scale).to_vec(),
                ChannelPath::Scale => convert_scale([key[0], key[1], key[2]]).to_vec(),
                ChannelPath::Rotation => convert_rotation([key[0], key[1], key[2], key[3]]).to_vec(),
            })
            .collect();

        let input = builder.push_times(&channel.times);
        let accessor_type = if width == 4 { "VEC4" } else { "VEC3" };
        let output = builder.push_floats(&values, accessor_type, channel.times.len());

        samplers.push(json!({
            "input": input,
            "output": output,
            "interpolation": channel.interpolation.as_gltf(),
        }));
        channels.push(json!({
            "sampler": samplers.len() - 1,
            "target": { "node": nodes.joint_nodes[joint], "path": channel.path.as_gltf() },
        }));
    }

    builder.add_animation(json!({
        "name": clip.name,
        "samplers": samplers,
        "channels": channels,
    }));
    builder.finish()
}
