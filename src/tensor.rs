//! Dense tensor encoding of per-vertex skin influences.
//!
//! Joint indices and weights are written to two standalone buffers, separate
//! from mesh geometry. Each buffer is a small self-describing tensor:
//!
//! ```text
//! i32 num_dims
//! i32 dims[num_dims]
//! i32 dtype            (glTF component type code, 5131 for float16)
//! data                 (little-endian, row-major)
//! ```
//!
//! Both tensors have shape `[vertex_count, 4]`. Unused influence slots carry
//! joint 0 with weight 0.

use half::f16;
use serde::{Deserialize, Serialize};

use crate::{error::ExportError, scene::SkinBinding};

pub const MAX_INFLUENCES: usize = 4;

pub const DTYPE_U8: i32 = 5121;
pub const DTYPE_U16: i32 = 5123;
pub const DTYPE_U32: i32 = 5125;
pub const DTYPE_F32: i32 = 5126;
pub const DTYPE_F16: i32 = 5131;

/// Storage precision of skin weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorPrecision {
    Float16,
    #[default]
    Float32,
}

impl TensorPrecision {
    pub fn dtype(self) -> i32 {
        match self {
            TensorPrecision::Float16 => DTYPE_F16,
            TensorPrecision::Float32 => DTYPE_F32,
        }
    }
}

/// Integer width used for joint indices, chosen from the skeleton size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U8,
    U16,
    U32,
}

impl IndexWidth {
    pub fn for_joint_count(joint_count: usize) -> Self {
        if joint_count <= 1 << 8 {
            IndexWidth::U8
        } else if joint_count <= 1 << 16 {
            IndexWidth::U16
        } else {
            IndexWidth::U32
        }
    }

    pub fn dtype(self) -> i32 {
        match self {
            IndexWidth::U8 => DTYPE_U8,
            IndexWidth::U16 => DTYPE_U16,
            IndexWidth::U32 => DTYPE_U32,
        }
    }

    fn from_dtype(dtype: i32) -> Option<Self> {
        match dtype {
            DTYPE_U8 => Some(IndexWidth::U8),
            DTYPE_U16 => Some(IndexWidth::U16),
            DTYPE_U32 => Some(IndexWidth::U32),
            _ => None,
        }
    }
}

// ─── Dense tensor ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DenseTensor {
    pub shape: Vec<u32>,
    pub dtype: i32,
    pub data: Vec<u8>,
}

impl DenseTensor {
    pub fn element_count(&self) -> usize {
        self.shape.iter().map(|&dim| dim as usize).product()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 * (2 + self.shape.len()) + self.data.len());
        bytes.extend_from_slice(&(self.shape.len() as i32).to_le_bytes());
        for &dim in &self.shape {
            bytes.extend_from_slice(&(dim as i32).to_le_bytes());
        }
        bytes.extend_from_slice(&self.dtype.to_le_bytes());
        bytes.extend_from_slice(&self.data);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExportError> {
        let mut cursor = 0usize;
        let num_dims = read_i32(bytes, &mut cursor)?;
        if num_dims < 0 {
            return Err(malformed_tensor(format!("negative rank {}", num_dims)));
        }

        let mut shape = Vec::with_capacity(num_dims as usize);
        for _ in 0..num_dims {
            let dim = read_i32(bytes, &mut cursor)?;
            let dim = u32::try_from(dim)
                .map_err(|_| malformed_tensor(format!("negative dimension {}", dim)))?;
            shape.push(dim);
        }
        let dtype = read_i32(bytes, &mut cursor)?;

        let tensor = Self {
            shape,
            dtype,
            data: bytes[cursor..].to_vec(),
        };
        let expected = tensor.element_count() * dtype_size(dtype)?;
        if tensor.data.len() != expected {
            return Err(malformed_tensor(format!(
                "payload is {} bytes, expected {}",
                tensor.data.len(),
                expected
            )));
        }
        Ok(tensor)
    }
}

fn dtype_size(dtype: i32) -> Result<usize, ExportError> {
    match dtype {
        DTYPE_U8 => Ok(1),
        DTYPE_U16 | DTYPE_F16 => Ok(2),
        DTYPE_U32 | DTYPE_F32 => Ok(4),
        other => Err(malformed_tensor(format!("unknown dtype {}", other))),
    }
}

fn read_i32(bytes: &[u8], cursor: &mut usize) -> Result<i32, ExportError> {
    let end = *cursor + 4;
    let slice = bytes
        .get(*cursor..end)
        .ok_or_else(|| malformed_tensor("truncated header".to_string()))?;
    *cursor = end;
    Ok(i32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

fn malformed_tensor(reason: String) -> ExportError {
    ExportError::invalid("tensor", reason)
}

// ─── Skin encoding ───────────────────────────────────────────────────────────

/// Encoded joint and weight tensors for one skinned mesh.
#[derive(Debug, Clone)]
pub struct EncodedSkin {
    pub joints: DenseTensor,
    pub weights: DenseTensor,
}

/// Influences padded to four slots per vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaddedInfluences {
    pub joints: Vec<[u32; MAX_INFLUENCES]>,
    pub weights: Vec<[f32; MAX_INFLUENCES]>,
}

/// Checks a binding against its mesh and skeleton sizes and pads every vertex
/// to four slots.
pub fn pad_influences(
    mesh: &str,
    binding: &SkinBinding,
    vertex_count: usize,
    joint_count: usize,
) -> Result<PaddedInfluences, ExportError> {
    let malformed = |reason: String| ExportError::MalformedSkinBinding {
        mesh: mesh.to_string(),
        reason,
    };

    if binding.joints.len() != vertex_count {
        return Err(malformed(format!(
            "{} joint lists for {} vertices",
            binding.joints.len(),
            vertex_count
        )));
    }
    if binding.weights.len() != vertex_count {
        return Err(malformed(format!(
            "{} weight lists for {} vertices",
            binding.weights.len(),
            vertex_count
        )));
    }

    let mut padded = PaddedInfluences {
        joints: Vec::with_capacity(vertex_count),
        weights: Vec::with_capacity(vertex_count),
    };
    for (vertex, (joints, weights)) in binding.joints.iter().zip(&binding.weights).enumerate() {
        if joints.len() > MAX_INFLUENCES {
            return Err(malformed(format!(
                "vertex {} has {} influences (max {})",
                vertex,
                joints.len(),
                MAX_INFLUENCES
            )));
        }
        if joints.len() != weights.len() {
            return Err(malformed(format!(
                "vertex {} has {} joints but {} weights",
                vertex,
                joints.len(),
                weights.len()
            )));
        }

        let mut joint_slots = [0u32; MAX_INFLUENCES];
        let mut weight_slots = [0f32; MAX_INFLUENCES];
        for (slot, (&joint, &weight)) in joints.iter().zip(weights).enumerate() {
            if joint as usize >= joint_count {
                return Err(malformed(format!(
                    "vertex {} references joint {} of {}",
                    vertex, joint, joint_count
                )));
            }
            joint_slots[slot] = joint;
            weight_slots[slot] = weight;
        }
        padded.joints.push(joint_slots);
        padded.weights.push(weight_slots);
    }
    Ok(padded)
}

/// Encodes a skin binding into joint and weight tensors.
///
/// # Arguments
///
/// * `mesh` - Mesh name, used for error context.
/// * `binding` - Per-vertex influences.
/// * `vertex_count` - Vertex count of the bound mesh.
/// * `joint_count` - Joint count of the bound skeleton; selects index width.
/// * `precision` - Weight storage precision.
pub fn encode_skin(
    mesh: &str,
    binding: &SkinBinding,
    vertex_count: usize,
    joint_count: usize,
    precision: TensorPrecision,
) -> Result<EncodedSkin, ExportError> {
    let padded = pad_influences(mesh, binding, vertex_count, joint_count)?;
    let width = IndexWidth::for_joint_count(joint_count);
    let shape = vec![vertex_count as u32, MAX_INFLUENCES as u32];

    let mut joint_data = Vec::with_capacity(vertex_count * MAX_INFLUENCES * 4);
    for &joint in padded.joints.iter().flatten() {
        match width {
            IndexWidth::U8 => joint_data.push(joint as u8),
            IndexWidth::U16 => joint_data.extend_from_slice(&(joint as u16).to_le_bytes()),
            IndexWidth::U32 => joint_data.extend_from_slice(&joint.to_le_bytes()),
        }
    }

    let mut weight_data = Vec::with_capacity(vertex_count * MAX_INFLUENCES * 4);
    for &weight in padded.weights.iter().flatten() {
        match precision {
            TensorPrecision::Float16 => {
                weight_data.extend_from_slice(&f16::from_f32(weight).to_bits().to_le_bytes())
            }
            TensorPrecision::Float32 => weight_data.extend_from_slice(&weight.to_le_bytes()),
        }
    }

    Ok(EncodedSkin {
        joints: DenseTensor {
            shape: shape.clone(),
            dtype: width.dtype(),
            data: joint_data,
        },
        weights: DenseTensor {
            shape,
            dtype: precision.dtype(),
            data: weight_data,
        },
    })
}

/// Decodes joint and weight tensors back into padded per-vertex slots.
pub fn decode_skin(
    joints: &DenseTensor,
    weights: &DenseTensor,
) -> Result<PaddedInfluences, ExportError> {
    if joints.shape != weights.shape
        || joints.shape.len() != 2
        || joints.shape[1] as usize != MAX_INFLUENCES
    {
        return Err(malformed_tensor(format!(
            "unexpected skin tensor shapes {:?} / {:?}",
            joints.shape, weights.shape
        )));
    }

    let width = IndexWidth::from_dtype(joints.dtype)
        .ok_or_else(|| malformed_tensor(format!("joint dtype {}", joints.dtype)))?;
    let joint_values: Vec<u32> = match width {
        IndexWidth::U8 => joints.data.iter().map(|&b| u32::from(b)).collect(),
        IndexWidth::U16 => joints
            .data
            .chunks_exact(2)
            .map(|c| u32::from(u16::from_le_bytes([c[0], c[1]])))
            .collect(),
        IndexWidth::U32 => joints
            .data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    };
    let weight_values: Vec<f32> = match weights.dtype {
        DTYPE_F16 => weights
            .data
            .chunks_exact(2)
            .map(|c| f16::from_bits(u16::from_le_bytes([c[0], c[1]])).to_f32())
            .collect(),
        DTYPE_F32 => weights
            .data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        other => return Err(malformed_tensor(format!("weight dtype {}", other))),
    };

    let vertex_count = joints.shape[0] as usize;
    if joint_values.len() != vertex_count * MAX_INFLUENCES
        || weight_values.len() != vertex_count * MAX_INFLUENCES
    {
        return Err(malformed_tensor("payload does not match shape".to_string()));
    }

    let mut decoded = PaddedInfluences::default();
    for (joint_chunk, weight_chunk) in joint_values
        .chunks_exact(MAX_INFLUENCES)
        .zip(weight_values.chunks_exact(MAX_INFLUENCES))
    {
        decoded
            .joints
            .push([joint_chunk[0], joint_chunk[1], joint_chunk[2], joint_chunk[3]]);
        decoded
            .weights
            .push([weight_chunk[0], weight_chunk[1], weight_chunk[2], weight_chunk[3]]);
    }
    Ok(decoded)
}
