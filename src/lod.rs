//! Level-of-detail generation behind a pluggable simplification contract.

use crate::{error::ExportError, scene::MeshNode};

/// Names of the first LOD levels, finest first.
const LEVEL_NAMES: [&str; 3] = ["high_quality", "medium_quality", "low_quality"];

/// Output of one simplification pass.
#[derive(Debug, Clone)]
pub struct LodResult {
    pub mesh: MeshNode,
    /// `true` when the result keeps every vertex of the source in the same
    /// order, so per-vertex blendshape deltas still apply to it.
    pub preserves_vertices: bool,
}

/// Reduces a mesh to roughly `ratio` of its faces.
///
/// Implementations must keep the vertex-attribute schema of the source:
/// the same optional attributes, material and skin skeleton.
pub trait LodStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn simplify(&self, mesh: &MeshNode, ratio: f32) -> Result<LodResult, ExportError>;
}

/// Name of LOD level `level`; level 0 is the source mesh.
pub fn lod_level_name(level: usize) -> String {
    LEVEL_NAMES
        .get(level)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("lod_{}", level))
}

/// Runs `strategy` and checks its result against the source schema.
pub fn generate_lod(
    strategy: &dyn LodStrategy,
    mesh: &MeshNode,
    ratio: f32,
) -> Result<LodResult, ExportError> {
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(ExportError::invalid(
            &mesh.name,
            format!("LOD ratio {} is outside (0, 1]", ratio),
        ));
    }

    let result = strategy.simplify(mesh, ratio)?;
    check_schema(mesh, &result)?;
    log::debug!(
        "{} reduced '{}' from {} to {} faces",
        strategy.name(),
        mesh.name,
        mesh.face_count(),
        result.mesh.face_count()
    );
    Ok(result)
}

/// Rejects LOD output whose attribute layout differs from the source.
pub fn check_schema(source: &MeshNode, result: &LodResult) -> Result<(), ExportError> {
    let lod = &result.mesh;
    let mismatch = |reason: String| ExportError::LodSchemaMismatch {
        mesh: source.name.clone(),
        reason,
    };

    let vertices = lod.vertex_count();
    if source.normals.is_empty() != lod.normals.is_empty() {
        return Err(mismatch("normals were added or dropped".to_string()));
    }
    if source.uvs.is_empty() != lod.uvs.is_empty() {
        return Err(mismatch("texture coordinates were added or dropped".to_string()));
    }
    if !lod.normals.is_empty() && lod.normals.len() != vertices {
        return Err(mismatch(format!("{} normals for {} vertices", lod.normals.len(), vertices)));
    }
    if !lod.uvs.is_empty() && lod.uvs.len() != vertices {
        return Err(mismatch(format!("{} uvs for {} vertices", lod.uvs.len(), vertices)));
    }
    if lod.indices.iter().any(|&index| index as usize >= vertices) {
        return Err(mismatch("index points past the vertex list".to_string()));
    }
    if source.material != lod.material || source.uv_tiles != lod.uv_tiles {
        return Err(mismatch("material binding changed".to_string()));
    }

    match (&source.skin, &lod.skin) {
        (None, None) => {}
        (Some(original), Some(reduced)) => {
            if original.skeleton != reduced.skeleton {
                return Err(mismatch("skin skeleton changed".to_string()));
            }
            if reduced.joints.len() != vertices || reduced.weights.len() != vertices {
                return Err(mismatch("skin influences do not cover every vertex".to_string()));
            }
        }
        _ => return Err(mismatch("skin binding was added or dropped".to_string())),
    }

    if result.preserves_vertices && vertices != source.vertex_count() {
        return Err(mismatch(format!(
            "claims to preserve vertices but has {} of {}",
            vertices,
            source.vertex_count()
        )));
    }
    Ok(())
}

// ─── Reference strategy ──────────────────────────────────────────────────────

/// Keeps an evenly strided subset of triangles and drops vertices no kept
/// triangle uses. Surviving vertices keep their relative order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleStrideDecimator;

impl LodStrategy for TriangleStrideDecimator {
    fn name(&self) -> &str {
        "triangle-stride"
    }

    fn simplify(&self, mesh: &MeshNode, ratio: f32) -> Result<LodResult, ExportError> {
        let faces = mesh.face_count();
        if faces == 0 || mesh.vertex_count() == 0 {
            return Err(ExportError::EmptyMeshAsset {
                mesh: mesh.name.clone(),
            });
        }
        let target = ((faces as f32 * ratio).ceil() as usize).clamp(1, faces);

        let mut kept_indices = Vec::with_capacity(target * 3);
        for step in 0..target {
            let face = step * faces / target;
            kept_indices.extend_from_slice(&mesh.indices[face * 3..face * 3 + 3]);
        }

        let mut used = vec![false; mesh.vertex_count()];
        for &index in &kept_indices {
            if let Some(slot) = used.get_mut(index as usize) {
                *slot = true;
            }
        }
        let mut remap = vec![None; used.len()];
        let mut next = 0u32;
        for (vertex, &is_used) in used.iter().enumerate() {
            if is_used {
                remap[vertex] = Some(next);
                next += 1;
            }
        }

        let keep = |vertex: usize| remap[vertex].is_some();
        let mut reduced = MeshNode {
            name: mesh.name.clone(),
            positions: select(&mesh.positions, keep),
            normals: select(&mesh.normals, keep),
            uvs: select(&mesh.uvs, keep),
            indices: Vec::with_capacity(kept_indices.len()),
            skin: None,
            material: mesh.material.clone(),
            asset: mesh.asset.clone(),
            uv_tiles: mesh.uv_tiles.clone(),
        };
        for index in kept_indices {
            if let Some(&Some(mapped)) = remap.get(index as usize) {
                reduced.indices.push(mapped);
            }
        }
        if let Some(skin) = &mesh.skin {
            let mut binding = skin.clone();
            binding.joints = select(&skin.joints, keep);
            binding.weights = select(&skin.weights, keep);
            reduced.skin = Some(binding);
        }

        let preserves_vertices = reduced.vertex_count() == mesh.vertex_count();
        Ok(LodResult {
            mesh: reduced,
            preserves_vertices,
        })
    }
}

fn select<T: Clone>(values: &[T], keep: impl Fn(usize) -> bool) -> Vec<T> {
    values
        .iter()
        .enumerate()
        .filter(|(vertex, _)| keep(*vertex))
        .map(|(_, value)| value.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SkinBinding;

    /// A strip of `quads` quads along X, two triangles each.
    fn strip(quads: u32) -> MeshNode {
        let mut mesh = MeshNode {
            name: "Strip".to_string(),
            ..MeshNode::default()
        };
        for column in 0..=quads {
            for row in 0..2 {
                mesh.positions.push([column as f32, row as f32, 0.0]);
                mesh.normals.push([0.0, 0.0, 1.0]);
                mesh.uvs.push([column as f32 / quads as f32, row as f32]);
            }
        }
        for quad in 0..quads {
            let base = quad * 2;
            mesh.indices.extend_from_slice(&[base, base + 2, base + 1]);
            mesh.indices.extend_from_slice(&[base + 1, base + 2, base + 3]);
        }
        mesh
    }

    #[test]
    fn given_level_numbers_when_naming_then_quality_names_come_first() {
        assert_eq!(lod_level_name(0), "high_quality");
        assert_eq!(lod_level_name(1), "medium_quality");
        assert_eq!(lod_level_name(2), "low_quality");
        assert_eq!(lod_level_name(3), "lod_3");
    }

    #[test]
    fn given_half_ratio_when_decimating_then_face_count_halves_and_indices_stay_valid() {
        let mesh = strip(8);

        let result = generate_lod(&TriangleStrideDecimator, &mesh, 0.5).expect("lod");

        assert_eq!(result.mesh.face_count(), 8);
        assert_eq!(result.mesh.normals.len(), result.mesh.vertex_count());
        assert_eq!(result.mesh.uvs.len(), result.mesh.vertex_count());
        assert!(
            result
                .mesh
                .indices
                .iter()
                .all(|&index| (index as usize) < result.mesh.vertex_count())
        );
    }

    #[test]
    fn given_full_ratio_when_decimating_then_vertices_are_preserved() {
        let mesh = strip(4);

        let result = generate_lod(&TriangleStrideDecimator, &mesh, 1.0).expect("lod");

        assert!(result.preserves_vertices);
        assert_eq!(result.mesh.indices, mesh.indices);
        assert_eq!(result.mesh.positions, mesh.positions);
    }

    #[test]
    fn given_skinned_mesh_when_decimating_then_influences_follow_surviving_vertices() {
        let mut mesh = strip(4);
        let vertex_count = mesh.vertex_count();
        mesh.skin = Some(SkinBinding {
            skeleton: "Armature".to_string(),
            joints: (0..vertex_count as u32).map(|vertex| vec![vertex]).collect(),
            weights: vec![vec![1.0]; vertex_count],
        });

        let result = generate_lod(&TriangleStrideDecimator, &mesh, 0.25).expect("lod");
        let skin = result.mesh.skin.as_ref().expect("skin");

        assert_eq!(skin.joints.len(), result.mesh.vertex_count());
        for (position, joints) in result.mesh.positions.iter().zip(&skin.joints) {
            let original = mesh.positions[joints[0] as usize];
            assert_eq!(*position, original);
        }
    }

    #[test]
    fn given_invalid_ratio_when_generating_then_error_is_returned() {
        let mesh = strip(2);
        assert!(generate_lod(&TriangleStrideDecimator, &mesh, 0.0).is_err());
        assert!(generate_lod(&TriangleStrideDecimator, &mesh, 1.5).is_err());
    }

    struct DropNormals;

    impl LodStrategy for DropNormals {
        fn name(&self) -> &str {
            "drop-normals"
        }

        fn simplify(&self, mesh: &MeshNode, _ratio: f32) -> Result<LodResult, ExportError> {
            let mut reduced = mesh.clone();
            reduced.normals.clear();
            Ok(LodResult {
                mesh: reduced,
                preserves_vertices: true,
            })
        }
    }

    #[test]
    fn given_strategy_dropping_normals_when_generating_then_schema_mismatch_is_reported() {
        let result = generate_lod(&DropNormals, &strip(2), 0.5);
        assert!(matches!(result, Err(ExportError::LodSchemaMismatch { .. })));
    }
}
