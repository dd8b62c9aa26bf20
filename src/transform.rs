use nalgebra::{Matrix3, Matrix4, Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Basis change from the source convention (Z-up, Y-forward, right-handed)
/// to the target convention (Y-up, Z-forward).
///
/// `(x, y, z) -> (x, z, -y)`. The matrix is a proper rotation, so normals and
/// quaternions transform with the same basis.
pub fn source_to_target_basis() -> Matrix3<f32> {
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, //
        0.0, -1.0, 0.0,
    )
}

/// Converts a position and applies the caller-supplied uniform scale.
///
/// # Arguments
///
/// * `position` - Position in the source convention.
/// * `scale` - Uniform scale factor applied after the basis change.
///
/// # Returns
///
/// Position in the target convention.
pub fn convert_position(position: [f32; 3], scale: f32) -> [f32; 3] {
    let converted = source_to_target_basis() * Vector3::from(position) * scale;
    converted.into()
}

/// Converts a normal. Normals are never scaled.
pub fn convert_normal(normal: [f32; 3]) -> [f32; 3] {
    (source_to_target_basis() * Vector3::from(normal)).into()
}

/// Converts a displacement (e.g. a blendshape offset). Same as a position:
/// the basis change is linear, so deltas convert like points.
pub fn convert_offset(offset: [f32; 3], scale: f32) -> [f32; 3] {
    convert_position(offset, scale)
}

/// Converts a rotation stored as `[x, y, z, w]`.
///
/// # Arguments
///
/// * `rotation` - Quaternion components in `[x, y, z, w]` order.
///
/// # Returns
///
/// The same rotation expressed in target axes, `[x, y, z, w]` order.
pub fn convert_rotation(rotation: [f32; 4]) -> [f32; 4] {
    let [x, y, z, w] = rotation;
    let vector = source_to_target_basis() * Vector3::new(x, y, z);
    [vector.x, vector.y, vector.z, w]
}

/// Converts a per-axis scale. Axis permutation only, no sign change.
pub fn convert_scale(scale: [f32; 3]) -> [f32; 3] {
    [scale[0], scale[2], scale[1]]
}

/// Converts a 4x4 affine transform: `C * M * C^T`, then scales translation.
pub fn convert_matrix(matrix: &Matrix4<f32>, scale: f32) -> Matrix4<f32> {
    let basis = source_to_target_basis().to_homogeneous();
    let mut converted = basis * matrix * basis.transpose();
    for row in 0..3 {
        converted[(row, 3)] *= scale;
    }
    converted
}

/// Compute world matrices from local transforms and parent links.
///
/// `parents[i]` must be `None` or an index smaller than `i`, which lets a
/// single forward pass resolve every joint.
pub fn compute_world_matrices(
    local_matrices: &[Matrix4<f32>],
    parents: &[Option<usize>],
) -> Vec<Matrix4<f32>> {
    let mut worlds = Vec::<Matrix4<f32>>::with_capacity(local_matrices.len());
    for (index, local) in local_matrices.iter().enumerate() {
        let world = match parents.get(index).copied().flatten() {
            Some(parent) if parent < index => worlds[parent] * local,
            _ => *local,
        };
        worlds.push(world);
    }
    worlds
}

/// Decompose an affine matrix into glTF TRS (`translation`, `[x, y, z, w]`
/// rotation, `scale`).
pub fn decompose_trs(matrix: &Matrix4<f32>) -> ([f32; 3], [f32; 4], [f32; 3]) {
    let translation = [matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]];

    let basis_x = Vector3::new(matrix[(0, 0)], matrix[(1, 0)], matrix[(2, 0)]);
    let basis_y = Vector3::new(matrix[(0, 1)], matrix[(1, 1)], matrix[(2, 1)]);
    let basis_z = Vector3::new(matrix[(0, 2)], matrix[(1, 2)], matrix[(2, 2)]);

    let mut scale_x = basis_x.norm();
    let scale_y = basis_y.norm();
    let scale_z = basis_z.norm();

    let mut rot_x = if scale_x > 1e-8 {
        basis_x / scale_x
    } else {
        Vector3::new(1.0, 0.0, 0.0)
    };
    let rot_y = if scale_y > 1e-8 {
        basis_y / scale_y
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    let rot_z = if scale_z > 1e-8 {
        basis_z / scale_z
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    if rot_x.cross(&rot_y).dot(&rot_z) < 0.0 {
        scale_x = -scale_x;
        rot_x = -rot_x;
    }

    let rotation = UnitQuaternion::from_matrix(&Matrix3::from_columns(&[rot_x, rot_y, rot_z]));
    let coords = rotation.coords;

    (
        translation,
        [coords.x, coords.y, coords.z, coords.w],
        [scale_x, scale_y, scale_z],
    )
}

/// Builds a rotation from `[x, y, z, w]` components, normalizing the input.
pub fn quaternion_from_xyzw(rotation: [f32; 4]) -> UnitQuaternion<f32> {
    let [x, y, z, w] = rotation;
    UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z))
}

// ─── UV space ────────────────────────────────────────────────────────────────

/// Texture-space layout used when flipping V from bottom-left to top-left
/// origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvTiling {
    /// One texture covers `[0, 1]`; `v' = 1 - v`.
    #[default]
    Single,
    /// Atlas tiles stacked along V, described by ascending boundaries
    /// (`[0.0, 1.0, 2.0]` is two tiles). Each tile is flipped on its own.
    Tiles(Vec<f32>),
}

/// Flips V for a single-tile texture.
pub fn flip_v(v: f32) -> f32 {
    1.0 - v
}

/// Flips V inside the tile that contains it.
///
/// Tiles are half-open `[lower, upper)`, the last tile also includes its upper
/// boundary. A value in `[lower, upper]` maps to `lower + upper - v`. Values
/// outside every tile are returned unchanged.
pub fn flip_v_tiled(v: f32, boundaries: &[f32]) -> f32 {
    let Some((lower, upper)) = containing_tile(v, boundaries) else {
        return v;
    };
    lower + upper - v
}

/// Converts one UV pair. U is kept.
pub fn convert_uv(uv: [f32; 2], tiling: &UvTiling) -> [f32; 2] {
    let v = match tiling {
        UvTiling::Single => flip_v(uv[1]),
        UvTiling::Tiles(boundaries) => flip_v_tiled(uv[1], boundaries),
    };
    [uv[0], v]
}

fn containing_tile(v: f32, boundaries: &[f32]) -> Option<(f32, f32)> {
    let last = boundaries.len().checked_sub(1)?;
    boundaries.windows(2).enumerate().find_map(|(index, pair)| {
        let (lower, upper) = (pair[0], pair[1]);
        let inside = if index + 1 == last {
            v >= lower && v <= upper
        } else {
            v >= lower && v < upper
        };
        inside.then_some((lower, upper))
    })
}
