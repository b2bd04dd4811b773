//! Cube meshes: blocks and the skybox

use tumble_core::BlockMesh;

use super::{Mesh, Vertex};

/// Face definitions: normal, then the two in-face axes (tangent, bitangent)
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

fn cube_faces(half_extent: f32, u_range: (f32, f32), inward: bool) -> Mesh {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, tangent, bitangent) in FACES {
        let base = vertices.len() as u16;
        for (corner_u, corner_v) in [(0.0f32, 0.0f32), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let mut position = [0.0f32; 3];
            for axis in 0..3 {
                position[axis] = half_extent
                    * (normal[axis]
                        + tangent[axis] * (corner_u * 2.0 - 1.0)
                        + bitangent[axis] * (corner_v * 2.0 - 1.0));
            }
            let sign = if inward { -1.0 } else { 1.0 };
            vertices.push(Vertex {
                position,
                normal: [normal[0] * sign, normal[1] * sign, normal[2] * sign],
                uv: [
                    u_range.0 + corner_u * (u_range.1 - u_range.0),
                    1.0 - corner_v,
                ],
            });
        }
        if inward {
            indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        } else {
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    Mesh { vertices, indices }
}

/// Unit-half-extent block cube
///
/// The two variants address different halves of the block texture atlas so
/// neighboring blocks do not look stamped from one mold. Physics scales
/// nothing: blocks really are this size.
pub fn block_mesh(variant: BlockMesh) -> Mesh {
    let u_range = match variant {
        BlockMesh::Default => (0.0, 0.5),
        BlockMesh::Alt => (0.5, 1.0),
    };
    cube_faces(1.0, u_range, false)
}

/// Inward-facing cube drawn around the camera
pub fn skybox_mesh() -> Mesh {
    cube_faces(1.0, (0.0, 1.0), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_variants_use_disjoint_atlas_halves() {
        let default = block_mesh(BlockMesh::Default);
        let alt = block_mesh(BlockMesh::Alt);
        assert!(default.vertices.iter().all(|v| v.uv[0] <= 0.5));
        assert!(alt.vertices.iter().all(|v| v.uv[0] >= 0.5));
    }

    #[test]
    fn test_block_extent() {
        let mesh = block_mesh(BlockMesh::Default);
        for v in &mesh.vertices {
            for c in v.position {
                assert!((c.abs() - 1.0).abs() < 0.0001);
            }
        }
    }

    #[test]
    fn test_skybox_normals_point_inward() {
        let mesh = skybox_mesh();
        for v in &mesh.vertices {
            let dot = v.position[0] * v.normal[0]
                + v.position[1] * v.normal[1]
                + v.position[2] * v.normal[2];
            assert!(dot < 0.0);
        }
    }
}
