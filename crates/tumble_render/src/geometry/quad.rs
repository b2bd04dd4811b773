//! Ground plane and UI overlay quads

use super::{Mesh, Vertex};

/// Half side length of the visible ground slab
pub const GROUND_EXTENT: f32 = 60.0;
/// Texture repeats across the ground, so the checker stays block-scale
pub const GROUND_UV_REPEAT: f32 = 30.0;

/// Large horizontal quad at y = 0; positioned by its model matrix
pub fn ground_mesh() -> Mesh {
    let e = GROUND_EXTENT;
    let r = GROUND_UV_REPEAT;
    let vertices = vec![
        Vertex {
            position: [-e, 0.0, -e],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 0.0],
        },
        Vertex {
            position: [e, 0.0, -e],
            normal: [0.0, 1.0, 0.0],
            uv: [r, 0.0],
        },
        Vertex {
            position: [e, 0.0, e],
            normal: [0.0, 1.0, 0.0],
            uv: [r, r],
        },
        Vertex {
            position: [-e, 0.0, e],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, r],
        },
    ];
    Mesh {
        vertices,
        indices: vec![0, 2, 1, 0, 3, 2],
    }
}

/// Unit quad in [0, 1] x [0, 1], placed in screen space by the overlay
/// pipeline's uniform
pub fn overlay_mesh() -> Mesh {
    let vertices = vec![
        Vertex {
            position: [0.0, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [0.0, 1.0],
        },
        Vertex {
            position: [1.0, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [1.0, 1.0],
        },
        Vertex {
            position: [1.0, 1.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [1.0, 0.0],
        },
        Vertex {
            position: [0.0, 1.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [0.0, 0.0],
        },
    ];
    Mesh {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}
