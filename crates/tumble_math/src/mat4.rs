//! 4x4 matrix utilities
//!
//! Matrices are column-major (`m[col][row]`) and multiply column vectors,
//! so they upload to wgpu uniform buffers directly. Projection matrices
//! target wgpu clip space: x and y in [-1, 1] with y up, z in [0, 1].

use crate::{Quat, Vec3};

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Create a translation matrix
pub fn translation(t: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3][0] = t.x;
    m[3][1] = t.y;
    m[3][2] = t.z;
    m
}

/// Create a rotation matrix around the X axis
pub fn rotation_x(angle: f32) -> Mat4 {
    let (sn, cs) = angle.sin_cos();
    let mut m = IDENTITY;
    m[1][1] = cs;
    m[1][2] = sn;
    m[2][1] = -sn;
    m[2][2] = cs;
    m
}

/// Create a rotation matrix around the Y axis
pub fn rotation_y(angle: f32) -> Mat4 {
    let (sn, cs) = angle.sin_cos();
    let mut m = IDENTITY;
    m[0][0] = cs;
    m[0][2] = -sn;
    m[2][0] = sn;
    m[2][2] = cs;
    m
}

/// Build a rigid transform from an orientation and a translation
pub fn from_quat_translation(q: Quat, t: Vec3) -> Mat4 {
    let x2 = q.x + q.x;
    let y2 = q.y + q.y;
    let z2 = q.z + q.z;
    let xx = q.x * x2;
    let xy = q.x * y2;
    let xz = q.x * z2;
    let yy = q.y * y2;
    let yz = q.y * z2;
    let zz = q.z * z2;
    let wx = q.w * x2;
    let wy = q.w * y2;
    let wz = q.w * z2;

    [
        [1.0 - (yy + zz), xy + wz, xz - wy, 0.0],
        [xy - wz, 1.0 - (xx + zz), yz + wx, 0.0],
        [xz + wy, yz - wx, 1.0 - (xx + yy), 0.0],
        [t.x, t.y, t.z, 1.0],
    ]
}

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a point (w = 1, no perspective divide)
pub fn transform_point(m: Mat4, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z + m[3][0],
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z + m[3][1],
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z + m[3][2],
    )
}

/// Transform a direction (w = 0, translation ignored)
pub fn transform_dir(m: Mat4, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
    )
}

/// Invert a rigid transform (rotation + translation only)
///
/// Transposes the rotation block and counter-rotates the translation.
/// Much cheaper than a general inverse and exact for camera/body matrices.
pub fn inverse_rigid(m: Mat4) -> Mat4 {
    let mut inv = IDENTITY;

    // Transpose the 3x3 rotation block
    for col in 0..3 {
        for row in 0..3 {
            inv[col][row] = m[row][col];
        }
    }

    let t = Vec3::new(m[3][0], m[3][1], m[3][2]);
    let rt = transform_dir(inv, t);
    inv[3][0] = -rt.x;
    inv[3][1] = -rt.y;
    inv[3][2] = -rt.z;
    inv
}

/// Extract the xyz part of a column (basis vector or translation)
pub fn column_xyz(m: Mat4, col: usize) -> Vec3 {
    Vec3::new(m[col][0], m[col][1], m[col][2])
}

/// Strip the translation, keeping only rotation (used for skybox rendering)
pub fn rotation_only(m: Mat4) -> Mat4 {
    let mut r = m;
    r[3][0] = 0.0;
    r[3][1] = 0.0;
    r[3][2] = 0.0;
    r
}

/// Perspective projection for wgpu clip space (z in [0, 1])
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    let nf = 1.0 / (near - far);

    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far * nf, -1.0],
        [0.0, 0.0, near * far * nf, 0.0],
    ]
}

/// Orthographic projection for wgpu clip space (z in [0, 1])
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rw = 1.0 / (right - left);
    let rh = 1.0 / (top - bottom);
    let rd = 1.0 / (near - far);

    [
        [2.0 * rw, 0.0, 0.0, 0.0],
        [0.0, 2.0 * rh, 0.0, 0.0],
        [0.0, 0.0, rd, 0.0],
        [
            -(right + left) * rw,
            -(top + bottom) * rh,
            near * rd,
            1.0,
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_identity_transform() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(transform_point(IDENTITY, v), v));
    }

    #[test]
    fn test_translation() {
        let m = translation(Vec3::new(1.0, 2.0, 3.0));
        let p = transform_point(m, Vec3::ZERO);
        assert!(vec_approx_eq(p, Vec3::new(1.0, 2.0, 3.0)));
        // Directions are unaffected by translation
        let d = transform_dir(m, Vec3::X);
        assert!(vec_approx_eq(d, Vec3::X));
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let m = rotation_y(FRAC_PI_2);
        let rotated = transform_point(m, Vec3::X);
        assert!(vec_approx_eq(rotated, Vec3::new(0.0, 0.0, -1.0)),
            "got {:?}", rotated);
    }

    #[test]
    fn test_mul_applies_b_first() {
        // Rotate +X a quarter turn around Y (-> -Z), then translate up
        let m = mul(translation(Vec3::Y), rotation_y(FRAC_PI_2));
        let p = transform_point(m, Vec3::X);
        assert!(vec_approx_eq(p, Vec3::new(0.0, 1.0, -1.0)), "got {:?}", p);
    }

    #[test]
    fn test_quat_translation_matches_quat_rotate() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 0.7);
        let t = Vec3::new(3.0, -1.0, 2.0);
        let m = from_quat_translation(q, t);
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(transform_point(m, v), q.rotate(v) + t));
    }

    #[test]
    fn test_inverse_rigid_round_trip() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 1.1);
        let m = from_quat_translation(q, Vec3::new(5.0, -2.0, 0.5));
        let inv = inverse_rigid(m);
        let round_trip = mul(inv, m);
        for col in 0..4 {
            for row in 0..4 {
                assert!(approx_eq(round_trip[col][row], IDENTITY[col][row]),
                    "mismatch at [{}][{}]", col, row);
            }
        }
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = perspective(FRAC_PI_2, 1.0, 0.5, 150.0);
        // A point on the near plane maps to z/w = 0, far plane to z/w = 1
        let near = transform_point(proj, Vec3::new(0.0, 0.0, -0.5));
        let near_w = -(-0.5f32); // -z of the input
        assert!(approx_eq(near.z / near_w, 0.0));
        let far = transform_point(proj, Vec3::new(0.0, 0.0, -150.0));
        assert!(approx_eq(far.z / 150.0, 1.0));
    }

    #[test]
    fn test_orthographic_maps_corners() {
        let m = orthographic(-10.0, 10.0, -5.0, 5.0, -1.0, 1.0);
        let p = transform_point(m, Vec3::new(10.0, 5.0, 0.0));
        assert!(approx_eq(p.x, 1.0));
        assert!(approx_eq(p.y, 1.0));
    }

    #[test]
    fn test_rotation_only_strips_translation() {
        let m = mul(translation(Vec3::new(1.0, 2.0, 3.0)), rotation_y(0.4));
        let r = rotation_only(m);
        assert_eq!(column_xyz(r, 3), Vec3::ZERO);
        assert_eq!(column_xyz(r, 0), column_xyz(m, 0));
    }
}
