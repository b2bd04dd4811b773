//! Shadow-casting light
//!
//! The light rides its own orbit at a fixed elevation; the user can spin it
//! around the scene with a two-finger rotate. Its projection is tight
//! around the block pile so the shadow map resolution is spent where the
//! blocks are.

use tumble_math::{mat4, Mat4, Vec3};

/// Elevation above the horizon, degrees
pub const LIGHT_ELEVATION_DEGREES: f32 = 37.0;
/// Distance from the scene origin
pub const LIGHT_DISTANCE: f32 = 25.0;
/// Shadow projection planes, chosen to bracket the block pile as seen
/// from the light's orbit
pub const SHADOW_NEAR: f32 = 12.0;
pub const SHADOW_FAR: f32 = 50.0;
/// Shadow projection field of view, degrees
pub const SHADOW_FOV_DEGREES: f32 = 60.0;

#[derive(Clone, Debug)]
pub struct LightRig {
    /// Rotation around the vertical axis, degrees
    pub rotation: f32,
}

impl LightRig {
    pub fn new(rotation: f32) -> Self {
        Self { rotation }
    }

    fn light_to_world(&self) -> Mat4 {
        let yaw = self.rotation.to_radians();
        let elevation = LIGHT_ELEVATION_DEGREES.to_radians();
        let orbit = mat4::mul(mat4::rotation_y(yaw), mat4::rotation_x(-elevation));
        mat4::mul(
            orbit,
            mat4::translation(Vec3::new(0.0, 0.0, LIGHT_DISTANCE)),
        )
    }

    /// World-space light position
    pub fn position(&self) -> Vec3 {
        mat4::column_xyz(self.light_to_world(), 3)
    }

    /// World-to-light view matrix
    pub fn view_matrix(&self) -> Mat4 {
        mat4::inverse_rigid(self.light_to_world())
    }

    /// Shadow map projection
    pub fn projection(&self) -> Mat4 {
        mat4::perspective(
            SHADOW_FOV_DEGREES.to_radians(),
            1.0,
            SHADOW_NEAR,
            SHADOW_FAR,
        )
    }

    /// Combined view-projection used by both shadow passes
    pub fn view_projection(&self) -> Mat4 {
        mat4::mul(self.projection(), self.view_matrix())
    }
}

impl tumble_input::LightControl for LightRig {
    fn rotation(&self) -> f32 {
        self.rotation
    }
    fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_sits_above_horizon() {
        let light = LightRig::new(0.0);
        let pos = light.position();
        assert!((pos.length() - LIGHT_DISTANCE).abs() < 0.001);
        let expected_y = LIGHT_DISTANCE * LIGHT_ELEVATION_DEGREES.to_radians().sin();
        assert!((pos.y - expected_y).abs() < 0.001);
    }

    #[test]
    fn test_rotation_keeps_elevation() {
        let a = LightRig::new(0.0);
        let b = LightRig::new(120.0);
        assert!((a.position().y - b.position().y).abs() < 0.001);
    }

    #[test]
    fn test_origin_is_inside_shadow_frustum() {
        let light = LightRig::new(45.0);
        let vp = light.view_projection();
        let p = mat4::transform_point(vp, Vec3::ZERO);
        // transform_point drops w; recompute it for the depth check
        let view = light.view_matrix();
        let view_z = mat4::transform_point(view, Vec3::ZERO).z;
        let w = -view_z;
        let depth = p.z / w;
        assert!(depth > 0.0 && depth < 1.0, "depth = {}", depth);
    }
}
