//! Orbit camera
//!
//! The camera circles the scene origin: yaw spins around the vertical axis,
//! pitch tilts down toward the blocks, distance backs away along the view
//! direction, height lifts the whole orbit.

use tumble_math::{mat4, Mat4, Vec3};

/// Vertical field of view in degrees
pub const FOV_Y_DEGREES: f32 = 90.0;
pub const NEAR_PLANE: f32 = 0.5;
pub const FAR_PLANE: f32 = 150.0;

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Rotation around the vertical axis, degrees
    pub yaw: f32,
    /// Downward tilt, degrees (0 = horizontal)
    pub pitch: f32,
    /// Distance from the orbit center
    pub distance: f32,
    /// Vertical offset of the orbit center
    pub height: f32,
}

impl OrbitCamera {
    pub fn new(yaw: f32, pitch: f32, distance: f32, height: f32) -> Self {
        Self {
            yaw,
            pitch,
            distance,
            height,
        }
    }

    /// Camera-to-world transform
    pub fn camera_to_world(&self) -> Mat4 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        // Positive pitch lifts the camera and tilts it down at the origin
        let orbit = mat4::mul(mat4::rotation_y(yaw), mat4::rotation_x(-pitch));
        let back = mat4::mul(orbit, mat4::translation(Vec3::new(0.0, 0.0, self.distance)));
        mat4::mul(mat4::translation(Vec3::new(0.0, self.height, 0.0)), back)
    }

    /// World-to-camera (view) matrix
    pub fn view_matrix(&self) -> Mat4 {
        mat4::inverse_rigid(self.camera_to_world())
    }

    /// Projection matrix for the given surface aspect ratio
    pub fn projection(&self, aspect: f32) -> Mat4 {
        mat4::perspective(FOV_Y_DEGREES.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    /// World-space camera position
    pub fn position(&self) -> Vec3 {
        mat4::column_xyz(self.camera_to_world(), 3)
    }

    /// Camera basis vectors in world space
    pub fn right(&self) -> Vec3 {
        mat4::column_xyz(self.camera_to_world(), 0)
    }

    pub fn up(&self) -> Vec3 {
        mat4::column_xyz(self.camera_to_world(), 1)
    }

    /// Direction the camera looks along
    pub fn forward(&self) -> Vec3 {
        -mat4::column_xyz(self.camera_to_world(), 2)
    }
}

impl tumble_input::OrbitRig for OrbitCamera {
    fn yaw(&self) -> f32 {
        self.yaw
    }
    fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }
    fn pitch(&self) -> f32 {
        self.pitch
    }
    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
    }
    fn distance(&self) -> f32 {
        self.distance
    }
    fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
    }
    fn height(&self) -> f32 {
        self.height
    }
    fn set_height(&mut self, height: f32) {
        self.height = height;
    }
    fn right(&self) -> Vec3 {
        OrbitCamera::right(self)
    }
    fn up(&self) -> Vec3 {
        OrbitCamera::up(self)
    }
    fn forward(&self) -> Vec3 {
        OrbitCamera::forward(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_zero_orbit_sits_behind_origin() {
        let cam = OrbitCamera::new(0.0, 0.0, 10.0, 0.0);
        assert!(vec_approx_eq(cam.position(), Vec3::new(0.0, 0.0, 10.0)));
        assert!(vec_approx_eq(cam.forward(), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_pitch_lifts_camera() {
        let cam = OrbitCamera::new(0.0, 45.0, 10.0, 0.0);
        let pos = cam.position();
        assert!(pos.y > 0.0);
        // Looking down toward the origin
        assert!(cam.forward().y < 0.0);
    }

    #[test]
    fn test_yaw_orbits_horizontally() {
        let cam = OrbitCamera::new(90.0, 0.0, 10.0, 0.0);
        let pos = cam.position();
        assert!(pos.y.abs() < EPSILON);
        assert!((pos.length() - 10.0).abs() < EPSILON);
        assert!(pos.z.abs() < 0.001, "position should leave the z axis: {:?}", pos);
    }

    #[test]
    fn test_view_inverts_camera_to_world() {
        let cam = OrbitCamera::new(30.0, 20.0, 8.0, 1.5);
        // The camera's own position maps to the view-space origin
        let view = cam.view_matrix();
        let origin = mat4::transform_point(view, cam.position());
        assert!(origin.length() < EPSILON);
    }

    #[test]
    fn test_height_offsets_orbit_center() {
        let low = OrbitCamera::new(0.0, 0.0, 10.0, 0.0);
        let high = OrbitCamera::new(0.0, 0.0, 10.0, 3.0);
        assert!((high.position().y - low.position().y - 3.0).abs() < EPSILON);
    }
}
