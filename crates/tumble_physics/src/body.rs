//! Rigid body state and construction

use slotmap::new_key_type;
use tumble_math::{mat4, Mat4, Quat, Vec3};

new_key_type! {
    /// Generational key identifying a rigid body in the world
    pub struct BodyKey;
}

/// A box-shaped rigid body
///
/// Blocks are cubes, so a single half-extent describes the collision shape.
/// Forces and torques accumulate between steps and are consumed by the next
/// `RigidBodyWorld::step` call.
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// World-space center of mass
    pub position: Vec3,
    /// Orientation of the body
    pub orientation: Quat,
    /// Linear velocity (m/s)
    pub linear_velocity: Vec3,
    /// Angular velocity (rad/s)
    pub angular_velocity: Vec3,
    /// Half the side length of the cube shape
    pub half_extent: f32,
    /// Mass in kg (must be > 0; static geometry is represented by
    /// ground planes, not bodies)
    pub mass: f32,
    /// Surface friction coefficient
    pub friction: f32,
    /// Bounciness on impact
    pub restitution: f32,
    /// Below this linear speed a body is a candidate for sleeping.
    /// Zero keeps the body permanently awake.
    pub linear_sleep_threshold: f32,
    /// Angular counterpart of the sleep threshold
    pub angular_sleep_threshold: f32,

    pub(crate) force: Vec3,
    pub(crate) torque: Vec3,
}

impl RigidBody {
    /// Create a cube body at rest at `position`
    pub fn new_cube(position: Vec3, half_extent: f32, mass: f32) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            half_extent,
            mass,
            friction: 0.5,
            restitution: 0.0,
            linear_sleep_threshold: 0.0,
            angular_sleep_threshold: 0.0,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
        }
    }

    /// Set the initial orientation (builder style)
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set friction (builder style)
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set restitution (builder style)
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set sleeping thresholds (builder style)
    pub fn with_sleep_thresholds(mut self, linear: f32, angular: f32) -> Self {
        self.linear_sleep_threshold = linear;
        self.angular_sleep_threshold = angular;
        self
    }

    /// World transform of this body as a 4x4 matrix
    pub fn transform(&self) -> Mat4 {
        mat4::from_quat_translation(self.orientation, self.position)
    }

    /// The eight world-space corners of the cube shape
    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_extent;
        let mut out = [Vec3::ZERO; 8];
        let mut i = 0;
        for &x in &[-h, h] {
            for &y in &[-h, h] {
                for &z in &[-h, h] {
                    out[i] = self.position + self.orientation.rotate(Vec3::new(x, y, z));
                    i += 1;
                }
            }
        }
        out
    }

    /// Moment of inertia of a solid cube around any axis through its center
    pub fn inertia(&self) -> f32 {
        let side = 2.0 * self.half_extent;
        self.mass * side * side / 6.0
    }
}
