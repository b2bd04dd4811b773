//! Dynamics world and stepping

use slotmap::SlotMap;
use tumble_math::Vec3;

use crate::body::{BodyKey, RigidBody};

/// Configuration for the simulation
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Gravity acceleration vector
    pub gravity: Vec3,
    /// Length of one fixed substep in seconds
    pub fixed_timestep: f32,
    /// Maximum substeps consumed per `step` call. When the clamp hits,
    /// the leftover wall time is discarded so a stall cannot queue up
    /// catch-up steps (Bullet-style clamping)
    pub max_substeps: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 2,
        }
    }
}

/// Infinite static plane the blocks collide with (floor and fence walls)
#[derive(Clone, Debug)]
pub struct GroundPlane {
    /// Unit normal pointing into the playable volume
    pub normal: Vec3,
    /// Plane offset: points satisfy dot(p, normal) = offset
    pub offset: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl GroundPlane {
    /// Horizontal floor at the given height
    pub fn floor(y: f32, friction: f32, restitution: f32) -> Self {
        Self {
            normal: Vec3::Y,
            offset: y,
            friction,
            restitution,
        }
    }
}

/// The dynamics world containing all rigid bodies
pub struct RigidBodyWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    ground_planes: Vec<GroundPlane>,
    accumulated_time: f32,
    pub config: WorldConfig,
}

impl RigidBodyWorld {
    /// Create a world with default configuration
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world with custom configuration
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            ground_planes: Vec::new(),
            accumulated_time: 0.0,
            config,
        }
    }

    /// Add a static collision plane
    pub fn add_ground_plane(&mut self, plane: GroundPlane) {
        self.ground_planes.push(plane);
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body from the world and return it
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        self.bodies.remove(key)
    }

    /// Get an immutable reference to a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    /// Get a mutable reference to a body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all body keys
    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Apply a force at a point relative to the body's center of mass
    ///
    /// The force accumulates until the next `step` call, matching the
    /// apply-then-step contract of the interaction layer.
    pub fn apply_force(&mut self, key: BodyKey, force: Vec3, relative_point: Vec3) -> bool {
        match self.bodies.get_mut(key) {
            Some(body) => {
                body.force += force;
                body.torque += relative_point.cross(force);
                true
            }
            None => false,
        }
    }

    /// Advance the simulation by `dt` seconds of wall time
    ///
    /// Wall time accumulates and is consumed in fixed substeps, at most
    /// `max_substeps` per call. A call with dt = 0 performs no substeps
    /// and leaves every body untouched.
    pub fn step(&mut self, dt: f32) {
        self.accumulated_time += dt.max(0.0);
        let h = self.config.fixed_timestep;

        let mut substeps = (self.accumulated_time / h) as u32;
        if substeps > self.config.max_substeps {
            substeps = self.config.max_substeps;
            // Drop the excess so a long stall cannot queue up catch-up work
            self.accumulated_time = 0.0;
        } else {
            self.accumulated_time -= substeps as f32 * h;
        }

        for _ in 0..substeps {
            self.substep(h);
        }

        // Forces are consumed by the step that follows their application
        if substeps > 0 {
            for (_key, body) in &mut self.bodies {
                body.force = Vec3::ZERO;
                body.torque = Vec3::ZERO;
            }
        }
    }

    fn substep(&mut self, h: f32) {
        let gravity = self.config.gravity;

        for (_key, body) in &mut self.bodies {
            // Integrate accelerations
            let inv_mass = 1.0 / body.mass;
            body.linear_velocity += (gravity + body.force * inv_mass) * h;
            body.angular_velocity += body.torque * (1.0 / body.inertia()) * h;

            // Integrate velocities
            body.position += body.linear_velocity * h;
            body.orientation = body.orientation.integrate(body.angular_velocity, h);

            // Resolve static plane contacts
            for plane in &self.ground_planes {
                Self::resolve_plane_contact(body, plane);
            }
        }
    }

    /// Push a body out of a plane and respond with restitution and friction
    fn resolve_plane_contact(body: &mut RigidBody, plane: &GroundPlane) {
        // Deepest corner along the plane normal
        let mut depth = f32::INFINITY;
        let mut deepest = body.position;
        for corner in body.corners() {
            let d = corner.dot(plane.normal) - plane.offset;
            if d < depth {
                depth = d;
                deepest = corner;
            }
        }

        if depth >= 0.0 {
            return;
        }

        // Positional correction
        body.position += plane.normal * -depth;

        let velocity_along_normal = body.linear_velocity.dot(plane.normal);
        if velocity_along_normal < 0.0 {
            let restitution = (body.restitution * plane.restitution).sqrt();
            let friction = (body.friction * plane.friction).sqrt();

            // Remove the normal component, optionally bouncing
            let normal_velocity = plane.normal * velocity_along_normal;
            body.linear_velocity -= normal_velocity * (1.0 + restitution);

            // Friction damps the tangential velocity
            let tangent_velocity =
                body.linear_velocity - plane.normal * body.linear_velocity.dot(plane.normal);
            if tangent_velocity.length() > 0.0001 {
                body.linear_velocity -= tangent_velocity * friction;
            }

            // Contact torque: offset between the contact corner and the center
            // of mass spins the body; friction bleeds existing spin away
            let arm = deepest - body.position;
            let spin = arm.cross(normal_velocity * -body.mass) * (1.0 / body.inertia());
            body.angular_velocity = (body.angular_velocity + spin) * (1.0 - friction * 0.5);
        }
    }
}

impl Default for RigidBodyWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: a world with a floor at y = 0 and standard block material
    fn world_with_floor() -> RigidBodyWorld {
        let mut world = RigidBodyWorld::new();
        world.add_ground_plane(GroundPlane::floor(0.0, 0.85, 0.3));
        world
    }

    fn block_at(position: Vec3) -> RigidBody {
        RigidBody::new_cube(position, 1.0, 0.9)
            .with_friction(0.85)
            .with_restitution(0.3)
            .with_sleep_thresholds(0.0, 0.0)
    }

    #[test]
    fn test_add_and_get_body() {
        let mut world = world_with_floor();
        let key = world.add_body(block_at(Vec3::new(0.0, 5.0, 0.0)));
        assert_eq!(world.body_count(), 1);
        assert!(world.get_body(key).is_some());
    }

    #[test]
    fn test_stale_key_returns_none() {
        let mut world = world_with_floor();
        let key = world.add_body(block_at(Vec3::new(0.0, 5.0, 0.0)));
        world.remove_body(key);
        assert!(world.get_body(key).is_none());

        // A new body gets a fresh key; the old one stays invalid
        let new_key = world.add_body(block_at(Vec3::new(1.0, 5.0, 0.0)));
        assert!(world.get_body(key).is_none());
        assert!(world.get_body(new_key).is_some());
    }

    #[test]
    fn test_zero_dt_step_moves_nothing() {
        let mut world = world_with_floor();
        let key = world.add_body(block_at(Vec3::new(0.0, 5.0, 0.0)));

        world.step(0.0);

        let body = world.get_body(key).unwrap();
        assert_eq!(body.position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(body.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_gravity_pulls_body_down() {
        let mut world = world_with_floor();
        let key = world.add_body(block_at(Vec3::new(0.0, 10.0, 0.0)));

        world.step(1.0 / 60.0);

        let body = world.get_body(key).unwrap();
        assert!(body.linear_velocity.y < 0.0);
        assert!(body.position.y < 10.0);
    }

    #[test]
    fn test_substep_clamping() {
        let mut world = world_with_floor();
        let key = world.add_body(block_at(Vec3::new(0.0, 100.0, 0.0)));

        // A one second stall is clamped to max_substeps of fixed time,
        // not integrated as a single huge step
        world.step(1.0);

        let body = world.get_body(key).unwrap();
        let h = world.config.fixed_timestep;
        let expected_velocity = world.config.gravity.y * h * 2.0;
        assert!((body.linear_velocity.y - expected_velocity).abs() < 0.001);
    }

    #[test]
    fn test_block_rests_on_floor() {
        let mut world = world_with_floor();
        let key = world.add_body(block_at(Vec3::new(0.0, 1.5, 0.0)));

        for _ in 0..600 {
            world.step(1.0 / 60.0);
        }

        let body = world.get_body(key).unwrap();
        // Lowest corner must sit at or above the floor plane
        let min_y = body
            .corners()
            .iter()
            .map(|c| c.y)
            .fold(f32::INFINITY, f32::min);
        assert!(min_y >= -0.01, "block sank through floor: min_y = {}", min_y);
    }

    #[test]
    fn test_apply_force_accelerates_body() {
        let mut world = RigidBodyWorld::with_config(WorldConfig {
            gravity: Vec3::ZERO,
            ..WorldConfig::default()
        });
        let key = world.add_body(block_at(Vec3::ZERO));

        world.apply_force(key, Vec3::new(500.0, 0.0, 0.0), Vec3::ZERO);
        world.step(1.0 / 60.0);

        let body = world.get_body(key).unwrap();
        assert!(body.linear_velocity.x > 0.0);
        // Force through the center of mass imparts no spin
        assert!(body.angular_velocity.length() < 0.0001);
    }

    #[test]
    fn test_apply_force_is_consumed_by_step() {
        let mut world = RigidBodyWorld::with_config(WorldConfig {
            gravity: Vec3::ZERO,
            ..WorldConfig::default()
        });
        let key = world.add_body(block_at(Vec3::ZERO));

        world.apply_force(key, Vec3::new(500.0, 0.0, 0.0), Vec3::ZERO);
        world.step(1.0 / 60.0);
        let vx_after_first = world.get_body(key).unwrap().linear_velocity.x;

        world.step(1.0 / 60.0);
        let vx_after_second = world.get_body(key).unwrap().linear_velocity.x;

        // No further acceleration once the force was consumed
        assert!((vx_after_second - vx_after_first).abs() < 0.0001);
    }

    #[test]
    fn test_offset_force_imparts_spin() {
        let mut world = RigidBodyWorld::with_config(WorldConfig {
            gravity: Vec3::ZERO,
            ..WorldConfig::default()
        });
        let key = world.add_body(block_at(Vec3::ZERO));

        world.apply_force(key, Vec3::new(0.0, 100.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        world.step(1.0 / 60.0);

        let body = world.get_body(key).unwrap();
        assert!(body.angular_velocity.length() > 0.0);
    }

    #[test]
    fn test_apply_force_to_stale_key() {
        let mut world = world_with_floor();
        let key = world.add_body(block_at(Vec3::ZERO));
        world.remove_body(key);
        assert!(!world.apply_force(key, Vec3::X, Vec3::ZERO));
    }

    #[test]
    fn test_bounce_off_floor() {
        let mut world = RigidBodyWorld::new();
        // Perfectly bouncy floor
        world.add_ground_plane(GroundPlane::floor(0.0, 0.0, 1.0));
        let key = world.add_body(
            RigidBody::new_cube(Vec3::new(0.0, 1.01, 0.0), 1.0, 0.9).with_restitution(1.0),
        );
        world.get_body_mut(key).unwrap().linear_velocity = Vec3::new(0.0, -5.0, 0.0);

        world.step(1.0 / 60.0);

        let body = world.get_body(key).unwrap();
        assert!(body.linear_velocity.y > 0.0, "expected bounce");
    }
}
