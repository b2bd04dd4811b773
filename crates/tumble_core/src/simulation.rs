//! Simulation state shared between the frame loop and the physics thread

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use rand::Rng;
use tumble_math::{Quat, Vec3};
use tumble_physics::{BodyKey, GroundPlane, RigidBody, RigidBodyWorld};

use crate::motion::{BlockMesh, DrawList, MotionRecord, MotionTable};
use crate::picking_color::PickingColorAllocator;

/// Uniform half side length of every block
pub const BLOCK_HALF_EXTENT: f32 = 1.0;
/// Block mass in kg
pub const BLOCK_MASS: f32 = 0.9;
/// Block bounciness
pub const BLOCK_RESTITUTION: f32 = 0.3;
/// Block surface friction
pub const BLOCK_FRICTION: f32 = 0.85;

/// Errors from simulation operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The body key refers to a removed or never-existing body
    UnknownBody,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::UnknownBody => write!(f, "unknown body key"),
        }
    }
}

impl Error for SimulationError {}

/// The whole mutable simulation: physics world plus render-facing state
///
/// Lives behind a mutex (see [`SharedSimulation`]). The physics thread holds
/// the lock for the duration of a step; the frame loop holds it only inside
/// its wait -> refresh -> signal window, so rendering and stepping overlap.
pub struct Simulation {
    world: RigidBodyWorld,
    motion: MotionTable,
    palette: PickingColorAllocator,
    /// Wall-clock time of the previous step. `None` until the first step,
    /// which therefore advances physics by zero and moves nothing.
    last_step: Option<Instant>,
}

impl Simulation {
    pub fn new(world: RigidBodyWorld) -> Self {
        Self {
            world,
            motion: MotionTable::new(),
            palette: PickingColorAllocator::new(),
            last_step: None,
        }
    }

    /// Add a static collision plane (floor, fence walls)
    pub fn add_ground_plane(&mut self, plane: GroundPlane) {
        self.world.add_ground_plane(plane);
    }

    /// Spawn a block with a random upright-preserving rotation and a random
    /// mesh variant
    pub fn spawn_block(&mut self, position: Vec3) -> BodyKey {
        let mut rng = rand::thread_rng();
        let axis = match rng.gen_range(0..3) {
            0 => Vec3::X,
            1 => Vec3::Y,
            _ => Vec3::Z,
        };
        // Quarter-turn multiples keep the cube faces axis-aligned
        let angle = rng.gen_range(1..4) as f32 * std::f32::consts::FRAC_PI_2;
        let mesh = if rng.gen_bool(0.5) {
            BlockMesh::Default
        } else {
            BlockMesh::Alt
        };
        self.spawn_block_oriented(position, Quat::from_axis_angle(axis, angle), mesh)
    }

    /// Spawn a block with explicit orientation and mesh variant
    pub fn spawn_block_oriented(
        &mut self,
        position: Vec3,
        orientation: Quat,
        mesh: BlockMesh,
    ) -> BodyKey {
        let body = RigidBody::new_cube(position, BLOCK_HALF_EXTENT, BLOCK_MASS)
            .with_orientation(orientation)
            .with_friction(BLOCK_FRICTION)
            .with_restitution(BLOCK_RESTITUTION)
            .with_sleep_thresholds(0.0, 0.0);
        let transform = body.transform();
        let key = self.world.add_body(body);

        let color = self.palette.allocate();
        if color.is_none() {
            log::warn!("picking palette exhausted, block spawned unpickable");
        }
        self.motion.insert(key, MotionRecord::new(transform, color, mesh));
        key
    }

    /// Remove every block and return all picking colors to the pool
    pub fn clear_blocks(&mut self) {
        let keys: Vec<BodyKey> = self.world.body_keys().collect();
        for key in keys {
            self.world.remove_body(key);
        }
        self.motion.clear();
        self.palette.reset();
    }

    pub fn block_count(&self) -> usize {
        self.world.body_count()
    }

    /// Apply a force at a point relative to a block's center of mass
    pub fn apply_force(
        &mut self,
        key: BodyKey,
        force: Vec3,
        relative_point: Vec3,
    ) -> Result<(), SimulationError> {
        if self.world.apply_force(key, force, relative_point) {
            Ok(())
        } else {
            Err(SimulationError::UnknownBody)
        }
    }

    /// World-space position of a block's center of mass
    pub fn body_position(&self, key: BodyKey) -> Result<Vec3, SimulationError> {
        self.world
            .get_body(key)
            .map(|b| b.position)
            .ok_or(SimulationError::UnknownBody)
    }

    /// Step physics by wall-clock time since the previous call
    ///
    /// The very first call has no previous timestamp and advances by zero,
    /// so a long scene-setup pause cannot launch the blocks.
    pub fn step(&mut self) {
        let now = Instant::now();
        let dt = match self.last_step {
            Some(prev) => now.duration_since(prev).as_secs_f32(),
            None => 0.0,
        };
        self.last_step = Some(now);
        self.step_with_dt(dt);
    }

    /// Step physics by an explicit dt, bypassing the wall clock
    pub fn step_with_dt(&mut self, dt: f32) {
        self.world.step(dt);
        for key in self.world.body_keys().collect::<Vec<_>>() {
            if let Some(body) = self.world.get_body(key) {
                let transform = body.transform();
                let known = self.motion.write_raw(key, transform);
                debug_assert!(known, "body {:?} has no motion record", key);
            }
        }
    }

    /// Forget the previous step timestamp
    ///
    /// Called when resuming from pause so the pause duration is not
    /// integrated as one giant step.
    pub fn reset_clock(&mut self) {
        self.last_step = None;
    }

    /// Snapshot current transforms and emit the frame's draw list
    pub fn refresh(&mut self) -> DrawList {
        self.motion.refresh()
    }
}

/// Simulation behind an `Arc<Mutex>`, cloneable across threads
#[derive(Clone)]
pub struct SharedSimulation {
    inner: Arc<Mutex<Simulation>>,
}

impl SharedSimulation {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            inner: Arc::new(Mutex::new(simulation)),
        }
    }

    /// Lock the simulation. A poisoned lock is recovered rather than
    /// propagated: transforms are plain data and stay usable even if a
    /// panicking thread abandoned the lock mid-step.
    pub fn lock(&self) -> MutexGuard<'_, Simulation> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picking_color::PALETTE_SIZE;

    fn simulation_with_floor() -> Simulation {
        let mut sim = Simulation::new(RigidBodyWorld::new());
        sim.add_ground_plane(GroundPlane::floor(-2.0, 0.85, 0.3));
        sim
    }

    #[test]
    fn test_first_step_moves_nothing() {
        let mut sim = simulation_with_floor();
        let key = sim.spawn_block_oriented(
            Vec3::new(0.0, 5.0, 0.0),
            Quat::IDENTITY,
            BlockMesh::Default,
        );

        std::thread::sleep(std::time::Duration::from_millis(20));
        sim.step();

        assert_eq!(sim.body_position(key).unwrap(), Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_second_step_applies_gravity() {
        let mut sim = simulation_with_floor();
        let key = sim.spawn_block_oriented(
            Vec3::new(0.0, 5.0, 0.0),
            Quat::IDENTITY,
            BlockMesh::Default,
        );

        sim.step();
        std::thread::sleep(std::time::Duration::from_millis(40));
        sim.step();

        assert!(sim.body_position(key).unwrap().y < 5.0);
    }

    #[test]
    fn test_stacked_blocks_stay_in_place_with_zero_dt() {
        let mut sim = simulation_with_floor();
        // Small pyramid resting on the floor
        let positions = [
            Vec3::new(-1.1, -1.0, 0.0),
            Vec3::new(1.1, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let keys: Vec<BodyKey> = positions
            .iter()
            .map(|&p| sim.spawn_block_oriented(p, Quat::IDENTITY, BlockMesh::Default))
            .collect();

        sim.step_with_dt(0.0);

        for (key, &expected) in keys.iter().zip(&positions) {
            assert_eq!(sim.body_position(*key).unwrap(), expected);
        }
    }

    #[test]
    fn test_spawned_blocks_get_distinct_colors() {
        let mut sim = simulation_with_floor();
        let a = sim.spawn_block_oriented(Vec3::ZERO, Quat::IDENTITY, BlockMesh::Default);
        let b = sim.spawn_block_oriented(Vec3::X, Quat::IDENTITY, BlockMesh::Default);

        sim.step_with_dt(0.0);
        let list = sim.refresh();
        let color_a = list.iter().find(|i| i.key == a).unwrap().color;
        let color_b = list.iter().find(|i| i.key == b).unwrap().color;
        assert!(color_a.is_some());
        assert!(color_b.is_some());
        assert_ne!(color_a, color_b);
    }

    #[test]
    fn test_palette_exhaustion_spawns_unpickable() {
        let mut sim = simulation_with_floor();
        let mut keys = Vec::new();
        for i in 0..=PALETTE_SIZE {
            keys.push(sim.spawn_block_oriented(
                Vec3::new(i as f32 * 3.0, 0.0, 0.0),
                Quat::IDENTITY,
                BlockMesh::Default,
            ));
        }

        let list = sim.refresh();
        let last = list.iter().find(|i| i.key == keys[PALETTE_SIZE]).unwrap();
        assert!(last.color.is_none());
        let full = list.iter().find(|i| i.key == keys[PALETTE_SIZE - 1]).unwrap();
        assert!(full.color.is_some());
    }

    #[test]
    fn test_clear_blocks_resets_palette() {
        let mut sim = simulation_with_floor();
        sim.spawn_block_oriented(Vec3::ZERO, Quat::IDENTITY, BlockMesh::Default);
        let before = sim.refresh()[0].color;

        sim.clear_blocks();
        assert_eq!(sim.block_count(), 0);

        sim.spawn_block_oriented(Vec3::ZERO, Quat::IDENTITY, BlockMesh::Default);
        let after = sim.refresh()[0].color;
        assert_eq!(before, after);
    }

    #[test]
    fn test_apply_force_unknown_body() {
        let mut sim = simulation_with_floor();
        let key = sim.spawn_block_oriented(Vec3::ZERO, Quat::IDENTITY, BlockMesh::Default);
        sim.clear_blocks();
        assert_eq!(
            sim.apply_force(key, Vec3::X, Vec3::ZERO),
            Err(SimulationError::UnknownBody)
        );
    }

    #[test]
    fn test_refresh_reflects_steps() {
        let mut sim = simulation_with_floor();
        let key = sim.spawn_block_oriented(
            Vec3::new(0.0, 10.0, 0.0),
            Quat::IDENTITY,
            BlockMesh::Default,
        );

        sim.step_with_dt(1.0 / 30.0);
        let list = sim.refresh();
        let item = list.iter().find(|i| i.key == key).unwrap();
        assert!(item.transform[3][1] < 10.0);
    }
}
