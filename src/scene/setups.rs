//! The block arrangements

use tumble_core::Simulation;
use tumble_input::OrbitPose;
use tumble_math::Vec3;

/// Center-to-center spacing of neighboring blocks in a row. Blocks are
/// 2 units wide, so this leaves a small gap for the physics to settle.
const SPACING: f32 = 2.5;
/// Vertical step between stacked layers; stacked blocks touch exactly
const LAYER_STEP: f32 = 2.0;

/// The arrangements the Next button cycles through, in order
pub const SETUP_CYCLE: [BlockSetup; 5] = [
    BlockSetup::Pyramid,
    BlockSetup::PyramidSolid,
    BlockSetup::Towers,
    BlockSetup::Shootout,
    BlockSetup::Grid,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockSetup {
    /// Flat pyramid, three rows tall
    Pyramid,
    /// Solid triangular pyramid
    PyramidSolid,
    /// Five towers of mixed heights
    Towers,
    /// A wall with two loose blocks in front of it
    Shootout,
    /// Nine towers on a 3x3 grid
    Grid,
}

impl BlockSetup {
    pub fn name(&self) -> &'static str {
        match self {
            BlockSetup::Pyramid => "pyramid",
            BlockSetup::PyramidSolid => "solid pyramid",
            BlockSetup::Towers => "towers",
            BlockSetup::Shootout => "shootout",
            BlockSetup::Grid => "grid",
        }
    }

    /// The setup shown after this one
    pub fn next(&self) -> BlockSetup {
        let index = SETUP_CYCLE
            .iter()
            .position(|s| s == self)
            .unwrap_or(SETUP_CYCLE.len() - 1);
        SETUP_CYCLE[(index + 1) % SETUP_CYCLE.len()]
    }

    /// Camera pose the approach animation flies toward for this setup
    pub fn approach_pose(&self) -> OrbitPose {
        let distance = match self {
            BlockSetup::Pyramid => 7.0,
            BlockSetup::PyramidSolid => 8.0,
            BlockSetup::Towers => 15.0,
            BlockSetup::Shootout => 15.0,
            BlockSetup::Grid => 18.0,
        };
        OrbitPose {
            yaw: 0.0,
            pitch: 22.0,
            distance,
            height: 1.0,
        }
    }

    /// Spawn this setup's blocks resting on the given floor height
    pub fn populate(&self, sim: &mut Simulation, ground_y: f32) {
        let base = ground_y + tumble_core::BLOCK_HALF_EXTENT;
        match self {
            BlockSetup::Pyramid => pyramid_2d(sim, base),
            BlockSetup::PyramidSolid => pyramid_3d(sim, base),
            BlockSetup::Towers => towers(sim, base),
            BlockSetup::Shootout => shootout(sim, base),
            BlockSetup::Grid => grid(sim, base),
        }
        log::info!("setup '{}' spawned {} blocks", self.name(), sim.block_count());
    }
}

/// A centered row of `count` blocks at the given height and depth
fn row(sim: &mut Simulation, count: u32, y: f32, z: f32) {
    let start = -(count as f32 - 1.0) * SPACING / 2.0;
    for i in 0..count {
        sim.spawn_block(Vec3::new(start + i as f32 * SPACING, y, z));
    }
}

/// A stack of `height` blocks at the given ground position
fn tower(sim: &mut Simulation, x: f32, z: f32, base: f32, height: u32) {
    for layer in 0..height {
        sim.spawn_block(Vec3::new(x, base + layer as f32 * LAYER_STEP, z));
    }
}

/// 3 + 2 + 1 blocks, 6 total
fn pyramid_2d(sim: &mut Simulation, base: f32) {
    for (layer, count) in [3u32, 2, 1].into_iter().enumerate() {
        row(sim, count, base + layer as f32 * LAYER_STEP, 0.0);
    }
}

/// Triangular layers of side 3, 2, 1: 6 + 3 + 1 blocks
fn pyramid_3d(sim: &mut Simulation, base: f32) {
    for (layer, side) in [3u32, 2, 1].into_iter().enumerate() {
        let y = base + layer as f32 * LAYER_STEP;
        // Rows of side, side - 1, .., 1, centered around the origin
        let depth_start = -(side as f32 - 1.0) * SPACING / 2.0;
        for (r, count) in (1..=side).rev().enumerate() {
            row(sim, count, y, depth_start + r as f32 * SPACING);
        }
    }
}

/// Five towers: a tall pair and three shorter ones, 17 blocks
fn towers(sim: &mut Simulation, base: f32) {
    tower(sim, 0.0, 0.0, base, 4);
    tower(sim, -SPACING * 2.0, -SPACING * 2.0, base, 4);
    tower(sim, SPACING * 2.0, -SPACING * 2.0, base, 3);
    tower(sim, -SPACING * 2.0, SPACING * 2.0, base, 3);
    tower(sim, SPACING * 2.0, SPACING * 2.0, base, 3);
}

/// A 5x3 wall with two loose blocks in front to throw at it, 17 blocks
fn shootout(sim: &mut Simulation, base: f32) {
    for layer in 0..3u32 {
        row(sim, 5, base + layer as f32 * LAYER_STEP, -3.0);
    }
    sim.spawn_block(Vec3::new(-SPACING, base, 6.0));
    sim.spawn_block(Vec3::new(SPACING, base, 6.0));
}

/// Nine towers of five on a 3x3 grid, 45 blocks
fn grid(sim: &mut Simulation, base: f32) {
    for gx in -1..=1 {
        for gz in -1..=1 {
            tower(sim, gx as f32 * SPACING * 2.0, gz as f32 * SPACING * 2.0, base, 5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tumble_physics::RigidBodyWorld;

    fn fresh_simulation() -> Simulation {
        let mut sim = Simulation::new(RigidBodyWorld::new());
        crate::scene::install_bounds(&mut sim, -2.0);
        sim
    }

    #[test]
    fn test_block_counts() {
        let expected = [6usize, 10, 17, 17, 45];
        for (setup, count) in SETUP_CYCLE.iter().zip(expected) {
            let mut sim = fresh_simulation();
            setup.populate(&mut sim, -2.0);
            assert_eq!(sim.block_count(), count, "setup {}", setup.name());
        }
    }

    #[test]
    fn test_every_setup_fits_the_picking_palette() {
        for setup in SETUP_CYCLE {
            let mut sim = fresh_simulation();
            setup.populate(&mut sim, -2.0);
            assert!(sim.block_count() <= tumble_core::PALETTE_SIZE);
        }
    }

    #[test]
    fn test_cycle_wraps_around() {
        let mut setup = SETUP_CYCLE[0];
        for _ in 0..SETUP_CYCLE.len() {
            setup = setup.next();
        }
        assert_eq!(setup, SETUP_CYCLE[0]);
    }

    #[test]
    fn test_setups_settle_on_the_floor() {
        // Every arrangement should come to rest without blocks falling
        // through the floor or exploding outward
        for setup in [BlockSetup::Pyramid, BlockSetup::Towers] {
            let mut sim = fresh_simulation();
            setup.populate(&mut sim, -2.0);
            for _ in 0..300 {
                sim.step_with_dt(1.0 / 60.0);
            }
            let list = sim.refresh();
            for item in list.iter() {
                let y = item.transform[3][1];
                assert!(y > -2.0, "block sank to y = {}", y);
                assert!(y < 10.0, "block flew to y = {}", y);
                let x = item.transform[3][0];
                let z = item.transform[3][2];
                assert!(x.abs() < 30.0 && z.abs() < 30.0, "block escaped the fence");
            }
        }
    }
}
