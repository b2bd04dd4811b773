//! Scene construction: the block setups the Next button cycles through
//! and the static collision bounds they all share.

mod setups;

pub use setups::{BlockSetup, SETUP_CYCLE};

use tumble_core::{Simulation, BLOCK_FRICTION, BLOCK_RESTITUTION};
use tumble_math::Vec3;
use tumble_physics::GroundPlane;

/// Distance of the fence walls from the scene center
pub const FENCE_DISTANCE: f32 = 30.0;

/// Install the floor and the four fence walls that keep tossed blocks
/// inside the arena
pub fn install_bounds(sim: &mut Simulation, ground_y: f32) {
    sim.add_ground_plane(GroundPlane::floor(ground_y, BLOCK_FRICTION, BLOCK_RESTITUTION));

    // Inward-facing vertical walls; a point is inside while
    // dot(p, normal) >= offset
    let walls = [Vec3::X, -Vec3::X, Vec3::Z, -Vec3::Z];
    for normal in walls {
        sim.add_ground_plane(GroundPlane {
            normal,
            offset: -FENCE_DISTANCE,
            friction: BLOCK_FRICTION,
            restitution: BLOCK_RESTITUTION,
        });
    }
}
