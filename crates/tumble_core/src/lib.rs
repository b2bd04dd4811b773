//! Core simulation layer for the Tumble block toy
//!
//! This crate ties the physics world to everything the renderer needs:
//! per-body motion records with picking colors, a double-buffered transform
//! table, and a scheduler that lets physics step on its own thread while a
//! frame is in flight.

pub mod motion;
pub mod picking_color;
pub mod scheduler;
pub mod simulation;

pub use motion::{BlockMesh, DrawItem, DrawList, MotionRecord, MotionTable};
pub use picking_color::{PickingColor, PickingColorAllocator, PALETTE_SIZE};
pub use scheduler::{PhysicsScheduler, SchedulerMode};
pub use simulation::{
    SharedSimulation, Simulation, SimulationError, BLOCK_FRICTION, BLOCK_HALF_EXTENT, BLOCK_MASS,
    BLOCK_RESTITUTION,
};
