//! Rigid body simulation for the Tumble block toy
//!
//! This crate provides the dynamics world the rest of the engine treats as
//! a black box: box-shaped rigid bodies with mass, friction and restitution,
//! advanced in fixed substeps, with forces applied at arbitrary points.
//! It is intentionally a toy-scale solver, not a general physics engine.

pub mod body;
pub mod world;

pub use body::{BodyKey, RigidBody};
pub use world::{GroundPlane, RigidBodyWorld, WorldConfig};
