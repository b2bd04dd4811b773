//! Tumble: a 3D toy-block scene
//!
//! Piles of blocks to knock over. Drag empty space to orbit the camera,
//! tap a block to push it, drag one to toss it, pinch to zoom and rotate
//! two fingers to move the light. The Next button cycles through block
//! arrangements with a short camera fly-in.

pub mod config;
pub mod scene;
pub mod systems;

pub use config::AppConfig;
