//! Input handling for the Tumble block toy
//!
//! Raw pointer events arrive already decoded to positions and phases; this
//! crate classifies them into taps and drags and turns them into scene
//! effects: orbiting the camera, spinning the light, pushing and tossing
//! blocks, and driving the two overlay buttons.

pub mod controller;
pub mod gesture;

pub use controller::{
    DragEffect, InteractionController, LightControl, OrbitPose, OrbitRig, TapOutcome, UiLayout,
};
pub use gesture::{Gesture, GestureClassifier};
