//! Rendering for the Tumble block toy
//!
//! Three GPU passes per frame:
//!
//! 1. Shadow pass: the scene from the light's point of view, into either a
//!    depth texture or an RGBA-packed depth target (driver workaround path)
//! 2. Lit pass: skybox, ground and blocks with diffuse lighting and the
//!    shadow map applied, then UI overlays
//! 3. On demand, a picking pass: every block in its flat identity color
//!    into an offscreen target that is read back on the CPU
//!
//! ## Key components
//!
//! - [`context::RenderContext`] - wgpu device, queue and surface management
//! - [`camera::OrbitCamera`] - yaw/pitch/distance orbit around the scene
//! - [`light::LightRig`] - shadow-casting light on its own orbit
//! - [`renderer::Renderer`] - owns all pipelines and draws a frame

pub mod camera;
pub mod context;
pub mod depth_pack;
pub mod geometry;
pub mod light;
pub mod pipeline;
pub mod renderer;
pub mod texture;

pub use camera::OrbitCamera;
pub use context::{RenderContext, RenderError};
pub use light::LightRig;
pub use pipeline::ShadowMode;
pub use renderer::{OverlayState, Renderer};
