//! Math primitives for the Tumble engine
//!
//! Provides the 3D vector, quaternion and 4x4 matrix types shared by the
//! physics, core and render crates. Matrices are column-major
//! `[[f32; 4]; 4]` arrays so they can be handed to the GPU without
//! conversion.

pub mod vec3;
pub mod quat;
pub mod mat4;

pub use vec3::Vec3;
pub use quat::Quat;
pub use mat4::Mat4;
