//! Application-level systems gluing the crates together

pub mod frame;

pub use frame::FrameDriver;
