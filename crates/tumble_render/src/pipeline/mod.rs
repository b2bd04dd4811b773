//! GPU pipelines
//!
//! - [`shadow::ShadowPipeline`] - scene depth from the light, two encodings
//! - [`lit::LitPipeline`] - textured, shadowed main pass
//! - [`picking::PickingPipeline`] - flat identity colors plus CPU readback
//! - [`flat::SkyPipeline`] / [`flat::OverlayPipeline`] - skybox and
//!   screen-space overlays

pub mod flat;
pub mod lit;
pub mod picking;
pub mod shadow;

use std::marker::PhantomData;

use bytemuck::Pod;
use tumble_math::Mat4;

/// Shadow map resolution (square)
pub const SHADOW_MAP_SIZE: u32 = 512;

/// Depth format for the main pass and the shadow depth path
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// How the shadow map stores depth
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowMode {
    /// Real depth texture sampled with a comparison sampler
    Depth,
    /// Depth packed into an RGBA8 color target; workaround for drivers
    /// that mishandle depth texture sampling
    Packed,
}

/// Maps clip space to shadow map UV space
///
/// wgpu clip space already has z in [0, 1], so only x is remapped and y is
/// remapped and flipped (texture v grows downward).
pub const SHADOW_UV_FROM_CLIP: Mat4 = [
    [0.5, 0.0, 0.0, 0.0],
    [0.0, -0.5, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.5, 0.5, 0.0, 1.0],
];

/// Create a depth attachment for the given dimensions
pub fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Arena of per-draw uniform slots addressed with dynamic offsets
///
/// Uniform data for every draw of a frame is written up front, one
/// 256-byte-aligned slot per draw, then bound once with a varying dynamic
/// offset. Cheaper than a bind group per block and valid under wgpu's
/// write-before-submit rules.
pub struct UniformArena<T> {
    buffer: wgpu::Buffer,
    capacity: u32,
    _marker: PhantomData<T>,
}

impl<T: Pod> UniformArena<T> {
    /// Slot stride: the struct size rounded up to the offset alignment
    pub fn stride() -> u64 {
        let size = std::mem::size_of::<T>() as u64;
        size.div_ceil(256) * 256
    }

    pub fn new(device: &wgpu::Device, capacity: u32, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: Self::stride() * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            capacity,
            _marker: PhantomData,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Write one slot. Slots beyond capacity are rejected; the caller
    /// skips the draw.
    pub fn write(&self, queue: &wgpu::Queue, slot: u32, value: &T) -> bool {
        if slot >= self.capacity {
            return false;
        }
        queue.write_buffer(
            &self.buffer,
            slot as u64 * Self::stride(),
            bytemuck::bytes_of(value),
        );
        true
    }

    /// Dynamic offset for a slot
    pub fn offset(slot: u32) -> u32 {
        (slot as u64 * Self::stride()) as u32
    }

    /// Binding resource covering one slot (used with dynamic offsets)
    pub fn binding(&self) -> wgpu::BindingResource<'_> {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        })
    }

    /// Layout entry for a dynamic-offset uniform binding
    pub fn layout_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};

    #[repr(C)]
    #[derive(Clone, Copy, Pod, Zeroable)]
    struct Small {
        v: [f32; 4],
    }

    #[repr(C)]
    #[derive(Clone, Copy, Pod, Zeroable)]
    struct ThreeMatrices {
        m: [[[f32; 4]; 4]; 3],
    }

    #[test]
    fn test_stride_is_aligned() {
        assert_eq!(UniformArena::<Small>::stride(), 256);
        assert_eq!(UniformArena::<ThreeMatrices>::stride(), 256);
        assert_eq!(UniformArena::<Small>::offset(3), 768);
    }

    #[test]
    fn test_uv_matrix_maps_clip_corners() {
        use tumble_math::{mat4, Vec3};
        let center = mat4::transform_point(SHADOW_UV_FROM_CLIP, Vec3::ZERO);
        assert_eq!((center.x, center.y), (0.5, 0.5));
        // Clip top-left (-1, 1) lands at uv (0, 0)
        let tl = mat4::transform_point(SHADOW_UV_FROM_CLIP, Vec3::new(-1.0, 1.0, 0.5));
        assert_eq!((tl.x, tl.y), (0.0, 0.0));
        // Depth passes through untouched
        assert_eq!(tl.z, 0.5);
    }
}
