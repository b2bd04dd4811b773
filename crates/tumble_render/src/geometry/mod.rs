//! Mesh data for blocks, ground, sky and UI quads

mod cube;
mod quad;

pub use cube::{block_mesh, skybox_mesh};
pub use quad::{ground_mesh, overlay_mesh};

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Vertex format shared by every pipeline
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 24,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// CPU-side mesh
#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// Mesh uploaded to GPU buffers
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        // 3 + 3 + 2 floats = 32 bytes, matching the buffer layout stride
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn test_meshes_are_indexed_triangles() {
        for mesh in [
            block_mesh(tumble_core::BlockMesh::Default),
            block_mesh(tumble_core::BlockMesh::Alt),
            skybox_mesh(),
            ground_mesh(),
            overlay_mesh(),
        ] {
            assert_eq!(mesh.indices.len() % 3, 0);
            let max = *mesh.indices.iter().max().unwrap() as usize;
            assert!(max < mesh.vertices.len());
        }
    }
}
