//! GPU picking
//!
//! Blocks are re-rendered into an offscreen target, each in its flat
//! identity color, and the pixel under the cursor is read back. A color
//! match is exact byte equality; palette colors are chosen to survive the
//! unorm round trip (see `tumble_core::picking_color`).

use bytemuck::{Pod, Zeroable};
use tumble_core::DrawList;
use tumble_math::{mat4, Mat4};
use tumble_physics::BodyKey;

use super::{UniformArena, DEPTH_FORMAT};
use crate::context::RenderError;
use crate::geometry::{GpuMesh, Vertex};
use crate::renderer::BlockMeshes;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct PickingDrawUniforms {
    mvp: Mat4,
    color: [f32; 4],
}

pub struct PickingPipeline {
    pipeline: wgpu::RenderPipeline,
    arena: UniformArena<PickingDrawUniforms>,
    bind_group: wgpu::BindGroup,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl PickingPipeline {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, max_draws: u32) -> Self {
        let arena = UniformArena::new(device, max_draws, "Picking Draw Uniforms");

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Picking Bind Group Layout"),
            entries: &[UniformArena::<PickingDrawUniforms>::layout_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Picking Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: arena.binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Picking Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Picking Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/picking.wgsl").into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Picking Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    // Non-srgb so palette bytes pass through unmodified
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (target, target_view, depth_view) = Self::create_targets(device, width, height);

        Self {
            pipeline,
            arena,
            bind_group,
            target,
            target_view,
            depth_view,
            width: width.max(1),
            height: height.max(1),
        }
    }

    fn create_targets(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView, wgpu::TextureView) {
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Picking Target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = super::create_depth_view(device, width, height);
        (target, target_view, depth_view)
    }

    /// Match the picking target to the window size
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (target, target_view, depth_view) = Self::create_targets(device, width, height);
        self.target = target;
        self.target_view = target_view;
        self.depth_view = depth_view;
        self.width = width;
        self.height = height;
    }

    /// Render identity colors and read back the pixel under `(x, y)`
    ///
    /// Returns the key of the block hit, or `None` for background, ground,
    /// or blocks spawned without a color. Blocks synchronously on the
    /// readback; picking happens at most once per tap.
    pub fn pick(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        draw_list: &DrawList,
        meshes: &BlockMeshes,
        view_projection: Mat4,
        x: u32,
        y: u32,
    ) -> Result<Option<BodyKey>, RenderError> {
        if x >= self.width || y >= self.height {
            return Ok(None);
        }

        for (slot, item) in draw_list.iter().enumerate() {
            let Some(color) = item.color else { continue };
            let [r, g, b] = color.to_floats();
            let uniforms = PickingDrawUniforms {
                mvp: mat4::mul(view_projection, item.transform),
                color: [r, g, b, 1.0],
            };
            if !self.arena.write(queue, slot as u32, &uniforms) {
                log::warn!("picking uniform arena full, remaining blocks unpickable");
                break;
            }
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Picking Encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Picking Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Black is reserved: no palette entry uses it
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            for (slot, item) in draw_list.iter().enumerate() {
                if item.color.is_none() || slot as u32 >= self.arena.capacity() {
                    continue;
                }
                let mesh: &GpuMesh = meshes.get(item.mesh);
                pass.set_bind_group(
                    0,
                    &self.bind_group,
                    &[UniformArena::<PickingDrawUniforms>::offset(slot as u32)],
                );
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Picking Readback"),
            size: 4,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    // Single-row copy, no row padding needed
                    bytes_per_row: None,
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));

        let (tx, rx) = std::sync::mpsc::channel();
        readback
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        device.poll(wgpu::Maintain::Wait);
        match rx.recv() {
            Ok(Ok(())) => {}
            _ => return Err(RenderError::Readback),
        }

        let rgb = {
            let data = readback.slice(..).get_mapped_range();
            [data[0], data[1], data[2]]
        };
        readback.unmap();

        Ok(draw_list
            .iter()
            .find(|item| item.color.is_some_and(|c| c.matches(rgb)))
            .map(|item| item.key))
    }
}
