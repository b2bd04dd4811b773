//! Shadow map pass
//!
//! Renders every block from the light's point of view. Two target
//! encodings exist (see [`ShadowMode`]); the pipeline owns its target and
//! hands the lit pass a view plus sampler to read it back.

use bytemuck::{Pod, Zeroable};
use tumble_core::DrawList;
use tumble_math::{mat4, Mat4};

use super::{ShadowMode, UniformArena, DEPTH_FORMAT, SHADOW_MAP_SIZE};
use crate::geometry::{GpuMesh, Vertex};
use crate::renderer::BlockMeshes;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct ShadowDrawUniforms {
    light_mvp: Mat4,
}

pub struct ShadowPipeline {
    mode: ShadowMode,
    pipeline: wgpu::RenderPipeline,
    arena: UniformArena<ShadowDrawUniforms>,
    bind_group: wgpu::BindGroup,
    /// What the lit pass samples: the depth view itself, or the packed
    /// color target
    map_view: wgpu::TextureView,
    map_sampler: wgpu::Sampler,
    /// Scratch depth buffer for the packed path's depth testing
    scratch_depth: Option<wgpu::TextureView>,
}

impl ShadowPipeline {
    pub fn new(device: &wgpu::Device, mode: ShadowMode, max_draws: u32) -> Self {
        let arena = UniformArena::new(device, max_draws, "Shadow Draw Uniforms");

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Bind Group Layout"),
            entries: &[UniformArena::<ShadowDrawUniforms>::layout_entry(
                0,
                wgpu::ShaderStages::VERTEX,
            )],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: arena.binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let size = wgpu::Extent3d {
            width: SHADOW_MAP_SIZE,
            height: SHADOW_MAP_SIZE,
            depth_or_array_layers: 1,
        };

        let (pipeline, map_view, map_sampler, scratch_depth) = match mode {
            ShadowMode::Depth => {
                let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("Shadow Depth Shader"),
                    source: wgpu::ShaderSource::Wgsl(
                        include_str!("../shaders/shadow_depth.wgsl").into(),
                    ),
                });
                let pipeline =
                    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Shadow Depth Pipeline"),
                        layout: Some(&pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[Vertex::layout()],
                            compilation_options: Default::default(),
                        },
                        fragment: None,
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

                let texture = device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("Shadow Map (depth)"),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: DEPTH_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                    label: Some("Shadow Comparison Sampler"),
                    address_mode_u: wgpu::AddressMode::ClampToEdge,
                    address_mode_v: wgpu::AddressMode::ClampToEdge,
                    mag_filter: wgpu::FilterMode::Linear,
                    min_filter: wgpu::FilterMode::Linear,
                    compare: Some(wgpu::CompareFunction::LessEqual),
                    ..Default::default()
                });
                (pipeline, view, sampler, None)
            }
            ShadowMode::Packed => {
                let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("Shadow Packed Shader"),
                    source: wgpu::ShaderSource::Wgsl(
                        include_str!("../shaders/shadow_packed.wgsl").into(),
                    ),
                });
                let pipeline =
                    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Shadow Packed Pipeline"),
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

                let color = device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("Shadow Map (packed)"),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                });
                let view = color.create_view(&wgpu::TextureViewDescriptor::default());
                let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                    label: Some("Shadow Packed Sampler"),
                    address_mode_u: wgpu::AddressMode::ClampToEdge,
                    address_mode_v: wgpu::AddressMode::ClampToEdge,
                    mag_filter: wgpu::FilterMode::Nearest,
                    min_filter: wgpu::FilterMode::Nearest,
                    ..Default::default()
                });
                let scratch =
                    super::create_depth_view(device, SHADOW_MAP_SIZE, SHADOW_MAP_SIZE);
                (pipeline, view, sampler, Some(scratch))
            }
        };

        Self {
            mode,
            pipeline,
            arena,
            bind_group,
            map_view,
            map_sampler,
            scratch_depth,
        }
    }

    pub fn mode(&self) -> ShadowMode {
        self.mode
    }

    /// View and sampler for the lit pass to bind
    pub fn map_view(&self) -> &wgpu::TextureView {
        &self.map_view
    }

    pub fn map_sampler(&self) -> &wgpu::Sampler {
        &self.map_sampler
    }

    /// Render the blocks into the shadow map
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        draw_list: &DrawList,
        meshes: &BlockMeshes,
        light_view_projection: Mat4,
    ) {
        for (slot, item) in draw_list.iter().enumerate() {
            let uniforms = ShadowDrawUniforms {
                light_mvp: mat4::mul(light_view_projection, item.transform),
            };
            if !self.arena.write(queue, slot as u32, &uniforms) {
                log::warn!(
                    "shadow uniform arena full ({} slots), skipping remaining blocks",
                    self.arena.capacity()
                );
                break;
            }
        }

        let depth_ops = wgpu::Operations {
            load: wgpu::LoadOp::Clear(1.0),
            store: wgpu::StoreOp::Store,
        };
        let mut pass = match (&self.mode, &self.scratch_depth) {
            (ShadowMode::Depth, _) => encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.map_view,
                    depth_ops: Some(depth_ops),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            }),
            (ShadowMode::Packed, Some(scratch)) => {
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Shadow Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &self.map_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            // Far depth packs to white
                            load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: scratch,
                        depth_ops: Some(depth_ops),
                        stencil_ops: None,
                    }),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
            }
            (ShadowMode::Packed, None) => {
                log::warn!("packed shadow target missing, skipping shadow pass");
                return;
            }
        };

        pass.set_pipeline(&self.pipeline);
        for (slot, item) in draw_list.iter().enumerate() {
            if slot as u32 >= self.arena.capacity() {
                break;
            }
            let mesh: &GpuMesh = meshes.get(item.mesh);
            pass.set_bind_group(
                0,
                &self.bind_group,
                &[UniformArena::<ShadowDrawUniforms>::offset(slot as u32)],
            );
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}
