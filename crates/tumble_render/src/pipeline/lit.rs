//! Main lit pass
//!
//! Textured geometry with one directional-ish point light, a hard ambient
//! floor and the shadow map applied. The shader pair matches the shadow
//! encoding: depth comparison sampling, or manual unpack of the RGBA path.

use bytemuck::{Pod, Zeroable};
use tumble_math::{mat4, Mat4, Vec3};

use super::{ShadowMode, UniformArena, DEPTH_FORMAT, SHADOW_UV_FROM_CLIP};
use crate::geometry::{GpuMesh, Vertex};
use crate::pipeline::shadow::ShadowPipeline;
use crate::texture::BoundTexture;

/// Minimum light level in shadow
pub const AMBIENT_FLOOR: f32 = 0.3;
/// Depth comparison bias against shadow acne
pub const SHADOW_BIAS: f32 = 0.002;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct GlobalUniforms {
    /// Light position in world space (w unused)
    light_pos: [f32; 4],
    /// x = ambient floor, y = shadow bias
    params: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct DrawUniforms {
    mvp: Mat4,
    model: Mat4,
    /// Light MVP premultiplied by the clip-to-uv matrix
    light_mvp_uv: Mat4,
}

pub struct LitPipeline {
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    arena: UniformArena<DrawUniforms>,
    draw_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
}

impl LitPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shadow: &ShadowPipeline,
        max_draws: u32,
    ) -> Self {
        let shadow_texture_entry = match shadow.mode() {
            ShadowMode::Depth => wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Depth,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            ShadowMode::Packed => wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
        };
        let shadow_sampler_entry = match shadow.mode() {
            ShadowMode::Depth => wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
            ShadowMode::Packed => wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
        };

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lit Globals Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                shadow_texture_entry,
                shadow_sampler_entry,
            ],
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lit Globals"),
            size: std::mem::size_of::<GlobalUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lit Globals Bind Group"),
            layout: &globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow.map_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(shadow.map_sampler()),
                },
            ],
        });

        let arena = UniformArena::new(device, max_draws, "Lit Draw Uniforms");
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lit Draw Layout"),
            entries: &[UniformArena::<DrawUniforms>::layout_entry(
                0,
                wgpu::ShaderStages::VERTEX,
            )],
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lit Draw Bind Group"),
            layout: &draw_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: arena.binding(),
            }],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lit Material Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &draw_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let source = match shadow.mode() {
            ShadowMode::Depth => include_str!("../shaders/lit_depth.wgsl"),
            ShadowMode::Packed => include_str!("../shaders/lit_packed.wgsl"),
        };
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Lit Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Lit Pipeline"),
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
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
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

        Self {
            pipeline,
            globals_buffer,
            globals_bind_group,
            arena,
            draw_bind_group,
            material_layout,
        }
    }

    /// Bind group tying a texture to this pipeline's material slot
    pub fn create_material(
        &self,
        device: &wgpu::Device,
        texture: &BoundTexture,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    pub fn max_draws(&self) -> u32 {
        self.arena.capacity()
    }

    pub fn write_globals(&self, queue: &wgpu::Queue, light_pos: Vec3) {
        let globals = GlobalUniforms {
            light_pos: [light_pos.x, light_pos.y, light_pos.z, 1.0],
            params: [AMBIENT_FLOOR, SHADOW_BIAS, 0.0, 0.0],
        };
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Write one draw's uniforms; returns false when the arena is full
    pub fn write_draw(
        &self,
        queue: &wgpu::Queue,
        slot: u32,
        model: Mat4,
        view_projection: Mat4,
        light_view_projection: Mat4,
    ) -> bool {
        let uniforms = DrawUniforms {
            mvp: mat4::mul(view_projection, model),
            model,
            light_mvp_uv: mat4::mul(
                SHADOW_UV_FROM_CLIP,
                mat4::mul(light_view_projection, model),
            ),
        };
        self.arena.write(queue, slot, &uniforms)
    }

    /// Record one lit draw; uniforms for `slot` must be written already
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        mesh: &GpuMesh,
        material: &wgpu::BindGroup,
        slot: u32,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_bind_group(
            1,
            &self.draw_bind_group,
            &[UniformArena::<DrawUniforms>::offset(slot)],
        );
        pass.set_bind_group(2, material, &[]);
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}
