//! Frame assembly
//!
//! Owns every pipeline, mesh and texture, and records the passes for one
//! frame. The caller keeps the returned surface texture and presents it
//! after the physics handshake, preserving the frame ordering contract.

use tumble_core::{BlockMesh, DrawList};
use tumble_math::{mat4, Vec3};
use tumble_physics::BodyKey;

use crate::camera::OrbitCamera;
use crate::context::{RenderContext, RenderError};
use crate::geometry::{block_mesh, ground_mesh, overlay_mesh, skybox_mesh, GpuMesh};
use crate::light::LightRig;
use crate::pipeline::flat::{OverlayPipeline, SkyPipeline};
use crate::pipeline::lit::LitPipeline;
use crate::pipeline::picking::PickingPipeline;
use crate::pipeline::shadow::ShadowPipeline;
use crate::pipeline::{create_depth_view, ShadowMode};
use crate::texture;

/// One uniform slot per possible picking color, the cap on visible blocks
pub const MAX_BLOCK_DRAWS: u32 = 64;
/// Lit pass also draws the ground, in the slot after the blocks
const GROUND_SLOT: u32 = MAX_BLOCK_DRAWS;

/// Both block mesh variants, uploaded once
pub struct BlockMeshes {
    default: GpuMesh,
    alt: GpuMesh,
}

impl BlockMeshes {
    pub fn get(&self, variant: BlockMesh) -> &GpuMesh {
        match variant {
            BlockMesh::Default => &self.default,
            BlockMesh::Alt => &self.alt,
        }
    }
}

/// What UI is drawn on top of the scene this frame
///
/// Button rects are in physical pixels, top-left origin, matching the hit
/// regions the interaction layer uses.
#[derive(Clone, Debug)]
pub struct OverlayState {
    pub next_button: [f32; 4],
    pub about_button: [f32; 4],
    pub show_about: bool,
}

/// Convert a pixel rect (top-left origin) to an NDC rect (lower-left corner)
pub fn pixel_rect_to_ndc(rect: [f32; 4], width: u32, height: u32) -> [f32; 4] {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    [
        rect[0] / w * 2.0 - 1.0,
        1.0 - (rect[1] + rect[3]) / h * 2.0,
        rect[2] / w * 2.0,
        rect[3] / h * 2.0,
    ]
}

pub struct Renderer {
    context: RenderContext,
    depth_view: wgpu::TextureView,
    shadow: ShadowPipeline,
    lit: LitPipeline,
    picking: PickingPipeline,
    sky: SkyPipeline,
    overlay: OverlayPipeline,
    meshes: BlockMeshes,
    ground: GpuMesh,
    skybox: GpuMesh,
    overlay_quad: GpuMesh,
    block_material: wgpu::BindGroup,
    ground_material: wgpu::BindGroup,
    sky_material: wgpu::BindGroup,
    next_material: wgpu::BindGroup,
    about_material: wgpu::BindGroup,
    panel_material: wgpu::BindGroup,
    /// Height of the ground plane the quad is drawn at
    ground_y: f32,
}

impl Renderer {
    pub fn new(context: RenderContext, shadow_mode: ShadowMode, ground_y: f32) -> Self {
        let device = &context.device;
        let queue = &context.queue;

        let shadow = ShadowPipeline::new(device, shadow_mode, MAX_BLOCK_DRAWS);
        let lit = LitPipeline::new(device, context.config.format, &shadow, MAX_BLOCK_DRAWS + 1);
        let picking = PickingPipeline::new(
            device,
            context.config.width,
            context.config.height,
            MAX_BLOCK_DRAWS,
        );
        let sky = SkyPipeline::new(device, context.config.format);
        let overlay = OverlayPipeline::new(device, context.config.format, 3);

        let meshes = BlockMeshes {
            default: GpuMesh::upload(device, &block_mesh(BlockMesh::Default), "Block"),
            alt: GpuMesh::upload(device, &block_mesh(BlockMesh::Alt), "Block Alt"),
        };
        let ground = GpuMesh::upload(device, &ground_mesh(), "Ground");
        let skybox = GpuMesh::upload(device, &skybox_mesh(), "Skybox");
        let overlay_quad = GpuMesh::upload(device, &overlay_mesh(), "Overlay Quad");

        let atlas = texture::upload(device, queue, &texture::block_atlas(), false, "Block Atlas");
        let ground_tex = texture::upload(device, queue, &texture::ground_tile(), true, "Ground");
        let sky_tex = texture::upload(device, queue, &texture::sky_gradient(), false, "Sky");
        let next_tex = texture::upload(device, queue, &texture::button_next(), false, "Next");
        let about_tex = texture::upload(device, queue, &texture::button_about(), false, "About");
        let panel_tex = texture::upload(device, queue, &texture::about_panel(), false, "Panel");

        let block_material = lit.create_material(device, &atlas, "Block Material");
        let ground_material = lit.create_material(device, &ground_tex, "Ground Material");
        let sky_material = sky.create_material(device, &sky_tex);
        let next_material = overlay.create_material(device, &next_tex, "Next Button");
        let about_material = overlay.create_material(device, &about_tex, "About Button");
        let panel_material = overlay.create_material(device, &panel_tex, "About Panel");

        let depth_view =
            create_depth_view(device, context.config.width, context.config.height);

        Self {
            context,
            depth_view,
            shadow,
            lit,
            picking,
            sky,
            overlay,
            meshes,
            ground,
            skybox,
            overlay_quad,
            block_material,
            ground_material,
            sky_material,
            next_material,
            about_material,
            panel_material,
            ground_y,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.depth_view = create_depth_view(&self.context.device, width, height);
        self.picking.resize(&self.context.device, width, height);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.context.config.width, self.context.config.height)
    }

    /// Record and submit the frame
    ///
    /// Returns the acquired surface texture; the caller presents it once
    /// the physics handshake for this frame is complete. `None` means the
    /// surface was stale and got reconfigured; skip this frame.
    pub fn render_frame(
        &mut self,
        draw_list: &DrawList,
        camera: &OrbitCamera,
        light: &LightRig,
        overlays: &OverlayState,
    ) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                let (w, h) = self.surface_size();
                self.context.resize(w, h);
                return Ok(None);
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let queue = &self.context.queue;
        let view = camera.view_matrix();
        let projection = camera.projection(self.context.aspect_ratio());
        let view_projection = mat4::mul(projection, view);
        let light_vp = light.view_projection();

        // Uniform writes for everything this frame draws
        self.lit.write_globals(queue, light.position());
        self.sky.write_uniforms(
            queue,
            mat4::mul(projection, mat4::rotation_only(view)),
        );

        let ground_model = mat4::translation(Vec3::new(0.0, self.ground_y, 0.0));
        self.lit
            .write_draw(queue, GROUND_SLOT, ground_model, view_projection, light_vp);

        let mut block_draws = 0u32;
        for (slot, item) in draw_list.iter().enumerate() {
            if !self.lit.write_draw(
                queue,
                slot as u32,
                item.transform,
                view_projection,
                light_vp,
            ) {
                log::warn!("draw list exceeds {} blocks, truncating", MAX_BLOCK_DRAWS);
                break;
            }
            block_draws += 1;
        }

        let (width, height) = self.surface_size();
        self.overlay
            .write_rect(queue, 0, pixel_rect_to_ndc(overlays.next_button, width, height));
        self.overlay
            .write_rect(queue, 1, pixel_rect_to_ndc(overlays.about_button, width, height));
        if overlays.show_about {
            let side = (width.min(height) as f32) * 0.7;
            let panel = [
                (width as f32 - side) / 2.0,
                (height as f32 - side) / 2.0,
                side,
                side,
            ];
            self.overlay
                .write_rect(queue, 2, pixel_rect_to_ndc(panel, width, height));
        }

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

        self.shadow
            .render(&mut encoder, queue, draw_list, &self.meshes, light_vp);

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
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

            self.sky.draw(&mut pass, &self.skybox, &self.sky_material);
            self.lit
                .draw(&mut pass, &self.ground, &self.ground_material, GROUND_SLOT);
            for (slot, item) in draw_list.iter().enumerate().take(block_draws as usize) {
                self.lit.draw(
                    &mut pass,
                    self.meshes.get(item.mesh),
                    &self.block_material,
                    slot as u32,
                );
            }

            self.overlay
                .draw(&mut pass, &self.overlay_quad, &self.next_material, 0);
            self.overlay
                .draw(&mut pass, &self.overlay_quad, &self.about_material, 1);
            if overlays.show_about {
                self.overlay
                    .draw(&mut pass, &self.overlay_quad, &self.panel_material, 2);
            }
        }

        queue.submit(Some(encoder.finish()));
        Ok(Some(frame))
    }

    /// Identify the block under a window coordinate, if any
    pub fn pick_block(
        &self,
        draw_list: &DrawList,
        camera: &OrbitCamera,
        x: u32,
        y: u32,
    ) -> Result<Option<BodyKey>, RenderError> {
        let view_projection = mat4::mul(
            camera.projection(self.context.aspect_ratio()),
            camera.view_matrix(),
        );
        self.picking.pick(
            &self.context.device,
            &self.context.queue,
            draw_list,
            &self.meshes,
            view_projection,
            x,
            y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_rect_to_ndc_full_screen() {
        let ndc = pixel_rect_to_ndc([0.0, 0.0, 800.0, 600.0], 800, 600);
        assert_eq!(ndc, [-1.0, -1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_pixel_rect_to_ndc_top_left_corner() {
        // A quarter-size rect in the window's top-left quadrant
        let ndc = pixel_rect_to_ndc([0.0, 0.0, 400.0, 300.0], 800, 600);
        assert_eq!(ndc, [-1.0, 0.0, 1.0, 1.0]);
    }
}
