//! The per-frame pipeline
//!
//! One frame runs in a fixed order:
//!
//! 1. render the previous frame's transform snapshot
//! 2. wait for the in-flight physics step to finish
//! 3. refresh the snapshot from the step's results
//! 4. signal the next physics step
//! 5. present the rendered frame
//!
//! Rendering and stepping overlap: while the GPU records frame N from
//! snapshot N, the physics thread computes the transforms snapshot N+1
//! will promote. Presentation comes last so a slow step delays the image
//! rather than tearing it.

use tumble_core::{DrawList, PhysicsScheduler, SchedulerMode, SharedSimulation};
use tumble_physics::BodyKey;
use tumble_render::{LightRig, OrbitCamera, OverlayState, RenderError, Renderer};

pub struct FrameDriver {
    renderer: Renderer,
    scheduler: PhysicsScheduler,
    simulation: SharedSimulation,
    pub camera: OrbitCamera,
    pub light: LightRig,
    draw_list: DrawList,
}

impl FrameDriver {
    pub fn new(
        renderer: Renderer,
        simulation: SharedSimulation,
        mode: SchedulerMode,
        camera: OrbitCamera,
        light: LightRig,
    ) -> Self {
        let scheduler = PhysicsScheduler::new(simulation.clone(), mode);
        Self {
            renderer,
            scheduler,
            simulation,
            camera,
            light,
            draw_list: DrawList::new(),
        }
    }

    pub fn simulation(&self) -> &SharedSimulation {
        &self.simulation
    }

    /// The snapshot currently being drawn; picking runs against this list
    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.renderer.surface_size()
    }

    /// Run one frame. `physics_running` is false while paused: the frame
    /// still renders and refreshes, but no step runs and none is
    /// requested. A step already in flight at the pause serializes
    /// against `refresh` on the simulation lock.
    pub fn frame(
        &mut self,
        overlays: &OverlayState,
        physics_running: bool,
    ) -> Result<(), RenderError> {
        let pending = self
            .renderer
            .render_frame(&self.draw_list, &self.camera, &self.light, overlays)?;

        if physics_running {
            self.scheduler.wait();
        }
        self.draw_list = self.simulation.lock().refresh();
        if physics_running {
            self.scheduler.signal();
        }

        if let Some(frame) = pending {
            frame.present();
        }
        Ok(())
    }

    /// Resolve the block under a window coordinate against the snapshot
    /// on screen
    pub fn pick_block(&self, x: u32, y: u32) -> Result<Option<BodyKey>, RenderError> {
        self.renderer
            .pick_block(&self.draw_list, &self.camera, x, y)
    }

    /// Stop the physics thread; called once when the event loop exits
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
    }
}
