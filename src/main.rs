//! Tumble - knock over piles of toy blocks

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use tumble_core::{SchedulerMode, SharedSimulation, Simulation};
use tumble_input::{DragEffect, InteractionController, TapOutcome};
use tumble_math::Vec3;
use tumble_physics::RigidBodyWorld;
use tumble_render::{LightRig, OrbitCamera, OverlayState, RenderContext, Renderer};

use tumble::config::AppConfig;
use tumble::scene::{self, BlockSetup, SETUP_CYCLE};
use tumble::systems::FrameDriver;

/// Initial light orbit rotation, degrees
const LIGHT_START_ROTATION: f32 = 30.0;

/// Main application state
struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    driver: Option<FrameDriver>,
    controller: Option<InteractionController>,
    setup: BlockSetup,
    /// Last reported cursor position, physical pixels
    cursor: (f32, f32),
    left_held: bool,
    touch_points: u32,
    paused: bool,
}

impl App {
    fn new() -> Self {
        let config = AppConfig::load().unwrap_or_else(|e| {
            log::warn!("failed to load config: {}, using defaults", e);
            AppConfig::default()
        });
        let setup = SETUP_CYCLE[config.scene.start_setup % SETUP_CYCLE.len()];

        Self {
            config,
            window: None,
            driver: None,
            controller: None,
            setup,
            cursor: (0.0, 0.0),
            left_held: false,
            touch_points: 0,
            paused: false,
        }
    }

    /// Build the simulation with the starting block setup in place
    fn build_simulation(&self) -> SharedSimulation {
        let world = RigidBodyWorld::with_config(self.config.physics.to_world_config());
        let mut sim = Simulation::new(world);
        scene::install_bounds(&mut sim, self.config.scene.ground_y);
        self.setup.populate(&mut sim, self.config.scene.ground_y);
        SharedSimulation::new(sim)
    }

    /// Tear down the current setup and fly the camera into the next one
    fn advance_setup(&mut self) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };
        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        self.setup = self.setup.next();
        {
            let mut sim = driver.simulation().lock();
            sim.clear_blocks();
            self.setup.populate(&mut sim, self.config.scene.ground_y);
        }
        controller.start_approach(&mut driver.camera, self.setup.approach_pose());
    }

    fn dispatch_outcome(&mut self, outcome: TapOutcome) {
        match outcome {
            TapOutcome::None => {}
            TapOutcome::NextSetup => self.advance_setup(),
            TapOutcome::AboutShown => {
                self.paused = true;
                log::info!("about shown, physics paused");
            }
            TapOutcome::AboutDismissed => {
                self.paused = false;
                if let Some(driver) = &self.driver {
                    driver.simulation().lock().reset_clock();
                }
                log::info!("about dismissed");
            }
            TapOutcome::Resumed => {
                self.paused = false;
                if let Some(driver) = &self.driver {
                    driver.simulation().lock().reset_clock();
                }
                log::info!("resumed");
            }
            TapOutcome::BlockPushed { key, force } | TapOutcome::BlockTossed { key, force } => {
                if let Some(driver) = &self.driver {
                    if let Err(e) = driver.simulation().lock().apply_force(key, force, Vec3::ZERO)
                    {
                        log::warn!("force on vanished block: {}", e);
                    }
                }
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("Failed to create window"),
        );

        let context = pollster::block_on(RenderContext::new(window.clone()))
            .expect("Failed to initialize GPU");
        let renderer = Renderer::new(
            context,
            self.config.shadow.shadow_mode(),
            self.config.scene.ground_y,
        );

        let simulation = self.build_simulation();
        let mode = self.config.physics.scheduler_mode();
        log::info!(
            "starting with setup '{}', {:?} scheduler",
            self.setup.name(),
            mode
        );

        let camera = OrbitCamera::new(0.0, 20.0, 15.0, 1.0);
        let light = LightRig::new(LIGHT_START_ROTATION);
        let mut driver = FrameDriver::new(renderer, simulation, mode, camera, light);

        let (width, height) = driver.surface_size();
        let mut controller = InteractionController::new(width as f32, height as f32);
        controller.start_approach(&mut driver.camera, self.setup.approach_pose());

        window.request_redraw();
        self.window = Some(window);
        self.driver = Some(driver);
        self.controller = Some(controller);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(driver) = &mut self.driver {
                    driver.shutdown();
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(driver) = &mut self.driver {
                    driver.resize(size.width, size.height);
                }
                if let Some(controller) = &mut self.controller {
                    controller.viewport_resized(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                if !self.left_held {
                    return;
                }
                if let (Some(driver), Some(controller)) =
                    (self.driver.as_mut(), self.controller.as_mut())
                {
                    let effect =
                        controller.on_move(self.cursor.0, self.cursor.1, &mut driver.camera);
                    if effect == DragEffect::OrbitMoved {
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button != MouseButton::Left {
                    return;
                }
                match state {
                    ElementState::Pressed => {
                        self.left_held = true;
                        if let (Some(driver), Some(controller)) =
                            (self.driver.as_ref(), self.controller.as_mut())
                        {
                            controller.on_press(self.cursor.0, self.cursor.1, |px, py| {
                                match driver.pick_block(px as u32, py as u32) {
                                    Ok(hit) => hit,
                                    Err(e) => {
                                        log::warn!("pick failed: {}", e);
                                        None
                                    }
                                }
                            });
                        }
                    }
                    ElementState::Released => {
                        self.left_held = false;
                        let outcome = match (self.driver.as_ref(), self.controller.as_mut()) {
                            (Some(driver), Some(controller)) => {
                                controller.on_release(self.cursor.0, self.cursor.1, &driver.camera)
                            }
                            _ => TapOutcome::None,
                        };
                        self.dispatch_outcome(outcome);
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                }
            }

            WindowEvent::PinchGesture { delta, .. } => {
                if let (Some(driver), Some(controller)) =
                    (self.driver.as_mut(), self.controller.as_mut())
                {
                    controller.on_pinch(1.0 + delta as f32, &mut driver.camera);
                }
            }

            WindowEvent::RotationGesture { delta, .. } => {
                if let (Some(driver), Some(controller)) =
                    (self.driver.as_mut(), self.controller.as_mut())
                {
                    controller.on_rotate(1.0 + delta, &mut driver.light);
                }
            }

            WindowEvent::Touch(touch) => {
                match touch.phase {
                    TouchPhase::Started => self.touch_points += 1,
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.touch_points = self.touch_points.saturating_sub(1);
                    }
                    TouchPhase::Moved => {}
                }
                if let Some(controller) = &mut self.controller {
                    controller.set_touch_points(self.touch_points);
                }
            }

            WindowEvent::Occluded(occluded) => {
                if occluded && !self.paused {
                    // The pause sticks until the user taps; the wall clock
                    // restarts from the resume tap
                    self.paused = true;
                    if let Some(controller) = &mut self.controller {
                        controller.set_paused(true);
                    }
                    log::info!("window occluded, physics paused");
                }
            }

            WindowEvent::RedrawRequested => {
                let (Some(driver), Some(controller)) =
                    (self.driver.as_mut(), self.controller.as_mut())
                else {
                    return;
                };

                controller.advance_animation(&mut driver.camera);

                let layout = *controller.layout();
                let overlays = OverlayState {
                    next_button: layout.next_button.as_array(),
                    about_button: layout.about_button.as_array(),
                    show_about: controller.about_visible(),
                };

                if let Err(e) = driver.frame(&overlays, !self.paused) {
                    log::error!("frame failed: {}", e);
                    event_loop.exit();
                    return;
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_about_overlay_pauses_physics() {
        let mut app = App::new();
        assert!(!app.paused);

        app.dispatch_outcome(TapOutcome::AboutShown);
        assert!(app.paused);

        app.dispatch_outcome(TapOutcome::AboutDismissed);
        assert!(!app.paused);
    }
}

fn main() {
    env_logger::init();
    log::info!("Starting Tumble");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop
        .run_app(&mut app)
        .expect("Event loop terminated abnormally");
}
