//! Interaction control
//!
//! Routes classified gestures to their scene effects. The controller never
//! touches the simulation or renderer directly: the camera and light are
//! mutated through small traits, block picking is a callback, and anything
//! the application must act on comes back as a [`TapOutcome`].

use tumble_math::Vec3;
use tumble_physics::BodyKey;

use crate::gesture::{Gesture, GestureClassifier};

/// Orbit drag divisors: pixels per degree of yaw and pitch
pub const YAW_PIXELS_PER_DEGREE: f32 = 3.0;
pub const PITCH_PIXELS_PER_DEGREE: f32 = 4.0;
pub const PITCH_MIN: f32 = 0.0;
pub const PITCH_MAX: f32 = 45.0;

/// Pinch-to-zoom: distance change per unit of scale factor
pub const PINCH_DISTANCE_SCALE: f32 = 2.5;
pub const DISTANCE_MIN: f32 = 2.0;
pub const DISTANCE_MAX: f32 = 20.0;

/// Light spin per unit of rotation gesture factor
pub const LIGHT_ROTATION_SCALE: f32 = 0.045;

/// Impulse applied by tapping a block
pub const PUSH_FORCE: f32 = 500.0;
/// Scale from total drag displacement (px) to toss force
pub const TOSS_FORCE_MULTIPLIER: f32 = 2.5;

/// Button side length and inset from the window corners, pixels
pub const BUTTON_SIZE: f32 = 64.0;
pub const BUTTON_INSET: f32 = 10.0;

/// Camera pose the approach animation starts from
pub const APPROACH_START: OrbitPose = OrbitPose {
    yaw: 90.0,
    pitch: 20.0,
    distance: 28.0,
    height: 10.0,
};
/// Frames the approach animation takes
pub const APPROACH_STEPS: u32 = 45;

/// Camera the controller steers
pub trait OrbitRig {
    fn yaw(&self) -> f32;
    fn set_yaw(&mut self, yaw: f32);
    fn pitch(&self) -> f32;
    fn set_pitch(&mut self, pitch: f32);
    fn distance(&self) -> f32;
    fn set_distance(&mut self, distance: f32);
    fn height(&self) -> f32;
    fn set_height(&mut self, height: f32);
    fn right(&self) -> Vec3;
    fn up(&self) -> Vec3;
    fn forward(&self) -> Vec3;
}

/// Shadow light the two-finger rotate gesture spins
pub trait LightControl {
    fn rotation(&self) -> f32;
    fn set_rotation(&mut self, rotation: f32);
}

/// Axis-aligned pixel rectangle, top-left origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// Hit regions for the overlay buttons, recomputed on resize
#[derive(Clone, Copy, Debug)]
pub struct UiLayout {
    pub next_button: Rect,
    pub about_button: Rect,
}

impl UiLayout {
    pub fn for_viewport(width: f32, height: f32) -> Self {
        let _ = height;
        Self {
            next_button: Rect {
                x: BUTTON_INSET,
                y: BUTTON_INSET,
                width: BUTTON_SIZE,
                height: BUTTON_SIZE,
            },
            about_button: Rect {
                x: width - BUTTON_INSET - BUTTON_SIZE,
                y: BUTTON_INSET,
                width: BUTTON_SIZE,
                height: BUTTON_SIZE,
            },
        }
    }
}

/// A full orbit camera pose, used by the approach animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitPose {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub height: f32,
}

impl OrbitPose {
    fn lerp(a: OrbitPose, b: OrbitPose, t: f32) -> OrbitPose {
        let l = |x: f32, y: f32| x + (y - x) * t;
        OrbitPose {
            yaw: l(a.yaw, b.yaw),
            pitch: l(a.pitch, b.pitch),
            distance: l(a.distance, b.distance),
            height: l(a.height, b.height),
        }
    }

    fn apply(&self, rig: &mut dyn OrbitRig) {
        rig.set_yaw(self.yaw);
        rig.set_pitch(self.pitch);
        rig.set_distance(self.distance);
        rig.set_height(self.height);
    }
}

#[derive(Clone, Copy, Debug)]
struct ApproachAnimation {
    step: u32,
    to: OrbitPose,
}

/// What a completed gesture asks the application to do
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TapOutcome {
    None,
    /// Advance to the next block setup
    NextSetup,
    /// The about overlay was opened
    AboutShown,
    /// The about overlay was dismissed
    AboutDismissed,
    /// A tap arrived while paused; the application should resume
    Resumed,
    /// A tapped block gets a push along the view direction
    BlockPushed { key: BodyKey, force: Vec3 },
    /// A dragged block gets slung against the drag direction
    BlockTossed { key: BodyKey, force: Vec3 },
}

/// Continuous effect of a pointer move
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragEffect {
    None,
    /// The camera orbit changed; a redraw is warranted
    OrbitMoved,
}

pub struct InteractionController {
    gesture: GestureClassifier,
    layout: UiLayout,
    about_visible: bool,
    paused: bool,
    touch_points: u32,
    drag_target: Option<BodyKey>,
    approach: Option<ApproachAnimation>,
}

impl InteractionController {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            gesture: GestureClassifier::new(),
            layout: UiLayout::for_viewport(viewport_width, viewport_height),
            about_visible: false,
            paused: false,
            touch_points: 0,
            drag_target: None,
            approach: None,
        }
    }

    pub fn viewport_resized(&mut self, width: f32, height: f32) {
        self.layout = UiLayout::for_viewport(width, height);
    }

    pub fn layout(&self) -> &UiLayout {
        &self.layout
    }

    pub fn about_visible(&self) -> bool {
        self.about_visible
    }

    /// The application reports pause transitions here so the next tap can
    /// be treated as a resume
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if paused {
            self.gesture.cancel();
            self.drag_target = None;
        }
    }

    /// Number of active touch points; anything above one suppresses the
    /// single-pointer gestures in favor of pinch and rotate
    pub fn set_touch_points(&mut self, count: u32) {
        self.touch_points = count;
        if count > 1 {
            self.gesture.cancel();
            self.drag_target = None;
        }
    }

    /// Pointer went down. `pick` resolves the block under the pointer and
    /// is only invoked when the press can actually grab one.
    pub fn on_press<P>(&mut self, x: f32, y: f32, pick: P)
    where
        P: FnOnce(f32, f32) -> Option<BodyKey>,
    {
        if self.touch_points > 1 || self.approach.is_some() {
            return;
        }
        self.gesture.on_press(x, y);

        let over_ui = self.layout.next_button.contains(x, y)
            || self.layout.about_button.contains(x, y);
        self.drag_target = if self.paused || self.about_visible || over_ui {
            None
        } else {
            pick(x, y)
        };
    }

    /// Pointer moved. Empty-space drags orbit the camera.
    pub fn on_move(&mut self, x: f32, y: f32, rig: &mut dyn OrbitRig) -> DragEffect {
        if self.touch_points > 1 || self.approach.is_some() {
            return DragEffect::None;
        }
        let Some((dx, dy)) = self.gesture.on_move(x, y) else {
            return DragEffect::None;
        };
        if self.paused || self.about_visible || self.drag_target.is_some() {
            return DragEffect::None;
        }

        rig.set_yaw(rig.yaw() + dx / YAW_PIXELS_PER_DEGREE);
        rig.set_pitch((rig.pitch() + dy / PITCH_PIXELS_PER_DEGREE).clamp(PITCH_MIN, PITCH_MAX));
        DragEffect::OrbitMoved
    }

    /// Pointer went up; classify and dispatch
    pub fn on_release(&mut self, x: f32, y: f32, rig: &dyn OrbitRig) -> TapOutcome {
        if self.approach.is_some() {
            self.gesture.cancel();
            self.drag_target = None;
            return TapOutcome::None;
        }
        let drag_target = self.drag_target.take();
        let Some(gesture) = self.gesture.on_release(x, y) else {
            return TapOutcome::None;
        };

        match gesture {
            Gesture::Tap { x, y } => {
                if self.paused {
                    self.paused = false;
                    return TapOutcome::Resumed;
                }
                if self.about_visible {
                    self.about_visible = false;
                    return TapOutcome::AboutDismissed;
                }
                if self.layout.next_button.contains(x, y) {
                    return TapOutcome::NextSetup;
                }
                if self.layout.about_button.contains(x, y) {
                    self.about_visible = true;
                    return TapOutcome::AboutShown;
                }
                if let Some(key) = drag_target {
                    return TapOutcome::BlockPushed {
                        key,
                        force: rig.forward() * PUSH_FORCE,
                    };
                }
                TapOutcome::None
            }
            Gesture::DragEnd { displacement, .. } => match drag_target {
                Some(key) => {
                    // Slingshot on the camera plane: the force opposes the
                    // horizontal drag; screen y grows downward, so a pull
                    // toward the viewer flings up and away
                    let (dx, dy) = displacement;
                    let force =
                        (rig.right() * -dx + rig.up() * dy) * TOSS_FORCE_MULTIPLIER;
                    TapOutcome::BlockTossed { key, force }
                }
                None => TapOutcome::None,
            },
        }
    }

    /// Pinch gesture: scale factor 1.0 means no change
    pub fn on_pinch(&mut self, scale: f32, rig: &mut dyn OrbitRig) {
        if self.approach.is_some() {
            return;
        }
        let distance = rig.distance() - (scale - 1.0) * PINCH_DISTANCE_SCALE;
        rig.set_distance(distance.clamp(DISTANCE_MIN, DISTANCE_MAX));
    }

    /// Two-finger rotate: factor 1.0 means no rotation
    pub fn on_rotate(&mut self, rotation: f32, light: &mut dyn LightControl) {
        if self.approach.is_some() {
            return;
        }
        light.set_rotation(light.rotation() + (rotation - 1.0) * LIGHT_ROTATION_SCALE);
    }

    /// Begin the fly-in toward a freshly loaded setup
    pub fn start_approach(&mut self, rig: &mut dyn OrbitRig, to: OrbitPose) {
        APPROACH_START.apply(rig);
        self.approach = Some(ApproachAnimation { step: 0, to });
    }

    pub fn is_animating(&self) -> bool {
        self.approach.is_some()
    }

    /// Advance the fly-in by one frame; returns true while still moving
    pub fn advance_animation(&mut self, rig: &mut dyn OrbitRig) -> bool {
        let Some(mut anim) = self.approach.take() else {
            return false;
        };
        anim.step += 1;
        let t = anim.step as f32 / APPROACH_STEPS as f32;
        OrbitPose::lerp(APPROACH_START, anim.to, t).apply(rig);

        if anim.step < APPROACH_STEPS {
            self.approach = Some(anim);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    struct StubRig {
        pose: OrbitPose,
    }

    impl StubRig {
        fn new() -> Self {
            Self {
                pose: OrbitPose {
                    yaw: 0.0,
                    pitch: 10.0,
                    distance: 10.0,
                    height: 2.0,
                },
            }
        }
    }

    impl OrbitRig for StubRig {
        fn yaw(&self) -> f32 {
            self.pose.yaw
        }
        fn set_yaw(&mut self, yaw: f32) {
            self.pose.yaw = yaw;
        }
        fn pitch(&self) -> f32 {
            self.pose.pitch
        }
        fn set_pitch(&mut self, pitch: f32) {
            self.pose.pitch = pitch;
        }
        fn distance(&self) -> f32 {
            self.pose.distance
        }
        fn set_distance(&mut self, distance: f32) {
            self.pose.distance = distance;
        }
        fn height(&self) -> f32 {
            self.pose.height
        }
        fn set_height(&mut self, height: f32) {
            self.pose.height = height;
        }
        fn right(&self) -> Vec3 {
            Vec3::X
        }
        fn up(&self) -> Vec3 {
            Vec3::Y
        }
        fn forward(&self) -> Vec3 {
            -Vec3::Z
        }
    }

    struct StubLight {
        rotation: f32,
    }

    impl LightControl for StubLight {
        fn rotation(&self) -> f32 {
            self.rotation
        }
        fn set_rotation(&mut self, rotation: f32) {
            self.rotation = rotation;
        }
    }

    fn controller() -> InteractionController {
        InteractionController::new(800.0, 600.0)
    }

    // BodyKey can only be minted by a SlotMap
    fn key() -> BodyKey {
        let mut map: slotmap::SlotMap<BodyKey, ()> = slotmap::SlotMap::with_key();
        map.insert(())
    }

    #[test]
    fn test_empty_drag_orbits_camera() {
        let mut c = controller();
        let mut rig = StubRig::new();
        c.on_press(400.0, 300.0, |_, _| None);
        let effect = c.on_move(430.0, 320.0, &mut rig);
        assert_eq!(effect, DragEffect::OrbitMoved);
        assert!((rig.yaw() - 10.0).abs() < 0.001); // 30 px / 3
        assert!((rig.pitch() - 15.0).abs() < 0.001); // 10 + 20 px / 4
    }

    #[test]
    fn test_pitch_clamps_to_range() {
        let mut c = controller();
        let mut rig = StubRig::new();
        c.on_press(400.0, 300.0, |_, _| None);
        c.on_move(400.0, 1000.0, &mut rig);
        assert_eq!(rig.pitch(), PITCH_MAX);
        c.on_move(400.0, -2000.0, &mut rig);
        assert_eq!(rig.pitch(), PITCH_MIN);
    }

    #[test]
    fn test_pinch_in_reduces_distance() {
        let mut c = controller();
        let mut rig = StubRig::new();
        c.on_pinch(1.25, &mut rig);
        assert!((rig.distance() - (10.0 - 0.25 * 2.5)).abs() < 0.001);
    }

    #[test]
    fn test_pinch_clamps_at_floor() {
        let mut c = controller();
        let mut rig = StubRig::new();
        rig.set_distance(2.1);
        c.on_pinch(3.0, &mut rig);
        assert_eq!(rig.distance(), DISTANCE_MIN);
    }

    #[test]
    fn test_pinch_clamps_at_ceiling() {
        let mut c = controller();
        let mut rig = StubRig::new();
        rig.set_distance(19.9);
        c.on_pinch(0.2, &mut rig);
        assert_eq!(rig.distance(), DISTANCE_MAX);
    }

    #[test]
    fn test_rotate_spins_light() {
        let mut c = controller();
        let mut light = StubLight { rotation: 1.0 };
        c.on_rotate(2.0, &mut light);
        assert!((light.rotation - (1.0 + LIGHT_ROTATION_SCALE)).abs() < 0.0001);
    }

    #[test]
    fn test_tap_next_button() {
        let mut c = controller();
        let rig = StubRig::new();
        // Center of the upper-left button
        c.on_press(42.0, 42.0, |_, _| None);
        assert_eq!(c.on_release(42.0, 42.0, &rig), TapOutcome::NextSetup);
    }

    #[test]
    fn test_tap_about_toggles_overlay() {
        let mut c = controller();
        let rig = StubRig::new();
        c.on_press(758.0, 42.0, |_, _| None);
        assert_eq!(c.on_release(758.0, 42.0, &rig), TapOutcome::AboutShown);
        assert!(c.about_visible());

        // Any tap dismisses
        c.on_press(400.0, 300.0, |_, _| None);
        assert_eq!(c.on_release(400.0, 300.0, &rig), TapOutcome::AboutDismissed);
        assert!(!c.about_visible());
    }

    #[test]
    fn test_tap_block_pushes_it() {
        let mut c = controller();
        let rig = StubRig::new();
        let k = key();
        c.on_press(400.0, 300.0, |_, _| Some(k));
        match c.on_release(400.0, 300.0, &rig) {
            TapOutcome::BlockPushed { key, force } => {
                assert_eq!(key, k);
                assert!((force.length() - PUSH_FORCE).abs() < 0.001);
            }
            other => panic!("expected push, got {:?}", other),
        }
    }

    #[test]
    fn test_tap_empty_space_does_nothing() {
        let mut c = controller();
        let rig = StubRig::new();
        c.on_press(400.0, 300.0, |_, _| None);
        assert_eq!(c.on_release(400.0, 300.0, &rig), TapOutcome::None);
    }

    #[test]
    fn test_drag_block_tosses_on_release() {
        let mut c = controller();
        let mut rig = StubRig::new();
        let k = key();
        c.on_press(400.0, 300.0, |_, _| Some(k));
        sleep(Duration::from_millis(250));
        c.on_move(500.0, 320.0, &mut rig);
        // Dragging a block must not orbit the camera
        assert_eq!(rig.yaw(), 0.0);
        c.on_move(520.0, 340.0, &mut rig);
        match c.on_release(520.0, 340.0, &rig) {
            TapOutcome::BlockTossed { key, force } => {
                assert_eq!(key, k);
                // 120 px rightward, 40 px downward drag slings the block
                // along -right and +up, scaled by the toss multiplier
                assert!((force.x - (-120.0 * TOSS_FORCE_MULTIPLIER)).abs() < 0.001);
                assert!((force.y - (40.0 * TOSS_FORCE_MULTIPLIER)).abs() < 0.001);
                assert_eq!(force.z, 0.0);
            }
            other => panic!("expected toss, got {:?}", other),
        }
    }

    #[test]
    fn test_approach_suppresses_gestures() {
        let mut c = controller();
        let mut rig = StubRig::new();
        let mut light = StubLight { rotation: 1.0 };
        c.start_approach(
            &mut rig,
            OrbitPose {
                yaw: 0.0,
                pitch: 22.0,
                distance: 7.0,
                height: 1.0,
            },
        );

        // Picking never runs mid-fly-in
        c.on_press(400.0, 300.0, |_, _| panic!("pick during approach"));
        assert_eq!(c.on_move(500.0, 300.0, &mut rig), DragEffect::None);
        assert_eq!(c.on_release(500.0, 300.0, &rig), TapOutcome::None);

        // Buttons are dead too
        c.on_press(42.0, 42.0, |_, _| None);
        assert_eq!(c.on_release(42.0, 42.0, &rig), TapOutcome::None);

        let distance = rig.distance();
        c.on_pinch(1.5, &mut rig);
        assert_eq!(rig.distance(), distance);
        c.on_rotate(2.0, &mut light);
        assert_eq!(light.rotation, 1.0);

        // Once the fly-in lands, gestures work again
        while c.advance_animation(&mut rig) {}
        c.on_press(42.0, 42.0, |_, _| None);
        assert_eq!(c.on_release(42.0, 42.0, &rig), TapOutcome::NextSetup);
    }

    #[test]
    fn test_multi_touch_suppresses_drag() {
        let mut c = controller();
        let mut rig = StubRig::new();
        c.on_press(400.0, 300.0, |_, _| None);
        c.set_touch_points(2);
        assert_eq!(c.on_move(500.0, 300.0, &mut rig), DragEffect::None);
        assert_eq!(rig.yaw(), 0.0);
        assert_eq!(c.on_release(500.0, 300.0, &rig), TapOutcome::None);
    }

    #[test]
    fn test_tap_while_paused_resumes() {
        let mut c = controller();
        let rig = StubRig::new();
        c.set_paused(true);
        c.on_press(400.0, 300.0, |_, _| None);
        assert_eq!(c.on_release(400.0, 300.0, &rig), TapOutcome::Resumed);
    }

    #[test]
    fn test_approach_animation_reaches_target() {
        let mut c = controller();
        let mut rig = StubRig::new();
        let target = OrbitPose {
            yaw: 0.0,
            pitch: 25.0,
            distance: 7.0,
            height: 2.0,
        };
        c.start_approach(&mut rig, target);
        assert_eq!(rig.distance(), APPROACH_START.distance);

        let mut steps = 0u32;
        while c.advance_animation(&mut rig) {
            steps += 1;
            assert!(steps <= APPROACH_STEPS, "animation never ended");
        }
        assert_eq!(steps + 1, APPROACH_STEPS);
        assert!((rig.distance() - 7.0).abs() < 0.001);
        assert!((rig.yaw() - 0.0).abs() < 0.001);
        assert!(!c.is_animating());
    }

    #[test]
    fn test_resize_moves_about_button() {
        let mut c = controller();
        let rig = StubRig::new();
        c.viewport_resized(1200.0, 900.0);
        c.on_press(1158.0, 42.0, |_, _| None);
        assert_eq!(c.on_release(1158.0, 42.0, &rig), TapOutcome::AboutShown);
    }
}
