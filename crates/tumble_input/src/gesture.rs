//! Tap-versus-drag classification
//!
//! A press that releases within the tap window counts as a tap at the
//! release position; anything longer is a drag. The classifier remembers
//! the press point so a finished drag reports its total displacement,
//! which is what the controller turns into a toss.

use std::time::{Duration, Instant};

/// Releases faster than this are taps
pub const TAP_MAX_DURATION: Duration = Duration::from_millis(200);

/// What a completed press/release turned out to be
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Tap {
        x: f32,
        y: f32,
    },
    /// Drag finished; displacement is the total pointer travel from press
    /// to release, in pixels
    DragEnd {
        x: f32,
        y: f32,
        displacement: (f32, f32),
    },
}

#[derive(Clone, Copy, Debug)]
struct Sample {
    x: f32,
    y: f32,
    at: Instant,
}

/// Tracks one pointer from press to release
#[derive(Debug, Default)]
pub struct GestureClassifier {
    pressed: Option<Sample>,
    current: Option<Sample>,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.is_some()
    }

    pub fn on_press(&mut self, x: f32, y: f32) {
        self.press_at(x, y, Instant::now());
    }

    /// Record movement; returns the delta since the last sample while a
    /// press is active
    pub fn on_move(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        self.move_at(x, y, Instant::now())
    }

    pub fn on_release(&mut self, x: f32, y: f32) -> Option<Gesture> {
        self.release_at(x, y, Instant::now())
    }

    /// Abandon the current press without producing a gesture
    pub fn cancel(&mut self) {
        self.pressed = None;
        self.current = None;
    }

    fn press_at(&mut self, x: f32, y: f32, at: Instant) {
        let sample = Sample { x, y, at };
        self.pressed = Some(sample);
        self.current = Some(sample);
    }

    fn move_at(&mut self, x: f32, y: f32, at: Instant) -> Option<(f32, f32)> {
        self.pressed?;
        let last = self.current;
        self.current = Some(Sample { x, y, at });
        last.map(|s| (x - s.x, y - s.y))
    }

    fn release_at(&mut self, x: f32, y: f32, at: Instant) -> Option<Gesture> {
        let pressed = self.pressed.take()?;
        self.current = None;

        if at.duration_since(pressed.at) < TAP_MAX_DURATION {
            return Some(Gesture::Tap { x, y });
        }

        let displacement = (x - pressed.x, y - pressed.y);
        Some(Gesture::DragEnd { x, y, displacement })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_release_is_tap() {
        let mut g = GestureClassifier::new();
        let t0 = Instant::now();
        g.press_at(10.0, 20.0, t0);
        let gesture = g.release_at(12.0, 21.0, t0 + Duration::from_millis(100));
        assert_eq!(gesture, Some(Gesture::Tap { x: 12.0, y: 21.0 }));
    }

    #[test]
    fn test_slow_release_is_drag() {
        let mut g = GestureClassifier::new();
        let t0 = Instant::now();
        g.press_at(0.0, 0.0, t0);
        g.move_at(50.0, 10.0, t0 + Duration::from_millis(200));
        g.move_at(100.0, -20.0, t0 + Duration::from_millis(300));
        let gesture = g.release_at(100.0, -20.0, t0 + Duration::from_millis(300));
        match gesture {
            Some(Gesture::DragEnd { displacement, .. }) => {
                // Total travel from the press point, not the last move
                assert_eq!(displacement, (100.0, -20.0));
            }
            other => panic!("expected drag end, got {:?}", other),
        }
    }

    #[test]
    fn test_boundary_duration_is_drag() {
        let mut g = GestureClassifier::new();
        let t0 = Instant::now();
        g.press_at(0.0, 0.0, t0);
        let gesture = g.release_at(0.0, 0.0, t0 + TAP_MAX_DURATION);
        assert!(matches!(gesture, Some(Gesture::DragEnd { .. })));
    }

    #[test]
    fn test_release_without_press() {
        let mut g = GestureClassifier::new();
        assert_eq!(g.on_release(0.0, 0.0), None);
    }

    #[test]
    fn test_move_reports_delta() {
        let mut g = GestureClassifier::new();
        let t0 = Instant::now();
        g.press_at(10.0, 10.0, t0);
        let delta = g.move_at(15.0, 7.0, t0 + Duration::from_millis(16));
        assert_eq!(delta, Some((5.0, -3.0)));
    }

    #[test]
    fn test_cancel_discards_press() {
        let mut g = GestureClassifier::new();
        g.on_press(0.0, 0.0);
        g.cancel();
        assert!(!g.is_pressed());
        assert_eq!(g.on_release(0.0, 0.0), None);
    }
}
