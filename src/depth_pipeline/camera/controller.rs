//! First-person camera control driven by [`InputState`]

use std::time::Duration;

use glam::Vec3;

use crate::depth_pipeline::camera::transform::turns;
use crate::depth_pipeline::camera::view::ViewState;

/// Largest pitch in either direction, just short of a quarter turn
pub const PITCH_LIMIT_TURNS: f32 = 0.245;
/// Open interval of accepted field-of-view values, in turns
pub const FOV_LIMIT_TURNS: f32 = 0.4;
/// Scroll units per turn of field of view
pub const SCROLL_STEPS_PER_TURN: f32 = 100.0;

/// Held movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

/// Input gathered by the display host since the last frame.
///
/// Owned by the event pump and handed to [`ViewController::apply`], which
/// consumes the accumulated deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// Mouse-look is engaged (button held)
    pub looking: bool,
    /// Pointer motion in pixels
    pub look_delta: (f32, f32),
    pub keys: MovementKeys,
    /// Pending scroll offset
    pub scroll: f32,
    pub toggle_fullscreen: bool,
}

impl InputState {
    /// Takes the pending fullscreen request, if any.
    pub fn take_fullscreen_toggle(&mut self) -> bool {
        std::mem::take(&mut self.toggle_fullscreen)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewController {
    /// Heading in turns
    pub yaw: f32,
    /// Elevation in turns, positive looks down. Pointer motion toward the
    /// top of the window raises it.
    pub pitch: f32,
    /// Movement speed in units per second
    pub speed: f32,
    /// Turns per pixel of pointer motion
    pub sensitivity: f32,
}

impl Default for ViewController {
    fn default() -> Self {
        Self {
            yaw: -0.25,
            pitch: 0.0,
            speed: 1.5,
            sensitivity: 0.0003,
        }
    }
}

impl ViewController {
    /// Direction the camera faces for the current yaw and pitch.
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (turns(self.yaw), turns(self.pitch));
        Vec3::new(
            yaw.cos() * pitch.cos(),
            -pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    /// Folds one frame of input into `view`. Deltas and scroll are cleared
    /// from `input`; held keys and the look flag are left alone.
    ///
    /// Looking and moving both require mouse-look to be engaged. Pointer `dy`
    /// grows downward in window coordinates and is negated before it reaches
    /// the pitch.
    pub fn apply(&mut self, input: &mut InputState, view: &mut ViewState, dt: Duration) {
        let (dx, dy) = std::mem::take(&mut input.look_delta);
        if input.looking {
            self.yaw += dx * self.sensitivity;
            self.pitch = (self.pitch - dy * self.sensitivity)
                .clamp(-PITCH_LIMIT_TURNS, PITCH_LIMIT_TURNS);
            view.forward = self.forward();
            self.translate(input.keys, view, dt);
        }

        let scroll = std::mem::take(&mut input.scroll);
        if scroll != 0.0 {
            let fov = view.fov + scroll / SCROLL_STEPS_PER_TURN;
            if fov > 0.0 && fov < FOV_LIMIT_TURNS {
                view.fov = fov;
            }
        }
    }

    fn translate(&self, keys: MovementKeys, view: &mut ViewState, dt: Duration) {
        let forward = view.forward;
        let right = forward.cross(view.up).normalize_or_zero();

        let mut direction = Vec3::ZERO;
        if keys.forward {
            direction += forward;
        }
        if keys.back {
            direction -= forward;
        }
        if keys.right {
            direction += right;
        }
        if keys.left {
            direction -= right;
        }
        view.position += direction * (self.speed * dt.as_secs_f32());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_controller_faces_negative_z() {
        let controller = ViewController::default();
        assert!(controller.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut controller = ViewController::default();
        let mut view = ViewState::default();
        let mut input = InputState {
            looking: true,
            look_delta: (0.0, -10_000.0),
            ..InputState::default()
        };

        controller.apply(&mut input, &mut view, Duration::ZERO);
        assert_eq!(controller.pitch, PITCH_LIMIT_TURNS);
        assert_eq!(input.look_delta, (0.0, 0.0));
        // positive pitch looks down
        assert!(view.forward.y < 0.0);
        assert!((view.forward.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_delta_is_negated() {
        let mut controller = ViewController::default();
        let mut view = ViewState::default();
        let mut input = InputState {
            looking: true,
            look_delta: (0.0, 100.0),
            ..InputState::default()
        };

        controller.apply(&mut input, &mut view, Duration::ZERO);
        assert!((controller.pitch + 100.0 * controller.sensitivity).abs() < 1e-7);
        assert!(view.forward.y > 0.0);
    }

    #[test]
    fn test_look_delta_ignored_when_not_looking() {
        let mut controller = ViewController::default();
        let mut view = ViewState::default();
        let mut input = InputState {
            look_delta: (500.0, 500.0),
            ..InputState::default()
        };

        controller.apply(&mut input, &mut view, Duration::ZERO);
        assert_eq!(controller.yaw, -0.25);
        assert_eq!(view.forward, Vec3::NEG_Z);
        assert_eq!(input.look_delta, (0.0, 0.0));
    }

    #[test]
    fn test_movement_scales_with_time() {
        let mut controller = ViewController::default();
        let mut view = ViewState::default();
        let mut input = InputState {
            looking: true,
            ..InputState::default()
        };
        input.keys.forward = true;

        controller.apply(&mut input, &mut view, Duration::from_secs(2));
        assert!(view.position.abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), 1e-5));

        input.keys = MovementKeys {
            right: true,
            ..MovementKeys::default()
        };
        controller.apply(&mut input, &mut view, Duration::from_secs(1));
        assert!(view.position.abs_diff_eq(Vec3::new(1.5, 0.0, -3.0), 1e-5));
    }

    #[test]
    fn test_movement_requires_mouse_look() {
        let mut controller = ViewController::default();
        let mut view = ViewState::default();
        let mut input = InputState::default();
        input.keys = MovementKeys {
            forward: true,
            right: true,
            ..MovementKeys::default()
        };

        controller.apply(&mut input, &mut view, Duration::from_secs(1));
        assert_eq!(view.position, Vec3::ZERO);

        input.looking = true;
        controller.apply(&mut input, &mut view, Duration::from_secs(1));
        assert!(view.position.abs_diff_eq(Vec3::new(1.5, 0.0, -1.5), 1e-5));
    }

    #[test]
    fn test_scroll_respects_fov_limits() {
        let mut controller = ViewController::default();
        let mut view = ViewState::default();

        let mut input = InputState {
            scroll: 10.0,
            ..InputState::default()
        };
        controller.apply(&mut input, &mut view, Duration::ZERO);
        assert!((view.fov - 0.28).abs() < 1e-6);
        assert_eq!(input.scroll, 0.0);

        // would leave the open interval, rejected
        input.scroll = 20.0;
        controller.apply(&mut input, &mut view, Duration::ZERO);
        assert!((view.fov - 0.28).abs() < 1e-6);

        input.scroll = -30.0;
        controller.apply(&mut input, &mut view, Duration::ZERO);
        assert!((view.fov - 0.28).abs() < 1e-6);
    }

    #[test]
    fn test_fullscreen_toggle_is_taken_once() {
        let mut input = InputState {
            toggle_fullscreen: true,
            ..InputState::default()
        };
        assert!(input.take_fullscreen_toggle());
        assert!(!input.take_fullscreen_toggle());
    }
}
