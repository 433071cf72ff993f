//! View and projection matrices
//!
//! Angles in this module are expressed in turns (1.0 = 360 degrees) and
//! converted to radians in exactly one place, [`turns`].

use std::f32::consts::TAU;

use glam::{Mat4, Vec3};

use crate::depth_pipeline::camera::view::ViewState;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Converts an angle in turns to radians.
#[inline]
pub fn turns(value: f32) -> f32 {
    value * TAU
}

/// Right-handed view matrix looking from `position` toward `target`.
pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(position, target, up)
}

/// OpenGL-style perspective projection; `fov_turns` is the vertical field of
/// view in turns. Maps view-space `z = -near` to NDC `-1` and `z = -far` to
/// `+1`. The caller guarantees `aspect > 0`.
pub fn perspective(fov_turns: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(turns(fov_turns), aspect, near, far)
}

/// Matrices derived from a [`ViewState`] for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub proj: Mat4,
    pub mvp: Mat4,
}

impl CameraMatrices {
    /// Recomputes every matrix from scratch; nothing is cached between frames.
    pub fn from_view(view_state: &ViewState, aspect: f32) -> Self {
        let view = look_at(
            view_state.position,
            view_state.position + view_state.forward,
            view_state.up,
        );
        let proj = perspective(view_state.fov, aspect, NEAR_PLANE, FAR_PLANE);
        let mvp = proj * view * view_state.model;
        Self { view, proj, mvp }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_turns_to_radians() {
        assert_eq!(turns(0.0), 0.0);
        assert!((turns(0.25) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((turns(0.5) - std::f32::consts::PI).abs() < 1e-6);
        assert!((turns(1.0) - TAU).abs() < 1e-6);
    }

    #[test]
    fn test_look_at_row_layout() {
        // the first row holds the right vector and its translation
        let view = look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert!(view.row(0).abs_diff_eq(Vec4::new(1.0, 0.0, 0.0, 0.0), 1e-6));
        assert!(view.row(2).abs_diff_eq(Vec4::new(0.0, 0.0, 1.0, -5.0), 1e-6));
        // the eye lands on the origin of view space
        let eye = view * Vec4::new(0.0, 0.0, 5.0, 1.0);
        assert!(eye.abs_diff_eq(Vec4::W, 1e-6));
    }

    #[test]
    fn test_perspective_maps_clip_planes() {
        let proj = perspective(0.25, 1.0, NEAR_PLANE, FAR_PLANE);
        let near = proj * Vec4::new(0.0, 0.0, -NEAR_PLANE, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -FAR_PLANE, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);

        // a quarter-turn fov puts the 45 degree ray on the frustum edge
        let edge = proj * Vec4::new(1.0, 0.0, -1.0, 1.0);
        assert!((edge.x / edge.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mvp_applies_model_first() {
        let mut view_state = ViewState::default();
        view_state.model = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0));
        let matrices = CameraMatrices::from_view(&view_state, 1.0);

        let expected = matrices.proj * matrices.view * view_state.model;
        assert!(matrices.mvp.abs_diff_eq(expected, 1e-6));
        // identity view for the default camera
        assert!(matrices.view.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }
}
