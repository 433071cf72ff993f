//! View state types

use glam::{Mat4, Vec3};

use crate::depth_pipeline::camera::transform::turns;
use crate::depth_pipeline::common::error::{PipelineError, Result};

/// Default vertical field of view, in turns (about 65 degrees)
pub const DEFAULT_FOV_TURNS: f32 = 0.18;

/// Camera pose and lens, mutated by the input layer once per frame and only
/// read by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view as a fraction of a full turn
    pub fov: f32,
    pub model: Mat4,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: DEFAULT_FOV_TURNS,
            model: Mat4::IDENTITY,
        }
    }
}

impl ViewState {
    /// Places the camera on a horizontal circle around the origin, looking at
    /// it. `time` is in seconds; one revolution takes two seconds per turn.
    pub fn orbit(&mut self, time: f32, radius: f32) {
        let angle = turns(time / 2.0);
        self.position = Vec3::new(radius * angle.sin(), 0.0, radius * angle.cos());
        self.forward = -self.position;
    }
}

/// Size of the render target for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; a zero-sized viewport has no aspect ratio.
    pub fn aspect(&self) -> Result<f32> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::DegenerateViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.width as f32 / self.height as f32)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_viewport() {
        assert_eq!(Viewport::new(1280, 720).aspect().unwrap(), 1280.0 / 720.0);
        assert_eq!(
            Viewport::new(0, 720).aspect().unwrap_err(),
            PipelineError::DegenerateViewport { width: 0, height: 720 }
        );
        assert!(Viewport::new(640, 0).aspect().is_err());
    }

    #[test]
    fn test_orbit_looks_at_origin() {
        let mut view = ViewState::default();
        for step in 0..8 {
            view.orbit(step as f32 * 0.37, 5.0);
            assert!((view.position.length() - 5.0).abs() < 1e-4);
            assert!(view.position.y.abs() < 1e-6);
            assert!((view.position + view.forward).length() < 1e-6);
        }

        view.orbit(0.0, 5.0);
        assert!(view.position.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-6));
    }
}
