//! Pluggable per-point programs of the rasterizer

use glam::{Mat4, Vec3, Vec4};

use crate::depth_pipeline::point_cloud::{Point, hsv_to_rgb};

/// Output of the vertex stage: a clip-space position and the colour carried
/// to the pixel stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOut {
    pub position: Vec4,
    pub color: Vec3,
}

/// Maps a camera-space point to clip space.
pub trait VertexStage: Send + Sync {
    fn shade(&self, point: &Point, mvp: &Mat4) -> VertexOut;
}

/// Turns the carried colour into RGB with components in `[0, 1]`.
pub trait PixelStage: Send + Sync {
    fn shade(&self, color: Vec3) -> Vec3;
}

impl<F> VertexStage for F
where
    F: Fn(&Point, &Mat4) -> VertexOut + Send + Sync,
{
    fn shade(&self, point: &Point, mvp: &Mat4) -> VertexOut {
        self(point, mvp)
    }
}

impl<F> PixelStage for F
where
    F: Fn(Vec3) -> Vec3 + Send + Sync,
{
    fn shade(&self, color: Vec3) -> Vec3 {
        self(color)
    }
}

/// `mvp · (x, y, z, 1)`, colour unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformVertex;

impl VertexStage for TransformVertex {
    #[inline]
    fn shade(&self, point: &Point, mvp: &Mat4) -> VertexOut {
        VertexOut {
            position: *mvp * point.position.extend(1.0),
            color: point.color,
        }
    }
}

/// Interprets the carried colour as HSV
#[derive(Debug, Clone, Copy, Default)]
pub struct HsvToRgbPixel;

impl PixelStage for HsvToRgbPixel {
    #[inline]
    fn shade(&self, color: Vec3) -> Vec3 {
        hsv_to_rgb(color)
    }
}
