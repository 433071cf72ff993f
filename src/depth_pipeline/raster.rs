//! Point rasterization
//!
//! Clip, project, viewport-transform and depth-test a point cloud into a
//! framebuffer. The depth test runs either sequentially or over the rayon pool
//! with per-pixel spinlocks; both produce the same image.

mod buffers;
mod compute_backend;
mod depth_test;
mod rasterizer;
mod stages;

pub use buffers::{DepthBuffer, EMPTY_DEPTH, Framebuffer, pack_rgba, unpack_rgba};
pub use compute_backend::{ComputeBackend, RasterBackend};
pub use rasterizer::{
    ExecutionMode, PointFate, RasterStats, Rasterizer, inside_clip_volume, perspective_divide,
    viewport_transform,
};
pub use stages::{HsvToRgbPixel, PixelStage, TransformVertex, VertexOut, VertexStage};
