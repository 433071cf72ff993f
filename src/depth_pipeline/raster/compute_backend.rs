//! Offloaded rasterization behind an upload/set/dispatch interface.
//!
//! [`RasterBackend`] is the contract a compute device has to honour: points
//! and the MVP are staged ahead of time and `dispatch` renders them into
//! buffers the backend owns, with the same nearest-wins result the
//! sequential rasterizer produces. [`ComputeBackend`] fulfils it on the CPU
//! by running the spinlock depth test over the rayon pool.

use glam::{Mat4, Vec3};
use tracing::{debug, info};

use crate::depth_pipeline::camera::Viewport;
use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::point_cloud::Point;
use crate::depth_pipeline::raster::buffers::{DepthBuffer, Framebuffer, pack_rgba};
use crate::depth_pipeline::raster::rasterizer::{ExecutionMode, RasterStats, Rasterizer};

pub trait RasterBackend {
    /// Copies the points to render into backend-owned storage.
    fn upload(&mut self, points: &[Point]);

    fn set_mvp(&mut self, mvp: Mat4);

    /// Clears the backend's buffers to `width × height` and rasterizes the
    /// uploaded points.
    ///
    /// # Errors
    ///
    /// * `DegenerateViewport` - `width` or `height` is zero; no buffer is
    ///   touched
    fn dispatch(&mut self, width: u32, height: u32) -> Result<RasterStats>;

    /// Color output of the last dispatch
    fn framebuffer(&self) -> &Framebuffer;

    /// Depth output of the last dispatch
    fn depth_buffer(&self) -> &DepthBuffer;
}

pub struct ComputeBackend {
    rasterizer: Rasterizer,
    points: Vec<Point>,
    mvp: Mat4,
    clear_color: u32,
    framebuffer: Framebuffer,
    depth: DepthBuffer,
}

impl ComputeBackend {
    /// Allocates the point store and both buffers for `max` up front.
    pub fn new(max: Viewport, point_capacity: usize, clear_color: Vec3) -> Self {
        info!(
            width = max.width,
            height = max.height,
            point_capacity,
            threads = rayon::current_num_threads(),
            "Compute backend ready"
        );
        Self {
            rasterizer: Rasterizer::new(ExecutionMode::Parallel),
            points: Vec::with_capacity(point_capacity),
            mvp: Mat4::IDENTITY,
            clear_color: pack_rgba(clear_color),
            framebuffer: Framebuffer::new(max),
            depth: DepthBuffer::new(max),
        }
    }

    pub fn uploaded(&self) -> usize {
        self.points.len()
    }
}

impl RasterBackend for ComputeBackend {
    fn upload(&mut self, points: &[Point]) {
        self.points.clear();
        self.points.extend_from_slice(points);
        debug!(points = points.len(), "Uploaded points");
    }

    fn set_mvp(&mut self, mvp: Mat4) {
        self.mvp = mvp;
    }

    fn dispatch(&mut self, width: u32, height: u32) -> Result<RasterStats> {
        let viewport = Viewport::new(width, height);
        viewport.aspect()?;

        self.framebuffer.resize(viewport);
        self.depth.resize(viewport);
        self.framebuffer.clear(self.clear_color);
        self.depth.clear();

        self.rasterizer
            .rasterize(&self.points, &self.mvp, &mut self.framebuffer, &mut self.depth)
    }

    fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }
}
