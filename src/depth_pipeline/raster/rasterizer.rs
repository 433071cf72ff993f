use std::ops::{Add, AddAssign};

use glam::{Mat4, Vec3, Vec4};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::depth_pipeline::common::error::{PipelineError, Result};
use crate::depth_pipeline::point_cloud::Point;
use crate::depth_pipeline::raster::buffers::{DepthBuffer, Framebuffer, pack_rgba};
use crate::depth_pipeline::raster::depth_test::{write_exclusive, write_locked};
use crate::depth_pipeline::raster::stages::{
    HsvToRgbPixel, PixelStage, TransformVertex, VertexStage,
};

/// How the depth test is scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One thread, plain compare-and-write
    #[default]
    Sequential,
    /// Points spread over the rayon pool, writes guarded by per-pixel locks
    Parallel,
}

/// Where a point left the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointFate {
    Clipped,
    OutOfBuffer,
    Occluded,
    Written,
}

/// Counts of submitted points by terminal state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub submitted: usize,
    pub clipped: usize,
    pub out_of_buffer: usize,
    pub occluded: usize,
    pub written: usize,
}

impl RasterStats {
    pub fn record(&mut self, fate: PointFate) {
        self.submitted += 1;
        match fate {
            PointFate::Clipped => self.clipped += 1,
            PointFate::OutOfBuffer => self.out_of_buffer += 1,
            PointFate::Occluded => self.occluded += 1,
            PointFate::Written => self.written += 1,
        }
    }
}

impl Add for RasterStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            submitted: self.submitted + other.submitted,
            clipped: self.clipped + other.clipped,
            out_of_buffer: self.out_of_buffer + other.out_of_buffer,
            occluded: self.occluded + other.occluded,
            written: self.written + other.written,
        }
    }
}

impl AddAssign for RasterStats {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Homogeneous clip-volume test: every coordinate strictly inside `(-w, w)`.
#[inline]
pub fn inside_clip_volume(clip: Vec4) -> bool {
    let w = clip.w;
    -w < clip.x && clip.x < w && -w < clip.y && clip.y < w && -w < clip.z && clip.z < w
}

/// Perspective divide with the row axis flipped to the raster convention.
/// `w == 0` passes the coordinates through unchanged.
#[inline]
pub fn perspective_divide(clip: Vec4) -> Vec3 {
    if clip.w != 0.0 {
        Vec3::new(clip.x / clip.w, -clip.y / clip.w, clip.z / clip.w)
    } else {
        clip.truncate()
    }
}

/// Pixel coordinates and normalized depth of an NDC position, `None` when it
/// falls outside `[0, width) × [0, height)`.
#[inline]
pub fn viewport_transform(ndc: Vec3, width: u32, height: u32) -> Option<(u32, u32, f32)> {
    let to_pixel = |extent: u32, coordinate: f32| {
        let half = extent / 2;
        let pixel = (half as f32 * coordinate).floor() as i64 + i64::from(half);
        (0..i64::from(extent)).contains(&pixel).then_some(pixel as u32)
    };
    let x = to_pixel(width, ndc.x)?;
    let y = to_pixel(height, ndc.y)?;
    Some((x, y, (ndc.z + 1.0) / 2.0))
}

/// Point rasterizer with injectable vertex and pixel programs
pub struct Rasterizer {
    vertex: Box<dyn VertexStage>,
    pixel: Box<dyn PixelStage>,
    mode: ExecutionMode,
}

impl Rasterizer {
    /// Rasterizer with the transform vertex stage and HSV pixel stage
    pub fn new(mode: ExecutionMode) -> Self {
        Self::with_stages(TransformVertex, HsvToRgbPixel, mode)
    }

    pub fn with_stages<V, P>(vertex: V, pixel: P, mode: ExecutionMode) -> Self
    where
        V: VertexStage + 'static,
        P: PixelStage + 'static,
    {
        Self {
            vertex: Box::new(vertex),
            pixel: Box::new(pixel),
            mode,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.mode = mode;
    }

    /// Runs every point through the pipeline against already-cleared buffers.
    ///
    /// Rejections are counted, never reported as errors; the only failure is
    /// a framebuffer and depth buffer of different sizes.
    #[instrument(skip_all, fields(points = points.len(), mode = ?self.mode))]
    pub fn rasterize(
        &self,
        points: &[Point],
        mvp: &Mat4,
        framebuffer: &mut Framebuffer,
        depth: &mut DepthBuffer,
    ) -> Result<RasterStats> {
        if framebuffer.width() != depth.width() || framebuffer.height() != depth.height() {
            return Err(PipelineError::InvalidDimensions(
                depth.width() as usize,
                depth.height() as usize,
            ));
        }

        let stats = match self.mode {
            ExecutionMode::Sequential => self.rasterize_sequential(points, mvp, framebuffer, depth),
            ExecutionMode::Parallel => self.rasterize_parallel(points, mvp, framebuffer, depth),
        };

        debug!(
            submitted = stats.submitted,
            written = stats.written,
            clipped = stats.clipped,
            out_of_buffer = stats.out_of_buffer,
            occluded = stats.occluded,
            "Rasterized point cloud"
        );
        Ok(stats)
    }

    /// Vertex stage, clip, divide and viewport. On success returns the pixel
    /// index, its depth and the packed colour from the pixel stage.
    #[inline]
    fn project(
        &self,
        point: &Point,
        mvp: &Mat4,
        width: u32,
        height: u32,
    ) -> std::result::Result<(usize, f32, u32), PointFate> {
        let vertex = self.vertex.shade(point, mvp);
        if !inside_clip_volume(vertex.position) {
            return Err(PointFate::Clipped);
        }
        let ndc = perspective_divide(vertex.position);
        let (x, y, depth) = viewport_transform(ndc, width, height).ok_or(PointFate::OutOfBuffer)?;
        let color = pack_rgba(self.pixel.shade(vertex.color));
        Ok((y as usize * width as usize + x as usize, depth, color))
    }

    fn rasterize_sequential(
        &self,
        points: &[Point],
        mvp: &Mat4,
        framebuffer: &mut Framebuffer,
        depth: &mut DepthBuffer,
    ) -> RasterStats {
        let (width, height) = (framebuffer.width(), framebuffer.height());
        let pixels = framebuffer.active_mut();
        let cells = depth.active_mut();

        let mut stats = RasterStats::default();
        for point in points {
            let fate = match self.project(point, mvp, width, height) {
                Ok((index, z, color)) => {
                    if write_exclusive(&mut cells[index], &mut pixels[index], z, color) {
                        PointFate::Written
                    } else {
                        PointFate::Occluded
                    }
                }
                Err(fate) => fate,
            };
            stats.record(fate);
        }
        stats
    }

    fn rasterize_parallel(
        &self,
        points: &[Point],
        mvp: &Mat4,
        framebuffer: &Framebuffer,
        depth: &DepthBuffer,
    ) -> RasterStats {
        let (width, height) = (framebuffer.width(), framebuffer.height());
        let pixels = framebuffer.active();
        let cells = depth.active();

        points
            .par_iter()
            .fold(RasterStats::default, |mut stats, point| {
                let fate = match self.project(point, mvp, width, height) {
                    Ok((index, z, color)) => {
                        if write_locked(&cells[index], &pixels[index], z, color) {
                            PointFate::Written
                        } else {
                            PointFate::Occluded
                        }
                    }
                    Err(fate) => fate,
                };
                stats.record(fate);
                stats
            })
            .reduce(RasterStats::default, Add::add)
    }
}

#[cfg(test)]
mod tests;
