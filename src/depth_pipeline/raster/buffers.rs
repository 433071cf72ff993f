//! Render targets shared by the sequential and parallel rasterizers
//!
//! Both buffers are allocated once for the largest expected viewport and
//! re-sliced every frame. Cells are atomics so that the parallel path can
//! write through a shared reference; the sequential path goes through
//! `get_mut` and never touches an atomic instruction.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec3;
use tracing::debug;

use crate::depth_pipeline::camera::Viewport;

/// Depth of a pixel nothing has been written to
pub const EMPTY_DEPTH: f32 = f32::INFINITY;

/// Packs an RGB color with components in `[0, 1]` into an opaque RGBA word
/// (`r` in the lowest byte).
#[inline]
pub fn pack_rgba(rgb: Vec3) -> u32 {
    let channel = |c: f32| (255.0 * c.clamp(0.0, 1.0)) as u8;
    u32::from_le_bytes([channel(rgb.x), channel(rgb.y), channel(rgb.z), 0xFF])
}

/// Inverse of [`pack_rgba`], returning `[r, g, b, a]`.
#[inline]
pub fn unpack_rgba(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

fn allocate<T>(count: usize, make: impl Fn() -> T) -> Vec<T> {
    let mut cells = Vec::with_capacity(count);
    cells.resize_with(count, make);
    cells
}

/// Packed RGBA pixels, row-major with the origin at the top left
#[derive(Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

impl Framebuffer {
    pub fn new(max: Viewport) -> Self {
        Self {
            width: max.width,
            height: max.height,
            pixels: allocate(max.pixel_count(), || AtomicU32::new(0)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Changes the active size. Storage only grows when the viewport exceeds
    /// every size seen so far.
    pub fn resize(&mut self, viewport: Viewport) {
        let needed = viewport.pixel_count();
        if needed > self.pixels.len() {
            debug!(
                width = viewport.width,
                height = viewport.height,
                "Growing framebuffer beyond its initial size"
            );
            self.pixels.resize_with(needed, || AtomicU32::new(0));
        }
        self.width = viewport.width;
        self.height = viewport.height;
    }

    pub fn clear(&mut self, color: u32) {
        let active = self.active_len();
        for pixel in &mut self.pixels[..active] {
            *pixel.get_mut() = color;
        }
    }

    /// Pixel at `(x, y)`, `None` outside the active area.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)].load(Ordering::Relaxed))
    }

    /// Copies the active pixels into `out`, reusing its allocation.
    pub fn copy_to(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend(self.active().iter().map(|p| p.load(Ordering::Relaxed)));
    }

    pub fn to_vec(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.active_len());
        self.copy_to(&mut out);
        out
    }

    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub(crate) fn active(&self) -> &[AtomicU32] {
        &self.pixels[..self.active_len()]
    }

    pub(crate) fn active_mut(&mut self) -> &mut [AtomicU32] {
        let active = self.active_len();
        &mut self.pixels[..active]
    }

    fn active_len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Depth of one pixel plus the lock word guarding it under parallel writes
#[derive(Debug)]
pub struct DepthCell {
    pub(crate) depth: AtomicU32,
    pub(crate) lock: AtomicU32,
}

impl DepthCell {
    fn empty() -> Self {
        Self {
            depth: AtomicU32::new(EMPTY_DEPTH.to_bits()),
            lock: AtomicU32::new(0),
        }
    }

    #[inline]
    pub(crate) fn load_depth(&self) -> f32 {
        f32::from_bits(self.depth.load(Ordering::Relaxed))
    }
}

/// Normalized depth in `[0, 1]` (0 = near) per pixel, same layout as the
/// [`Framebuffer`]
#[derive(Debug)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    cells: Vec<DepthCell>,
}

impl DepthBuffer {
    pub fn new(max: Viewport) -> Self {
        Self {
            width: max.width,
            height: max.height,
            cells: allocate(max.pixel_count(), DepthCell::empty),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resize(&mut self, viewport: Viewport) {
        let needed = viewport.pixel_count();
        if needed > self.cells.len() {
            self.cells.resize_with(needed, DepthCell::empty);
        }
        self.width = viewport.width;
        self.height = viewport.height;
    }

    /// Resets every active cell to the empty sentinel and releases its lock.
    pub fn clear(&mut self) {
        let active = self.active_len();
        for cell in &mut self.cells[..active] {
            *cell.depth.get_mut() = EMPTY_DEPTH.to_bits();
            *cell.lock.get_mut() = 0;
        }
    }

    /// Stored depth at `(x, y)`, `None` when the pixel is empty or outside
    /// the active area.
    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let depth = self.cells[y as usize * self.width as usize + x as usize].load_depth();
        (depth != EMPTY_DEPTH).then_some(depth)
    }

    /// Number of active pixels holding a depth.
    pub fn written(&self) -> usize {
        self.active()
            .iter()
            .filter(|cell| cell.load_depth() != EMPTY_DEPTH)
            .count()
    }

    pub(crate) fn active(&self) -> &[DepthCell] {
        &self.cells[..self.active_len()]
    }

    pub(crate) fn active_mut(&mut self) -> &mut [DepthCell] {
        let active = self.active_len();
        &mut self.cells[..active]
    }

    fn active_len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
