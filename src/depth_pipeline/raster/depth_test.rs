//! Nearest-wins depth test and write
//!
//! A candidate replaces the stored sample when its depth is strictly smaller,
//! or when the depths are bit-identical and its packed colour is smaller. The
//! stored key therefore only ever decreases, and the final contents of a pixel
//! depend on the set of candidates alone.

use std::hint::spin_loop;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::depth_pipeline::raster::buffers::DepthCell;

#[inline]
fn is_nearer(depth: f32, color: u32, stored_depth: f32, stored_color: u32) -> bool {
    depth < stored_depth || (depth == stored_depth && color < stored_color)
}

/// Single-writer path; returns whether the candidate was written.
#[inline]
pub(crate) fn write_exclusive(
    cell: &mut DepthCell,
    pixel: &mut AtomicU32,
    depth: f32,
    color: u32,
) -> bool {
    let stored_depth = f32::from_bits(*cell.depth.get_mut());
    if !is_nearer(depth, color, stored_depth, *pixel.get_mut()) {
        return false;
    }
    *pixel.get_mut() = color;
    *cell.depth.get_mut() = depth.to_bits();
    true
}

/// Concurrent path guarded by the cell's lock word.
///
/// Candidates strictly behind the stored depth leave without touching the
/// lock. Everyone else takes the lock with a compare-and-swap `0 -> 1`,
/// repeats the comparison under it, writes if still nearer and releases with
/// `1 -> 0`. A failed swap spins and starts over from the cheap check.
#[inline]
pub(crate) fn write_locked(cell: &DepthCell, pixel: &AtomicU32, depth: f32, color: u32) -> bool {
    loop {
        // colour and depth are only consistent under the lock, so the
        // lock-free check uses depth alone
        if depth > cell.load_depth() {
            return false;
        }

        if cell
            .lock
            .compare_exchange_weak(0, 1, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            let stored_depth = cell.load_depth();
            let stored_color = pixel.load(Ordering::Relaxed);
            let nearer = is_nearer(depth, color, stored_depth, stored_color);
            if nearer {
                pixel.store(color, Ordering::Relaxed);
                cell.depth.store(depth.to_bits(), Ordering::Relaxed);
            }
            cell.lock.store(0, Ordering::Release);
            return nearer;
        }

        spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth_pipeline::camera::Viewport;
    use crate::depth_pipeline::raster::buffers::{DepthBuffer, Framebuffer};

    #[test]
    fn test_strictly_nearer_wins() {
        let mut depth = DepthBuffer::new(Viewport::new(1, 1));
        let mut frame = Framebuffer::new(Viewport::new(1, 1));
        let cell = &mut depth.active_mut()[0];
        let pixel = &mut frame.active_mut()[0];

        assert!(write_exclusive(cell, pixel, 0.6, 10));
        assert!(!write_exclusive(cell, pixel, 0.7, 1));
        assert!(write_exclusive(cell, pixel, 0.4, 20));
        assert_eq!(*pixel.get_mut(), 20);
    }

    #[test]
    fn test_equal_depth_prefers_smaller_color() {
        let depth = DepthBuffer::new(Viewport::new(1, 1));
        let frame = Framebuffer::new(Viewport::new(1, 1));
        let (cell, pixel) = (&depth.active()[0], &frame.active()[0]);

        assert!(write_locked(cell, pixel, 0.5, 30));
        assert!(write_locked(cell, pixel, 0.5, 10));
        assert!(!write_locked(cell, pixel, 0.5, 20));
        assert!(!write_locked(cell, pixel, 0.5, 10));
        assert_eq!(pixel.load(Ordering::Relaxed), 10);
        assert_eq!(cell.lock.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_contended_pixel_keeps_minimum() {
        let depth = DepthBuffer::new(Viewport::new(1, 1));
        let frame = Framebuffer::new(Viewport::new(1, 1));
        let (cell, pixel) = (&depth.active()[0], &frame.active()[0]);

        std::thread::scope(|scope| {
            for worker in 0..8u32 {
                scope.spawn(move || {
                    for step in 0..500u32 {
                        let key = 1 + (step * 8 + worker) % 4000;
                        write_locked(cell, pixel, key as f32 / 4000.0, key);
                    }
                });
            }
        });

        assert_eq!(cell.load_depth(), 1.0 / 4000.0);
        assert_eq!(pixel.load(Ordering::Relaxed), 1);
        assert_eq!(cell.lock.load(Ordering::Relaxed), 0);
    }
}
