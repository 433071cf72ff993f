//! Presentation side of the render loop

use tracing::trace;

use crate::depth_pipeline::camera::{InputState, Viewport};
use crate::depth_pipeline::raster::Framebuffer;

/// Window or other sink that shows finished frames.
///
/// The host owns input: it fills an [`InputState`] between frames and the
/// render loop folds it into the view.
pub trait DisplayHost {
    /// Size to render the next frame at
    fn viewport(&self) -> Viewport;

    /// Drains pending events into `input` without blocking.
    fn poll_input(&mut self, input: &mut InputState);

    fn present(&mut self, framebuffer: &Framebuffer);

    fn should_close(&self) -> bool;
}

/// Display without a window: remembers what it was shown.
#[derive(Debug)]
pub struct HeadlessDisplay {
    viewport: Viewport,
    frame_limit: Option<u64>,
    presented: u64,
    last_checksum: u64,
    last_frame: Vec<u32>,
}

impl HeadlessDisplay {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            frame_limit: None,
            presented: 0,
            last_checksum: 0,
            last_frame: Vec::with_capacity(viewport.pixel_count()),
        }
    }

    /// Asks the render loop to stop after `frames` presents.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// FNV-1a over the pixels of the last presented frame
    pub fn last_checksum(&self) -> u64 {
        self.last_checksum
    }

    pub fn last_frame(&self) -> &[u32] {
        &self.last_frame
    }
}

fn checksum(pixels: &[u32]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    pixels
        .iter()
        .flat_map(|pixel| pixel.to_le_bytes())
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

impl DisplayHost for HeadlessDisplay {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn poll_input(&mut self, _input: &mut InputState) {}

    fn present(&mut self, framebuffer: &Framebuffer) {
        framebuffer.copy_to(&mut self.last_frame);
        self.last_checksum = checksum(&self.last_frame);
        self.presented += 1;
        trace!(frame = self.presented, checksum = self.last_checksum, "Presented frame");
    }

    fn should_close(&self) -> bool {
        self.frame_limit
            .is_some_and(|limit| self.presented >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_records_frame() {
        let mut framebuffer = Framebuffer::new(Viewport::new(2, 2));
        framebuffer.clear(0xFF000000);
        let mut display = HeadlessDisplay::new(Viewport::new(2, 2)).with_frame_limit(2);

        display.present(&framebuffer);
        assert_eq!(display.presented(), 1);
        assert_eq!(display.last_frame(), &[0xFF000000; 4]);
        assert!(!display.should_close());
        let first = display.last_checksum();

        framebuffer.clear(0xFFFFFFFF);
        display.present(&framebuffer);
        assert_ne!(display.last_checksum(), first);
        assert!(display.should_close());
    }

    #[test]
    fn test_checksum_is_order_sensitive() {
        assert_ne!(checksum(&[1, 2]), checksum(&[2, 1]));
        assert_eq!(checksum(&[]), 0xcbf2_9ce4_8422_2325);
    }
}
