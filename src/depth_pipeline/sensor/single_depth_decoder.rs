//! Decoder for sensors that deliver one 16-bit depth image per frame
//! (Azure Kinect style). Samples are millimetres; zero means "no return".

use tracing::trace;

use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::sensor::decoder::{DepthDecoder, check_frame_size, check_grid};
use crate::depth_pipeline::sensor::types::{DepthGrid, RawDepthFrame, SampleWidth};

#[derive(Debug, Clone)]
pub struct SingleDepthDecoder {
    width: usize,
    height: usize,
    depth_scale: f32,
}

impl SingleDepthDecoder {
    pub fn new(width: usize, height: usize, depth_scale: f32) -> Self {
        Self {
            width,
            height,
            depth_scale,
        }
    }
}

impl DepthDecoder for SingleDepthDecoder {
    fn decode(&self, frame: &RawDepthFrame, grid: &mut DepthGrid) -> Result<()> {
        check_frame_size(frame, self.expected_bytes())?;
        check_grid(grid, self.width, self.height)?;
        trace!(sequence = frame.sequence(), "Decoding single-depth frame");

        let bytes = frame.as_bytes();
        for (index, value) in grid.values.iter_mut().enumerate() {
            *value = SampleWidth::Bits16.read(bytes, index) as f32 * self.depth_scale;
        }
        Ok(())
    }

    fn expected_bytes(&self) -> usize {
        self.width * self.height * SampleWidth::Bits16.bytes()
    }
}
