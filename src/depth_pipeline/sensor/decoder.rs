use crate::depth_pipeline::common::error::{PipelineError, Result};
use crate::depth_pipeline::sensor::quad_phase_decoder::QuadPhaseDecoder;
use crate::depth_pipeline::sensor::single_depth_decoder::SingleDepthDecoder;
use crate::depth_pipeline::sensor::types::{DepthGrid, RawDepthFrame, SensorConfig, SensorKind};

/// Turns a raw sensor payload into metres per pixel.
///
/// Implementations write into a caller-owned grid so the frame loop can reuse
/// one allocation for the lifetime of the pipeline. On error the grid
/// contents are unspecified and must not be consumed.
pub trait DepthDecoder: Send {
    fn decode(&self, frame: &RawDepthFrame, grid: &mut DepthGrid) -> Result<()>;

    /// Byte length of a frame this decoder accepts.
    fn expected_bytes(&self) -> usize;
}

/// Rejects payloads whose length disagrees with the sensor geometry.
pub(crate) fn check_frame_size(frame: &RawDepthFrame, expected: usize) -> Result<()> {
    if frame.len() != expected {
        return Err(PipelineError::SizeMismatch {
            expected,
            actual: frame.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_grid(grid: &DepthGrid, width: usize, height: usize) -> Result<()> {
    if grid.width != width || grid.height != height || grid.values.len() != width * height {
        return Err(PipelineError::InvalidDimensions(grid.width, grid.height));
    }
    Ok(())
}

/// Decoder selected from a [`SensorConfig`] at runtime.
#[derive(Debug, Clone)]
pub enum SensorDecoder {
    SingleDepth(SingleDepthDecoder),
    QuadPhase(QuadPhaseDecoder),
}

impl SensorDecoder {
    pub fn new(sensor: &SensorConfig) -> Self {
        match &sensor.kind {
            SensorKind::SingleDepth { depth_scale } => SensorDecoder::SingleDepth(
                SingleDepthDecoder::new(sensor.width, sensor.height, *depth_scale),
            ),
            SensorKind::QuadPhase(phase) => SensorDecoder::QuadPhase(QuadPhaseDecoder::new(
                sensor.width,
                sensor.height,
                phase.clone(),
            )),
        }
    }
}

impl DepthDecoder for SensorDecoder {
    fn decode(&self, frame: &RawDepthFrame, grid: &mut DepthGrid) -> Result<()> {
        match self {
            SensorDecoder::SingleDepth(decoder) => decoder.decode(frame, grid),
            SensorDecoder::QuadPhase(decoder) => decoder.decode(frame, grid),
        }
    }

    fn expected_bytes(&self) -> usize {
        match self {
            SensorDecoder::SingleDepth(decoder) => decoder.expected_bytes(),
            SensorDecoder::QuadPhase(decoder) => decoder.expected_bytes(),
        }
    }
}
