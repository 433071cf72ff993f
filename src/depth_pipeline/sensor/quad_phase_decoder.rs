//! Decoder for four-phase continuous-wave time-of-flight sensors (EPC660).
//!
//! A frame holds four quadrature images `d0..d3` back to back. For every pixel
//! the phase of the reflected signal is recovered from the two orthogonal
//! differences and scaled to a range:
//!
//! `depth = c / (4·π·f) · (π + atan2(d3 − d1, d2 − d0))`

use std::f32::consts::PI;

use tracing::trace;

use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::sensor::constants::PHASE_IMAGE_COUNT;
use crate::depth_pipeline::sensor::decoder::{DepthDecoder, check_frame_size, check_grid};
use crate::depth_pipeline::sensor::layout::RowMap;
use crate::depth_pipeline::sensor::types::{DepthGrid, PhaseConfig, RawDepthFrame};

#[derive(Debug, Clone)]
pub struct QuadPhaseDecoder {
    width: usize,
    height: usize,
    phase: PhaseConfig,
    rows: RowMap,
    range_scale: f32,
}

impl QuadPhaseDecoder {
    pub fn new(width: usize, height: usize, phase: PhaseConfig) -> Self {
        let rows = RowMap::new(phase.row_order, height);
        let range_scale = phase.range_scale();
        Self {
            width,
            height,
            phase,
            rows,
            range_scale,
        }
    }

    pub fn phase_config(&self) -> &PhaseConfig {
        &self.phase
    }

    #[inline]
    fn sample(&self, bytes: &[u8], index: usize) -> i32 {
        let raw = self.phase.sample_width.read(bytes, index) & self.phase.sample_mask;
        raw as i32 - self.phase.bias
    }
}

/// Range for one set of biased quadrature samples.
///
/// Identical samples carry no phase information; they decode to `0`, the
/// "no return" depth, instead of the arbitrary angle `atan2(0, 0)` yields.
#[inline]
pub fn phase_to_depth(d0: i32, d1: i32, d2: i32, d3: i32, range_scale: f32) -> f32 {
    let quadrature = (d3 - d1) as f32;
    let in_phase = (d2 - d0) as f32;
    if quadrature == 0.0 && in_phase == 0.0 {
        return 0.0;
    }
    range_scale * (PI + quadrature.atan2(in_phase))
}

impl DepthDecoder for QuadPhaseDecoder {
    fn decode(&self, frame: &RawDepthFrame, grid: &mut DepthGrid) -> Result<()> {
        check_frame_size(frame, self.expected_bytes())?;
        check_grid(grid, self.width, self.height)?;
        trace!(sequence = frame.sequence(), "Decoding quad-phase frame");

        let bytes = frame.as_bytes();
        let image = self.width * self.height;

        for (row, out_row) in grid.values.chunks_exact_mut(self.width).enumerate() {
            let source_row = self.rows.source_row(row) * self.width;
            for (column, value) in out_row.iter_mut().enumerate() {
                let at = source_row + column;
                let d0 = self.sample(bytes, at);
                let d1 = self.sample(bytes, at + image);
                let d2 = self.sample(bytes, at + 2 * image);
                let d3 = self.sample(bytes, at + 3 * image);
                *value = phase_to_depth(d0, d1, d2, d3, self.range_scale);
            }
        }
        Ok(())
    }

    fn expected_bytes(&self) -> usize {
        self.width * self.height * PHASE_IMAGE_COUNT * self.phase.sample_width.bytes()
    }
}
