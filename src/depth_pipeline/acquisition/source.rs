use std::time::Duration;

use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::sensor::{DepthRange, RawDepthFrame, SensorConfig, UnprojectionTable};

/// A depth camera together with its calibration.
///
/// Implemented by device SDK bindings and network receivers; the pipeline
/// only sees whole frames and never the transport behind them.
pub trait SensorProvider: Send {
    /// Geometry and encoding of the frames this sensor delivers
    fn config(&self) -> &SensorConfig;

    /// Next frame, or `None` if nothing arrived within `timeout`.
    fn get_depth_frame(&mut self, timeout: Duration) -> Option<RawDepthFrame>;

    /// Per-pixel rays for this sensor, built once at start-up.
    fn unprojection_table(&self) -> Result<UnprojectionTable>;

    /// Range of depths the sensor reports reliably, in metres
    fn operating_range(&self) -> DepthRange;
}

/// Source of raw frames for the render loop.
pub trait Acquisition {
    /// Waits at most `timeout` for a new frame.
    ///
    /// The returned frame stays valid, and unshared, until the next call.
    ///
    /// # Errors
    ///
    /// * `AcquisitionTimeout` - nothing new arrived; the caller keeps its
    ///   previous output
    /// * `Disconnected` - the producer is gone and no frame will ever arrive
    fn acquire(&mut self, timeout: Duration) -> Result<&RawDepthFrame>;
}
