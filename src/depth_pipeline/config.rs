//! Pipeline configuration

use std::time::Duration;

use glam::Vec3;

use crate::depth_pipeline::camera::Viewport;
use crate::depth_pipeline::raster::ExecutionMode;
use crate::depth_pipeline::sensor::constants::{
    AZURE_KINECT_HEIGHT, AZURE_KINECT_MAX_RANGE_M, AZURE_KINECT_MIN_RANGE_M, AZURE_KINECT_WIDTH,
    EPC660_HEIGHT, EPC660_MAX_RANGE_M, EPC660_MIN_RANGE_M, EPC660_WIDTH,
};
use crate::depth_pipeline::sensor::{
    DepthRange, PhaseConfig, RowOrder, SensorConfig, SensorKind,
};

/// Roughly one sensor sampling interval
pub const DEFAULT_ACQUISITION_TIMEOUT: Duration = Duration::from_millis(5);
pub const DEFAULT_MAX_VIEWPORT: Viewport = Viewport {
    width: 1280,
    height: 720,
};

/// Configuration for the depth-to-image frame pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Sensor geometry and payload encoding
    pub sensor: SensorConfig,
    /// Depths outside this range are dropped from the point cloud
    pub range: DepthRange,
    /// Largest viewport the render buffers are sized for up front
    pub max_viewport: Viewport,
    pub execution: ExecutionMode,
    /// How long the render loop waits for a new frame before re-rendering
    /// the previous one
    pub acquisition_timeout: Duration,
    /// RGB in `[0, 1]`
    pub clear_color: Vec3,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::azure_kinect()
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Azure Kinect NFOV unbinned: 16-bit millimetre depth
    pub fn azure_kinect() -> Self {
        Self {
            sensor: SensorConfig {
                width: AZURE_KINECT_WIDTH,
                height: AZURE_KINECT_HEIGHT,
                kind: SensorKind::default(),
            },
            range: DepthRange::new(AZURE_KINECT_MIN_RANGE_M, AZURE_KINECT_MAX_RANGE_M),
            max_viewport: DEFAULT_MAX_VIEWPORT,
            execution: ExecutionMode::Sequential,
            acquisition_timeout: DEFAULT_ACQUISITION_TIMEOUT,
            clear_color: Vec3::ZERO,
        }
    }

    /// EPC660 over the network link: four phase images of 32-bit words with
    /// the sensor's interleaved row readout
    pub fn epc660() -> Self {
        Self {
            sensor: SensorConfig {
                width: EPC660_WIDTH,
                height: EPC660_HEIGHT,
                kind: SensorKind::QuadPhase(PhaseConfig {
                    row_order: RowOrder::Interleaved,
                    ..PhaseConfig::default()
                }),
            },
            range: DepthRange::new(EPC660_MIN_RANGE_M, EPC660_MAX_RANGE_M),
            ..Self::azure_kinect()
        }
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    sensor: Option<SensorConfig>,
    range: Option<DepthRange>,
    max_viewport: Option<Viewport>,
    execution: Option<ExecutionMode>,
    acquisition_timeout: Option<Duration>,
    clear_color: Option<Vec3>,
}

impl PipelineConfigBuilder {
    pub fn sensor(mut self, sensor: SensorConfig) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.range = Some(DepthRange::new(min, max));
        self
    }

    pub fn max_viewport(mut self, width: u32, height: u32) -> Self {
        self.max_viewport = Some(Viewport::new(width, height));
        self
    }

    pub fn execution(mut self, mode: ExecutionMode) -> Self {
        self.execution = Some(mode);
        self
    }

    pub fn acquisition_timeout(mut self, timeout: Duration) -> Self {
        self.acquisition_timeout = Some(timeout);
        self
    }

    pub fn clear_color(mut self, color: Vec3) -> Self {
        self.clear_color = Some(color);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            sensor: self.sensor.unwrap_or(default.sensor),
            range: self.range.unwrap_or(default.range),
            max_viewport: self.max_viewport.unwrap_or(default.max_viewport),
            execution: self.execution.unwrap_or(default.execution),
            acquisition_timeout: self.acquisition_timeout.unwrap_or(default.acquisition_timeout),
            clear_color: self.clear_color.unwrap_or(default.clear_color),
        }
    }
}
