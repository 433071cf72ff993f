//! Depth frame to image pipeline
//!
//! Raw range-sensor frames are decoded into metres, unprojected into a
//! coloured point cloud and rasterized with a nearest-wins depth test. Each
//! stage lives in its own module; [`FramePipeline`] strings them together.

pub mod acquisition;
pub mod camera;
pub mod common;
pub mod config;
pub mod display;
pub mod frame;
pub mod point_cloud;
pub mod raster;
pub mod sensor;

pub use common::{PipelineError, Result};

pub use acquisition::{
    Acquisition, SensorProvider, SyncAcquisition, SyntheticSensor, ThreadedAcquisition,
};

pub use camera::{InputState, ViewController, ViewState, Viewport};

pub use config::{PipelineConfig, PipelineConfigBuilder};

pub use display::{DisplayHost, HeadlessDisplay};

pub use frame::{FrameOutcome, FramePipeline, FrameStats};

pub use raster::{DepthBuffer, ExecutionMode, Framebuffer, RasterStats};

pub use sensor::{DepthRange, RawDepthFrame, SensorConfig, SensorKind, UnprojectionTable};
