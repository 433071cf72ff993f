//! Sensor module
//!
//! Raw frame types, sensor constants, depth decoders and the unprojection
//! table that turns a pixel plus a depth sample into a camera-space point.

pub mod constants;
mod decoder;
mod layout;
mod quad_phase_decoder;
mod single_depth_decoder;
pub mod types;
mod unprojection;

pub use decoder::{DepthDecoder, SensorDecoder};
pub use layout::RowMap;
pub use quad_phase_decoder::{QuadPhaseDecoder, phase_to_depth};
pub use single_depth_decoder::SingleDepthDecoder;
pub use types::{
    DepthGrid, DepthRange, PhaseConfig, RawDepthFrame, RowOrder, SampleWidth, SensorConfig,
    SensorKind,
};
pub use unprojection::{RangeModel, UnprojectionTable};
