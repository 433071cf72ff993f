//! Sensor constants
//!
//! Defaults for the two supported sensor families. Everything here is only a
//! default: the values end up in [`PhaseConfig`](super::PhaseConfig) or
//! [`PipelineConfig`](crate::depth_pipeline::PipelineConfig) and can be
//! overridden per device.

/// Speed of light used by the phase decoder (metres per second)
pub const PROPAGATION_SPEED_M_S: f32 = 300_000_000.0;
/// EPC660 modulation frequency (hertz)
pub const MODULATION_FREQUENCY_HZ: f32 = 12_000_000.0;

/// Mid-scale value subtracted from every 12-bit phase sample
pub const PHASE_SAMPLE_BIAS: i32 = 2048;
/// Mask selecting the 12 significant bits of a phase word
pub const PHASE_SAMPLE_MASK: u32 = 0xFFF;
/// Number of quadrature images per phase frame
pub const PHASE_IMAGE_COUNT: usize = 4;

/// EPC660 lens model: 50 pixels per millimetre times a 3.7 mm focal length
pub const EPC660_FOCAL_LENGTH_PX: f32 = 50.0 * 3.7;
pub const EPC660_WIDTH: usize = 320;
pub const EPC660_HEIGHT: usize = 240;
/// Unambiguous range of the EPC660 at 12 MHz (metres)
pub const EPC660_MIN_RANGE_M: f32 = 0.0;
pub const EPC660_MAX_RANGE_M: f32 = 12.5;

/// Azure Kinect narrow field-of-view unbinned depth mode
pub const AZURE_KINECT_WIDTH: usize = 640;
pub const AZURE_KINECT_HEIGHT: usize = 576;
pub const AZURE_KINECT_MIN_RANGE_M: f32 = 0.5;
pub const AZURE_KINECT_MAX_RANGE_M: f32 = 3.86;
/// Approximate NFOV intrinsics used when no device calibration is available
pub const AZURE_KINECT_FX: f32 = 504.0;
pub const AZURE_KINECT_FY: f32 = 504.0;

/// Single-depth samples arrive in millimetres
pub const MILLIMETRES_TO_METRES: f32 = 0.001;
