//! Sensor data types

use super::constants::{
    EPC660_FOCAL_LENGTH_PX, MILLIMETRES_TO_METRES, MODULATION_FREQUENCY_HZ, PHASE_IMAGE_COUNT,
    PHASE_SAMPLE_BIAS, PHASE_SAMPLE_MASK, PROPAGATION_SPEED_M_S,
};

/// Raw payload exactly as delivered by the sensor.
///
/// The bytes are opaque until a decoder interprets them. The sequence number
/// is assigned by whoever filled the buffer and is only used for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDepthFrame {
    data: Vec<u8>,
    sequence: u64,
}

impl RawDepthFrame {
    pub fn new(data: Vec<u8>, sequence: u64) -> Self {
        Self { data, sequence }
    }

    /// A zero-filled frame of `len` bytes, used to pre-size handoff buffers.
    pub fn zeroed(len: usize) -> Self {
        Self {
            data: vec![0; len],
            sequence: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Dense per-pixel depth in metres, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthGrid {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

impl DepthGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Width of one little-endian sample word in the raw payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    Bits16,
    Bits32,
}

impl SampleWidth {
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::Bits16 => 2,
            SampleWidth::Bits32 => 4,
        }
    }

    /// Reads sample `index` from `bytes`. The caller has already validated
    /// the buffer length.
    #[inline]
    pub(crate) fn read(self, bytes: &[u8], index: usize) -> u32 {
        match self {
            SampleWidth::Bits16 => {
                let at = index * 2;
                u32::from(u16::from_le_bytes([bytes[at], bytes[at + 1]]))
            }
            SampleWidth::Bits32 => {
                let at = index * 4;
                u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
            }
        }
    }
}

/// Order in which the sensor reads out the rows of each image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// Rows arrive top to bottom
    Sequential,
    /// EPC660 readout: the even rows from the bottom upward, then the odd
    /// rows from the top downward
    Interleaved,
}

/// Parameters of a four-phase continuous-wave time-of-flight sensor
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseConfig {
    /// Propagation speed of the emitted light (m/s)
    pub propagation_speed: f32,
    /// Modulation frequency (Hz)
    pub modulation_frequency: f32,
    /// Subtracted from every masked sample
    pub bias: i32,
    /// Significant bits of a raw sample word
    pub sample_mask: u32,
    pub sample_width: SampleWidth,
    pub row_order: RowOrder,
    /// Focal length of the unprojection model in pixels
    pub focal_length_px: f32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            propagation_speed: PROPAGATION_SPEED_M_S,
            modulation_frequency: MODULATION_FREQUENCY_HZ,
            bias: PHASE_SAMPLE_BIAS,
            sample_mask: PHASE_SAMPLE_MASK,
            sample_width: SampleWidth::Bits32,
            row_order: RowOrder::Sequential,
            focal_length_px: EPC660_FOCAL_LENGTH_PX,
        }
    }
}

impl PhaseConfig {
    /// Metres per radian of phase: `c / (4·π·f)`
    pub fn range_scale(&self) -> f32 {
        self.propagation_speed / (4.0 * std::f32::consts::PI * self.modulation_frequency)
    }

    /// Largest range the sensor can report without wrapping: `c / (2·f)`
    pub fn ambiguity_distance(&self) -> f32 {
        self.propagation_speed / (2.0 * self.modulation_frequency)
    }
}

/// How a raw payload encodes depth
#[derive(Debug, Clone, PartialEq)]
pub enum SensorKind {
    /// One 16-bit image; samples are multiplied by `depth_scale` to get metres
    SingleDepth { depth_scale: f32 },
    /// Four concatenated quadrature images
    QuadPhase(PhaseConfig),
}

impl Default for SensorKind {
    fn default() -> Self {
        SensorKind::SingleDepth {
            depth_scale: MILLIMETRES_TO_METRES,
        }
    }
}

impl SensorKind {
    pub fn images_per_frame(&self) -> usize {
        match self {
            SensorKind::SingleDepth { .. } => 1,
            SensorKind::QuadPhase(_) => PHASE_IMAGE_COUNT,
        }
    }

    pub fn sample_width(&self) -> SampleWidth {
        match self {
            SensorKind::SingleDepth { .. } => SampleWidth::Bits16,
            SensorKind::QuadPhase(phase) => phase.sample_width,
        }
    }
}

/// Geometry and encoding of a depth sensor
#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    pub width: usize,
    pub height: usize,
    pub kind: SensorKind,
}

impl SensorConfig {
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Exact byte length of a well-formed raw frame
    pub fn frame_bytes(&self) -> usize {
        self.pixel_count() * self.kind.images_per_frame() * self.kind.sample_width().bytes()
    }
}

/// Operating range of the sensor in metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub min: f32,
    pub max: f32,
}

impl DepthRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, z: f32) -> bool {
        z >= self.min && z <= self.max
    }
}
