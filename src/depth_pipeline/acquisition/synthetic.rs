//! Deterministic stand-in for a depth camera
//!
//! Renders a tilted floor plane with a box sliding across it and encodes the
//! result exactly like the configured sensor would, so every decoder path can
//! be driven without hardware.

use std::f32::consts::PI;
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;
use tracing::debug;

use crate::depth_pipeline::acquisition::source::SensorProvider;
use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::sensor::constants::{AZURE_KINECT_FX, AZURE_KINECT_FY};
use crate::depth_pipeline::sensor::{
    DepthRange, RawDepthFrame, RowMap, SampleWidth, SensorConfig, SensorKind, UnprojectionTable,
};

/// Amplitude of the synthetic quadrature signal, well inside 12 bits
const PHASE_AMPLITUDE: f32 = 1000.0;
/// Frames per back-and-forth sweep of the box
const SWEEP_FRAMES: u64 = 120;

/// Encodes per-pixel measurements as the raw payload of `config`.
///
/// `samples` are what the sensor measures, in metres and row-major: axial
/// depth for single-depth sensors, range along the ray for phase sensors.
/// A sample of `0` encodes "no return".
pub fn encode_depth_frame(config: &SensorConfig, samples: &[f32], sequence: u64) -> RawDepthFrame {
    let width = config.kind.sample_width();
    let mut bytes = Vec::with_capacity(config.frame_bytes());
    let mut push = |word: u32| match width {
        SampleWidth::Bits16 => bytes.extend((word as u16).to_le_bytes()),
        SampleWidth::Bits32 => bytes.extend(word.to_le_bytes()),
    };

    match &config.kind {
        SensorKind::SingleDepth { depth_scale } => {
            for &sample in samples {
                push((sample / depth_scale).round().clamp(0.0, f32::from(u16::MAX)) as u32);
            }
        }
        SensorKind::QuadPhase(phase) => {
            let rows = RowMap::new(phase.row_order, config.height);
            let range_scale = phase.range_scale();
            let bias = phase.bias as f32;

            // stored row `s` holds output row `r` where source_row(r) == s
            let mut stored_to_output = vec![0; config.height];
            for row in 0..rows.len() {
                stored_to_output[rows.source_row(row)] = row;
            }

            let quadrature = |sample: f32| -> (f32, f32) {
                if sample <= 0.0 {
                    return (0.0, 0.0);
                }
                let angle = (sample / range_scale) % (2.0 * PI) - PI;
                (PHASE_AMPLITUDE * angle.sin(), PHASE_AMPLITUDE * angle.cos())
            };

            for image in 0..4 {
                for &row in &stored_to_output {
                    for column in 0..config.width {
                        let (sin, cos) = quadrature(samples[row * config.width + column]);
                        let offset = match image {
                            2 => cos.round(),
                            3 => sin.round(),
                            _ => 0.0,
                        };
                        push(((bias + offset) as u32) & phase.sample_mask);
                    }
                }
            }
        }
    }

    RawDepthFrame::new(bytes, sequence)
}

/// Sensor provider producing an animated synthetic scene.
pub struct SyntheticSensor {
    config: SensorConfig,
    range: DepthRange,
    table: UnprojectionTable,
    sequence: u64,
    frame_interval: Option<Duration>,
    next_frame: Option<Instant>,
    truncate_every: Option<u64>,
    samples: Vec<f32>,
}

impl SyntheticSensor {
    /// Builds the sensor and its lens model: a pinhole camera for
    /// single-depth sensors, the phase sensor's focal model otherwise.
    pub fn new(config: SensorConfig, range: DepthRange) -> Result<Self> {
        let table = match &config.kind {
            SensorKind::SingleDepth { .. } => UnprojectionTable::pinhole(
                config.width,
                config.height,
                Vec2::new(AZURE_KINECT_FX, AZURE_KINECT_FY),
                Vec2::new(config.width as f32 / 2.0, config.height as f32 / 2.0),
            )?,
            SensorKind::QuadPhase(phase) => {
                UnprojectionTable::focal_model(config.width, config.height, phase.focal_length_px)?
            }
        };
        let samples = vec![0.0; config.pixel_count()];
        Ok(Self {
            config,
            range,
            table,
            sequence: 0,
            frame_interval: None,
            next_frame: None,
            truncate_every: None,
            samples,
        })
    }

    /// Paces delivery like a real device; without it frames are always ready.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    /// Makes every `n`th frame one byte short, as a glitching link would.
    pub fn with_truncated_frames(mut self, n: u64) -> Self {
        self.truncate_every = (n > 0).then_some(n);
        self
    }

    pub fn frames_produced(&self) -> u64 {
        self.sequence
    }

    /// Axial depth of the scene at pixel `(x, y)` for frame `sequence`.
    fn scene_depth(&self, x: usize, y: usize, sequence: u64) -> f32 {
        let span = self.range.max - self.range.min;
        let u = x as f32 / self.config.width as f32;
        let v = y as f32 / self.config.height as f32;

        // floor recedes toward the top of the image
        let floor = self.range.min + span * (0.75 - 0.3 * (0.5 - v));

        let phase = (sequence % SWEEP_FRAMES) as f32 / SWEEP_FRAMES as f32;
        let centre = 0.5 + 0.25 * (2.0 * PI * phase).sin();
        let on_box = (u - centre).abs() < 0.15 && (v - 0.55).abs() < 0.2;
        if on_box { floor - 0.3 * span } else { floor }
    }

    fn render(&mut self, sequence: u64) {
        let width = self.config.width;
        for index in 0..self.samples.len() {
            let z = self.scene_depth(index % width, index / width, sequence);
            self.samples[index] = match self.table.rays()[index] {
                // the sensor measures along the ray for the radial model
                Some(ray) => z * self.table.model().axial_depth(ray, 1.0).recip(),
                None => 0.0,
            };
        }
    }

    /// Waits for the next frame slot; `false` if it is further than `timeout`.
    fn pace(&mut self, timeout: Duration) -> bool {
        let Some(interval) = self.frame_interval else {
            return true;
        };
        let now = Instant::now();
        let due = *self.next_frame.get_or_insert(now);
        if due > now + timeout {
            thread::sleep(timeout);
            return false;
        }
        if due > now {
            thread::sleep(due - now);
        }
        self.next_frame = Some(due.max(now) + interval);
        true
    }
}

impl SensorProvider for SyntheticSensor {
    fn config(&self) -> &SensorConfig {
        &self.config
    }

    fn get_depth_frame(&mut self, timeout: Duration) -> Option<RawDepthFrame> {
        if !self.pace(timeout) {
            return None;
        }

        self.sequence += 1;
        let sequence = self.sequence;
        self.render(sequence);
        let mut frame = encode_depth_frame(&self.config, &self.samples, sequence);

        if self.truncate_every.is_some_and(|n| sequence % n == 0) {
            debug!(sequence, "Emitting truncated frame");
            let mut bytes = frame.as_bytes().to_vec();
            bytes.pop();
            frame = RawDepthFrame::new(bytes, sequence);
        }
        Some(frame)
    }

    fn unprojection_table(&self) -> Result<UnprojectionTable> {
        Ok(self.table.clone())
    }

    fn operating_range(&self) -> DepthRange {
        self.range
    }
}
