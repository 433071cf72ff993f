use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use tof_viewer_rs::depth_pipeline::acquisition::{SensorProvider, SyntheticSensor, ThreadedAcquisition};
use tof_viewer_rs::depth_pipeline::common::FrameRateMeter;
use tof_viewer_rs::depth_pipeline::{
    DisplayHost, ExecutionMode, FrameOutcome, FramePipeline, HeadlessDisplay, InputState,
    PipelineConfig, ViewController, ViewState,
};
use tof_viewer_rs::logger;

use tracing::{info, trace};

const DEMO_FRAMES: u64 = 600;
const ORBIT_RADIUS: f32 = 5.0;
const SENSOR_INTERVAL: Duration = Duration::from_millis(4);
const PRODUCER_POLL: Duration = Duration::from_millis(5);

fn main() -> Result<()> {
    logger::init();

    info!("Starting tof_viewer...");

    let config = PipelineConfig::builder()
        .execution(ExecutionMode::Parallel)
        .build();
    let viewport = config.max_viewport;

    let sensor = SyntheticSensor::new(config.sensor.clone(), config.range)?
        .with_frame_interval(SENSOR_INTERVAL)
        .with_truncated_frames(250);
    let table = sensor.unprojection_table()?;
    let mut pipeline = FramePipeline::new(config, table)?;
    let mut acquisition = ThreadedAcquisition::spawn("depth-producer", sensor, PRODUCER_POLL)
        .context("failed to start depth producer")?;

    let mut host = HeadlessDisplay::new(viewport).with_frame_limit(DEMO_FRAMES);
    let mut input = InputState::default();
    let mut controller = ViewController::default();
    let mut view = ViewState {
        // centre the middle of the sensor's range on the orbit
        model: Mat4::from_translation(Vec3::new(0.0, 0.0, 2.2)),
        ..ViewState::default()
    };
    let mut meter = FrameRateMeter::default();

    let started = Instant::now();
    let mut last = started;
    while !host.should_close() {
        let now = Instant::now();
        host.poll_input(&mut input);
        controller.apply(&mut input, &mut view, now - last);
        view.orbit(started.elapsed().as_secs_f32(), ORBIT_RADIUS);
        last = now;

        let outcome = pipeline
            .run_frame(&mut acquisition, &view, host.viewport())
            .context("frame pipeline failed")?;
        if let FrameOutcome::Rendered { build, .. } = outcome {
            trace!(points = build.emitted, "Frame rendered");
        }

        host.present(pipeline.framebuffer());
        meter.record(now.elapsed());
    }

    pipeline.timings().log_summary();
    let stats = pipeline.stats();
    let slot = acquisition.stats();
    info!(
        rendered = stats.rendered,
        stale = stats.stale,
        discarded = stats.discarded,
        produced = slot.published,
        dropped = slot.dropped,
        "Run complete"
    );
    let presented = host.presented();
    let checksum = format!("{:016x}", host.last_checksum());
    info!(
        frames = presented,
        checksum = %checksum,
        width = viewport.width,
        height = viewport.height,
        "Last frame presented"
    );

    Ok(())
}
