//! Per-frame orchestration: acquire, decode, build, transform, rasterize

use tracing::{debug, debug_span, info, warn};

use crate::depth_pipeline::acquisition::Acquisition;
use crate::depth_pipeline::camera::{CameraMatrices, ViewState, Viewport};
use crate::depth_pipeline::common::{PipelineError, PipelineTimings, Result, Timer};
use crate::depth_pipeline::config::PipelineConfig;
use crate::depth_pipeline::point_cloud::{BuildStats, PointCloud, PointCloudBuilder};
use crate::depth_pipeline::raster::{
    DepthBuffer, ExecutionMode, Framebuffer, RasterStats, Rasterizer, pack_rgba,
};
use crate::depth_pipeline::sensor::{
    DepthDecoder, DepthGrid, RawDepthFrame, SensorDecoder, UnprojectionTable,
};

/// What [`FramePipeline::run_frame`] did with the frame slot it was given
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// A new frame was decoded and rendered
    Rendered { build: BuildStats, raster: RasterStats },
    /// No frame arrived in time; the previous point cloud was rendered again
    Stale { raster: RasterStats },
    /// The frame was malformed and dropped; the framebuffer still holds the
    /// previous image
    Discarded { error: PipelineError },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub rendered: u64,
    pub stale: u64,
    pub discarded: u64,
}

/// The depth-to-image pipeline with every buffer it needs allocated up front.
pub struct FramePipeline<D: DepthDecoder = SensorDecoder> {
    config: PipelineConfig,
    decoder: D,
    table: UnprojectionTable,
    builder: PointCloudBuilder,
    grid: DepthGrid,
    cloud: PointCloud,
    rasterizer: Rasterizer,
    framebuffer: Framebuffer,
    depth: DepthBuffer,
    clear_color: u32,
    matrices: Option<CameraMatrices>,
    stats: FrameStats,
    timings: PipelineTimings,
}

impl FramePipeline<SensorDecoder> {
    /// Pipeline for `config` with the decoder its sensor kind calls for.
    pub fn new(config: PipelineConfig, table: UnprojectionTable) -> Result<Self> {
        let decoder = SensorDecoder::new(&config.sensor);
        let rasterizer = Rasterizer::new(config.execution);
        Self::with_custom(decoder, rasterizer, config, table)
    }
}

impl<D: DepthDecoder> FramePipeline<D> {
    /// # Errors
    ///
    /// * `InvalidDimensions` - the table does not cover the sensor image
    pub fn with_custom(
        decoder: D,
        rasterizer: Rasterizer,
        config: PipelineConfig,
        table: UnprojectionTable,
    ) -> Result<Self> {
        let (width, height) = (config.sensor.width, config.sensor.height);
        if table.width() != width || table.height() != height {
            return Err(PipelineError::InvalidDimensions(table.width(), table.height()));
        }

        info!(
            width,
            height,
            frame_bytes = decoder.expected_bytes(),
            max_width = config.max_viewport.width,
            max_height = config.max_viewport.height,
            mode = ?rasterizer.mode(),
            "Frame pipeline ready"
        );

        Ok(Self {
            builder: PointCloudBuilder::new(config.range),
            grid: DepthGrid::new(width, height),
            cloud: PointCloud::with_capacity(width * height),
            framebuffer: Framebuffer::new(config.max_viewport),
            depth: DepthBuffer::new(config.max_viewport),
            clear_color: pack_rgba(config.clear_color),
            matrices: None,
            stats: FrameStats::default(),
            timings: PipelineTimings::new(),
            decoder,
            table,
            rasterizer,
            config,
        })
    }

    /// Decodes `frame` and rebuilds the point cloud from it.
    ///
    /// On error the point cloud from the last good frame is left in place.
    pub fn ingest(&mut self, frame: &RawDepthFrame) -> Result<BuildStats> {
        let timer = Timer::start("decode");
        debug_span!("decode", sequence = frame.sequence())
            .in_scope(|| self.decoder.decode(frame, &mut self.grid))?;
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        let timer = Timer::start("build");
        let stats = debug_span!("build_point_cloud")
            .in_scope(|| self.builder.build(&self.grid, &self.table, &mut self.cloud))?;
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        Ok(stats)
    }

    /// Clears the buffers to `viewport` and rasterizes the current point
    /// cloud as seen from `view`.
    ///
    /// A zero-sized viewport is rejected before any buffer is touched.
    pub fn render(&mut self, view: &ViewState, viewport: Viewport) -> Result<RasterStats> {
        let aspect = viewport.aspect()?;

        let timer = Timer::start("clear");
        self.framebuffer.resize(viewport);
        self.depth.resize(viewport);
        self.framebuffer.clear(self.clear_color);
        self.depth.clear();
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        let timer = Timer::start("transform");
        let matrices =
            debug_span!("transform").in_scope(|| CameraMatrices::from_view(view, aspect));
        self.matrices = Some(matrices);
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        let timer = Timer::start("rasterize");
        let stats = self.rasterizer.rasterize(
            self.cloud.points(),
            &matrices.mvp,
            &mut self.framebuffer,
            &mut self.depth,
        )?;
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        Ok(stats)
    }

    /// Runs one iteration of the render loop.
    ///
    /// Recoverable conditions are reported through [`FrameOutcome`]: a late
    /// frame re-renders the previous cloud, a malformed one is dropped and
    /// leaves the framebuffer as it was. Only a degenerate viewport, a
    /// vanished producer or a configuration fault come back as errors.
    pub fn run_frame<A: Acquisition + ?Sized>(
        &mut self,
        acquisition: &mut A,
        view: &ViewState,
        viewport: Viewport,
    ) -> Result<FrameOutcome> {
        viewport.aspect()?;
        self.timings.clear();

        let timer = Timer::start("acquire");
        let acquired = acquisition.acquire(self.config.acquisition_timeout);
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        let outcome = match acquired {
            Ok(frame) => match self.ingest(frame) {
                Ok(build) => {
                    let raster = self.render(view, viewport)?;
                    self.stats.rendered += 1;
                    FrameOutcome::Rendered { build, raster }
                }
                Err(error) if error.is_recoverable() => {
                    warn!(%error, "Discarding depth frame");
                    self.stats.discarded += 1;
                    FrameOutcome::Discarded { error }
                }
                Err(error) => return Err(error),
            },
            Err(PipelineError::AcquisitionTimeout(timeout)) => {
                debug!(?timeout, "No new depth frame, re-rendering previous cloud");
                let raster = self.render(view, viewport)?;
                self.stats.stale += 1;
                FrameOutcome::Stale { raster }
            }
            Err(error) => return Err(error),
        };

        Ok(outcome)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn set_execution_mode(&mut self, mode: ExecutionMode) {
        self.config.execution = mode;
        self.rasterizer.set_mode(mode);
    }

    pub fn table(&self) -> &UnprojectionTable {
        &self.table
    }

    pub fn point_cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }

    /// Matrices of the most recent render
    pub fn matrices(&self) -> Option<&CameraMatrices> {
        self.matrices.as_ref()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Step durations of the most recent [`run_frame`](Self::run_frame)
    pub fn timings(&self) -> &PipelineTimings {
        &self.timings
    }
}
