use std::time::Duration;

use tracing::trace;

use crate::depth_pipeline::acquisition::source::{Acquisition, SensorProvider};
use crate::depth_pipeline::common::error::{PipelineError, Result};
use crate::depth_pipeline::sensor::RawDepthFrame;

/// Polls the provider directly on the render thread.
pub struct SyncAcquisition<P> {
    provider: P,
    current: RawDepthFrame,
}

impl<P: SensorProvider> SyncAcquisition<P> {
    pub fn new(provider: P) -> Self {
        let current = RawDepthFrame::zeroed(provider.config().frame_bytes());
        Self { provider, current }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_inner(self) -> P {
        self.provider
    }
}

impl<P: SensorProvider> Acquisition for SyncAcquisition<P> {
    fn acquire(&mut self, timeout: Duration) -> Result<&RawDepthFrame> {
        match self.provider.get_depth_frame(timeout) {
            Some(frame) => {
                trace!(sequence = frame.sequence(), "Polled depth frame");
                self.current = frame;
                Ok(&self.current)
            }
            None => Err(PipelineError::AcquisitionTimeout(timeout)),
        }
    }
}
