use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::depth_pipeline::acquisition::slot::{FrameSlot, Publish, SlotStats};
use crate::depth_pipeline::acquisition::source::{Acquisition, SensorProvider};
use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::sensor::RawDepthFrame;

/// Runs a [`SensorProvider`] on its own thread and hands frames to the render
/// thread through a [`FrameSlot`].
///
/// The producer polls with `poll_timeout` and re-checks the shutdown flag
/// between polls, so stopping it takes at most about two poll intervals.
/// Dropping the acquisition shuts the producer down and joins it.
pub struct ThreadedAcquisition {
    slot: Arc<FrameSlot>,
    current: RawDepthFrame,
    producer: Option<JoinHandle<()>>,
    name: String,
}

impl ThreadedAcquisition {
    /// Spawns the producer thread.
    ///
    /// # Arguments
    ///
    /// * `name` - Thread name, also used in log output
    /// * `provider` - Moved onto the producer thread
    /// * `poll_timeout` - Upper bound on every blocking call the producer makes
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn<P>(name: &str, mut provider: P, poll_timeout: Duration) -> io::Result<Self>
    where
        P: SensorProvider + 'static,
    {
        let frame_bytes = provider.config().frame_bytes();
        let slot = Arc::new(FrameSlot::new(frame_bytes));
        let producer_slot = Arc::clone(&slot);
        let thread_name = name.to_string();

        info!(name = %name, frame_bytes, ?poll_timeout, "Starting depth producer");

        let producer = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(name = %thread_name, "Producer thread started");
                while !producer_slot.is_shutdown() {
                    let Some(mut frame) = provider.get_depth_frame(poll_timeout) else {
                        trace!(name = %thread_name, "No frame from sensor");
                        continue;
                    };
                    match producer_slot.publish(&mut frame, poll_timeout) {
                        Ok(Publish::Delivered) => {}
                        Ok(Publish::Replaced) => {
                            trace!(name = %thread_name, "Consumer behind, dropped a frame")
                        }
                        Err(_) => break,
                    }
                }

                info!(name = %thread_name, "Producer thread exiting");
            })?;

        Ok(Self {
            slot,
            current: RawDepthFrame::zeroed(frame_bytes),
            producer: Some(producer),
            name: name.to_string(),
        })
    }

    pub fn stats(&self) -> SlotStats {
        self.slot.stats()
    }

    pub fn is_running(&self) -> bool {
        self.producer
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stops the producer and waits for it to exit.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.producer.take() else {
            return;
        };
        debug!(name = %self.name, "Stopping depth producer");
        self.slot.shutdown();
        if handle.join().is_err() {
            warn!(name = %self.name, "Depth producer panicked");
        }
    }
}

impl Acquisition for ThreadedAcquisition {
    fn acquire(&mut self, timeout: Duration) -> Result<&RawDepthFrame> {
        self.slot.take(&mut self.current, timeout)?;
        Ok(&self.current)
    }
}

impl Drop for ThreadedAcquisition {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth_pipeline::acquisition::synthetic::SyntheticSensor;
    use crate::depth_pipeline::common::error::PipelineError;
    use crate::depth_pipeline::sensor::{DepthRange, SensorConfig, SensorKind};
    use std::time::Instant;

    fn sensor(interval: Duration) -> SyntheticSensor {
        let config = SensorConfig {
            width: 8,
            height: 8,
            kind: SensorKind::default(),
        };
        SyntheticSensor::new(config, DepthRange::new(0.5, 3.86))
            .unwrap()
            .with_frame_interval(interval)
    }

    fn spawn(name: &str, interval: Duration) -> ThreadedAcquisition {
        ThreadedAcquisition::spawn(name, sensor(interval), Duration::from_millis(5)).unwrap()
    }

    #[test]
    fn test_frames_arrive_in_order() {
        let mut acquisition = spawn("test-producer", Duration::from_millis(1));
        assert!(acquisition.is_running());

        let mut last = 0;
        for _ in 0..5 {
            let frame = acquisition.acquire(Duration::from_secs(2)).unwrap();
            assert_eq!(frame.len(), 8 * 8 * 2);
            assert!(frame.sequence() > last);
            last = frame.sequence();
        }
        assert!(acquisition.stats().taken >= 5);
    }

    #[test]
    fn test_slow_producer_times_out() {
        let mut acquisition = spawn("slow-producer", Duration::from_secs(60));
        // the first frame is immediate, the next one is a minute away
        acquisition.acquire(Duration::from_secs(2)).unwrap();
        assert_eq!(
            acquisition.acquire(Duration::from_millis(5)).unwrap_err(),
            PipelineError::AcquisitionTimeout(Duration::from_millis(5))
        );
    }

    #[test]
    fn test_shutdown_joins_producer() {
        let mut acquisition = spawn("stopping-producer", Duration::from_secs(60));
        let started = Instant::now();
        acquisition.shutdown();
        assert!(!acquisition.is_running());
        assert!(started.elapsed() < Duration::from_secs(2));

        // any frame published before shutdown may still be taken once
        let _ = acquisition.acquire(Duration::ZERO);
        assert_eq!(
            acquisition.acquire(Duration::from_millis(5)).unwrap_err(),
            PipelineError::Disconnected
        );
    }
}
