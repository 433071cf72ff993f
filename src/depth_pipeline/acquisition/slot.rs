//! Single-frame handoff between a producer thread and the render thread
//!
//! One mutex guards one frame buffer and two condition variables carry the
//! signals: `buffer_full` wakes the consumer, `buffer_read` wakes the
//! producer. Frames change hands by swapping buffers, so neither side copies
//! payload bytes or holds the lock while it works on a frame.

use std::mem;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::trace;

use crate::depth_pipeline::common::error::{PipelineError, Result};
use crate::depth_pipeline::sensor::RawDepthFrame;

/// What happened to a published frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// The slot was empty
    Delivered,
    /// The consumer had not taken the previous frame in time; it was dropped
    Replaced,
}

/// Handoff counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStats {
    pub published: u64,
    pub taken: u64,
    pub dropped: u64,
}

#[derive(Debug)]
struct SlotState {
    frame: RawDepthFrame,
    full: bool,
    shutdown: bool,
    stats: SlotStats,
}

#[derive(Debug)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
    buffer_full: Condvar,
    buffer_read: Condvar,
}

impl FrameSlot {
    /// Creates an empty slot whose buffer is pre-sized to `frame_bytes`.
    pub fn new(frame_bytes: usize) -> Self {
        Self {
            state: Mutex::new(SlotState {
                frame: RawDepthFrame::zeroed(frame_bytes),
                full: false,
                shutdown: false,
                stats: SlotStats::default(),
            }),
            buffer_full: Condvar::new(),
            buffer_read: Condvar::new(),
        }
    }

    // a panic on the other side must not take the render loop down with it
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Producer side: hands `frame` to the consumer and gets the slot's old
    /// buffer back in its place.
    ///
    /// Waits up to `wait` for the consumer to read the previous frame, then
    /// overwrites it. Fails with `Disconnected` once the slot is shut down.
    pub fn publish(&self, frame: &mut RawDepthFrame, wait: Duration) -> Result<Publish> {
        let guard = self.lock();
        let (mut state, _) = self
            .buffer_read
            .wait_timeout_while(guard, wait, |s| s.full && !s.shutdown)
            .unwrap_or_else(PoisonError::into_inner);

        if state.shutdown {
            return Err(PipelineError::Disconnected);
        }

        let outcome = if state.full {
            state.stats.dropped += 1;
            Publish::Replaced
        } else {
            Publish::Delivered
        };
        mem::swap(&mut state.frame, frame);
        state.full = true;
        state.stats.published += 1;
        drop(state);

        self.buffer_full.notify_one();
        Ok(outcome)
    }

    /// Consumer side: waits up to `timeout` for a frame and swaps it into
    /// `frame`. The buffer previously in `frame` goes back to the producer.
    ///
    /// A frame published before shutdown is still delivered; after that the
    /// slot reports `Disconnected`.
    pub fn take(&self, frame: &mut RawDepthFrame, timeout: Duration) -> Result<()> {
        let guard = self.lock();
        let (mut state, _) = self
            .buffer_full
            .wait_timeout_while(guard, timeout, |s| !s.full && !s.shutdown)
            .unwrap_or_else(PoisonError::into_inner);

        if !state.full {
            return Err(if state.shutdown {
                PipelineError::Disconnected
            } else {
                PipelineError::AcquisitionTimeout(timeout)
            });
        }

        mem::swap(&mut state.frame, frame);
        state.full = false;
        state.stats.taken += 1;
        trace!(sequence = frame.sequence(), "Took frame from slot");
        drop(state);

        self.buffer_read.notify_one();
        Ok(())
    }

    /// Wakes every waiter on both sides; all later calls return promptly.
    pub fn shutdown(&self) {
        self.lock().shutdown = true;
        self.buffer_full.notify_all();
        self.buffer_read.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }

    pub fn stats(&self) -> SlotStats {
        self.lock().stats
    }
}
