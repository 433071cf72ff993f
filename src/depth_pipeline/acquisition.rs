//! Frame acquisition
//!
//! Gets raw frames from a [`SensorProvider`] to the render thread, either by
//! polling it in place ([`SyncAcquisition`]) or from a producer thread through
//! a single-frame handoff slot ([`ThreadedAcquisition`]).

mod slot;
mod source;
mod sync;
mod synthetic;
mod threaded;

pub use slot::{FrameSlot, Publish, SlotStats};
pub use source::{Acquisition, SensorProvider};
pub use sync::SyncAcquisition;
pub use synthetic::{SyntheticSensor, encode_depth_frame};
pub use threaded::ThreadedAcquisition;
