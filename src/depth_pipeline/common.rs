//! Common utilities module
//!
//! This module contains the error type and timing helpers shared by every
//! stage of the depth pipeline.

pub mod error;
pub mod timing;

pub use error::{PipelineError, Result};
pub use timing::{FrameRate, FrameRateMeter, PipelineTimings, StepTiming, Timer};
