use std::time::Duration;

use thiserror::Error;

/// Every failure the frame pipeline can report.
///
/// None of these are fatal: the acquisition and display layers decide
/// whether to keep running. Per-pixel calibration gaps are not errors at all,
/// they are counted by the point cloud builder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("No depth frame arrived within {0:?}")]
    AcquisitionTimeout(Duration),

    #[error("Raw depth frame has {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Degenerate viewport: width={width}, height={height}")]
    DegenerateViewport { width: u32, height: u32 },

    #[error("Invalid dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Depth producer has shut down")]
    Disconnected,
}

impl PipelineError {
    /// Frame-level errors after which the previous output stays valid.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::AcquisitionTimeout(_) | PipelineError::SizeMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_level_errors_are_recoverable() {
        assert!(PipelineError::AcquisitionTimeout(Duration::from_millis(5)).is_recoverable());
        assert!(PipelineError::SizeMismatch { expected: 32, actual: 16 }.is_recoverable());

        assert!(!PipelineError::Disconnected.is_recoverable());
        assert!(!PipelineError::InvalidDimensions(4, 1).is_recoverable());
        assert!(!PipelineError::DegenerateViewport { width: 0, height: 4 }.is_recoverable());
    }
}
