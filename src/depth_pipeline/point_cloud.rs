//! Point cloud module
//!
//! Builds the per-frame colored point cloud from decoded depth.

mod builder;
pub mod color;
mod types;

pub use builder::{BuildStats, PointCloudBuilder};
pub use color::{depth_color, depth_to_hue, hsv_to_rgb};
pub use types::{Point, PointCloud};
