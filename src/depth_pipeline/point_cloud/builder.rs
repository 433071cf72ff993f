use std::ops::AddAssign;

use tracing::trace;

use crate::depth_pipeline::common::error::{PipelineError, Result};
use crate::depth_pipeline::point_cloud::color::depth_color;
use crate::depth_pipeline::point_cloud::types::{Point, PointCloud};
use crate::depth_pipeline::sensor::{DepthGrid, DepthRange, UnprojectionTable};

/// Per-frame accounting of the samples the builder looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Points appended to the cloud
    pub emitted: usize,
    /// Samples with no return (zero or non-finite depth)
    pub no_return: usize,
    /// Samples outside the operating range
    pub out_of_range: usize,
    /// Pixels without calibration
    pub invalid_ray: usize,
}

impl BuildStats {
    pub fn rejected(&self) -> usize {
        self.no_return + self.out_of_range + self.invalid_ray
    }
}

impl AddAssign for BuildStats {
    fn add_assign(&mut self, other: Self) {
        self.emitted += other.emitted;
        self.no_return += other.no_return;
        self.out_of_range += other.out_of_range;
        self.invalid_ray += other.invalid_ray;
    }
}

/// Combines a decoded depth grid with the unprojection table into a colored
/// point cloud, keeping only samples inside the operating range.
#[derive(Debug, Clone)]
pub struct PointCloudBuilder {
    range: DepthRange,
}

impl PointCloudBuilder {
    pub fn new(range: DepthRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> DepthRange {
        self.range
    }

    /// Rebuilds `cloud` from `grid`. Points keep the pixel order of the grid.
    pub fn build(
        &self,
        grid: &DepthGrid,
        table: &UnprojectionTable,
        cloud: &mut PointCloud,
    ) -> Result<BuildStats> {
        if grid.width != table.width() || grid.height != table.height() {
            return Err(PipelineError::InvalidDimensions(grid.width, grid.height));
        }

        cloud.clear();
        let mut stats = BuildStats::default();

        for (index, &d) in grid.values.iter().enumerate() {
            let Some(position) = table.unproject(index, d) else {
                stats.invalid_ray += 1;
                continue;
            };

            let z = -position.z;
            if z == 0.0 || !z.is_finite() {
                stats.no_return += 1;
                continue;
            }
            if !self.range.contains(z) {
                stats.out_of_range += 1;
                continue;
            }

            cloud.push(Point::new(position, depth_color(z, self.range)));
            stats.emitted += 1;
        }

        trace!(
            emitted = stats.emitted,
            rejected = stats.rejected(),
            "Point cloud built"
        );
        Ok(stats)
    }
}
