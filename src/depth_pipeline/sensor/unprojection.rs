//! Per-pixel unprojection rays
//!
//! A table entry holds the direction ratios `(x/z, y/z)` of the ray through a
//! pixel, in camera convention (x right, y up, looking down −z). Constructors
//! that start from image-space intrinsics flip the row axis here, once, so
//! that no later stage has to know about it.

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::depth_pipeline::common::error::{PipelineError, Result};

/// What a decoded depth sample measures along a pixel's ray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeModel {
    /// Distance along the optical axis (calibrated depth cameras)
    Axial,
    /// Distance from the optical centre along the ray (phase sensors)
    Radial,
}

impl RangeModel {
    /// Optical-axis depth of a sample `d` seen through `ray`.
    #[inline]
    pub fn axial_depth(self, ray: Vec2, d: f32) -> f32 {
        match self {
            RangeModel::Axial => d,
            RangeModel::Radial => d / (ray.length_squared() + 1.0).sqrt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnprojectionTable {
    width: usize,
    height: usize,
    rays: Vec<Option<Vec2>>,
    model: RangeModel,
}

impl UnprojectionTable {
    /// Wraps a calibrated table; `None` marks pixels without calibration.
    pub fn from_rays(
        width: usize,
        height: usize,
        rays: Vec<Option<Vec2>>,
        model: RangeModel,
    ) -> Result<Self> {
        if width == 0 || height == 0 || rays.len() != width * height {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        let invalid = rays.iter().filter(|r| r.is_none()).count();
        debug!(width, height, invalid, "Unprojection table loaded");
        Ok(Self {
            width,
            height,
            rays,
            model,
        })
    }

    /// Imports an SDK-style table of image-space `(x, y)` ratios in which
    /// uncalibrated pixels are NaN.
    pub fn from_image_space(
        width: usize,
        height: usize,
        ratios: &[[f32; 2]],
        model: RangeModel,
    ) -> Result<Self> {
        let rays = ratios
            .iter()
            .map(|&[x, y]| {
                if x.is_finite() && y.is_finite() {
                    Some(Vec2::new(x, -y))
                } else {
                    None
                }
            })
            .collect();
        Self::from_rays(width, height, rays, model)
    }

    /// Ideal pinhole camera measuring axial depth.
    pub fn pinhole(
        width: usize,
        height: usize,
        focal: Vec2,
        principal_point: Vec2,
    ) -> Result<Self> {
        let rays = (0..width * height)
            .map(|i| {
                let pixel = Vec2::new((i % width) as f32, (i / width) as f32);
                let offset = (pixel - principal_point) / focal;
                Some(Vec2::new(offset.x, -offset.y))
            })
            .collect();
        Self::from_rays(width, height, rays, RangeModel::Axial)
    }

    /// Lens model of a phase sensor: one focal length, principal point at the
    /// integer image centre, radial range samples.
    pub fn focal_model(width: usize, height: usize, focal_length_px: f32) -> Result<Self> {
        let principal_point = Vec2::new((width / 2) as f32, (height / 2) as f32);
        let mut table = Self::pinhole(
            width,
            height,
            Vec2::splat(focal_length_px),
            principal_point,
        )?;
        table.model = RangeModel::Radial;
        Ok(table)
    }

    /// Every pixel looks straight down the optical axis and samples are
    /// axial depth.
    pub fn identity(width: usize, height: usize) -> Result<Self> {
        Self::from_rays(width, height, vec![Some(Vec2::ZERO); width * height], RangeModel::Axial)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn model(&self) -> RangeModel {
        self.model
    }

    pub fn rays(&self) -> &[Option<Vec2>] {
        &self.rays
    }

    /// Camera-space point for a sample `d` at pixel `index`, `None` when the
    /// pixel has no calibration.
    #[inline]
    pub fn unproject(&self, index: usize, d: f32) -> Option<Vec3> {
        let ray = self.rays[index]?;
        let z = self.model.axial_depth(ray, d);
        Some(Vec3::new(ray.x * z, ray.y * z, -z))
    }
}
