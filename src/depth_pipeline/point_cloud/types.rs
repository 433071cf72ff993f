//! Point cloud types

use glam::Vec3;

/// A camera-space point and its colour.
///
/// The colour is carried as HSV; conversion to RGB happens in the raster
/// pixel stage so alternative colourings do not touch the builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: Vec3,
    pub color: Vec3,
}

impl Point {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}

/// Reusable point buffer sized for one full sensor frame.
///
/// Rebuilt in place every frame; only valid samples are stored, densely and
/// in pixel order.
#[derive(Debug, Clone)]
pub struct PointCloud {
    points: Vec<Point>,
}

impl PointCloud {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    #[inline]
    pub fn push(&mut self, point: Point) {
        debug_assert!(
            self.points.len() < self.points.capacity(),
            "point cloud grew past its frame capacity"
        );
        self.points.push(point);
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}
