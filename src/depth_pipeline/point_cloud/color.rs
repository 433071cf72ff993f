//! Depth colouring and HSV conversion

use glam::Vec3;

use crate::depth_pipeline::sensor::DepthRange;

/// Hue span used for depth colouring: red (0) to blue (2/3).
pub const HUE_SPAN: f32 = 2.0 / 3.0;

/// Maps a depth to a hue in `[0, 2/3]`.
///
/// The position inside the range is clamped to `[0, 1]` and then flipped, so
/// the near limit gets hue 2/3 (blue) and the far limit hue 0 (red). Hue never
/// increases as `z` grows.
#[inline]
pub fn depth_to_hue(z: f32, range: DepthRange) -> f32 {
    let span = range.max - range.min;
    let t = if span > 0.0 {
        ((z - range.min) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    HUE_SPAN * (1.0 - t)
}

/// Fully saturated, full-value HSV colour for a depth.
#[inline]
pub fn depth_color(z: f32, range: DepthRange) -> Vec3 {
    Vec3::new(depth_to_hue(z, range), 1.0, 1.0)
}

/// Converts HSV (all components in `[0, 1]`) to RGB.
pub fn hsv_to_rgb(hsv: Vec3) -> Vec3 {
    let (h, s, v) = (hsv.x, hsv.y, hsv.z);
    if s == 0.0 {
        return Vec3::splat(v);
    }

    let h = h * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match (sector as i32).rem_euclid(6) {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}
