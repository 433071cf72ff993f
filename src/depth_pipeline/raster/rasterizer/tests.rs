use super::*;
use crate::depth_pipeline::camera::Viewport;
use crate::depth_pipeline::raster::buffers::unpack_rgba;
use crate::depth_pipeline::raster::stages::VertexOut;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const CLEAR: u32 = 0xFF000000;

fn buffers(width: u32, height: u32) -> (Framebuffer, DepthBuffer) {
    let viewport = Viewport::new(width, height);
    let mut framebuffer = Framebuffer::new(viewport);
    framebuffer.clear(CLEAR);
    (framebuffer, DepthBuffer::new(viewport))
}

fn depths(depth: &DepthBuffer) -> Vec<Option<f32>> {
    (0..depth.height())
        .flat_map(|y| (0..depth.width()).map(move |x| (x, y)))
        .map(|(x, y)| depth.depth(x, y))
        .collect()
}

fn render(points: &[Point], mode: ExecutionMode) -> (Vec<u32>, Vec<Option<f32>>, RasterStats) {
    let (mut framebuffer, mut depth) = buffers(8, 8);
    let stats = Rasterizer::new(mode)
        .rasterize(points, &Mat4::IDENTITY, &mut framebuffer, &mut depth)
        .unwrap();
    (framebuffer.to_vec(), depths(&depth), stats)
}

/// Clip-space points (identity MVP) crowded onto a few pixels, with depths
/// quantized so that many of them tie.
fn crowded_points(seed: u64, count: usize) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let position = Vec3::new(
                rng.gen_range(-1.2..1.2),
                rng.gen_range(-1.2..1.2),
                rng.gen_range(0..8) as f32 / 4.0 - 1.0,
            );
            let hue = rng.gen_range(0..6) as f32 / 6.0;
            Point::new(position, Vec3::new(hue, 1.0, 1.0))
        })
        .collect()
}

#[test]
fn test_clip_volume() {
    assert!(inside_clip_volume(Vec4::new(0.0, 0.0, 0.0, 1.0)));
    assert!(!inside_clip_volume(Vec4::new(2.0, 0.0, 0.0, 1.0)));
    // the boundary itself is outside
    assert!(!inside_clip_volume(Vec4::new(1.0, 0.0, 0.0, 1.0)));
    assert!(!inside_clip_volume(Vec4::new(0.0, 0.0, -1.0, 1.0)));
    // no point survives a non-positive w
    assert!(!inside_clip_volume(Vec4::new(0.0, 0.0, 0.0, 0.0)));
    assert!(!inside_clip_volume(Vec4::new(0.0, 0.0, 0.0, -1.0)));
    assert!(!inside_clip_volume(Vec4::new(f32::NAN, 0.0, 0.0, 1.0)));
}

#[test]
fn test_perspective_divide_flips_y() {
    assert_eq!(
        perspective_divide(Vec4::new(1.0, 1.0, 0.5, 2.0)),
        Vec3::new(0.5, -0.5, 0.25)
    );
    assert_eq!(
        perspective_divide(Vec4::new(1.0, 2.0, 3.0, 0.0)),
        Vec3::new(1.0, 2.0, 3.0)
    );
}

#[test]
fn test_viewport_transform_bounds() {
    assert_eq!(viewport_transform(Vec3::ZERO, 4, 4), Some((2, 2, 0.5)));
    assert_eq!(viewport_transform(Vec3::new(-1.0, -1.0, -1.0), 4, 4), Some((0, 0, 0.0)));
    assert_eq!(viewport_transform(Vec3::new(-0.1, 0.9, 0.0), 4, 4), Some((1, 3, 0.5)));
    assert_eq!(viewport_transform(Vec3::new(1.0, 0.0, 0.0), 4, 4), None);
    assert_eq!(viewport_transform(Vec3::new(0.0, -1.5, 0.0), 4, 4), None);
    // odd extents use the integer half
    assert_eq!(viewport_transform(Vec3::new(0.99, 0.0, 0.0), 5, 1), Some((3, 0, 0.5)));
}

#[test]
fn test_fates_are_counted() {
    let points = [
        Point::new(Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 1.0, 1.0)),
        Point::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.5, 1.0, 1.0)),
        Point::new(Vec3::new(0.0, 0.0, 0.9), Vec3::new(0.5, 1.0, 1.0)),
        Point::new(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO),
    ];
    let (mut framebuffer, mut depth) = buffers(4, 4);
    let stats = Rasterizer::new(ExecutionMode::Sequential)
        .rasterize(&points, &Mat4::IDENTITY, &mut framebuffer, &mut depth)
        .unwrap();

    assert_eq!(
        stats,
        RasterStats { submitted: 4, clipped: 1, out_of_buffer: 0, occluded: 1, written: 2 }
    );
    assert_eq!(depth.depth(2, 2), Some(0.5));
    // hue 0.5 is cyan
    assert_eq!(unpack_rgba(framebuffer.pixel(2, 2).unwrap()), [0, 0xFF, 0xFF, 0xFF]);
    assert_eq!(depth.written(), 1);
    assert_eq!(
        framebuffer.to_vec().iter().filter(|&&p| p == CLEAR).count(),
        15
    );
}

#[test]
fn test_nearest_wins_regardless_of_order() {
    let mut points = crowded_points(7, 2000);
    let (reference, reference_depth, _) = render(&points, ExecutionMode::Sequential);

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..10 {
        points.shuffle(&mut rng);
        let (image, depth, _) = render(&points, ExecutionMode::Sequential);
        assert_eq!(image, reference);
        assert_eq!(depth, reference_depth);
    }
}

#[test]
fn test_stored_depth_is_minimum_per_pixel() {
    let points = crowded_points(3, 500);
    let (_, depth, _) = render(&points, ExecutionMode::Parallel);

    let mut expected = vec![None::<f32>; 64];
    for point in &points {
        let clip = point.position.extend(1.0);
        if !inside_clip_volume(clip) {
            continue;
        }
        if let Some((x, y, z)) = viewport_transform(perspective_divide(clip), 8, 8) {
            let slot = &mut expected[(y * 8 + x) as usize];
            *slot = Some(slot.map_or(z, |current| current.min(z)));
        }
    }
    assert_eq!(depth, expected);
}

#[test]
fn test_parallel_matches_sequential() {
    for seed in 0..5 {
        let points = crowded_points(seed, 5000);
        let (sequential, sequential_depth, sequential_stats) =
            render(&points, ExecutionMode::Sequential);
        for _ in 0..3 {
            let (parallel, parallel_depth, parallel_stats) =
                render(&points, ExecutionMode::Parallel);
            assert_eq!(parallel, sequential, "seed {}", seed);
            assert_eq!(parallel_depth, sequential_depth);
            assert_eq!(parallel_stats.submitted, sequential_stats.submitted);
            assert_eq!(parallel_stats.clipped, sequential_stats.clipped);
            assert_eq!(parallel_stats.out_of_buffer, sequential_stats.out_of_buffer);
            assert_eq!(
                parallel_stats.written + parallel_stats.occluded,
                sequential_stats.written + sequential_stats.occluded
            );
        }
    }
}

#[test]
fn test_custom_stages() {
    let flat_white = |_: Vec3| Vec3::ONE;
    let shift_right = |point: &Point, mvp: &Mat4| VertexOut {
        position: *mvp * (point.position + Vec3::new(0.5, 0.0, 0.0)).extend(1.0),
        color: point.color,
    };
    let rasterizer = Rasterizer::with_stages(shift_right, flat_white, ExecutionMode::Sequential);

    let (mut framebuffer, mut depth) = buffers(4, 4);
    let points = [Point::new(Vec3::ZERO, Vec3::new(0.3, 1.0, 1.0))];
    rasterizer
        .rasterize(&points, &Mat4::IDENTITY, &mut framebuffer, &mut depth)
        .unwrap();
    assert_eq!(framebuffer.pixel(3, 2), Some(0xFFFFFFFF));
    assert_eq!(framebuffer.pixel(2, 2), Some(CLEAR));
}

#[test]
fn test_mismatched_buffers_are_rejected() {
    let mut framebuffer = Framebuffer::new(Viewport::new(4, 4));
    let mut depth = DepthBuffer::new(Viewport::new(4, 2));
    let result = Rasterizer::new(ExecutionMode::Parallel).rasterize(
        &[],
        &Mat4::IDENTITY,
        &mut framebuffer,
        &mut depth,
    );
    assert_eq!(result.unwrap_err(), PipelineError::InvalidDimensions(4, 2));
}
