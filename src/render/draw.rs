use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_antialiased_line_segment_mut, draw_filled_circle_mut, draw_hollow_circle_mut,
};
use imageproc::pixelops::interpolate;

use crate::foundation::core::{Point, Vec2};

/// Opaque RGB color.
pub type Rgb = [u8; 3];

/// Subject skeleton color.
pub const SUBJECT_COLOR: Rgb = [0, 0, 255];
/// Reference skeleton color.
pub const REFERENCE_COLOR: Rgb = [0, 255, 0];
/// Bone stroke width in pixels.
pub const BONE_THICKNESS: u32 = 2;

fn rgba(color: Rgb) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], 255])
}

fn to_pixel(p: Point) -> (i32, i32) {
    // Truncate toward zero, like integer pixel casts elsewhere in the pipeline.
    (p.x as i32, p.y as i32)
}

/// Segments far outside the canvas are skipped; line rasterization cost grows with length.
fn drawable(canvas: &RgbaImage, a: Point, b: Point) -> bool {
    let limit = 4.0 * f64::from(canvas.width() + canvas.height());
    [a.x, a.y, b.x, b.y]
        .iter()
        .all(|v| v.is_finite() && v.abs() <= limit)
}

/// Anti-aliased line of `thickness` pixels between `a` and `b`.
pub fn thick_line(canvas: &mut RgbaImage, a: Point, b: Point, color: Rgb, thickness: u32) {
    if !drawable(canvas, a, b) {
        return;
    }
    let color = rgba(color);
    let dir = b - a;
    let len = dir.hypot();
    let normal = if len > 0.0 {
        Vec2::new(-dir.y / len, dir.x / len)
    } else {
        Vec2::ZERO
    };

    let t = thickness.max(1);
    let center = f64::from(t - 1) / 2.0;
    for k in 0..t {
        let offset = normal * (f64::from(k) - center);
        draw_antialiased_line_segment_mut(
            canvas,
            to_pixel(a + offset),
            to_pixel(b + offset),
            color,
            interpolate,
        );
    }
}

/// Filled dot with a surrounding ring, used to mark joint vertices.
pub fn joint_marker(canvas: &mut RgbaImage, p: Point, color: Rgb) {
    if !drawable(canvas, p, p) {
        return;
    }
    let c = to_pixel(p);
    let color = rgba(color);
    draw_filled_circle_mut(canvas, c, 10, color);
    draw_hollow_circle_mut(canvas, c, 15, color);
    draw_hollow_circle_mut(canvas, c, 14, color);
}

/// Draw every `(from, to)` connection of a skeleton.
///
/// `position` resolves a landmark index to its drawn position; connections with an unresolved
/// endpoint are skipped. Returns the number of bones drawn.
pub fn draw_bones<F>(
    canvas: &mut RgbaImage,
    connections: &[(usize, usize)],
    position: F,
    color: Rgb,
) -> usize
where
    F: Fn(usize) -> Option<Point>,
{
    let mut drawn = 0;
    for &(from, to) in connections {
        let (Some(a), Some(b)) = (position(from), position(to)) else {
            continue;
        };
        thick_line(canvas, a, b, color, BONE_THICKNESS);
        drawn += 1;
    }
    drawn
}

#[cfg(test)]
#[path = "../../tests/unit/render/draw.rs"]
mod tests;
