use image::{Rgb, RgbImage};

pub const BACKGROUND: u8 = 30;
pub const BOARD: u8 = 220;

// Length of [a, a+1) covered by [lo, hi).
fn overlap(a: f32, lo: f32, hi: f32) -> f32 {
    ((a + 1.0).min(hi) - a.max(lo)).clamp(0.0, 1.0)
}

/// Bright axis-aligned board on a dark background, area anti-aliased.
///
/// Put the bounds on half pixels (e.g. `59.5`) so every border pixel is
/// exactly half covered and the edge map stays one pixel wide.
pub fn board_frame(width: u32, height: u32, x0: f32, y0: f32, x1: f32, y1: f32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let cov = overlap(x as f32, x0, x1) * overlap(y as f32, y0, y1);
        let v = BACKGROUND as f32 + cov * (BOARD - BACKGROUND) as f32;
        let v = v.round() as u8;
        Rgb([v, v, v])
    })
}

/// Default 320x240 test frame: board spans (60, 40) to (260, 200).
pub fn default_board() -> RgbImage {
    board_frame(320, 240, 59.5, 39.5, 259.5, 199.5)
}

/// Convex quad (clockwise in image coordinates) filled with `BOARD`,
/// 4x4 supersampled.
pub fn quad_frame(width: u32, height: u32, quad: [(f32, f32); 4]) -> RgbImage {
    let inside = |px: f32, py: f32| {
        (0..4).all(|i| {
            let (ax, ay) = quad[i];
            let (bx, by) = quad[(i + 1) % 4];
            (bx - ax) * (py - ay) - (by - ay) * (px - ax) >= 0.0
        })
    };
    RgbImage::from_fn(width, height, |x, y| {
        let mut hits = 0u32;
        for sy in 0..4 {
            for sx in 0..4 {
                let px = x as f32 + (sx as f32 + 0.5) / 4.0;
                let py = y as f32 + (sy as f32 + 0.5) / 4.0;
                if inside(px, py) {
                    hits += 1;
                }
            }
        }
        let cov = hits as f32 / 16.0;
        let v = (BACKGROUND as f32 + cov * (BOARD - BACKGROUND) as f32).round() as u8;
        Rgb([v, v, v])
    })
}
