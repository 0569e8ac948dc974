//! Canonical ordering of board corners.
//!
//! Corners are ordered top-left, top-right, bottom-right, bottom-left. The
//! top/bottom split is taken against a reference centroid supplied by the
//! caller, left/right is decided by `x` within each half.

use nalgebra::Point2;

/// Errors returned by the corner orderer.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerOrderError {
    #[error("invalid corner topology: {top} point(s) above the centroid, {bottom} at or below (need 2/2)")]
    InvalidTopology { top: usize, bottom: usize },
}

/// Arithmetic mean of `points`, `None` for an empty set.
pub fn centroid(points: &[Point2<f32>]) -> Option<Point2<f32>> {
    if points.is_empty() {
        return None;
    }
    let mut sx = 0.0_f64;
    let mut sy = 0.0_f64;
    for p in points {
        sx += p.x as f64;
        sy += p.y as f64;
    }
    let n = points.len() as f64;
    Some(Point2::new((sx / n) as f32, (sy / n) as f32))
}

fn left_right(a: Point2<f32>, b: Point2<f32>) -> (Point2<f32>, Point2<f32>) {
    if b.x < a.x {
        (b, a)
    } else {
        (a, b)
    }
}

/// Reorder `corners` in place into top-left, top-right, bottom-right, bottom-left.
///
/// A point is "top" when `y < center.y`, otherwise "bottom". Exactly two
/// points must fall on each side; any other split (including a slice that
/// does not hold four points) is reported and leaves `corners` untouched.
pub fn sort_corners(
    corners: &mut [Point2<f32>],
    center: Point2<f32>,
) -> Result<(), CornerOrderError> {
    let mut top = Vec::with_capacity(2);
    let mut bottom = Vec::with_capacity(2);
    for &p in corners.iter() {
        if p.y < center.y {
            top.push(p);
        } else {
            bottom.push(p);
        }
    }

    if top.len() != 2 || bottom.len() != 2 {
        return Err(CornerOrderError::InvalidTopology {
            top: top.len(),
            bottom: bottom.len(),
        });
    }

    let (tl, tr) = left_right(top[0], top[1]);
    let (bl, br) = left_right(bottom[0], bottom[1]);
    corners.copy_from_slice(&[tl, tr, br, bl]);
    Ok(())
}

/// Order four corners and return them as a fixed-size quad.
pub fn order_quad(
    corners: &[Point2<f32>],
    center: Point2<f32>,
) -> Result<[Point2<f32>; 4], CornerOrderError> {
    let mut quad: [Point2<f32>; 4] = corners.try_into().map_err(|_| {
        let top = corners.iter().filter(|p| p.y < center.y).count();
        CornerOrderError::InvalidTopology {
            top,
            bottom: corners.len() - top,
        }
    })?;
    sort_corners(&mut quad, center)?;
    Ok(quad)
}
