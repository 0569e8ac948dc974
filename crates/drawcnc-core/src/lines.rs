//! Line segments in two-point form and their intersections.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Returned by [`intersection_or_sentinel`] for parallel or coincident lines.
///
/// Valid image coordinates are non-negative, so callers can drop it with the
/// same `x >= 0 && y >= 0` filter they use for off-image intersections.
pub const NO_INTERSECTION: Point2<f32> = Point2::new(-1.0, -1.0);

/// A detected edge segment with integer pixel endpoints `(x1, y1)`-`(x2, y2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LineSegment {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub const fn from_array(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub const fn to_array(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Euclidean length in pixels.
    pub fn length(&self) -> f32 {
        let dx = (self.x2 - self.x1) as f32;
        let dy = (self.y2 - self.y1) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Intersect the infinite lines through `a` and `b`.
///
/// Returns `None` when the determinant vanishes (parallel or coincident
/// lines). The point may lie outside both segments and outside the image.
pub fn line_intersection(a: &LineSegment, b: &LineSegment) -> Option<Point2<f32>> {
    let (x1, y1, x2, y2) = (a.x1 as f64, a.y1 as f64, a.x2 as f64, a.y2 as f64);
    let (x3, y3, x4, y4) = (b.x1 as f64, b.y1 as f64, b.x2 as f64, b.y2 as f64);

    let d = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if d == 0.0 {
        return None;
    }

    let ab = x1 * y2 - y1 * x2;
    let cd = x3 * y4 - y3 * x4;
    let x = (ab * (x3 - x4) - (x1 - x2) * cd) / d;
    let y = (ab * (y3 - y4) - (y1 - y2) * cd) / d;

    Some(Point2::new(x as f32, y as f32))
}

/// Same as [`line_intersection`] but reports "no intersection" as [`NO_INTERSECTION`].
pub fn intersection_or_sentinel(a: &LineSegment, b: &LineSegment) -> Point2<f32> {
    line_intersection(a, b).unwrap_or(NO_INTERSECTION)
}

/// Intersect every unordered pair of segments and keep the points with
/// non-negative coordinates.
///
/// Quadratic in `segments.len()`; no early termination. Output order follows
/// the `(i, j)` pair order with `i < j`.
pub fn pairwise_intersections(segments: &[LineSegment]) -> Vec<Point2<f32>> {
    let mut out = Vec::new();
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            let p = intersection_or_sentinel(a, b);
            if p.x >= 0.0 && p.y >= 0.0 {
                out.push(p);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // Signed area of the triangle (p1, p2, q); zero when q lies on line p1-p2.
    fn cross(s: &LineSegment, q: Point2<f32>) -> f64 {
        let (x1, y1) = (s.x1 as f64, s.y1 as f64);
        let (x2, y2) = (s.x2 as f64, s.y2 as f64);
        (x2 - x1) * (q.y as f64 - y1) - (y2 - y1) * (q.x as f64 - x1)
    }

    #[test]
    fn vertical_and_horizontal_meet() {
        let a = LineSegment::new(0, 0, 0, 10);
        let b = LineSegment::new(0, 5, 10, 5);
        let p = line_intersection(&a, &b).expect("not parallel");
        assert_abs_diff_eq!(p.x, 0.0);
        assert_abs_diff_eq!(p.y, 5.0);
    }

    #[test]
    fn parallel_lines_yield_sentinel() {
        let a = LineSegment::new(0, 0, 10, 0);
        let b = LineSegment::new(0, 1, 10, 1);
        assert!(line_intersection(&a, &b).is_none());
        assert_eq!(intersection_or_sentinel(&a, &b), Point2::new(-1.0, -1.0));

        // same direction vector, different offsets and lengths
        let c = LineSegment::new(3, 4, 9, 12);
        let d = LineSegment::new(100, 7, 103, 11);
        assert_eq!(intersection_or_sentinel(&c, &d), NO_INTERSECTION);
    }

    #[test]
    fn coincident_lines_yield_sentinel() {
        let a = LineSegment::new(0, 0, 10, 10);
        let b = LineSegment::new(20, 20, 30, 30);
        assert_eq!(intersection_or_sentinel(&a, &b), NO_INTERSECTION);
    }

    #[test]
    fn intersection_lies_on_both_lines() {
        let cases = [
            (LineSegment::new(12, 40, 630, 55), LineSegment::new(30, 2, 41, 470)),
            (LineSegment::new(0, 0, 7, 3), LineSegment::new(5, 9, 6, -4)),
            (LineSegment::new(600, 20, 590, 470), LineSegment::new(10, 460, 620, 430)),
            (LineSegment::new(1, 1, 2, 2), LineSegment::new(100, 0, 0, 100)),
        ];
        for (a, b) in cases {
            let p = line_intersection(&a, &b).expect("not parallel");
            let tol_a = 1e-3 * a.length() as f64 * (1.0 + p.coords.norm() as f64);
            let tol_b = 1e-3 * b.length() as f64 * (1.0 + p.coords.norm() as f64);
            assert!(cross(&a, p).abs() < tol_a, "{p:?} off line {a:?}");
            assert!(cross(&b, p).abs() < tol_b, "{p:?} off line {b:?}");
        }
    }

    #[test]
    fn intersection_outside_segment_extent_is_reported() {
        // segments do not overlap, their lines cross at (20, 20)
        let a = LineSegment::new(0, 0, 5, 5);
        let b = LineSegment::new(40, 0, 35, 5);
        let p = line_intersection(&a, &b).expect("not parallel");
        assert_abs_diff_eq!(p.x, 20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(p.y, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn large_coordinates_do_not_overflow() {
        let a = LineSegment::new(0, 0, 60_000, 60_000);
        let b = LineSegment::new(0, 60_000, 60_000, 0);
        let p = line_intersection(&a, &b).expect("not parallel");
        assert_abs_diff_eq!(p.x, 30_000.0, epsilon = 1e-2);
        assert_abs_diff_eq!(p.y, 30_000.0, epsilon = 1e-2);
    }

    #[test]
    fn pairwise_drops_negative_and_parallel() {
        let segs = [
            LineSegment::new(10, 0, 10, 100),  // x = 10
            LineSegment::new(90, 0, 90, 100),  // x = 90, parallel to the first
            LineSegment::new(0, 20, 100, 20),  // y = 20
            LineSegment::new(0, -5, 100, -5),  // y = -5, crosses at negative y
        ];
        let pts = pairwise_intersections(&segs);
        assert_eq!(
            pts,
            vec![Point2::new(10.0, 20.0), Point2::new(90.0, 20.0)]
        );
    }

    #[test]
    fn pairwise_of_fewer_than_two_is_empty() {
        assert!(pairwise_intersections(&[]).is_empty());
        assert!(pairwise_intersections(&[LineSegment::new(0, 0, 1, 1)]).is_empty());
    }
}
