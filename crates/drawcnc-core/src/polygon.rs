//! Polyline length and Ramer–Douglas–Peucker simplification.

use nalgebra::Point2;

/// Total length of the polyline through `points`; `closed` adds the
/// segment from the last point back to the first.
pub fn arc_length(points: &[Point2<f32>], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut len = 0.0_f64;
    for w in points.windows(2) {
        len += (w[1] - w[0]).norm() as f64;
    }
    if closed {
        len += (points[0] - points[points.len() - 1]).norm() as f64;
    }
    len
}

// Distance from `p` to the infinite line through `a` and `b`.
fn line_distance(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f64 {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let dx = b.x as f64 - ax;
    let dy = b.y as f64 - ay;
    let px = p.x as f64 - ax;
    let py = p.y as f64 - ay;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        return (px * px + py * py).sqrt();
    }
    (dx * py - dy * px).abs() / len
}

// Open-chain RDP; returns the kept points, both endpoints included.
fn simplify_chain(chain: &[Point2<f32>], epsilon: f64) -> Vec<Point2<f32>> {
    let n = chain.len();
    if n < 3 {
        return chain.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut best = start;
        let mut best_d = -1.0_f64;
        for (i, &p) in chain.iter().enumerate().take(end).skip(start + 1) {
            let d = line_distance(p, chain[start], chain[end]);
            if d > best_d {
                best_d = d;
                best = i;
            }
        }
        if best_d > epsilon {
            keep[best] = true;
            stack.push((start, best));
            stack.push((best, end));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Approximate a polyline with fewer vertices so that no dropped point is
/// farther than `epsilon` from the simplified curve.
///
/// Points are taken in the given order. For a closed curve the split point
/// is the vertex farthest from the first one, and both halves are simplified
/// independently; the first vertex always survives.
pub fn approximate_polygon_dp(
    points: &[Point2<f32>],
    epsilon: f64,
    closed: bool,
) -> Vec<Point2<f32>> {
    if points.len() < 3 {
        return points.to_vec();
    }
    if !closed {
        return simplify_chain(points, epsilon);
    }

    let first = points[0];
    let mut far = 0usize;
    let mut far_d = 0.0_f32;
    for (i, p) in points.iter().enumerate() {
        let d = (p - first).norm();
        if d > far_d {
            far_d = d;
            far = i;
        }
    }
    if far == 0 {
        // every point coincides with the first one
        return vec![first];
    }

    let head = simplify_chain(&points[..=far], epsilon);
    let tail: Vec<Point2<f32>> = points[far..].iter().copied().chain([first]).collect();
    let tail = simplify_chain(&tail, epsilon);

    let mut out = head;
    if tail.len() > 2 {
        out.extend_from_slice(&tail[1..tail.len() - 1]);
    }
    out
}
