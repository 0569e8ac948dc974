//! Edge map and line segment extraction.
//!
//! Grayscale conversion, box blur and Canny come straight from `image` /
//! `imageproc`. Lines are found with a standard polar Hough transform
//! ([`hough_lines`]); [`detect_segments`] then walks each infinite line over
//! the edge map and cuts it into finite segments, linking edge pixels across
//! short gaps.

use drawcnc_core::LineSegment;
use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::box_filter;
use imageproc::hough::PolarLine;
use imageproc::suppress::suppress_non_maximum;
use log::trace;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Hough segment detection settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// Minimum accumulator votes for a line (1 px / 1 degree bins).
    pub vote_threshold: u32,
    /// Non-maximum suppression radius in accumulator bins.
    pub suppression_radius: u32,
    /// Shorter segments are dropped.
    pub min_line_length: f32,
    /// Largest run of missing edge pixels bridged inside one segment.
    pub max_line_gap: f32,
    /// Edge pixels up to this many pixels off the quantized line still count.
    pub edge_tolerance: u32,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            vote_threshold: 70,
            suppression_radius: 8,
            min_line_length: 30.0,
            max_line_gap: 10.0,
            edge_tolerance: 1,
        }
    }
}

/// Grayscale, `(2r+1)x(2r+1)` box blur, Canny.
pub fn edge_map(frame: &RgbImage, blur_radius: u32, canny_low: f32, canny_high: f32) -> GrayImage {
    let gray = image::imageops::grayscale(frame);
    let blurred = if blur_radius > 0 {
        box_filter(&gray, blur_radius, blur_radius)
    } else {
        gray
    };
    canny(&blurred, canny_low, canny_high)
}

struct Run {
    start: (i32, i32),
    end: (i32, i32),
    last_t: i32,
}

impl Run {
    fn segment(&self) -> LineSegment {
        LineSegment::new(self.start.0, self.start.1, self.end.0, self.end.1)
    }
}

// First edge pixel at `(x, y)` or up to `tol` pixels along the normal `(c, s)`.
fn edge_hit(edges: &GrayImage, x: f32, y: f32, c: f32, s: f32, tol: i32) -> Option<(i32, i32)> {
    let (w, h) = (edges.width() as i32, edges.height() as i32);
    std::iter::once(0)
        .chain((1..=tol).flat_map(|k| [-k, k]))
        .find_map(|k| {
            let xi = (x + k as f32 * c).round() as i32;
            let yi = (y + k as f32 * s).round() as i32;
            let inside = xi >= 0 && yi >= 0 && xi < w && yi < h;
            (inside && edges.get_pixel(xi as u32, yi as u32)[0] > 0).then_some((xi, yi))
        })
}

/// Cut one polar line `x cos(a) + y sin(a) = r` into segments of edge pixels.
pub fn trace_polar_line(edges: &GrayImage, line: &PolarLine, params: &HoughParams) -> Vec<LineSegment> {
    let (s, c) = (line.angle_in_degrees as f32).to_radians().sin_cos();
    let (x0, y0) = (line.r * c, line.r * s);
    let reach = (edges.width() as f32).hypot(edges.height() as f32).ceil() as i32;
    let tol = params.edge_tolerance as i32;

    let mut out = Vec::new();
    let close = |run: &Run, out: &mut Vec<LineSegment>| {
        let seg = run.segment();
        if seg.length() >= params.min_line_length {
            out.push(seg);
        }
    };

    let mut current: Option<Run> = None;
    for t in -reach..=reach {
        let (px, py) = (x0 - t as f32 * s, y0 + t as f32 * c);
        let Some(hit) = edge_hit(edges, px, py, c, s, tol) else {
            continue;
        };
        match current.as_mut() {
            Some(run) if (t - run.last_t - 1) as f32 <= params.max_line_gap => {
                run.end = hit;
                run.last_t = t;
            }
            _ => {
                if let Some(run) = current.take() {
                    close(&run, &mut out);
                }
                current = Some(Run {
                    start: hit,
                    end: hit,
                    last_t: t,
                });
            }
        }
    }
    if let Some(run) = current {
        close(&run, &mut out);
    }
    out
}

/// Polar lines `x cos(a) + y sin(a) = r` with at least `vote_threshold`
/// edge pixels, 1 px / 1 degree bins, `a` in `0..180`.
///
/// Each vote goes to the nearest `r` bin, so a one pixel wide axis-aligned
/// edge puts all its votes into a single bin. Peaks are thinned with
/// non-maximum suppression over `suppression_radius` bins.
pub fn hough_lines(edges: &GrayImage, params: &HoughParams) -> Vec<PolarLine> {
    let (w, h) = edges.dimensions();
    let rmax = (w as f32).hypot(h as f32).ceil() as i32;
    let trig: Vec<(f32, f32)> = (0..180u32)
        .map(|deg| (deg as f32).to_radians().sin_cos())
        .collect();

    let mut acc: ImageBuffer<Luma<u32>, Vec<u32>> = ImageBuffer::new(180, 2 * rmax as u32 + 1);
    for (x, y, p) in edges.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        for (deg, &(s, c)) in trig.iter().enumerate() {
            let r = (x as f32 * c + y as f32 * s).round() as i32;
            acc.get_pixel_mut(deg as u32, (r + rmax) as u32)[0] += 1;
        }
    }

    let peaks = suppress_non_maximum(&acc, params.suppression_radius);
    peaks
        .enumerate_pixels()
        .filter(|(_, _, votes)| votes[0] >= params.vote_threshold.max(1))
        .map(|(deg, bin, _)| PolarLine {
            r: (bin as i32 - rmax) as f32,
            angle_in_degrees: deg,
        })
        .collect()
}

/// Probabilistic-Hough style segments: strong polar lines, each cut into
/// finite runs of edge pixels.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(edges, params), fields(width = edges.width(), height = edges.height()))
)]
pub fn detect_segments(edges: &GrayImage, params: &HoughParams) -> Vec<LineSegment> {
    let lines = hough_lines(edges, params);
    trace!("hough: {} polar lines", lines.len());

    lines
        .iter()
        .flat_map(|line| trace_polar_line(edges, line, params))
        .collect()
}
