//! Board quad location and perspective correction.
//!
//! 1. Edge map (grayscale, box blur, Canny) and Hough line segments.
//! 2. Every pair of segments is intersected; off-image (negative) points are
//!    dropped.
//! 3. The intersection cloud, taken in pair order as a closed curve, is
//!    simplified with a tolerance of `approx_epsilon_frac` times its length.
//!    Anything but four vertices means no clean board outline was seen.
//! 4. The four vertices are ordered TL, TR, BR, BL against a centroid and
//!    mapped onto the full frame rectangle.

use drawcnc_core::{
    approximate_polygon_dp, arc_length, centroid, homography_from_4pt, order_quad,
    pairwise_intersections, warp_perspective, CornerOrderError, Homography, ImageView,
    LineSegment,
};
use image::RgbImage;
use log::{debug, info};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::vision::{detect_segments, edge_map, HoughParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Which point set the top/bottom split centroid is computed from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentroidSource {
    /// Mean of every raw intersection, before simplification.
    #[default]
    Intersections,
    /// Mean of the four simplified corners.
    Quad,
}

/// Perspective corrector settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectorParams {
    /// Box blur radius applied before Canny (1 gives a 3x3 kernel).
    pub blur_radius: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub hough: HoughParams,
    /// Simplification tolerance as a fraction of the cloud's closed length.
    pub approx_epsilon_frac: f64,
    pub centroid: CentroidSource,
}

/// Rejected corrector settings.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("canny thresholds must be finite, non-negative and low <= high (got {low} / {high})")]
    CannyThresholds { low: f32, high: f32 },
    #[error("approx_epsilon_frac must be finite and non-negative (got {0})")]
    EpsilonFrac(f64),
    #[error("hough.{name} must be finite and non-negative (got {value})")]
    Hough { name: &'static str, value: f32 },
    #[error("hough.vote_threshold must be at least 1")]
    VoteThreshold,
}

impl CorrectorParams {
    /// Check the settings that would otherwise make edge detection panic or
    /// the simplification tolerance meaningless.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let (low, high) = (self.canny_low, self.canny_high);
        if !(low.is_finite() && high.is_finite() && low >= 0.0 && low <= high) {
            return Err(ParamsError::CannyThresholds { low, high });
        }
        let frac = self.approx_epsilon_frac;
        if !(frac.is_finite() && frac >= 0.0) {
            return Err(ParamsError::EpsilonFrac(frac));
        }
        for (name, value) in [
            ("min_line_length", self.hough.min_line_length),
            ("max_line_gap", self.hough.max_line_gap),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ParamsError::Hough { name, value });
            }
        }
        if self.hough.vote_threshold == 0 {
            return Err(ParamsError::VoteThreshold);
        }
        Ok(())
    }
}

impl Default for CorrectorParams {
    fn default() -> Self {
        Self {
            blur_radius: 1,
            canny_low: 100.0,
            canny_high: 100.0,
            hough: HoughParams::default(),
            approx_epsilon_frac: 0.02,
            centroid: CentroidSource::Intersections,
        }
    }
}

/// Errors returned by the perspective corrector.
#[derive(thiserror::Error, Debug)]
pub enum CorrectError {
    #[error("board quadrilateral not found (simplified outline has {vertices} vertices)")]
    QuadNotFound { vertices: usize },
    #[error(transparent)]
    CornerOrder(#[from] CornerOrderError),
    #[error("perspective transform could not be estimated from the board corners")]
    Homography,
    #[error("invalid frame ({width}x{height})")]
    InvalidFrame { width: u32, height: u32 },
    #[error(transparent)]
    InvalidParams(#[from] ParamsError),
}

impl CorrectError {
    /// Numeric code reported to the user, one per failure kind.
    pub fn code(&self) -> i32 {
        match self {
            Self::QuadNotFound { .. } => -1,
            Self::CornerOrder(_) => -2,
            Self::Homography => -3,
            Self::InvalidFrame { .. } => -4,
            Self::InvalidParams(_) => -5,
        }
    }
}

/// Board outline located in the source frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardQuad {
    /// Top-left, top-right, bottom-right, bottom-left.
    pub corners: [Point2<f32>; 4],
    /// Point used to split top from bottom corners.
    pub centroid: Point2<f32>,
    pub num_intersections: usize,
}

/// Output of [`correct_perspective`].
#[derive(Clone, Debug)]
pub struct CorrectedFrame {
    pub image: RgbImage,
    pub quad: BoardQuad,
    /// Maps output pixels back into the source frame.
    pub h_img_from_rect: Homography,
    pub num_segments: usize,
}

/// Find the board quadrilateral from detected line segments.
pub fn locate_quad(
    segments: &[LineSegment],
    params: &CorrectorParams,
) -> Result<BoardQuad, CorrectError> {
    let cloud = pairwise_intersections(segments);
    let epsilon = arc_length(&cloud, true) * params.approx_epsilon_frac;
    let approx = approximate_polygon_dp(&cloud, epsilon, true);
    debug!(
        "{} segments -> {} intersections -> {} vertices (eps {:.2})",
        segments.len(),
        cloud.len(),
        approx.len(),
        epsilon
    );

    if approx.len() != 4 {
        return Err(CorrectError::QuadNotFound {
            vertices: approx.len(),
        });
    }

    let center = match params.centroid {
        CentroidSource::Intersections => centroid(&cloud),
        CentroidSource::Quad => centroid(&approx),
    }
    .ok_or(CorrectError::QuadNotFound { vertices: 0 })?;

    let corners = order_quad(&approx, center)?;
    Ok(BoardQuad {
        corners,
        centroid: center,
        num_intersections: cloud.len(),
    })
}

/// Warp `frame` so that `quad` fills the whole `width x height` output.
pub fn rectify(frame: &RgbImage, quad: &BoardQuad) -> Result<(RgbImage, Homography), CorrectError> {
    let (w, h) = frame.dimensions();
    let rect = [
        Point2::new(0.0, 0.0),
        Point2::new(w as f32, 0.0),
        Point2::new(w as f32, h as f32),
        Point2::new(0.0, h as f32),
    ];
    let h_img_from_rect =
        homography_from_4pt(&rect, &quad.corners).ok_or(CorrectError::Homography)?;

    let src = ImageView {
        width: w as usize,
        height: h as usize,
        channels: 3,
        data: frame.as_raw(),
    };
    let warped = warp_perspective(&src, h_img_from_rect, w as usize, h as usize);
    let image = RgbImage::from_raw(w, h, warped.data).ok_or(CorrectError::InvalidFrame {
        width: w,
        height: h,
    })?;
    Ok((image, h_img_from_rect))
}

/// Locate the board in `frame` and warp it to a fronto-parallel view of the
/// same size. Fails without retry when no clean quadrilateral is found.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(frame, params), fields(width = frame.width(), height = frame.height()))
)]
pub fn correct_perspective(
    frame: &RgbImage,
    params: &CorrectorParams,
) -> Result<CorrectedFrame, CorrectError> {
    params.validate()?;
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(CorrectError::InvalidFrame { width, height });
    }

    let edges = edge_map(frame, params.blur_radius, params.canny_low, params.canny_high);
    let segments = detect_segments(&edges, &params.hough);
    let quad = locate_quad(&segments, params)?;
    info!(
        "board corners: TL ({:.1}, {:.1}) TR ({:.1}, {:.1}) BR ({:.1}, {:.1}) BL ({:.1}, {:.1})",
        quad.corners[0].x,
        quad.corners[0].y,
        quad.corners[1].x,
        quad.corners[1].y,
        quad.corners[2].x,
        quad.corners[2].y,
        quad.corners[3].x,
        quad.corners[3].y
    );

    let (image, h_img_from_rect) = rectify(frame, &quad)?;
    Ok(CorrectedFrame {
        image,
        quad,
        h_img_from_rect,
        num_segments: segments.len(),
    })
}
