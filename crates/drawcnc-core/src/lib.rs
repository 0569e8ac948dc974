//! Core geometry for rectifying a photographed board.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete edge detector, camera backend or image codec:
//! - line intersection of two-point segments,
//! - canonical ordering of four board corners,
//! - closed-curve simplification (Ramer–Douglas–Peucker),
//! - 4-point homography and a channel-generic perspective warp.

mod corners;
mod homography;
mod image;
mod lines;
mod logger;
mod polygon;

pub use corners::{centroid, order_quad, sort_corners, CornerOrderError};
pub use homography::{homography_from_4pt, warp_perspective, Homography};
pub use image::{sample_bilinear, sample_bilinear_u8, Image, ImageView};
pub use lines::{
    intersection_or_sentinel, line_intersection, pairwise_intersections, LineSegment,
    NO_INTERSECTION,
};
pub use polygon::{approximate_polygon_dp, arc_length};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
