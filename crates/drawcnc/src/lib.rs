//! Take a perspective-corrected picture of a board for CNC tracing.
//!
//! The pipeline grabs one frame from a [`camera::FrameSource`], finds the
//! quadrilateral outline of the board (or of a sheet of paper under it),
//! warps the frame so the board fills an axis-aligned rectangle, runs the
//! trace filter stage and encodes the result.
//!
//! ## Quickstart
//!
//! ```no_run
//! use drawcnc::camera::{Camera, FrameSource};
//! use drawcnc::correct::{correct_perspective, CorrectorParams};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut camera = Camera::open(Some(Path::new("board.jpg")))?;
//! let frame = camera.capture()?;
//! let corrected = correct_perspective(&frame, &CorrectorParams::default())?;
//! println!("board corners: {:?}", corrected.quad.corners);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `drawcnc::core`: geometry (line intersection, corner ordering,
//!   polygon simplification, homography, warp).
//! - [`vision`]: edge map and Hough line segments.
//! - [`correct`]: board quad location and perspective correction.
//! - [`filter`]: trace filter stage.
//! - [`camera`], [`output`]: frame source and image writer.
//! - [`config`], [`pipeline`]: JSON configuration and the end-to-end run.

pub use drawcnc_core as core;

pub mod camera;
pub mod config;
pub mod correct;
pub mod filter;
pub mod output;
pub mod pipeline;
pub mod vision;

pub use config::PipelineConfig;
pub use pipeline::{process_frame, run, PipelineError, PipelineReport, ProcessedFrame};
