//! End-to-end capture run: frame source, perspective correction, filter,
//! encoding.

use image::RgbImage;
use log::info;
use serde::{Deserialize, Serialize};

use crate::camera::{CaptureError, FrameSource};
use crate::config::{ConfigError, PipelineConfig};
use crate::correct::{correct_perspective, BoardQuad, CorrectError};
use crate::filter::{filter_frame, FilterError};
use crate::output::{encode, write_to, OutputError, OutputFormat, OutputTarget};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("unable to fix perspective: error {code}: {0}", code = .0.code())]
    Correct(#[from] CorrectError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Capture(CaptureError::NoCamera) => -1,
            Self::Capture(CaptureError::EmptyFrame | CaptureError::Decode(_)) => -2,
            Self::Correct(CorrectError::InvalidParams(_)) => -5,
            Self::Correct(_) => -3,
            Self::Filter(_) => -4,
            Self::Output(_) | Self::Config(_) => -5,
        }
    }
}

/// A corrected and filtered frame, ready to encode.
#[derive(Clone, Debug)]
pub struct ProcessedFrame {
    pub image: RgbImage,
    pub quad: BoardQuad,
    pub num_segments: usize,
}

/// Summary of a successful run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub width: u32,
    pub height: u32,
    pub quad: BoardQuad,
    pub num_segments: usize,
    pub format: OutputFormat,
    pub bytes: usize,
}

/// Correct the perspective of `frame` and run the filter stage on the
/// corrected image.
pub fn process_frame(frame: &RgbImage, cfg: &PipelineConfig) -> Result<ProcessedFrame, PipelineError> {
    let corrected = correct_perspective(frame, &cfg.corrector)?;
    let image = filter_frame(corrected.image, cfg.filter)?;
    Ok(ProcessedFrame {
        image,
        quad: corrected.quad,
        num_segments: corrected.num_segments,
    })
}

/// Capture one frame from `source`, process it and write it to `target`.
///
/// `format` overrides the encoding picked from the target. Nothing is
/// written unless every stage succeeded.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
pub fn run<S: FrameSource>(
    source: &mut S,
    cfg: &PipelineConfig,
    target: &OutputTarget,
    format: Option<OutputFormat>,
) -> Result<PipelineReport, PipelineError> {
    let frame = source.capture()?;
    info!("captured {}x{} frame", frame.width(), frame.height());

    let processed = process_frame(&frame, cfg)?;
    let format = format.unwrap_or_else(|| target.default_format());
    let bytes = encode(&processed.image, format, cfg.jpeg_quality)?;
    write_to(target, &bytes)?;
    info!("wrote {} image ({} bytes)", format, bytes.len());

    Ok(PipelineReport {
        width: processed.image.width(),
        height: processed.image.height(),
        quad: processed.quad,
        num_segments: processed.num_segments,
        format,
        bytes: bytes.len(),
    })
}
