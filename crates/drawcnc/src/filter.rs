//! Trace filter stage.
//!
//! The goal is a two-level mask (background wood vs. marker trace). There
//! is no agreed thresholding yet, so the mask mode refuses to run instead of
//! guessing; the default mode hands the corrected frame through unchanged.

use image::RgbImage;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Identity.
    #[default]
    Passthrough,
    /// Binary wood/marker mask. Not implemented.
    TraceMask,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    #[error("filter mode {0:?} is not implemented")]
    NotImplemented(FilterMode),
}

/// Run the filter stage on a corrected frame.
pub fn filter_frame(frame: RgbImage, mode: FilterMode) -> Result<RgbImage, FilterError> {
    match mode {
        FilterMode::Passthrough => Ok(frame),
        FilterMode::TraceMask => Err(FilterError::NotImplemented(mode)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_is_identity() {
        let frame = RgbImage::from_fn(5, 4, |x, y| image::Rgb([x as u8, y as u8, 7]));
        let out = filter_frame(frame.clone(), FilterMode::Passthrough).expect("identity");
        assert_eq!(out, frame);
    }

    #[test]
    fn trace_mask_is_not_implemented() {
        let err = filter_frame(RgbImage::new(2, 2), FilterMode::TraceMask).unwrap_err();
        assert_eq!(err, FilterError::NotImplemented(FilterMode::TraceMask));
    }

    #[test]
    fn mode_names_in_json() {
        let mode: FilterMode = serde_json::from_str("\"trace_mask\"").expect("parse");
        assert_eq!(mode, FilterMode::TraceMask);
    }
}
