//! JSON pipeline configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::correct::{CorrectorParams, ParamsError};
use crate::filter::FilterMode;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid corrector settings: {0}")]
    Invalid(#[from] ParamsError),
}

fn default_jpeg_quality() -> u8 {
    95
}

/// Parameters of one capture run. Every field is optional in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub corrector: CorrectorParams,
    #[serde(default)]
    pub filter: FilterMode,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corrector: CorrectorParams::default(),
            filter: FilterMode::default(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(self.corrector.validate()?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correct::CentroidSource;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg: PipelineConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.jpeg_quality, 95);
        assert_eq!(cfg.corrector.hough.vote_threshold, 70);
    }

    #[test]
    fn partial_override() {
        let raw = r#"{
            "corrector": { "canny_low": 50.0, "hough": { "max_line_gap": 4.0 }, "centroid": "quad" },
            "filter": "trace_mask"
        }"#;
        let cfg: PipelineConfig = serde_json::from_str(raw).expect("parse");
        assert_eq!(cfg.corrector.canny_low, 50.0);
        assert_eq!(cfg.corrector.canny_high, 100.0);
        assert_eq!(cfg.corrector.hough.max_line_gap, 4.0);
        assert_eq!(cfg.corrector.hough.min_line_length, 30.0);
        assert_eq!(cfg.corrector.centroid, CentroidSource::Quad);
        assert_eq!(cfg.filter, FilterMode::TraceMask);
    }

    #[test]
    fn json_file_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.json");
        let mut cfg = PipelineConfig::default();
        cfg.jpeg_quality = 80;
        cfg.corrector.approx_epsilon_frac = 0.05;
        cfg.write_json(&path).expect("write");
        assert_eq!(PipelineConfig::load_json(&path).expect("load"), cfg);
    }

    #[test]
    fn inverted_canny_thresholds_fail_to_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.json");
        std::fs::write(
            &path,
            r#"{ "corrector": { "canny_low": 200.0, "canny_high": 50.0 } }"#,
        )
        .expect("write");
        assert!(matches!(
            PipelineConfig::load_json(&path),
            Err(ConfigError::Invalid(ParamsError::CannyThresholds { .. }))
        ));
    }

    #[test]
    fn negative_epsilon_fails_to_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, r#"{ "corrector": { "approx_epsilon_frac": -0.5 } }"#)
            .expect("write");
        assert!(matches!(
            PipelineConfig::load_json(&path),
            Err(ConfigError::Invalid(ParamsError::EpsilonFrac(_)))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"jpeg_quality\": ").expect("write");
        assert!(matches!(
            PipelineConfig::load_json(&path),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            PipelineConfig::load_json(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
