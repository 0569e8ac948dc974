//! Image encoding and output targets.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to encode {format} image: {source}")]
    Encode {
        format: OutputFormat,
        #[source]
        source: image::ImageError,
    },
}

/// Where the final image goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    Path(PathBuf),
}

impl OutputTarget {
    /// `None` or `-` selects standard output.
    pub fn parse(arg: Option<&str>) -> Self {
        match arg {
            None | Some("-") => Self::Stdout,
            Some(path) => Self::Path(PathBuf::from(path)),
        }
    }

    /// Encoding used when none is forced: JPEG on stdout, by extension for
    /// files.
    pub fn default_format(&self) -> OutputFormat {
        match self {
            Self::Stdout => OutputFormat::Jpeg,
            Self::Path(path) => OutputFormat::from_path(path),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    /// Binary PPM (P6), readable by bitmap tracers.
    Pnm,
    Bmp,
}

impl OutputFormat {
    /// Pick the encoder from a file extension; unknown or missing
    /// extensions fall back to JPEG.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "pnm" | "ppm" => Ok(Self::Pnm),
            "bmp" => Ok(Self::Bmp),
            other => Err(format!("unsupported output format '{other}'")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Pnm => "pnm",
            Self::Bmp => "bmp",
        };
        f.write_str(name)
    }
}

/// Encode `image` in memory. `jpeg_quality` is clamped to `1..=100` and
/// only used for JPEG.
pub fn encode(image: &RgbImage, format: OutputFormat, jpeg_quality: u8) -> Result<Vec<u8>, OutputError> {
    let mut buf = Vec::new();
    let res = match format {
        OutputFormat::Jpeg => image.write_with_encoder(JpegEncoder::new_with_quality(
            &mut buf,
            jpeg_quality.clamp(1, 100),
        )),
        OutputFormat::Png => image.write_with_encoder(PngEncoder::new(&mut buf)),
        OutputFormat::Pnm => image.write_with_encoder(
            PnmEncoder::new(&mut buf).with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary)),
        ),
        OutputFormat::Bmp => image.write_with_encoder(BmpEncoder::new(&mut buf)),
    };
    res.map_err(|source| OutputError::Encode { format, source })?;
    Ok(buf)
}

/// Write encoded bytes to `target`.
pub fn write_to(target: &OutputTarget, bytes: &[u8]) -> Result<(), OutputError> {
    match target {
        OutputTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            debug!("wrote {} bytes to stdout", bytes.len());
        }
        OutputTarget::Path(path) => {
            std::fs::write(path, bytes)?;
            debug!("wrote {} bytes to {}", bytes.len(), path.display());
        }
    }
    Ok(())
}
