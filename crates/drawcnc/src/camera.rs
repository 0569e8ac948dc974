//! Frame acquisition.
//!
//! A [`Camera`] owns its device for as long as it lives: it is acquired in
//! [`Camera::open`] and released when the value is dropped, including on
//! every early-return error path of the caller. The bundled backend reads
//! a still frame from a device path (a snapshot file written by a capture
//! daemon, a mounted image, a test fixture); capture blocks until the frame
//! is decoded and has no timeout.

use std::path::{Path, PathBuf};

use image::{ImageReader, RgbImage};
use log::{debug, info};

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("no camera detected")]
    NoCamera,
    #[error("invalid captured frame")]
    EmptyFrame,
    #[error("invalid captured frame: {0}")]
    Decode(#[from] image::ImageError),
}

/// Anything that can hand out one raster frame.
pub trait FrameSource {
    fn capture(&mut self) -> Result<RgbImage, CaptureError>;
}

/// Scoped handle on a frame device.
#[derive(Debug)]
pub struct Camera {
    device: PathBuf,
    frames: usize,
}

impl Camera {
    /// Acquire `device`. `None` or a path that does not exist means there
    /// is no camera.
    pub fn open(device: Option<&Path>) -> Result<Self, CaptureError> {
        let device = device.ok_or(CaptureError::NoCamera)?;
        if !device.exists() {
            debug!("camera device {} does not exist", device.display());
            return Err(CaptureError::NoCamera);
        }
        info!("camera {} acquired", device.display());
        Ok(Self {
            device: device.to_path_buf(),
            frames: 0,
        })
    }

    pub fn device(&self) -> &Path {
        &self.device
    }
}

impl FrameSource for Camera {
    fn capture(&mut self) -> Result<RgbImage, CaptureError> {
        let frame = ImageReader::open(&self.device)
            .map_err(|_| CaptureError::EmptyFrame)?
            .with_guessed_format()
            .map_err(|_| CaptureError::EmptyFrame)?
            .decode()?
            .to_rgb8();
        if frame.width() == 0 || frame.height() == 0 {
            return Err(CaptureError::EmptyFrame);
        }
        self.frames += 1;
        debug!(
            "captured frame {} ({}x{})",
            self.frames,
            frame.width(),
            frame.height()
        );
        Ok(frame)
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        debug!(
            "camera {} released after {} frame(s)",
            self.device.display(),
            self.frames
        );
    }
}
