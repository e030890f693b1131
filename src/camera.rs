//! Webcam capture behind a narrow frame-grabbing seam.
//!
//! The acquisition loop only ever asks for "the current frame", so the seam
//! is a single-method trait. Tests substitute synthetic sources; production
//! uses the `OpenCV` camera with a one-frame buffer so a slow cycle never
//! reads a stale frame.

use log::info;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};

use crate::error::{Error, Result};

/// A producer of single frames for the acquisition loop
pub trait FrameSource: Send {
    /// Grab the current frame; an empty grab is an error
    fn grab_frame(&mut self) -> Result<Mat>;
}

/// Webcam capture with low-latency settings
pub struct Camera {
    capture: VideoCapture,
    index: i32,
}

impl Camera {
    /// Open a camera device and apply the capture settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::CameraError` when the device cannot be opened, which
    /// includes permission denials. The caller reports this once and the loop
    /// never enters its running state.
    pub fn open(index: i32, width: i32, height: i32) -> Result<Self> {
        info!("Opening camera {index}");
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::CameraError(format!(
                "camera {index} unavailable or access denied"
            )));
        }

        capture.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(width))?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(height))?;

        // Reduce buffer size for lower latency
        capture.set(CAP_PROP_BUFFERSIZE, 1.0)?;
        info!("Camera buffer size set to 1 for low latency");

        Ok(Self { capture, index })
    }
}

impl FrameSource for Camera {
    fn grab_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Err(Error::CameraError(format!(
                "camera {} returned an empty frame",
                self.index
            )));
        }
        Ok(frame)
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        let _ = self.capture.release();
        info!("Released camera {}", self.index);
    }
}
