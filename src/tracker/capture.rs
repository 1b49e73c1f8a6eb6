//! Collaborators the tracker pulls frames, detections and time from.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::tracker::detection::MarkerDetection;
use crate::tracker::roi::RegionOfInterest;

/// Source of video frames: a live camera, a recorded video, or a test fake.
///
/// # Example
///
/// ```ignore
/// use tagtrack_rs::{FrameSource, RegionOfInterest};
///
/// struct Recording {
///     frames: std::vec::IntoIter<GrayImage>,
/// }
///
/// impl FrameSource for Recording {
///     type Frame = GrayImage;
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self, roi: &RegionOfInterest) -> Result<GrayImage, Self::Error> {
///         let frame = self.frames.next().ok_or(std::io::ErrorKind::UnexpectedEof)?;
///         Ok(crop(frame, roi))
///     }
/// }
/// ```
pub trait FrameSource {
    /// Image type handed to the detector.
    type Frame;
    /// Error type for capture failures, including end of stream.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Capture the next frame, cropped to `roi`.
    ///
    /// Detections produced from the returned image are in crop coordinates;
    /// the tracker shifts them by `roi.offset()`.
    fn next_frame(&mut self, roi: &RegionOfInterest) -> Result<Self::Frame, Self::Error>;
}

/// Fiducial marker detector.
pub trait MarkerDetector<F> {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Detect markers in `frame`, reporting each tag id at most once.
    fn detect(&mut self, frame: &F) -> Result<Vec<MarkerDetection>, Self::Error>;
}

/// Monotonic clock reporting time elapsed since an arbitrary origin.
///
/// Acquisition timeouts are measured on this clock, so it must advance
/// while frames are being captured.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
