//! TrackingPipeline for combining frame capture and detection with tracking.

use nalgebra::Point2;
use tracing::debug;

use crate::error::{Result, TrackError};
use crate::tracker::{
    Clock, DetectionSet, FrameSource, MarkerDetector, MarkerTracker, RegionOfInterest, TagId,
};

/// Drives one capture, detect, step iteration per call.
///
/// The pipeline owns the current region of interest: frames are requested
/// cropped to it and detections are shifted back by its offset.
pub struct TrackingPipeline<S, D, C> {
    source: S,
    detector: D,
    clock: C,
    tracker: MarkerTracker,
    roi: RegionOfInterest,
    frame_width: u32,
    frame_height: u32,
}

impl<S, D, C> TrackingPipeline<S, D, C>
where
    S: FrameSource,
    D: MarkerDetector<S::Frame>,
    C: Clock,
{
    /// Create a pipeline over a `frame_width` x `frame_height` camera,
    /// initially looking at the whole frame.
    pub fn new(
        source: S,
        detector: D,
        clock: C,
        tracker: MarkerTracker,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            source,
            detector,
            clock,
            tracker,
            roi: RegionOfInterest::full_frame(frame_width, frame_height),
            frame_width,
            frame_height,
        }
    }

    /// Start with a cropped region of interest instead of the full frame.
    pub fn with_roi(mut self, roi: RegionOfInterest) -> Self {
        self.roi = roi;
        self
    }

    /// Acquire every tag. Can be called again after an acquisition timeout.
    pub fn start(&mut self) -> Result<()> {
        self.tracker
            .acquire(&mut self.source, &mut self.detector, &self.clock, &self.roi)
    }

    /// Capture one frame, detect markers in it and step the tracker.
    ///
    /// Returns the timestamp of the step in seconds since acquisition.
    pub fn process_frame(&mut self) -> Result<f64> {
        let Some(t0) = self.tracker.t0() else {
            let id = self.tracker.ids().next().unwrap_or_default();
            return Err(TrackError::NotInitialized { id });
        };

        let frame = self
            .source
            .next_frame(&self.roi)
            .map_err(|e| TrackError::FrameSource(Box::new(e)))?;
        let detections: DetectionSet = self
            .detector
            .detect(&frame)
            .map_err(|e| TrackError::Detector(Box::new(e)))?
            .into_iter()
            .collect();

        let timestamp = self.clock.now().saturating_sub(t0).as_secs_f64();
        self.tracker
            .step(&detections, timestamp, &self.roi.offset())?;
        Ok(timestamp)
    }

    /// Move the region of interest so it is centered on the centroid of
    /// `ids`, with the given size.
    pub fn recenter_on(&mut self, ids: &[TagId], width: u32, height: u32) -> Result<Point2<f64>> {
        let center = self.tracker.centroid(ids)?;
        self.roi = RegionOfInterest::recentered(
            &center,
            width,
            height,
            self.frame_width,
            self.frame_height,
        );
        debug!(x = center.x, y = center.y, roi = ?self.roi, "recentered region of interest");
        Ok(center)
    }

    pub fn roi(&self) -> &RegionOfInterest {
        &self.roi
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &MarkerTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut MarkerTracker {
        &mut self.tracker
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Tear the pipeline down, handing back its parts.
    pub fn into_parts(self) -> (S, D, C, MarkerTracker) {
        (self.source, self.detector, self.clock, self.tracker)
    }
}
