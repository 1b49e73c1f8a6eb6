//! Multi-marker pose tracking for identity-tagged fiducial detections.
//!
//! Detections are matched to tracked identities by tag id, converted into
//! continuous `(x, y, theta)` poses, smoothed over missed frames by
//! retroactive linear interpolation and kept in a bounded rolling history.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{Result, TrackError};
pub use integration::{DetectionBuilder, ManualClock, SystemClock, TrackingPipeline};
pub use tracker::{
    Clock, DetectionSet, FrameSource, HistoryCapacity, HistoryRow, HistorySample,
    MarkerDetection, MarkerDetector, MarkerTracker, Pose, PoseHistory, RegionOfInterest, TagId,
    TrackState, TrackedObject, TrackerConfig,
};
