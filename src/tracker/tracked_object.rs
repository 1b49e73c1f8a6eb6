//! State of a single tracked tag.

use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::error::{Result, TrackError};
use crate::tracker::detection::{MarkerDetection, TagId};
use crate::tracker::geometry::{self, Pose};
use crate::tracker::history::{HistoryCapacity, HistorySample, PoseHistory};
use crate::tracker::track_state::TrackState;

/// One tag's current pose plus its timestamped history.
///
/// Missed detections are recorded as placeholders holding the last known
/// pose; once the tag is seen again they are rewritten by linear
/// interpolation between the poses on either side of the gap.
#[derive(Debug, Clone)]
pub struct TrackedObject {
    id: TagId,
    /// Physical side length of the marker, if known
    known_length: Option<f64>,
    state: TrackState,
    pose: Pose,
    timestamp: f64,
    history: PoseHistory,
    /// Number of placeholder samples since the last detection
    missed_frames: u32,
    /// Last successfully detected sample, kept even after eviction from history
    last_detection: Option<HistorySample>,
    /// Pixels per physical unit, fixed at initialization
    scale_factor: Option<f64>,
}

impl TrackedObject {
    pub fn new(id: TagId, capacity: HistoryCapacity, known_length: Option<f64>) -> Self {
        Self {
            id,
            known_length,
            state: TrackState::Unseen,
            pose: Pose::default(),
            timestamp: 0.0,
            history: PoseHistory::new(capacity),
            missed_frames: 0,
            last_detection: None,
            scale_factor: None,
        }
    }

    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn is_detected(&self) -> bool {
        self.state == TrackState::Tracking
    }

    /// Most recent pose. During a detection gap this is the last known pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn missed_frames(&self) -> u32 {
        self.missed_frames
    }

    pub fn history(&self) -> &PoseHistory {
        &self.history
    }

    pub fn known_length(&self) -> Option<f64> {
        self.known_length
    }

    pub fn scale_factor(&self) -> Option<f64> {
        self.scale_factor
    }

    pub fn last_detection(&self) -> Option<&HistorySample> {
        self.last_detection.as_ref()
    }

    /// Start tracking from a first detection.
    pub fn initialize(
        &mut self,
        timestamp: f64,
        det: &MarkerDetection,
        offset: &Vector2<f64>,
    ) -> Result<()> {
        if self.is_detected() {
            return Err(TrackError::AlreadyInitialized { id: self.id });
        }
        if !det.is_finite() {
            return Err(TrackError::NonFiniteDetection { id: self.id });
        }

        let pose = geometry::pose_from_detection(det, offset, 0.0);
        if self.known_length.is_some() {
            self.scale_factor = Some(geometry::scale_factor(det, self.known_length)?);
        }

        self.pose = pose;
        self.timestamp = timestamp;
        let sample = HistorySample::new(timestamp, pose);
        self.history.push(sample);
        self.last_detection = Some(sample);
        self.missed_frames = 0;
        self.state = TrackState::Tracking;
        Ok(())
    }

    /// Record one timestep, with or without a detection of this tag.
    ///
    /// A detection with non-finite geometry is recorded as a missed frame.
    pub fn update(
        &mut self,
        timestamp: f64,
        det: Option<&MarkerDetection>,
        offset: &Vector2<f64>,
    ) -> Result<()> {
        if !self.is_detected() {
            return Err(TrackError::NotInitialized { id: self.id });
        }
        if !(timestamp > self.timestamp) {
            return Err(TrackError::NonMonotonicTimestamp {
                previous: self.timestamp,
                timestamp,
            });
        }

        let det = det.filter(|d| {
            let finite = d.is_finite();
            if !finite {
                warn!(id = self.id, "ignoring non-finite detection");
            }
            finite
        });

        match det {
            Some(det) => {
                let pose = geometry::pose_from_detection(det, offset, self.pose.theta);
                if self.missed_frames > 0 {
                    self.interpolate_gap(timestamp, pose)?;
                }
                let sample = HistorySample::new(timestamp, pose);
                self.pose = pose;
                self.timestamp = timestamp;
                self.history.push(sample);
                self.last_detection = Some(sample);
                self.missed_frames = 0;
            }
            None => {
                self.missed_frames += 1;
                self.timestamp = timestamp;
                self.history.push(HistorySample::new(timestamp, self.pose));
            }
        }
        Ok(())
    }

    /// Rewrite the placeholders of the current gap on the line between the
    /// last detection and the new one. Placeholders already evicted from a
    /// bounded history are simply skipped.
    fn interpolate_gap(&mut self, timestamp: f64, pose: Pose) -> Result<()> {
        let anchor = self.last_detection.ok_or_else(|| {
            TrackError::InternalInconsistency(format!(
                "tag {} closed a gap of {} frames without a prior detection",
                self.id, self.missed_frames
            ))
        })?;

        let p0 = anchor.pose.to_vector();
        let slope = (pose.to_vector() - p0) / (timestamp - anchor.timestamp);
        for sample in self.history.recent_mut(self.missed_frames as usize) {
            let dt = sample.timestamp - anchor.timestamp;
            sample.pose = Pose::from(p0 + slope * dt);
        }

        debug!(
            id = self.id,
            missed = self.missed_frames,
            from = anchor.timestamp,
            to = timestamp,
            "interpolated detection gap"
        );
        Ok(())
    }
}
