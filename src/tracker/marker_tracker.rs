//! Identity-keyed multi-marker tracker.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use nalgebra::{Point2, Vector2};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::{Result, TrackError};
use crate::tracker::capture::{Clock, FrameSource, MarkerDetector};
use crate::tracker::detection::{DetectionSet, TagId};
use crate::tracker::geometry::Pose;
use crate::tracker::history::HistoryCapacity;
use crate::tracker::roi::RegionOfInterest;
use crate::tracker::tracked_object::TrackedObject;

/// Configuration for the MarkerTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// History kept per tag
    pub history: HistoryCapacity,
    /// How long acquisition waits for each tag before giving up; zero
    /// allows one frame per tag
    pub acquisition_timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history: HistoryCapacity::Unbounded,
            acquisition_timeout: Duration::from_secs(5),
        }
    }
}

impl TrackerConfig {
    pub fn with_history(mut self, history: HistoryCapacity) -> Self {
        self.history = history;
        self
    }

    pub fn with_acquisition_timeout(mut self, timeout: Duration) -> Self {
        self.acquisition_timeout = timeout;
        self
    }
}

/// One timestep of the exported history: every tag's pose at `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub timestamp: f64,
    pub poses: BTreeMap<TagId, Pose>,
}

#[derive(Debug)]
pub struct MarkerTracker {
    /// Sorted by ascending tag id
    objects: Vec<TrackedObject>,
    config: TrackerConfig,
    /// Clock reading when acquisition of the last tag completed
    t0: Option<Duration>,
    last_timestamp: f64,
}

impl MarkerTracker {
    /// Create a tracker for `ids`. `known_lengths` gives the physical side
    /// length of the markers that should calibrate the pixel scale.
    pub fn new(
        ids: impl IntoIterator<Item = TagId>,
        known_lengths: &HashMap<TagId, f64>,
        config: TrackerConfig,
    ) -> Result<Self> {
        let ids: BTreeSet<TagId> = ids.into_iter().collect();

        for (&id, &length) in known_lengths {
            if !ids.contains(&id) {
                return Err(TrackError::InvalidConfiguration(format!(
                    "known length given for untracked tag {id}"
                )));
            }
            if !(length.is_finite() && length > 0.0) {
                return Err(TrackError::InvalidConfiguration(format!(
                    "known length {length} for tag {id} must be positive and finite"
                )));
            }
        }

        let objects = ids
            .into_iter()
            .map(|id| TrackedObject::new(id, config.history, known_lengths.get(&id).copied()))
            .collect();

        Ok(Self {
            objects,
            config,
            t0: None,
            last_timestamp: 0.0,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Tracked objects in ascending id order.
    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    pub fn ids(&self) -> impl Iterator<Item = TagId> + '_ {
        self.objects.iter().map(|o| o.id())
    }

    pub fn get(&self, id: TagId) -> Option<&TrackedObject> {
        self.objects
            .binary_search_by_key(&id, |o| o.id())
            .ok()
            .map(|i| &self.objects[i])
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn is_acquired(&self) -> bool {
        self.t0.is_some()
    }

    /// Clock reading at which acquisition completed.
    pub fn t0(&self) -> Option<Duration> {
        self.t0
    }

    /// Seconds elapsed on `clock` since acquisition completed.
    pub fn elapsed(&self, clock: &impl Clock) -> Option<f64> {
        self.t0
            .map(|t0| clock.now().saturating_sub(t0).as_secs_f64())
    }

    /// Bring up every tag, one at a time in ascending id order, by pulling
    /// frames until the tag is detected.
    ///
    /// Blocks until all tags are found or one of them exceeds the configured
    /// timeout, measured on `clock`. A zero timeout gives each tag a single
    /// frame. Tags initialized by an earlier failed attempt are kept, so
    /// calling this again resumes with the first missing tag.
    pub fn acquire<S, D, C>(
        &mut self,
        source: &mut S,
        detector: &mut D,
        clock: &C,
        roi: &RegionOfInterest,
    ) -> Result<()>
    where
        S: FrameSource,
        D: MarkerDetector<S::Frame>,
        C: Clock,
    {
        if self.t0.is_some() {
            if let Some(obj) = self.objects.first() {
                return Err(TrackError::AlreadyInitialized { id: obj.id() });
            }
        }

        let offset = roi.offset();
        let timeout = self.config.acquisition_timeout;

        for obj in self.objects.iter_mut() {
            if obj.is_detected() {
                debug!(id = obj.id(), "tag already acquired, skipping");
                continue;
            }

            let started = clock.now();
            loop {
                let frame = source
                    .next_frame(roi)
                    .map_err(|e| TrackError::FrameSource(Box::new(e)))?;
                let detections: DetectionSet = detector
                    .detect(&frame)
                    .map_err(|e| TrackError::Detector(Box::new(e)))?
                    .into_iter()
                    .collect();

                if let Some(det) = detections.get(obj.id()) {
                    obj.initialize(0.0, det, &offset)?;
                    info!(
                        id = obj.id(),
                        scale_factor = ?obj.scale_factor(),
                        "tag detected in frame"
                    );
                    break;
                }

                if timeout.is_zero() || clock.now().saturating_sub(started) > timeout {
                    warn!(id = obj.id(), ?timeout, "tag could not be found in frame");
                    return Err(TrackError::AcquisitionTimeout {
                        id: obj.id(),
                        timeout,
                    });
                }
            }
        }

        self.t0 = Some(clock.now());
        self.last_timestamp = 0.0;
        info!(tags = self.objects.len(), "acquisition complete");
        Ok(())
    }

    /// Advance every tag by one timestep.
    ///
    /// Tags missing from `detections` record a missed frame. Detections of
    /// untracked ids are ignored. The call is rejected as a whole, before any
    /// tag is touched, if a tag is not initialized yet or `timestamp` does
    /// not advance.
    pub fn step(
        &mut self,
        detections: &DetectionSet,
        timestamp: f64,
        offset: &Vector2<f64>,
    ) -> Result<()> {
        if let Some(obj) = self.objects.iter().find(|o| !o.is_detected()) {
            return Err(TrackError::NotInitialized { id: obj.id() });
        }
        if !(timestamp > self.last_timestamp) {
            return Err(TrackError::NonMonotonicTimestamp {
                previous: self.last_timestamp,
                timestamp,
            });
        }

        for obj in self.objects.iter_mut() {
            obj.update(timestamp, detections.get(obj.id()), offset)?;
        }
        self.last_timestamp = timestamp;

        trace!(timestamp, detected = detections.len(), "tracker step");
        Ok(())
    }

    /// Mean current position of the tags in `ids`.
    pub fn centroid(&self, ids: &[TagId]) -> Result<Point2<f64>> {
        let (sum, count) = self
            .objects
            .iter()
            .filter(|o| ids.contains(&o.id()))
            .fold((Vector2::<f64>::zeros(), 0usize), |(sum, n), o| {
                (sum + o.pose().position().coords, n + 1)
            });

        if count == 0 {
            return Err(TrackError::EmptySelection);
        }
        Ok(Point2::from(sum / count as f64))
    }

    /// Mean pixels-per-unit over all calibrated tags.
    pub fn scale_factor(&self) -> Result<f64> {
        let factors: Vec<f64> = self.objects.iter().filter_map(|o| o.scale_factor()).collect();
        if factors.is_empty() {
            return Err(TrackError::NoCalibratedMarkers);
        }
        Ok(factors.iter().sum::<f64>() / factors.len() as f64)
    }

    /// The full history as one row per timestep.
    pub fn export_history(&self) -> Result<Vec<HistoryRow>> {
        let Some(first) = self.objects.first() else {
            return Ok(Vec::new());
        };

        let len = first.history().len();
        if let Some(obj) = self.objects.iter().find(|o| o.history().len() != len) {
            return Err(TrackError::InternalInconsistency(format!(
                "tag {} has {} history samples, tag {} has {}",
                obj.id(),
                obj.history().len(),
                first.id(),
                len
            )));
        }

        let mut rows = Vec::with_capacity(len);
        for i in 0..len {
            let mut poses = BTreeMap::new();
            let mut timestamp = None;
            for obj in &self.objects {
                let sample = obj.history().get(i).ok_or_else(|| {
                    TrackError::InternalInconsistency(format!(
                        "tag {} lost history sample {i}",
                        obj.id()
                    ))
                })?;
                match timestamp {
                    None => timestamp = Some(sample.timestamp),
                    Some(t) if t != sample.timestamp => {
                        return Err(TrackError::InternalInconsistency(format!(
                            "tag {} sample {i} is at {} instead of {t}",
                            obj.id(),
                            sample.timestamp
                        )));
                    }
                    Some(_) => {}
                }
                poses.insert(obj.id(), sample.pose);
            }
            rows.push(HistoryRow {
                timestamp: timestamp.unwrap_or_default(),
                poses,
            });
        }
        Ok(rows)
    }

    /// The history as a table: one row per timestep, columns `t` followed by
    /// `x, y, theta` for each tag in ascending id order.
    pub fn export_matrix(&self) -> Result<Array2<f64>> {
        let rows = self.export_history()?;
        let mut table = Array2::zeros((rows.len(), 1 + 3 * self.objects.len()));
        for (i, row) in rows.iter().enumerate() {
            table[[i, 0]] = row.timestamp;
            for (j, pose) in row.poses.values().enumerate() {
                table[[i, 1 + 3 * j]] = pose.x;
                table[[i, 2 + 3 * j]] = pose.y;
                table[[i, 3 + 3 * j]] = pose.theta;
            }
        }
        Ok(table)
    }
}
