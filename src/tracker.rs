mod capture;
mod detection;
mod geometry;
mod history;
mod marker_tracker;
mod roi;
mod track_state;
mod tracked_object;

pub use capture::{Clock, FrameSource, MarkerDetector};
pub use detection::{DetectionSet, MarkerDetection, TagId};
pub use geometry::{Pose, heading, pose_from_detection, scale_factor, wrap_to_pi};
pub use history::{HistoryCapacity, HistorySample, PoseHistory};
pub use marker_tracker::{HistoryRow, MarkerTracker, TrackerConfig};
pub use roi::RegionOfInterest;
pub use track_state::TrackState;
pub use tracked_object::TrackedObject;
