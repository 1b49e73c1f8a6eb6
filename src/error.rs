//! Error type shared by the tracker and its integration layer.

use std::time::Duration;

use thiserror::Error;

use crate::tracker::TagId;

/// Boxed error raised by an external collaborator (frame source or detector).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = TrackError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TrackError {
    /// `update` (or a tracker step) reached a tag that was never initialized.
    #[error("tag {id} has not been initialized")]
    NotInitialized { id: TagId },

    /// `initialize` was called on a tag that is already being tracked.
    #[error("tag {id} is already initialized")]
    AlreadyInitialized { id: TagId },

    /// The tag never showed up during acquisition.
    #[error("tag {id} was not detected within {timeout:?}")]
    AcquisitionTimeout { id: TagId, timeout: Duration },

    /// A detection with a non-finite corner or center cannot start a track.
    #[error("detection of tag {id} has non-finite coordinates")]
    NonFiniteDetection { id: TagId },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An aggregate query selected no tracked tag.
    #[error("no tracked tag matches the requested selection")]
    EmptySelection,

    /// A scale factor was requested but no tag has a known physical size.
    #[error("no tracked tag has a known physical size")]
    NoCalibratedMarkers,

    #[error("timestamp {timestamp} does not advance past {previous}")]
    NonMonotonicTimestamp { previous: f64, timestamp: f64 },

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("frame source failed: {0}")]
    FrameSource(#[source] BoxError),

    #[error("marker detector failed: {0}")]
    Detector(#[source] BoxError),
}

impl TrackError {
    /// Whether this is an expected runtime failure a driver may retry or
    /// report, as opposed to a misuse of the API or a broken invariant.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Self::AcquisitionTimeout { .. }
                | Self::NonFiniteDetection { .. }
                | Self::EmptySelection
                | Self::NoCalibratedMarkers
                | Self::FrameSource(_)
                | Self::Detector(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operational_classification() {
        let timeout = TrackError::AcquisitionTimeout {
            id: 3,
            timeout: Duration::from_secs(5),
        };
        assert!(timeout.is_operational());
        assert!(TrackError::EmptySelection.is_operational());
        assert!(TrackError::NonFiniteDetection { id: 2 }.is_operational());
        let io = std::io::Error::other("camera unplugged");
        assert!(TrackError::FrameSource(Box::new(io)).is_operational());
        let io = std::io::Error::other("decoder crashed");
        assert!(TrackError::Detector(Box::new(io)).is_operational());
        assert!(!TrackError::NotInitialized { id: 1 }.is_operational());
        assert!(!TrackError::AlreadyInitialized { id: 1 }.is_operational());
        assert!(!TrackError::InternalInconsistency("gap".into()).is_operational());
    }

    #[test]
    fn test_display() {
        let err = TrackError::AcquisitionTimeout {
            id: 12,
            timeout: Duration::from_millis(500),
        };
        assert_eq!(err.to_string(), "tag 12 was not detected within 500ms");
    }
}
