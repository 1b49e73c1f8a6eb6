//! Integration module for connecting cameras and marker detectors with the tracker.
//!
//! This module provides clock implementations, a detection builder, and a
//! pipeline driving the per-frame loop over the tracker's collaborator traits.

mod builder;
mod clock;
mod pipeline;

pub use builder::DetectionBuilder;
pub use clock::{ManualClock, SystemClock};
pub use pipeline::TrackingPipeline;
