/// Lifecycle of a tracked tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Not detected yet; waiting for acquisition
    #[default]
    Unseen,
    /// Initialized from a first detection and updated every step
    Tracking,
}
