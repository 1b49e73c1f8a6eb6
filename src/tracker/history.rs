//! Timestamped pose history with fixed FIFO capacity.

use std::collections::VecDeque;
use std::collections::vec_deque;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::tracker::geometry::Pose;

/// How many samples a history keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryCapacity {
    /// Keep only the most recent `n` samples
    Bounded(NonZeroUsize),
    /// Keep every sample
    #[default]
    Unbounded,
}

impl HistoryCapacity {
    /// `Bounded(n)`, or `None` when `n == 0`.
    pub fn bounded(n: usize) -> Option<Self> {
        NonZeroUsize::new(n).map(Self::Bounded)
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Bounded(n) => Some(n.get()),
            Self::Unbounded => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub timestamp: f64,
    pub pose: Pose,
}

impl HistorySample {
    pub fn new(timestamp: f64, pose: Pose) -> Self {
        Self { timestamp, pose }
    }
}

#[derive(Debug, Clone)]
pub struct PoseHistory {
    samples: VecDeque<HistorySample>,
    capacity: HistoryCapacity,
}

impl PoseHistory {
    pub fn new(capacity: HistoryCapacity) -> Self {
        let samples = match capacity {
            HistoryCapacity::Bounded(n) => VecDeque::with_capacity(n.get()),
            HistoryCapacity::Unbounded => VecDeque::new(),
        };
        Self { samples, capacity }
    }

    pub fn capacity(&self) -> HistoryCapacity {
        self.capacity
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn push(&mut self, sample: HistorySample) {
        if let Some(limit) = self.capacity.limit() {
            while self.samples.len() >= limit {
                self.samples.pop_front();
            }
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HistorySample> {
        self.samples.get(index)
    }

    pub fn last(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, HistorySample> {
        self.samples.iter()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.timestamp)
    }

    pub fn poses(&self) -> impl Iterator<Item = Pose> + '_ {
        self.samples.iter().map(|s| s.pose)
    }

    /// Mutable access to the `n` most recent samples, oldest first. Yields
    /// fewer when the history holds fewer than `n`.
    pub(crate) fn recent_mut(&mut self, n: usize) -> impl Iterator<Item = &mut HistorySample> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter_mut().skip(skip)
    }
}

impl<'a> IntoIterator for &'a PoseHistory {
    type Item = &'a HistorySample;
    type IntoIter = vec_deque::Iter<'a, HistorySample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
