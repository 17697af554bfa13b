//! Temporal majority-vote smoothing over recent fused results.
//!
//! A bounded FIFO of the last `capacity` decisive results. An UNKNOWN frame
//! empties the window so history never blends two separate gesture episodes.

use std::collections::VecDeque;

use signvote_models::{FusedResult, Gesture, SmoothedState};

use crate::config::SMOOTH_WINDOW;

/// Majority-vote smoother with hard reset on UNKNOWN.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    window: VecDeque<FusedResult>,
    capacity: usize,
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(SMOOTH_WINDOW)
    }
}

impl TemporalSmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Feed one fused result and return the updated dominant state.
    ///
    /// Returns `None` when the window is empty, which is always the case
    /// right after an UNKNOWN result.
    pub fn push(&mut self, fused: FusedResult) -> Option<SmoothedState> {
        if fused.label.is_decisive() {
            if self.window.len() == self.capacity {
                self.window.pop_front();
            }
            self.window.push_back(fused);
        } else {
            self.window.clear();
        }
        self.state()
    }

    /// Drop all history, e.g. when the hand leaves the frame.
    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Reduce the window to its most frequent label.
    ///
    /// Ties go to the label seen first when scanning oldest to newest.
    pub fn state(&self) -> Option<SmoothedState> {
        // (label, count, confidence sum) in order of first appearance.
        let mut tallies: Vec<(Gesture, usize, f64)> = Vec::with_capacity(2);
        for entry in &self.window {
            match tallies.iter_mut().find(|(label, _, _)| *label == entry.label) {
                Some(tally) => {
                    tally.1 += 1;
                    tally.2 += entry.confidence;
                }
                None => tallies.push((entry.label, 1, entry.confidence)),
            }
        }

        let mut best: Option<&(Gesture, usize, f64)> = None;
        for tally in &tallies {
            if best.map_or(true, |b| tally.1 > b.1) {
                best = Some(tally);
            }
        }

        best.map(|(label, count, sum)| SmoothedState {
            label: *label,
            confidence: sum / *count as f64,
        })
    }
}
