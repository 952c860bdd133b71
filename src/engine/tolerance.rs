//! Sliding observation window for steady-state detection.
//!
//! A single near-target crossing must not count as settled: an
//! under-damped spring passes through its endpoint on every overshoot.
//! The window therefore records one within-tolerance boolean per
//! integration sub-step and only declares settlement once every slot is
//! true, i.e. the model has stayed within tolerance for the window's
//! whole span of simulation time.

/// Fixed-size circular buffer of within-tolerance observations.
///
/// The buffer is allocated once and reused; recording overwrites the
/// oldest slot.
#[derive(Debug, Clone)]
pub(crate) struct ToleranceWindow {
    entries: Vec<bool>,
    cursor: usize,
}

impl ToleranceWindow {
    /// All-false window with `len` slots.
    pub(crate) fn new(len: usize) -> Self {
        Self {
            entries: vec![false; len],
            cursor: 0,
        }
    }

    /// Record one observation, overwriting the oldest slot.
    pub(crate) fn record(&mut self, within_tolerance: bool) {
        self.entries[self.cursor] = within_tolerance;
        self.cursor = (self.cursor + 1) % self.entries.len();
    }

    /// Whether every slot in the window is within tolerance.
    pub(crate) fn is_filled(&self) -> bool {
        self.entries.iter().all(|&within| within)
    }

    /// Clear all slots back to false.
    pub(crate) fn reset(&mut self) {
        self.entries.fill(false);
    }
}
