//! Vertical track geometry and the bounded position trail drawn on it.

use std::collections::VecDeque;

use thiserror::Error;

/// Rows on the drawn track.
pub const DEFAULT_ROWS: usize = 20;
/// Past positions kept for the fade effect.
pub const DEFAULT_TRAIL_LEN: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("track needs at least one row")]
    NoRows,
    #[error("trail must hold at least one entry")]
    EmptyTrail,
}

/// Maps heights onto `rows` discrete steps, row 0 at the drop height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Track {
    rows: usize,
    trail_len: usize,
}

impl Default for Track {
    fn default() -> Self {
        Self { rows: DEFAULT_ROWS, trail_len: DEFAULT_TRAIL_LEN }
    }
}

impl Track {
    /// # Errors
    /// Fails when either dimension is zero.
    pub fn new(rows: usize, trail_len: usize) -> Result<Self, TrackError> {
        if rows == 0 {
            return Err(TrackError::NoRows);
        }
        if trail_len == 0 {
            return Err(TrackError::EmptyTrail);
        }
        Ok(Self { rows, trail_len })
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn trail_len(&self) -> usize { self.trail_len }

    /// Row index for `position`: `round((h0 - y) / h0 * rows)` clamped to `[0, rows - 1]`.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn step_index(&self, position: f64, initial_height: f64) -> usize {
        let rows = self.rows as f64;
        let fallen = (initial_height - position) / initial_height;
        // NaN casts to 0
        (fallen * rows).round().clamp(0.0, rows - 1.0) as usize
    }

    pub fn new_trail(&self) -> Trail {
        Trail::with_capacity(self.trail_len)
    }
}

/// FIFO of recent row indices; the oldest entry is evicted first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trail {
    entries: VecDeque<usize>,
    capacity: usize,
}

impl Trail {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity + 1), capacity }
    }

    pub fn push(&mut self, index: usize) {
        self.entries.push_back(index);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn capacity(&self) -> usize { self.capacity }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains(&index)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}
