//! Scrollback history
//!
//! Rows that scrolled off the top of the primary screen, oldest first.

use std::collections::VecDeque;

use super::buffer::row_to_string;
use super::cell::Cell;

/// Maximum number of evicted rows kept for reuse
const ROW_POOL_MAX: usize = 32;

/// Capacity-bounded FIFO of copied rows
#[derive(Debug, Clone)]
pub struct Scrollback {
    capacity: usize,
    rows: VecDeque<Vec<Cell>>,
    /// Evicted row buffers, reused to avoid reallocating on every scroll
    pool: Vec<Vec<Cell>>,
}

impl Scrollback {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rows: VecDeque::new(),
            pool: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy a row into history, evicting the oldest beyond capacity
    pub fn push(&mut self, row: &[Cell]) {
        if self.capacity == 0 {
            return;
        }
        let mut copy = self.pool.pop().unwrap_or_default();
        copy.clear();
        copy.extend_from_slice(row);
        self.rows.push_back(copy);
        while self.rows.len() > self.capacity {
            if let Some(old) = self.rows.pop_front() {
                if self.pool.len() < ROW_POOL_MAX {
                    self.pool.push(old);
                }
            }
        }
    }

    /// Row by index (0 = oldest)
    pub fn row(&self, idx: usize) -> Option<&[Cell]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    /// Iterate rows oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Plain text lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.iter().map(row_to_string).collect()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
