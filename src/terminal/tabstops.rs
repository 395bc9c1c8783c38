//! Horizontal tab stops

use std::collections::BTreeSet;

/// Sorted set of tab-stop columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStops {
    stops: BTreeSet<usize>,
    width: usize,
    interval: usize,
}

impl TabStops {
    /// Default stops every `interval` columns for a row of `width` cells
    pub fn new(width: usize, interval: usize) -> Self {
        let mut tabs = Self {
            stops: BTreeSet::new(),
            width,
            interval: interval.max(1),
        };
        tabs.reset();
        tabs
    }

    /// Restore the default stops
    pub fn reset(&mut self) {
        self.stops = (self.interval..self.width).step_by(self.interval).collect();
    }

    /// Change width and re-derive the default stops
    pub fn resize(&mut self, width: usize) {
        self.width = width;
        self.reset();
    }

    /// HTS
    pub fn set(&mut self, x: usize) {
        if x < self.width {
            self.stops.insert(x);
        }
    }

    /// TBC 0
    pub fn clear(&mut self, x: usize) {
        self.stops.remove(&x);
    }

    /// TBC 3
    pub fn clear_all(&mut self) {
        self.stops.clear();
    }

    pub fn is_set(&self, x: usize) -> bool {
        self.stops.contains(&x)
    }

    /// First stop after `x`, or the last column when there is none
    pub fn next(&self, x: usize) -> usize {
        self.stops
            .range(x + 1..)
            .next()
            .copied()
            .unwrap_or(self.width.saturating_sub(1))
    }

    /// Last stop before `x`, or column 0 when there is none
    pub fn prev(&self, x: usize) -> usize {
        self.stops.range(..x).next_back().copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.stops.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_every_eight() {
        let tabs = TabStops::new(20, 8);
        assert_eq!(tabs.iter().collect::<Vec<_>>(), vec![8, 16]);
    }

    #[test]
    fn next_prev_saturate() {
        let tabs = TabStops::new(20, 8);
        assert_eq!(tabs.next(0), 8);
        assert_eq!(tabs.next(8), 16);
        assert_eq!(tabs.next(16), 19);
        assert_eq!(tabs.prev(16), 8);
        assert_eq!(tabs.prev(8), 0);
        assert_eq!(tabs.prev(3), 0);
    }

    #[test]
    fn set_and_clear() {
        let mut tabs = TabStops::new(20, 8);
        tabs.set(3);
        assert_eq!(tabs.next(0), 3);
        tabs.clear(3);
        assert_eq!(tabs.next(0), 8);
        tabs.clear_all();
        assert_eq!(tabs.next(0), 19);
        tabs.resize(10);
        assert_eq!(tabs.iter().collect::<Vec<_>>(), vec![8]);
    }
}
