use std::collections::VecDeque;

/// Fixed-capacity window over the most recent values with a running sum.
///
/// Pushing past capacity evicts the oldest value, so the mean of any window
/// position costs O(1) rather than a rescan.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl RollingWindow {
    /// `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity + 1),
            sum: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Add `value`, returning whatever fell out of the window.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        self.sum += value;
        if self.values.len() > self.capacity {
            let evicted = self.values.pop_front()?;
            self.sum -= evicted;
            return Some(evicted);
        }
        None
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Mean of the window, only once it holds exactly `capacity` values.
    pub fn mean(&self) -> Option<f64> {
        self.is_full().then(|| self.sum / self.capacity as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_and_tracks_sum() {
        let mut w = RollingWindow::new(3);
        assert!(w.is_empty());
        assert_eq!(w.push(1.0), None);
        assert_eq!(w.push(2.0), None);
        assert_eq!(w.mean(), None);
        assert_eq!(w.push(3.0), None);
        assert_eq!(w.mean(), Some(2.0));
        assert_eq!(w.push(4.0), Some(1.0));
        assert_eq!(w.sum(), 9.0);
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn capacity_one_tracks_last_value() {
        let mut w = RollingWindow::new(1);
        w.push(5.0);
        assert_eq!(w.mean(), Some(5.0));
        assert_eq!(w.push(7.0), Some(5.0));
        assert_eq!(w.mean(), Some(7.0));
    }
}
