//! Fixed-capacity sample window for one channel
//!
//! A ring buffer of the most recent N intensities. Pushing into a full
//! window evicts the oldest value, so the window always holds the latest
//! N samples in arrival order.

use ringbuf::{traits::*, HeapRb};
use std::fmt;

/// Sliding sample window over one channel's intensities
pub struct ChannelWindow {
    ring: HeapRb<f64>,
    evicted_count: u64,
}

impl fmt::Debug for ChannelWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelWindow")
            .field("len", &self.ring.occupied_len())
            .field("capacity", &self.ring.capacity().get())
            .field("evicted", &self.evicted_count)
            .finish()
    }
}

impl ChannelWindow {
    /// Create a window holding at most `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: HeapRb::new(capacity),
            evicted_count: 0,
        }
    }

    /// Push a sample, evicting the oldest when full
    #[inline]
    pub fn push(&mut self, value: f64) {
        if self.ring.is_full() {
            let _ = self.ring.try_pop();
            self.evicted_count += 1;
        }
        let _ = self.ring.try_push(value);
    }

    /// Number of samples currently held
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    /// Whether the window holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Whether the window has reached capacity
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Window capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity().get()
    }

    /// Samples in arrival order, oldest first
    pub fn values(&self) -> Vec<f64> {
        self.ring.iter().copied().collect()
    }

    /// Discard all held samples
    pub fn clear(&mut self) {
        self.ring.clear();
    }

    /// Values evicted by overflow since creation
    pub fn evicted_count(&self) -> u64 {
        self.evicted_count
    }

    /// Arithmetic mean of the held samples
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let sum: f64 = self.ring.iter().sum();
        Some(sum / self.len() as f64)
    }

    /// Sample standard deviation (N-1 divisor) of the held samples
    ///
    /// Computed about the unrounded mean. Needs at least two samples.
    pub fn sample_stddev(&self) -> Option<f64> {
        let n = self.len();
        if n < 2 {
            return None;
        }
        let mean = self.mean()?;
        let sum_sq: f64 = self.ring.iter().map(|v| (v - mean).powi(2)).sum();
        Some((sum_sq / (n - 1) as f64).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_fills_to_capacity() {
        let mut window = ChannelWindow::new(3);
        assert!(window.is_empty());

        window.push(1.0);
        window.push(2.0);
        assert!(!window.is_full());

        window.push(3.0);
        assert!(window.is_full());
        assert_eq!(window.values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut window = ChannelWindow::new(3);
        for v in 1..=5 {
            window.push(f64::from(v));
        }
        assert_eq!(window.values(), vec![3.0, 4.0, 5.0]);
        assert_eq!(window.evicted_count(), 2);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_mean_and_stddev() {
        let mut window = ChannelWindow::new(5);
        for v in 1..=5 {
            window.push(f64::from(v));
        }
        assert_eq!(window.mean(), Some(3.0));
        let stddev = window.sample_stddev().unwrap();
        assert!((stddev - 2.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_identical_values_have_zero_spread() {
        let mut window = ChannelWindow::new(4);
        for _ in 0..4 {
            window.push(7.25);
        }
        assert_eq!(window.sample_stddev(), Some(0.0));
    }

    #[test]
    fn test_stats_need_enough_samples() {
        let mut window = ChannelWindow::new(4);
        assert_eq!(window.mean(), None);
        window.push(1.0);
        assert_eq!(window.mean(), Some(1.0));
        assert_eq!(window.sample_stddev(), None);
    }

    #[test]
    fn test_clear_resets_contents_not_eviction_count() {
        let mut window = ChannelWindow::new(2);
        window.push(1.0);
        window.push(2.0);
        window.push(3.0);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.evicted_count(), 1);
    }
}
