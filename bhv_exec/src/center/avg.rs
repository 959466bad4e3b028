//! Running average of map frame center fixes

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bhv::Pose2D;
use nalgebra::Vector2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Fixed capacity ring of 2D samples which can be averaged.
///
/// Resetting the ring only rewinds the write index, old samples stay in storage until they are
/// overwritten. Averaging directly after a reset, before any new sample is recorded, reads back
/// the stale sample left in the first slot.
#[derive(Debug, Clone)]
pub struct RingAvg {
    samples: Vec<Vector2<f64>>,
    index: usize,
    full: bool,

    /// Set once the first sample is written, never cleared by a reset.
    written: bool,
}

/// Smooths the map frame center over the most recent fixes.
#[derive(Debug, Clone)]
pub struct CenterAvgFilter {
    ring: RingAvg,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RingAvg {
    /// Create a new ring.
    ///
    /// # Panics
    /// - If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            util::raise_error!("A RingAvg must have a non-zero capacity");
        }

        Self {
            samples: vec![Vector2::zeros(); capacity],
            index: 0,
            full: false,
            written: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Number of samples included in the average.
    pub fn count(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            self.index
        }
    }

    /// Write a sample, overwriting the oldest one once the ring is full.
    pub fn record(&mut self, sample: Vector2<f64>) {
        self.samples[self.index] = sample;
        self.index += 1;
        self.written = true;

        if self.index >= self.capacity() {
            self.index = 0;
            self.full = true;
        }
    }

    /// Mean of the samples in the ring, or `None` if nothing has ever been written.
    ///
    /// Directly after a reset the stale sample in slot 0 is returned.
    pub fn average(&self) -> Option<Vector2<f64>> {
        let count = match (self.count(), self.written) {
            (0, false) => return None,
            (0, true) => 1,
            (c, _) => c,
        };

        let sum = self.samples[..count]
            .iter()
            .fold(Vector2::<f64>::zeros(), |acc, s| acc + s);

        Some(sum / count as f64)
    }

    /// Rewind the write index and clear the full flag, leaving stored samples in place.
    pub fn reset(&mut self) {
        self.index = 0;
        self.full = false;
    }
}

impl CenterAvgFilter {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RingAvg::new(capacity),
        }
    }

    /// Record a new center fix and return the updated average.
    pub fn record(&mut self, fix: &Pose2D) -> Pose2D {
        self.ring.record(Vector2::new(fix.x, fix.y));

        // Can't be empty directly after a record
        self.average().unwrap_or(*fix)
    }

    /// Averaged center, with zero heading.
    pub fn average(&self) -> Option<Pose2D> {
        self.ring.average().map(|v| Pose2D::new(v.x, v.y, 0.0))
    }

    /// Restart averaging from the next fix. Stored fixes are not cleared.
    pub fn purge(&mut self) {
        self.ring.reset();
    }

    pub fn count(&self) -> usize {
        self.ring.count()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn mean(samples: &[f64]) -> f64 {
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    #[test]
    fn test_partial_fill() {
        let mut ring = RingAvg::new(20);
        assert_eq!(ring.average(), None);

        let xs: Vec<f64> = (1..=7).map(|i| i as f64 * 1.5).collect();
        for x in xs.iter() {
            ring.record(Vector2::new(*x, -x));
        }

        let avg = ring.average().unwrap();
        assert_eq!(ring.count(), 7);
        assert!((avg.x - mean(&xs)).abs() < 1e-12);
        assert!((avg.y + mean(&xs)).abs() < 1e-12);
    }

    #[test]
    fn test_oldest_evicted() {
        let mut ring = RingAvg::new(20);

        // Samples 1..=21, the first is overwritten by the 21st
        for i in 1..=21 {
            ring.record(Vector2::new(i as f64, 0.0));
        }

        let expected: Vec<f64> = (2..=21).map(|i| i as f64).collect();
        assert_eq!(ring.count(), 20);
        assert!((ring.average().unwrap().x - mean(&expected)).abs() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut ring = RingAvg::new(4);

        for i in 0..6 {
            ring.record(Vector2::new(i as f64, 0.0));
        }
        ring.reset();

        // Slot 0 holds the 5th sample after the wrap, which is read back
        assert_eq!(ring.count(), 0);
        assert_eq!(ring.average(), Some(Vector2::new(4.0, 0.0)));

        // New samples overwrite from slot 0
        ring.record(Vector2::new(10.0, 2.0));
        assert_eq!(ring.count(), 1);
        assert_eq!(ring.average(), Some(Vector2::new(10.0, 2.0)));
    }

    #[test]
    fn test_center_filter() {
        let mut filter = CenterAvgFilter::new(20);

        let avg = filter.record(&Pose2D::new(1.0, 1.0, 0.7));
        assert_eq!(avg, Pose2D::new(1.0, 1.0, 0.0));

        let avg = filter.record(&Pose2D::new(3.0, -1.0, 0.0));
        assert_eq!(avg, Pose2D::new(2.0, 0.0, 0.0));

        filter.purge();
        assert_eq!(filter.count(), 0);
        assert_eq!(filter.average(), Some(Pose2D::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_reset_before_wrap() {
        let mut ring = RingAvg::new(20);

        ring.record(Vector2::new(7.0, 3.0));
        ring.record(Vector2::new(9.0, 5.0));
        ring.record(Vector2::new(11.0, 7.0));
        ring.reset();

        assert_eq!(ring.average(), Some(Vector2::new(7.0, 3.0)));

        // Never written, nothing to read back
        let mut empty = RingAvg::new(20);
        empty.reset();
        assert_eq!(empty.average(), None);
    }
}
