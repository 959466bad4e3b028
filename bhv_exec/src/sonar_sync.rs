//! # Sonar synchroniser
//!
//! The three sonars publish independently. Readings are only passed on to the controller as a
//! set of three taken at approximately the same time, any reading which can't be matched with
//! readings from the other two sonars is dropped.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use comms_if::bhv::{RangeMsg, SonarId};
use log::trace;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A matched set of sonar ranges.
///
/// Units: meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SonarTriple {
    pub left: f32,
    pub center: f32,
    pub right: f32,
}

/// Approximate time synchroniser for the three sonar streams.
#[derive(Debug, Clone)]
pub struct SonarSync {
    window_s: f64,
    queue_size: usize,

    /// Pending readings, indexed left, center, right
    queues: [VecDeque<RangeMsg>; 3],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SonarSync {
    pub fn new(window_s: f64, queue_size: usize) -> Self {
        Self {
            window_s,
            queue_size: queue_size.max(1),
            queues: Default::default(),
        }
    }

    /// Add a reading, returning a triple if one can now be matched.
    pub fn push(&mut self, msg: RangeMsg) -> Option<SonarTriple> {
        let queue = &mut self.queues[index(msg.sonar)];

        if queue.len() >= self.queue_size {
            queue.pop_front();
        }
        queue.push_back(msg);

        self.try_match()
    }

    /// Number of readings waiting for a match.
    pub fn pending(&self) -> usize {
        self.queues.iter().map(|q| q.len()).sum()
    }

    fn try_match(&mut self) -> Option<SonarTriple> {
        loop {
            let heads: Vec<DateTime<Utc>> = self
                .queues
                .iter()
                .map(|q| q.front().map(|m| m.stamp))
                .collect::<Option<_>>()?;

            // Index of the oldest and newest heads
            let (oldest, newest) = heads.iter().enumerate().fold((0, 0), |(o, n), (i, s)| {
                (
                    if *s < heads[o] { i } else { o },
                    if *s > heads[n] { i } else { n },
                )
            });

            let spread_s = (heads[newest] - heads[oldest])
                .num_microseconds()
                .map(|us| us as f64 * 1e-6)
                .unwrap_or(std::f64::INFINITY);

            if spread_s <= self.window_s {
                let [l, c, r] = &mut self.queues;
                let (l, c, r) = (l.pop_front()?, c.pop_front()?, r.pop_front()?);

                return Some(SonarTriple {
                    left: l.range_m,
                    center: c.range_m,
                    right: r.range_m,
                });
            }

            // The oldest head can never be matched with anything newer
            if let Some(dropped) = self.queues[oldest].pop_front() {
                trace!("Dropping unmatched {:?} sonar reading", dropped.sonar);
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn index(id: SonarId) -> usize {
    match id {
        SonarId::Left => 0,
        SonarId::Center => 1,
        SonarId::Right => 2,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    fn reading(sonar: SonarId, stamp: DateTime<Utc>, range_m: f32) -> RangeMsg {
        RangeMsg {
            stamp,
            sonar,
            range_m,
        }
    }

    #[test]
    fn test_triple_fires_once() {
        let t0 = Utc::now();
        let mut sync = SonarSync::new(0.1, 10);

        assert_eq!(sync.push(reading(SonarId::Left, t0, 1.0)), None);
        assert_eq!(
            sync.push(reading(SonarId::Right, t0 + Duration::milliseconds(20), 3.0)),
            None
        );

        let triple = sync.push(reading(SonarId::Center, t0 + Duration::milliseconds(40), 2.0));
        assert_eq!(
            triple,
            Some(SonarTriple {
                left: 1.0,
                center: 2.0,
                right: 3.0
            })
        );
        assert_eq!(sync.pending(), 0);

        // A further reading on it's own doesn't fire again
        assert_eq!(
            sync.push(reading(SonarId::Left, t0 + Duration::milliseconds(60), 1.0)),
            None
        );
    }

    #[test]
    fn test_stale_reading_dropped() {
        let t0 = Utc::now();
        let mut sync = SonarSync::new(0.1, 10);

        // Left reading far older than the others
        sync.push(reading(SonarId::Left, t0, 9.0));
        sync.push(reading(SonarId::Left, t0 + Duration::milliseconds(500), 1.0));
        sync.push(reading(SonarId::Center, t0 + Duration::milliseconds(510), 2.0));

        let triple = sync.push(reading(SonarId::Right, t0 + Duration::milliseconds(520), 3.0));
        assert_eq!(
            triple,
            Some(SonarTriple {
                left: 1.0,
                center: 2.0,
                right: 3.0
            })
        );
        assert_eq!(sync.pending(), 0);
    }

    #[test]
    fn test_queue_bounded() {
        let t0 = Utc::now();
        let mut sync = SonarSync::new(0.1, 3);

        for i in 0..10 {
            sync.push(reading(SonarId::Center, t0 + Duration::milliseconds(i * 10), 2.0));
        }

        assert_eq!(sync.pending(), 3);
    }
}
