//! Run time counter

use std::fmt;

/// Time since the behaviour loop was initialised, split into hours, minutes and seconds for the
/// logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunTime {
    start_ms: Option<i64>,
    elapsed_ms: i64,
}

impl RunTime {
    /// Start counting from `now_ms`.
    pub fn start(&mut self, now_ms: i64) {
        self.start_ms = Some(now_ms);
        self.elapsed_ms = 0;
    }

    /// Update the counter, does nothing if the counter hasn't been started.
    pub fn update(&mut self, now_ms: i64) {
        if let Some(start) = self.start_ms {
            self.elapsed_ms = (now_ms - start).max(0);
        }
    }

    pub fn hours(&self) -> i64 {
        self.elapsed_ms / 3_600_000
    }

    pub fn minutes(&self) -> i64 {
        (self.elapsed_ms / 60_000) % 60
    }

    /// Seconds within the current minute, truncated to tenths.
    pub fn seconds(&self) -> f64 {
        ((self.elapsed_ms % 60_000) / 100) as f64 / 10.0
    }
}

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} h {:02} min {:04.1} s",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_run_time() {
        let mut rt = RunTime::default();

        // Not started
        rt.update(5_000);
        assert_eq!(rt.seconds(), 0.0);

        rt.start(1_000);
        rt.update(1_000 + 2 * 3_600_000 + 61 * 60_000 + 7_890);

        assert_eq!(rt.hours(), 3);
        assert_eq!(rt.minutes(), 1);
        assert_eq!(rt.seconds(), 7.8);
        assert_eq!(rt.to_string(), "3 h 01 min 07.8 s");
    }
}
