//! Record-local recheck timer
//!
//! The governor arms this while a process waits on a power or foreground
//! condition and polls [`RecordTimer::is_due`] from its own loop. Settling
//! the record stops it.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTimer {
    deadline: Option<Instant>,
    period: Duration,
}

impl RecordTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `period` after `now`
    pub fn start_at(&mut self, period: Duration, now: Instant) {
        self.period = period;
        self.deadline = Some(now + period);
    }

    pub fn start(&mut self, period: Duration) {
        self.start_at(period, Instant::now());
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Re-arm for another period if due; returns whether it fired
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.deadline = Some(now + self.period);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_and_rearms() {
        let start = Instant::now();
        let mut timer = RecordTimer::new();
        assert!(!timer.is_due(start));

        timer.start_at(Duration::from_secs(5), start);
        assert!(timer.is_running());
        assert!(!timer.fire_if_due(start + Duration::from_secs(4)));
        assert!(timer.fire_if_due(start + Duration::from_secs(5)));
        assert!(!timer.is_due(start + Duration::from_secs(9)));
        assert!(timer.is_due(start + Duration::from_secs(10)));

        timer.stop();
        assert!(!timer.is_due(start + Duration::from_secs(60)));
    }
}
