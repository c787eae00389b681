//! Explore/exploit schedule for the reinforcement agent.

/// Explore rate above which each explore step decays the rate.
pub const DECAY_FLOOR: f64 = 0.25;

/// Per-step decay coefficient; the decrement is `steps × DECAY_STEP`.
pub const DECAY_STEP: f64 = 0.001;

/// Current explore rate plus the number of explore steps taken.
///
/// The decrement grows with the step counter, so decay accelerates; it only
/// applies while the rate is above [`DECAY_FLOOR`] and may overshoot it. The
/// rate is kept within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplorationSchedule {
    rate: f64,
    steps: u64,
}

impl ExplorationSchedule {
    /// Creates a schedule starting at `rate` (clamped into `[0, 1]`).
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
            steps: 0,
        }
    }

    /// Probability of exploring on the next decision.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Explore steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns true if a uniform sample `u` in `[0, 1)` selects exploration.
    pub fn should_explore(&self, u: f64) -> bool {
        u < self.rate
    }

    /// Records one explore step and decays the rate.
    pub fn record_explore(&mut self) {
        self.steps += 1;
        if self.rate > DECAY_FLOOR {
            self.rate = (self.rate - self.steps as f64 * DECAY_STEP).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_rate() {
        assert_eq!(ExplorationSchedule::new(1.7).rate(), 1.0);
        assert_eq!(ExplorationSchedule::new(-0.2).rate(), 0.0);
    }

    #[test]
    fn decay_accelerates() {
        let mut s = ExplorationSchedule::new(1.0);
        s.record_explore();
        assert!((s.rate() - 0.999).abs() < 1e-12);
        s.record_explore();
        assert!((s.rate() - 0.997).abs() < 1e-12);
        s.record_explore();
        assert!((s.rate() - 0.994).abs() < 1e-12);
        assert_eq!(s.steps(), 3);
    }

    #[test]
    fn decay_stops_at_or_below_floor() {
        let mut s = ExplorationSchedule::new(1.0);
        while s.rate() > DECAY_FLOOR {
            s.record_explore();
        }
        let settled = s.rate();
        assert!(settled <= DECAY_FLOOR);
        for _ in 0..100 {
            s.record_explore();
        }
        assert_eq!(s.rate(), settled);
    }

    #[test]
    fn rate_never_negative() {
        let mut s = ExplorationSchedule::new(0.26);
        s.steps = 10_000;
        s.record_explore();
        assert_eq!(s.rate(), 0.0);
    }

    #[test]
    fn zero_rate_never_explores() {
        let s = ExplorationSchedule::new(0.0);
        assert!(!s.should_explore(0.0));
        let s = ExplorationSchedule::new(1.0);
        assert!(s.should_explore(0.999_999));
    }
}
