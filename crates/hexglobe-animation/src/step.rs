//! Fixed-interval step timer.

/// Fires discrete steps `1..=target` at a fixed interval.
///
/// Step 0 is considered fired at creation. Each call to [`advance`](Self::advance)
/// accumulates elapsed time and reports how many further steps became due,
/// never going past `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTimer {
    interval_ms: f64,
    accumulated_ms: f64,
    current: usize,
    target: usize,
}

impl StepTimer {
    pub fn new(interval_ms: f64, target: usize) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            accumulated_ms: 0.0,
            current: 0,
            target,
        }
    }

    /// Advance by `dt_ms`, returning the range of newly fired steps.
    pub fn advance(&mut self, dt_ms: f64) -> std::ops::Range<usize> {
        let start = self.current + 1;
        if self.is_done() {
            return start..start;
        }
        if self.interval_ms <= 0.0 {
            self.current = self.target;
            return start..self.target + 1;
        }
        self.accumulated_ms += dt_ms.max(0.0);
        let due = (self.accumulated_ms / self.interval_ms).floor() as usize;
        let fired = due.min(self.target - self.current);
        self.accumulated_ms -= fired as f64 * self.interval_ms;
        if self.current + fired == self.target {
            self.accumulated_ms = 0.0;
        }
        self.current += fired;
        start..self.current + 1
    }

    /// Last fired step.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_one_step_per_interval() {
        let mut timer = StepTimer::new(10.0, 3);
        assert_eq!(timer.current(), 0);
        assert!(timer.advance(9.0).is_empty());
        assert_eq!(timer.advance(1.0), 1..2);
        assert_eq!(timer.advance(10.0), 2..3);
        assert_eq!(timer.advance(10.0), 3..4);
        assert!(timer.is_done());
        assert!(timer.advance(100.0).is_empty());
    }

    #[test]
    fn test_large_delta_fires_several_steps_capped_at_target() {
        let mut timer = StepTimer::new(10.0, 5);
        assert_eq!(timer.advance(35.0), 1..4);
        assert_eq!(timer.advance(1000.0), 4..6);
        assert_eq!(timer.current(), 5);
    }

    #[test]
    fn test_zero_interval_completes_at_once() {
        let mut timer = StepTimer::new(0.0, 4);
        assert_eq!(timer.advance(0.0), 1..5);
        assert!(timer.is_done());
    }

    #[test]
    fn test_zero_target_is_done() {
        let mut timer = StepTimer::new(10.0, 0);
        assert!(timer.is_done());
        assert!(timer.advance(50.0).is_empty());
    }
}
