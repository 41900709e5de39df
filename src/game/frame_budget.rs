//! Frame budget monitoring
//!
//! Update and draw must both finish before the next display refresh. This
//! tracks a rolling window of frame work durations against that budget.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::warn;

/// Samples needed before the status is trusted
const MIN_SAMPLES: usize = 10;

/// Budget status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetStatus {
    /// Average below 70% of the frame budget
    #[default]
    Healthy,
    /// Average between 70% and 100%
    Tight,
    /// Average above the frame budget; frames will be dropped by the host
    Over,
}

/// Rolling frame-time monitor
#[derive(Debug)]
pub struct FrameBudget {
    samples: VecDeque<Duration>,
    max_samples: usize,
    budget: Duration,
    status: BudgetStatus,
    frame_start: Option<Instant>,
}

impl FrameBudget {
    pub fn new(refresh_hz: u32) -> Self {
        let budget = Duration::from_nanos(1_000_000_000 / u64::from(refresh_hz.max(1)));
        Self {
            samples: VecDeque::with_capacity(120), // ~2 seconds at 60Hz
            max_samples: 120,
            budget,
            status: BudgetStatus::Healthy,
            frame_start: None,
        }
    }

    pub fn frame_start(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// Stop timing the current frame and return its duration
    pub fn frame_end(&mut self) -> Option<Duration> {
        let duration = self.frame_start.take()?.elapsed();
        self.record(duration);
        Some(duration)
    }

    /// Record a frame work duration
    pub fn record(&mut self, duration: Duration) {
        self.samples.push_back(duration);
        while self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        if self.samples.len() < MIN_SAMPLES {
            return;
        }

        let usage = self.usage_percent();
        let status = if usage < 70.0 {
            BudgetStatus::Healthy
        } else if usage <= 100.0 {
            BudgetStatus::Tight
        } else {
            BudgetStatus::Over
        };

        if status == BudgetStatus::Over && self.status != BudgetStatus::Over {
            warn!(
                "Frame work over budget: {:.1}% of {:?} (avg {:?})",
                usage,
                self.budget,
                self.average()
            );
        }
        self.status = status;
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.samples.iter().sum();
        sum / self.samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    /// Average frame work as a percentage of the budget (0-100+)
    pub fn usage_percent(&self) -> f32 {
        self.average().as_secs_f32() / self.budget.as_secs_f32() * 100.0
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn status(&self) -> BudgetStatus {
        self.status
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Default for FrameBudget {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_from_refresh_rate() {
        let budget = FrameBudget::new(50);
        assert_eq!(budget.budget(), Duration::from_millis(20));
        assert_eq!(budget.status(), BudgetStatus::Healthy);
    }

    #[test]
    fn test_status_needs_samples() {
        let mut budget = FrameBudget::new(60);
        for _ in 0..5 {
            budget.record(Duration::from_millis(50));
        }
        assert_eq!(budget.status(), BudgetStatus::Healthy);
    }

    #[test]
    fn test_status_levels() {
        let mut budget = FrameBudget::new(50);
        for _ in 0..10 {
            budget.record(Duration::from_millis(2));
        }
        assert_eq!(budget.status(), BudgetStatus::Healthy);

        let mut budget = FrameBudget::new(50);
        for _ in 0..10 {
            budget.record(Duration::from_millis(16));
        }
        assert_eq!(budget.status(), BudgetStatus::Tight);

        let mut budget = FrameBudget::new(50);
        for _ in 0..10 {
            budget.record(Duration::from_millis(30));
        }
        assert_eq!(budget.status(), BudgetStatus::Over);
    }

    #[test]
    fn test_rolling_window() {
        let mut budget = FrameBudget::new(60);
        for _ in 0..200 {
            budget.record(Duration::from_millis(1));
        }
        assert_eq!(budget.sample_count(), 120);
        assert_eq!(budget.max(), Duration::from_millis(1));
    }

    #[test]
    fn test_frame_timing() {
        let mut budget = FrameBudget::default();
        assert!(budget.frame_end().is_none());
        budget.frame_start();
        assert!(budget.frame_end().is_some());
        assert_eq!(budget.sample_count(), 1);
    }
}
