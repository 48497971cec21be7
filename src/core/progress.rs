//! Throughput and ETA statistics for a running batch.

use std::time::Instant;

/// Coarse batch status for operator-facing output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Running,
    Stalled,
    Finished,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Running => write!(f, "Running"),
            BatchStatus::Stalled => write!(f, "Stalled"),
            BatchStatus::Finished => write!(f, "Finished"),
        }
    }
}

/// A duration broken into days, hours, and minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DhmSpan {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl DhmSpan {
    pub fn from_seconds(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
        }
    }
}

impl std::fmt::Display for DhmSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} days, {} hours, {} min", self.days, self.hours, self.minutes)
    }
}

/// One point-in-time snapshot of batch throughput
#[derive(Debug, Clone, Copy)]
pub struct ProgressEstimate {
    pub status: BatchStatus,
    /// Average seconds per completed item
    pub secs_per_item: f64,
    pub eta: DhmSpan,
    pub elapsed: DhmSpan,
    pub remaining: usize,
}

/// Tracks completions against wall-clock time for a single batch run
pub struct ProgressEstimator {
    started: Instant,
    total: usize,
    completed: usize,
    status: BatchStatus,
}

impl ProgressEstimator {
    pub fn new(total: usize) -> Self {
        Self {
            started: Instant::now(),
            total,
            completed: 0,
            status: BatchStatus::Running,
        }
    }

    pub fn record_completed(&mut self) {
        self.completed += 1;
        if self.completed >= self.total {
            self.status = BatchStatus::Finished;
        }
    }

    pub fn set_status(&mut self, status: BatchStatus) {
        self.status = status;
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    /// Current snapshot, or `None` before the first completion (the
    /// seconds-per-item division is undefined at zero).
    pub fn estimate(&self) -> Option<ProgressEstimate> {
        estimate_from(
            self.started.elapsed().as_secs_f64(),
            self.completed,
            self.remaining(),
            self.status,
        )
    }
}

/// Pure estimate computation, factored out of the clock for testability
pub fn estimate_from(
    elapsed_seconds: f64,
    completed: usize,
    remaining: usize,
    status: BatchStatus,
) -> Option<ProgressEstimate> {
    if completed == 0 {
        return None;
    }

    let secs_per_item = elapsed_seconds / completed as f64;
    Some(ProgressEstimate {
        status,
        secs_per_item,
        eta: DhmSpan::from_seconds((secs_per_item * remaining as f64) as u64),
        elapsed: DhmSpan::from_seconds(elapsed_seconds as u64),
        remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_estimate_before_first_completion() {
        assert!(estimate_from(42.0, 0, 10, BatchStatus::Running).is_none());
    }

    #[test]
    fn test_speed_and_eta() {
        let est = estimate_from(100.0, 4, 6, BatchStatus::Running).unwrap();
        assert_relative_eq!(est.secs_per_item, 25.0);
        // 25 s/item * 6 items = 150 s -> 0 days, 0 hours, 2 min
        assert_eq!(est.eta, DhmSpan { days: 0, hours: 0, minutes: 2 });
        assert_eq!(est.remaining, 6);
    }

    #[test]
    fn test_dhm_breakdown() {
        assert_eq!(
            DhmSpan::from_seconds(90_061),
            DhmSpan { days: 1, hours: 1, minutes: 1 }
        );
        assert_eq!(DhmSpan::from_seconds(59), DhmSpan { days: 0, hours: 0, minutes: 0 });
        assert_eq!(
            DhmSpan::from_seconds(86_400),
            DhmSpan { days: 1, hours: 0, minutes: 0 }
        );
    }

    #[test]
    fn test_estimator_transitions_to_finished() {
        let mut progress = ProgressEstimator::new(2);
        progress.record_completed();
        assert_eq!(progress.estimate().unwrap().status, BatchStatus::Running);
        progress.record_completed();
        assert_eq!(progress.estimate().unwrap().status, BatchStatus::Finished);
        assert_eq!(progress.remaining(), 0);
    }
}
