use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Shared transfer counters for one job.
///
/// Every worker owns exactly one slot and only ever adds to it, so no two
/// writers touch the same counter; readers sum the slots for the aggregate.
/// The tracker lives as long as the job and is dropped with it.
pub struct ProgressTracker {
    total_size: Option<u64>,
    counters: Vec<AtomicU64>,
    started_at: Instant,
}

impl ProgressTracker {
    pub fn new(total_size: Option<u64>, worker_count: usize) -> ProgressTracker {
        ProgressTracker {
            total_size,
            counters: (0..worker_count).map(|_| AtomicU64::new(0)).collect(),
            started_at: Instant::now(),
        }
    }

    /// Adds `delta` bytes to `worker`'s counter.
    pub fn record(&self, worker: usize, delta: u64) {
        self.counters[worker].fetch_add(delta, Ordering::Relaxed);
    }

    /// Aggregate bytes transferred across all workers.
    pub fn transferred(&self) -> u64 {
        self.counters
            .iter()
            .map(|counter| counter.load(Ordering::Relaxed))
            .sum()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            transferred: self.transferred(),
            total_size: self.total_size,
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

/// Point-in-time view used for rendering.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot {
    pub transferred: u64,
    pub total_size: Option<u64>,
    pub elapsed_secs: f64,
}

impl ProgressSnapshot {
    /// Average speed in bytes per second since the job started, or `None`
    /// while no wall-clock time has elapsed yet.
    pub fn speed(&self) -> Option<f64> {
        if self.elapsed_secs <= 0.0 {
            return None;
        }
        Some(self.transferred as f64 / self.elapsed_secs)
    }

    /// Fraction complete in `[0, 1]`, `None` when the total is unknown.
    /// An empty resource counts as complete.
    pub fn fraction(&self) -> Option<f64> {
        let total_size = self.total_size?;
        if total_size == 0 {
            return Some(1.0);
        }
        Some((self.transferred as f64 / total_size as f64).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_worker_counters() {
        let tracker = ProgressTracker::new(Some(1000), 3);
        tracker.record(0, 100);
        tracker.record(1, 250);
        tracker.record(2, 50);
        tracker.record(0, 100);
        assert_eq!(tracker.transferred(), 500);
    }

    #[test]
    fn percentage_is_monotonic_and_capped() {
        let tracker = ProgressTracker::new(Some(100), 1);
        let mut previous = 0.0;
        for _ in 0..30 {
            tracker.record(0, 5);
            let fraction = tracker.snapshot().fraction().unwrap();
            assert!(fraction >= previous);
            assert!(fraction <= 1.0);
            previous = fraction;
        }
        // 30 * 5 = 150 recorded bytes against a total of 100
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn unknown_total_has_no_fraction() {
        let tracker = ProgressTracker::new(None, 2);
        tracker.record(1, 4096);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.fraction(), None);
        assert_eq!(snapshot.transferred, 4096);
    }

    #[test]
    fn speed_guards_zero_elapsed_time() {
        let snapshot = ProgressSnapshot {
            transferred: 1024,
            total_size: None,
            elapsed_secs: 0.0,
        };
        assert_eq!(snapshot.speed(), None);

        let snapshot = ProgressSnapshot {
            transferred: 4096,
            total_size: None,
            elapsed_secs: 2.0,
        };
        assert_eq!(snapshot.speed(), Some(2048.0));
    }

    #[test]
    fn empty_resource_reads_as_complete() {
        let tracker = ProgressTracker::new(Some(0), 1);
        assert_eq!(tracker.snapshot().fraction(), Some(1.0));
    }
}
