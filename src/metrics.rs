use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Utc};

/// Thread-safe run counters plus a start timestamp. Every field mutation
/// goes through `inner`'s mutex, held for the minimum duration of a single
/// field update.
#[derive(Debug)]
pub struct Metrics {
    inner: Mutex<Counters>,
    start_instant: Mutex<Instant>,
    start_wall_clock: Mutex<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    files_processed: u64,
    directories_processed: u64,
    errors_encountered: u64,
    skipped_files: u64,
}

/// Snapshot of `Metrics` taken at summary time, with `elapsed_time` already
/// rendered to its three-decimal string form (§3, §4.7).
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub files_processed: u64,
    pub directories_processed: u64,
    pub errors_encountered: u64,
    pub skipped_files: u64,
    pub start_time: DateTime<Utc>,
    pub elapsed_time: String,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters::default()),
            start_instant: Mutex::new(Instant::now()),
            start_wall_clock: Mutex::new(Utc::now()),
        }
    }

    pub fn incr_files_processed(&self) {
        self.inner.lock().unwrap().files_processed += 1;
    }

    pub fn incr_directories_processed(&self) {
        self.inner.lock().unwrap().directories_processed += 1;
    }

    pub fn incr_errors(&self) {
        self.inner.lock().unwrap().errors_encountered += 1;
    }

    pub fn incr_skipped(&self) {
        self.inner.lock().unwrap().skipped_files += 1;
    }

    /// Restores all counters to zero and resets `start_time` to now.
    pub fn reset(&self) {
        *self.inner.lock().unwrap() = Counters::default();
        *self.start_instant.lock().unwrap() = Instant::now();
        *self.start_wall_clock.lock().unwrap() = Utc::now();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = *self.inner.lock().unwrap();
        let start_instant = *self.start_instant.lock().unwrap();
        let start_wall_clock = *self.start_wall_clock.lock().unwrap();
        let elapsed = start_instant.elapsed().as_secs_f64();
        MetricsSnapshot {
            files_processed: c.files_processed,
            directories_processed: c.directories_processed,
            errors_encountered: c.errors_encountered,
            skipped_files: c.skipped_files,
            start_time: start_wall_clock,
            elapsed_time: format!("{elapsed:.3}s"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_only_increase() {
        let m = Metrics::new();
        m.incr_files_processed();
        m.incr_files_processed();
        m.incr_errors();
        let snap = m.snapshot();
        assert_eq!(snap.files_processed, 2);
        assert_eq!(snap.errors_encountered, 1);
        assert_eq!(snap.skipped_files, 0);
    }

    #[test]
    fn reset_zeroes_counters() {
        let m = Metrics::new();
        m.incr_files_processed();
        m.incr_skipped();
        m.reset();
        let snap = m.snapshot();
        assert_eq!(snap.files_processed, 0);
        assert_eq!(snap.skipped_files, 0);
    }

    #[test]
    fn elapsed_time_has_three_fractional_digits() {
        let m = Metrics::new();
        let snap = m.snapshot();
        assert!(snap.elapsed_time.ends_with('s'));
        let digits = &snap.elapsed_time[snap.elapsed_time.find('.').unwrap() + 1..snap.elapsed_time.len() - 1];
        assert_eq!(digits.len(), 3);
    }
}
