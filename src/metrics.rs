//! Engine activity counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

pub struct EngineMetrics {
    started: Instant,
    commands: AtomicU64,
    rounds_settled: AtomicU64,
    timeouts_fired: AtomicU64,
    penalties_charged: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            commands: AtomicU64::new(0),
            rounds_settled: AtomicU64::new(0),
            timeouts_fired: AtomicU64::new(0),
            penalties_charged: AtomicU64::new(0),
        }
    }

    pub fn record_command(&self) {
        self.commands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_round_settled(&self) {
        self.rounds_settled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeouts(&self, count: u64) {
        self.timeouts_fired.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_penalty(&self) {
        self.penalties_charged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.started.elapsed().as_secs(),
            commands: self.commands.load(Ordering::Relaxed),
            rounds_settled: self.rounds_settled.load(Ordering::Relaxed),
            timeouts_fired: self.timeouts_fired.load(Ordering::Relaxed),
            penalties_charged: self.penalties_charged.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub commands: u64,
    pub rounds_settled: u64,
    pub timeouts_fired: u64,
    pub penalties_charged: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = EngineMetrics::new();
        metrics.record_command();
        metrics.record_command();
        metrics.record_round_settled();
        metrics.record_timeouts(3);
        metrics.record_penalty();

        let snap = metrics.snapshot();
        assert_eq!(snap.commands, 2);
        assert_eq!(snap.rounds_settled, 1);
        assert_eq!(snap.timeouts_fired, 3);
        assert_eq!(snap.penalties_charged, 1);
    }
}
