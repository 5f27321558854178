//! Session tally reacting to the detector callbacks.
//!
//! Stands in for the persistence layer of the full application: it only
//! counts within the process. Cloneable so the two callbacks and the main
//! loop can share one tally.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct SessionTally {
    inner: Arc<TallyInner>,
}

#[derive(Default)]
struct TallyInner {
    utterances_started: AtomicU64,
    repetitions: AtomicU64,
}

impl SessionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed utterance start.
    pub fn record_started(&self) {
        self.inner.utterances_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one completed repetition.
    pub fn record_completed(&self) {
        self.inner.repetitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn repetitions(&self) -> u64 {
        self.inner.repetitions.load(Ordering::Relaxed)
    }

    pub fn utterances_started(&self) -> u64 {
        self.inner.utterances_started.load(Ordering::Relaxed)
    }

    pub fn summary(&self, elapsed: Duration) -> SessionSummary {
        let repetitions = self.repetitions();
        let session_secs = elapsed.as_secs_f64();
        let repetitions_per_minute = if session_secs > 0.0 {
            repetitions as f64 * 60.0 / session_secs
        } else {
            0.0
        };
        SessionSummary {
            repetitions,
            utterances_started: self.utterances_started(),
            session_secs,
            repetitions_per_minute,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub repetitions: u64,
    pub utterances_started: u64,
    pub session_secs: f64,
    pub repetitions_per_minute: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_independently() {
        let tally = SessionTally::new();
        tally.record_started();
        tally.record_started();
        tally.record_completed();
        assert_eq!(tally.utterances_started(), 2);
        assert_eq!(tally.repetitions(), 1);
    }

    #[test]
    fn summary_computes_rate() {
        let tally = SessionTally::new();
        for _ in 0..6 {
            tally.record_started();
            tally.record_completed();
        }
        let summary = tally.summary(Duration::from_secs(120));
        assert_eq!(summary.repetitions, 6);
        assert!((summary.repetitions_per_minute - 3.0).abs() < 1e-9);
    }

    #[test]
    fn summary_handles_zero_elapsed() {
        let tally = SessionTally::new();
        let summary = tally.summary(Duration::ZERO);
        assert_eq!(summary.repetitions_per_minute, 0.0);
    }

    #[test]
    fn clones_share_counts() {
        let tally = SessionTally::new();
        let clone = tally.clone();
        clone.record_completed();
        assert_eq!(tally.repetitions(), 1);
    }
}
