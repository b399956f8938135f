use serde::{Deserialize, Serialize};

use super::{ActivityKind, ActivityLog, DEMO_SOURCE};

/// Usage summary shown above the activity list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub total_sessions: u64,
    pub total_gaze_minutes: u64,
    pub total_clicks: u64,
    /// No estimator reports accuracy yet; only the demo baseline carries one.
    pub avg_accuracy_pct: Option<f64>,
}

impl ActivityStats {
    /// Baseline shown alongside the demo log.
    pub fn demo() -> Self {
        Self {
            total_sessions: 12,
            total_gaze_minutes: 145,
            total_clicks: 234,
            avg_accuracy_pct: Some(95.2),
        }
    }

    /// Count entries in the log. Demo entries are not counted.
    pub fn from_log(log: &ActivityLog) -> Self {
        let mut stats = Self::default();
        let mut session_start = None;
        let mut gaze_ms: i64 = 0;

        for entry in log.entries() {
            match entry.source_event.as_deref() {
                Some(DEMO_SOURCE) => {}
                Some("tracking_started") => {
                    stats.total_sessions += 1;
                    session_start = Some(entry.timestamp);
                }
                Some("tracking_stopped") => {
                    if let Some(start) = session_start.take() {
                        gaze_ms += (entry.timestamp - start).num_milliseconds().max(0);
                    }
                }
                _ if entry.kind == ActivityKind::Click => stats.total_clicks += 1,
                _ => {}
            }
        }
        stats.total_gaze_minutes = (gaze_ms / 60_000) as u64;
        stats
    }

    /// Add `other`'s counters; accuracy keeps `self`'s value if set.
    pub fn combined(&self, other: &Self) -> Self {
        Self {
            total_sessions: self.total_sessions + other.total_sessions,
            total_gaze_minutes: self.total_gaze_minutes + other.total_gaze_minutes,
            total_clicks: self.total_clicks + other.total_clicks,
            avg_accuracy_pct: self.avg_accuracy_pct.or(other.avg_accuracy_pct),
        }
    }
}
