//! In-memory activity log.
//!
//! Append and clear only: no deduplication, no size bound, nothing written to
//! disk. Entries keep insertion order; screens show them newest first.

mod stats;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::Event;

pub use stats::ActivityStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Gaze,
    Blink,
    Click,
    Calibration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Name of the core event this entry was recorded from, or
    /// [`DEMO_SOURCE`] for seeded entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_event: Option<String>,
}

impl ActivityLogEntry {
    pub fn new(kind: ActivityKind, timestamp: DateTime<Utc>, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            timestamp,
            description: description.into(),
            details: None,
            source_event: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn from_event(event: &Event) -> Option<Self> {
        let entry = match event {
            Event::CalibrationCompleted { total_steps, at } => {
                Self::new(ActivityKind::Calibration, *at, "Eye tracking calibrated")
                    .with_details(format!("{total_steps}-point calibration completed"))
            }
            Event::CalibrationSkipped { at_step, at } => {
                Self::new(ActivityKind::Calibration, *at, "Calibration skipped")
                    .with_details(format!("Skipped at step {}", at_step + 1))
            }
            Event::CalibrationReset { at } => {
                Self::new(ActivityKind::Calibration, *at, "Calibration reset")
            }
            Event::TrackingStarted { at, .. } => {
                Self::new(ActivityKind::Gaze, *at, "Eye tracking session started")
            }
            Event::TrackingStopped { samples, at, .. } => {
                Self::new(ActivityKind::Gaze, *at, "Eye tracking session ended")
                    .with_details(format!("Gaze samples: {samples}"))
            }
            Event::ControlActivated { at } => {
                Self::new(ActivityKind::Gaze, *at, "Eye control activated")
            }
            Event::ControlDeactivated { at } => {
                Self::new(ActivityKind::Gaze, *at, "Eye control deactivated")
            }
            Event::EmergencyStop { was_active, at } => {
                let entry = Self::new(ActivityKind::Gaze, *at, "Emergency stop");
                if *was_active {
                    entry.with_details("Eye control was active")
                } else {
                    entry
                }
            }
            Event::CalibrationStarted { .. }
            | Event::CalibrationStepConfirmed { .. }
            | Event::CalibrationStepAdvanced { .. }
            | Event::NoticeDue { .. }
            | Event::StateSnapshot { .. } => return None,
        };
        Some(Self {
            source_event: Some(event.name().to_string()),
            ..entry
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityLog {
    entries: Vec<ActivityLogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding the demo entries.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self {
            entries: demo_entries(now),
        }
    }

    pub fn append(&mut self, entry: ActivityLogEntry) {
        debug!(id = %entry.id, kind = ?entry.kind, "activity appended");
        self.entries.push(entry);
    }

    /// Record an event if it maps to an activity entry.
    /// Returns whether an entry was appended.
    pub fn record(&mut self, event: &Event) -> bool {
        match ActivityLogEntry::from_event(event) {
            Some(entry) => {
                self.append(entry);
                true
            }
            None => false,
        }
    }

    /// Remove every entry. Irreversible.
    pub fn clear(&mut self) {
        debug!(removed = self.entries.len(), "activity log cleared");
        self.entries.clear();
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ActivityLogEntry] {
        &self.entries
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &ActivityLogEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `source_event` marker carried by demo entries.
pub const DEMO_SOURCE: &str = "demo";

/// The six demo entries, oldest first, spread over the last half hour.
pub fn demo_entries(now: DateTime<Utc>) -> Vec<ActivityLogEntry> {
    let seed = [
        ("1", ActivityKind::Calibration, 30, "Eye tracking calibrated", "5-point calibration completed"),
        ("2", ActivityKind::Gaze, 25, "Eye tracking session started", "Duration: 15 minutes"),
        ("3", ActivityKind::Click, 20, "Double blink detected", "Action: Tap on home button"),
        ("4", ActivityKind::Click, 18, "Double blink detected", "Action: Open messages app"),
        ("5", ActivityKind::Gaze, 10, "Eye tracking session ended", "Total interactions: 23"),
        ("6", ActivityKind::Calibration, 5, "Recalibration performed", "Accuracy improved to 97.8%"),
    ];
    seed.into_iter()
        .map(|(id, kind, minutes_ago, description, details)| ActivityLogEntry {
            id: id.to_string(),
            kind,
            timestamp: now - Duration::minutes(minutes_ago),
            description: description.to_string(),
            details: Some(details.to_string()),
            source_event: Some(DEMO_SOURCE.to_string()),
        })
        .collect()
}
