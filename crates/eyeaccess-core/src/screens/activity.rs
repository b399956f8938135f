//! Activity monitor screen.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use super::{ActionOutcome, ButtonView};
use crate::activity::{ActivityKind, ActivityLogEntry, ActivityStats};
use crate::context::AppContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryRow {
    pub id: String,
    pub kind: ActivityKind,
    pub description: String,
    pub details: Option<String>,
    /// "Jan 5"
    pub date: String,
    /// "02:30 PM"
    pub time: String,
}

impl EntryRow {
    /// "Jan 5 at 02:30 PM"
    pub fn when(&self) -> String {
        format!("{} at {}", self.date, self.time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityView {
    pub title: String,
    pub subtitle: String,
    pub stats: Vec<StatCard>,
    pub section_title: String,
    pub clear_button: ButtonView,
    /// Newest first.
    pub entries: Vec<EntryRow>,
    pub empty_state: Option<EmptyState>,
}

pub fn view(ctx: &AppContext) -> ActivityView {
    view_in(ctx, &Local)
}

/// Same as [`view`] with timestamps rendered in `tz`.
pub fn view_in<Tz: TimeZone>(ctx: &AppContext, tz: &Tz) -> ActivityView
where
    Tz::Offset: std::fmt::Display,
{
    let entries: Vec<EntryRow> = ctx
        .activity()
        .newest_first()
        .map(|entry| entry_row(entry, tz))
        .collect();
    let empty_state = entries.is_empty().then(|| EmptyState {
        title: "No activity logs yet".into(),
        subtitle: "Start using eye tracking to see your activity history".into(),
    });

    ActivityView {
        title: "Activity Monitor".into(),
        subtitle: "Track your eye control usage and performance".into(),
        stats: stat_cards(&ctx.stats()),
        section_title: "Recent Activity".into(),
        clear_button: ButtonView::new("Clear", !entries.is_empty()),
        entries,
        empty_state,
    }
}

pub fn clear(ctx: &mut AppContext) -> ActionOutcome {
    ctx.clear_activity();
    ActionOutcome::none()
}

fn stat_cards(stats: &ActivityStats) -> Vec<StatCard> {
    let accuracy = match stats.avg_accuracy_pct {
        Some(pct) => format!("{pct:.1}%"),
        None => "--".into(),
    };
    [
        (stats.total_sessions.to_string(), "Total Sessions"),
        (format!("{}m", stats.total_gaze_minutes), "Gaze Time"),
        (stats.total_clicks.to_string(), "Total Clicks"),
        (accuracy, "Accuracy"),
    ]
    .into_iter()
    .map(|(value, label)| StatCard {
        value,
        label: label.into(),
    })
    .collect()
}

fn entry_row<Tz: TimeZone>(entry: &ActivityLogEntry, tz: &Tz) -> EntryRow
where
    Tz::Offset: std::fmt::Display,
{
    let (date, time) = format_timestamp(&entry.timestamp, tz);
    EntryRow {
        id: entry.id.clone(),
        kind: entry.kind,
        description: entry.description.clone(),
        details: entry.details.clone(),
        date,
        time,
    }
}

/// Short month and day, then 12-hour time with a two-digit hour.
pub fn format_timestamp<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> (String, String)
where
    Tz::Offset: std::fmt::Display,
{
    let local = ts.with_timezone(tz);
    (
        local.format("%b %-d").to_string(),
        local.format("%I:%M %p").to_string(),
    )
}
