use crate::snapshot::DataSnapshot;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

pub const PORTFOLIO_METRICS_FIELD: &str = "portfolioMetrics";
pub const BUILDING_DATA_FIELD: &str = "buildingData";

pub fn age_in_minutes(snapshot: &DataSnapshot) -> i64 {
    age_in_minutes_at(snapshot, Utc::now())
}

pub fn age_in_minutes_at(snapshot: &DataSnapshot, now: DateTime<Utc>) -> i64 {
    (now - snapshot.timestamp()).num_seconds().div_euclid(60)
}

pub fn format_timestamp(snapshot: &DataSnapshot) -> String {
    format_timestamp_in(snapshot, &Local)
}

pub fn format_timestamp_in<Tz>(snapshot: &DataSnapshot, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    snapshot
        .timestamp()
        .with_timezone(tz)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

pub fn describe_age(minutes: i64) -> String {
    match minutes {
        m if m < 1 => "just now".to_string(),
        1 => "1 minute ago".to_string(),
        m if m < 60 => format!("{} minutes ago", m),
        m if m < 120 => "1 hour ago".to_string(),
        m if m < 1440 => format!("{} hours ago", m / 60),
        m if m < 2880 => "1 day ago".to_string(),
        m => format!("{} days ago", m / 1440),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotValidation {
    pub is_valid: bool,
    pub missing_fields: Vec<&'static str>,
}

// UNIFORMAT and forecast sections are allowed to be empty.
pub fn validate(snapshot: &DataSnapshot) -> SnapshotValidation {
    let mut missing_fields = Vec::new();

    if snapshot.portfolio_metrics().is_empty() {
        missing_fields.push(PORTFOLIO_METRICS_FIELD);
    }

    if snapshot.building_data().is_empty() {
        missing_fields.push(BUILDING_DATA_FIELD);
    }

    SnapshotValidation {
        is_valid: missing_fields.is_empty(),
        missing_fields,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotStatus {
    Locked,
    Stale,
}

impl SnapshotStatus {
    pub fn of(snapshot: &DataSnapshot, current: &Value) -> Self {
        if snapshot.has_changed(current) {
            SnapshotStatus::Stale
        } else {
            SnapshotStatus::Locked
        }
    }

    pub fn is_stale(self) -> bool {
        self == SnapshotStatus::Stale
    }

    pub fn label(self) -> &'static str {
        match self {
            SnapshotStatus::Locked => "Data locked",
            SnapshotStatus::Stale => "Data has changed since this snapshot",
        }
    }
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
