// src/model.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Calendar day used as the grouping key. Time of day and timezone are discarded.
pub type CalendarDate = NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MAX_DESCRIPTION_LEN: usize = 150;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Description cannot be empty.")]
    EmptyDescription,
    #[error("Description is too long ({0} characters, max 150).")]
    DescriptionTooLong(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryKind {
    #[default]
    Planned,
    Imported,
}

impl EntryKind {
    /// Maps the wire `type` field. Anything that is not an imported-activity marker is planned.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "strava" || v == "imported" => Self::Imported,
            _ => Self::Planned,
        }
    }

    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Imported => "strava",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Planned => write!(f, "planned"),
            EntryKind::Imported => write!(f, "imported"),
        }
    }
}

/// Parses a wire date, ignoring any time suffix (`2024-06-03T07:00:00Z`).
pub fn parse_calendar_date(raw: &str) -> Result<CalendarDate, RecordError> {
    let trimmed = raw.trim();
    let day_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day_part, DATE_FORMAT)
        .map_err(|_| RecordError::InvalidDate(raw.to_string()))
}

pub fn format_calendar_date(date: CalendarDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Raw workout record as exchanged with the plans endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PlanRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub warmup_target: Option<String>,
    #[serde(default)]
    pub main_target: Option<String>,
    #[serde(default)]
    pub cooldown_target: Option<String>,
    #[serde(default)]
    pub terrain: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Targets {
    pub warmup: Option<String>,
    pub main: Option<String>,
    pub cooldown: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutEntry {
    pub id: Option<i64>, // None for unsaved drafts
    pub date: CalendarDate,
    pub kind: EntryKind,
    pub description: String,
    pub distance: Option<f64>,
    pub notes: Option<String>,
    pub targets: Targets,
    pub terrain: Option<String>,
}

impl WorkoutEntry {
    /// A new unsaved planned entry.
    pub fn draft(date: CalendarDate) -> Self {
        Self {
            id: None,
            date,
            kind: EntryKind::Planned,
            description: String::new(),
            distance: None,
            notes: None,
            targets: Targets::default(),
            terrain: None,
        }
    }

    pub fn from_record(record: PlanRecord) -> Result<Self, RecordError> {
        let date = parse_calendar_date(&record.date)?;
        Ok(Self {
            id: record.id,
            date,
            kind: EntryKind::from_wire(record.kind.as_deref()),
            description: record.description.unwrap_or_default(),
            distance: record.distance,
            notes: record.notes,
            targets: Targets {
                warmup: record.warmup_target,
                main: record.main_target,
                cooldown: record.cooldown_target,
            },
            terrain: record.terrain,
        })
    }

    pub fn to_record(&self) -> PlanRecord {
        PlanRecord {
            id: self.id,
            date: format_calendar_date(self.date),
            kind: Some(self.kind.as_wire().to_string()),
            description: Some(self.description.clone()),
            warmup_target: self.targets.warmup.clone(),
            main_target: self.targets.main.clone(),
            cooldown_target: self.targets.cooldown.clone(),
            terrain: self.terrain.clone(),
            notes: self.notes.clone(),
            distance: self.distance,
        }
    }

    pub fn is_planned(&self) -> bool {
        self.kind == EntryKind::Planned
    }

    /// Only saved planned entries can be dragged. Imported entries never can.
    pub fn is_draggable(&self) -> bool {
        self.is_planned() && self.id.is_some()
    }

    pub fn is_editable(&self) -> bool {
        self.is_draggable()
    }

    pub fn display_description(&self) -> &str {
        let trimmed = self.description.trim();
        if !trimmed.is_empty() {
            trimmed
        } else if self.is_planned() {
            "Planned workout"
        } else {
            "Imported activity"
        }
    }
}

/// Trims and checks a description before it is sent anywhere.
pub fn validate_description(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    let len = trimmed.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong(len));
    }
    Ok(trimmed.to_string())
}
