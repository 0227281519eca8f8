// src/drag.rs
use crate::model::{CalendarDate, WorkoutEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    #[error("Only saved planned workouts can be moved.")]
    NotDraggable,
    #[error("A move is already in progress.")]
    Busy,
    #[error("Drag payload could not be read: {0}")]
    MalformedPayload(String),
}

/// What travels through the drag transfer channel between drag start and drop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragPayload {
    pub id: i64,
    #[serde(rename = "date", alias = "sourceDate")]
    pub source_date: CalendarDate,
}

impl DragPayload {
    pub fn encode(&self) -> String {
        // Two plain fields; serialising cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn decode(raw: &str) -> Result<Self, DragError> {
        serde_json::from_str(raw).map_err(|e| DragError::MalformedPayload(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging { payload: DragPayload },
    Moving { payload: DragPayload, target: CalendarDate },
}

/// What a drop asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropDecision {
    /// The payload was not ours (or was garbage); nothing happens.
    Ignored,
    /// Dropped back on the source date.
    NoOp,
    /// Issue exactly one move request, then call `finish_move`.
    Move {
        id: i64,
        from: CalendarDate,
        to: CalendarDate,
    },
}

/// Per-gesture state for drag-and-drop rescheduling.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    hover: Option<CalendarDate>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            hover: None,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, DragState::Moving { .. })
    }

    /// Starts a drag and returns the serialised payload for the transfer channel.
    pub fn start(&mut self, entry: &WorkoutEntry) -> Result<String, DragError> {
        if self.is_busy() {
            return Err(DragError::Busy);
        }
        let id = match entry.id {
            Some(id) if entry.is_draggable() => id,
            _ => return Err(DragError::NotDraggable),
        };
        let payload = DragPayload {
            id,
            source_date: entry.date,
        };
        debug!(id, source = %entry.date, "drag started");
        self.state = DragState::Dragging { payload };
        self.hover = None;
        Ok(payload.encode())
    }

    pub fn source_date(&self) -> Option<CalendarDate> {
        match self.state {
            DragState::Dragging { payload } | DragState::Moving { payload, .. } => {
                Some(payload.source_date)
            }
            DragState::Idle => None,
        }
    }

    /// The source cell is never a valid target for its own entry.
    pub fn is_valid_target(&self, date: CalendarDate) -> bool {
        match self.state {
            DragState::Dragging { payload } => payload.source_date != date,
            _ => false,
        }
    }

    pub fn drag_over(&mut self, date: CalendarDate) {
        if self.is_dragging() {
            self.hover = Some(date);
        }
    }

    pub fn drag_leave(&mut self) {
        self.hover = None;
    }

    pub fn hovered(&self) -> Option<CalendarDate> {
        self.hover
    }

    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("drag cancelled");
            self.state = DragState::Idle;
        }
        self.hover = None;
    }

    /// Consumes a raw transfer payload dropped on `target`.
    ///
    /// Malformed payloads are ignored rather than reported: they come from drag
    /// sources outside the calendar.
    pub fn drop_on(&mut self, raw: &str, target: CalendarDate) -> Result<DropDecision, DragError> {
        if self.is_busy() {
            return Err(DragError::Busy);
        }
        self.hover = None;
        let payload = match DragPayload::decode(raw) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("ignoring drop: {}", e);
                self.state = DragState::Idle;
                return Ok(DropDecision::Ignored);
            }
        };
        if payload.source_date == target {
            self.state = DragState::Idle;
            return Ok(DropDecision::NoOp);
        }
        self.state = DragState::Moving { payload, target };
        Ok(DropDecision::Move {
            id: payload.id,
            from: payload.source_date,
            to: target,
        })
    }

    /// Settles an in-flight move, whatever its result.
    pub fn finish_move(&mut self) {
        self.state = DragState::Idle;
    }
}
