// src/modal.rs
use crate::config::ConfigError;
use crate::model::{
    format_calendar_date, validate_description, CalendarDate, EntryKind, PlanRecord,
    ValidationError, WorkoutEntry,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_MODAL_SIZE: Size = Size {
    width: 400.0,
    height: 300.0,
};

#[derive(Error, Debug)]
pub enum ModalError {
    #[error("The workout dialog is not open.")]
    NotOpen,
    #[error("A save is still in progress.")]
    SaveInFlight,
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Only saved planned workouts can be deleted.")]
    NotDeletable,
    #[error("Failed to persist dialog size: {0}")]
    Persist(#[from] ConfigError),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Bounding box of the element the modal centres itself on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Top-left corner that centres a box of `size` inside these bounds.
    pub fn centre_of(&self, size: Size) -> Position {
        Position {
            x: self.left + (self.width - size.width) / 2.0,
            y: self.top + (self.height - size.height) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeConstraints {
    pub min: Size,
    pub max: Size,
}

impl Default for SizeConstraints {
    fn default() -> Self {
        Self {
            min: Size {
                width: 300.0,
                height: 200.0,
            },
            max: Size {
                width: 800.0,
                height: 800.0,
            },
        }
    }
}

impl SizeConstraints {
    pub fn clamp(&self, size: Size) -> Size {
        Size {
            width: size.width.clamp(self.min.width, self.max.width),
            height: size.height.clamp(self.min.height, self.max.height),
        }
    }
}

/// The eight resize handles on the modal border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    /// Dragging this handle moves the left edge.
    pub const fn moves_left_edge(self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    /// Dragging this handle moves the top edge.
    pub const fn moves_top_edge(self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    pub const fn changes_width(self) -> bool {
        !matches!(self, Self::N | Self::S)
    }

    pub const fn changes_height(self) -> bool {
        !matches!(self, Self::E | Self::W)
    }
}

/// Read-only access to the surrounding viewport.
pub trait ViewportProbe {
    fn is_compact(&self) -> bool;
}

/// Durable storage for the user's preferred modal size.
pub trait SizeStore {
    fn load(&self) -> Option<Size>;
    fn save(&mut self, size: Size) -> Result<(), ConfigError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemorySizeStore {
    pub size: Option<Size>,
    pub saves: usize,
}

impl SizeStore for MemorySizeStore {
    fn load(&self) -> Option<Size> {
        self.size
    }

    fn save(&mut self, size: Size) -> Result<(), ConfigError> {
        self.size = Some(size);
        self.saves += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalTarget {
    Add { date: CalendarDate },
    Edit { entry: WorkoutEntry },
}

impl ModalTarget {
    pub fn date(&self) -> CalendarDate {
        match self {
            Self::Add { date } => *date,
            Self::Edit { entry } => entry.date,
        }
    }

    pub fn entry_id(&self) -> Option<i64> {
        match self {
            Self::Add { .. } => None,
            Self::Edit { entry } => entry.id,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edit { .. })
    }

    pub fn key(&self) -> ModalKey {
        ModalKey {
            date: self.date(),
            entry_id: self.entry_id(),
        }
    }
}

/// Identity of one modal session: a different key means fresh geometry and draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalKey {
    pub date: CalendarDate,
    pub entry_id: Option<i64>,
}

impl fmt::Display for ModalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry_id {
            Some(id) => write!(f, "{}-{}", format_calendar_date(self.date), id),
            None => write!(f, "{}-new", format_calendar_date(self.date)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Escape,
    Backdrop,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveGate {
    Idle,
    Saving,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Create(PlanRecord),
    Update { id: i64, record: PlanRecord },
}

/// State machine and geometry for the floating add/edit dialog.
pub struct ModalManager<V: ViewportProbe, P: SizeStore> {
    phase: ModalPhase,
    target: Option<ModalTarget>,
    draft: WorkoutEntry,
    size: Size,
    position: Option<Position>,
    user_moved: bool,
    gate: SaveGate,
    error_message: Option<String>,
    constraints: SizeConstraints,
    viewport: V,
    sizes: P,
}

impl<V: ViewportProbe, P: SizeStore> ModalManager<V, P> {
    pub fn new(viewport: V, sizes: P, constraints: SizeConstraints) -> Self {
        let size = constraints.clamp(sizes.load().unwrap_or(DEFAULT_MODAL_SIZE));
        Self {
            phase: ModalPhase::Closed,
            target: None,
            draft: WorkoutEntry::draft(CalendarDate::default()),
            size,
            position: None,
            user_moved: false,
            gate: SaveGate::Idle,
            error_message: None,
            constraints,
            viewport,
            sizes,
        }
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.phase, ModalPhase::Opening | ModalPhase::Open)
    }

    pub fn is_saving(&self) -> bool {
        self.gate == SaveGate::Saving
    }

    pub fn target(&self) -> Option<&ModalTarget> {
        self.target.as_ref()
    }

    pub fn key(&self) -> Option<ModalKey> {
        self.target.as_ref().map(ModalTarget::key)
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// `None` on compact viewports, where layout pins the dialog to the centre.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn constraints(&self) -> SizeConstraints {
        self.constraints
    }

    pub fn is_compact(&self) -> bool {
        self.viewport.is_compact()
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn draft(&self) -> &WorkoutEntry {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut WorkoutEntry {
        &mut self.draft
    }

    /// Opens for `target`, centred on `anchor` unless the viewport is compact.
    pub fn open(&mut self, target: ModalTarget, anchor: Bounds) -> Result<(), ModalError> {
        if self.is_saving() {
            return Err(ModalError::SaveInFlight);
        }
        if let Some(persisted) = self.sizes.load() {
            self.size = self.constraints.clamp(persisted);
        }
        self.draft = match &target {
            ModalTarget::Add { date } => WorkoutEntry::draft(*date),
            ModalTarget::Edit { entry } => entry.clone(),
        };
        self.user_moved = false;
        self.error_message = None;
        self.position = if self.viewport.is_compact() {
            None
        } else {
            Some(anchor.centre_of(self.size))
        };
        debug!(key = %target.key(), "workout dialog opening");
        self.target = Some(target);
        self.phase = ModalPhase::Opening;
        Ok(())
    }

    /// Completes an opening or closing transition.
    pub fn finish_transition(&mut self) {
        self.phase = match self.phase {
            ModalPhase::Opening => ModalPhase::Open,
            ModalPhase::Closing => {
                self.target = None;
                ModalPhase::Closed
            }
            other => other,
        };
    }

    /// Re-centres after the anchor changed, unless the user already moved the dialog.
    pub fn recenter(&mut self, anchor: Bounds) {
        if !self.is_visible() || self.user_moved {
            return;
        }
        self.position = if self.viewport.is_compact() {
            None
        } else {
            Some(anchor.centre_of(self.size))
        };
    }

    /// Live resize from `handle`. Edges that are not being dragged stay put.
    pub fn on_resize(&mut self, handle: ResizeHandle, new_size: Size) {
        if !self.is_visible() || self.viewport.is_compact() {
            return;
        }
        let new_size = self.constraints.clamp(new_size);
        let delta_w = new_size.width - self.size.width;
        let delta_h = new_size.height - self.size.height;
        if let Some(pos) = self.position.as_mut() {
            if handle.moves_left_edge() {
                pos.x -= delta_w;
            }
            if handle.moves_top_edge() {
                pos.y -= delta_h;
            }
        }
        self.size = new_size;
    }

    /// End of a resize gesture: the final size becomes the default for future opens.
    pub fn on_resize_stop(&mut self, final_size: Size) -> Result<(), ModalError> {
        if !self.is_visible() {
            return Err(ModalError::NotOpen);
        }
        self.size = self.constraints.clamp(final_size);
        self.sizes.save(self.size)?;
        debug!(
            width = self.size.width,
            height = self.size.height,
            "dialog size persisted"
        );
        Ok(())
    }

    /// End of a move gesture. Position lives only for this session.
    pub fn on_drag_stop(&mut self, final_position: Position) {
        if !self.is_visible() || self.viewport.is_compact() {
            return;
        }
        self.position = Some(final_position);
        self.user_moved = true;
    }

    pub fn request_dismiss(&mut self, reason: DismissReason) -> Result<(), ModalError> {
        if !self.is_visible() {
            return Err(ModalError::NotOpen);
        }
        if self.is_saving() {
            return Err(ModalError::SaveInFlight);
        }
        debug!(?reason, "workout dialog dismissed");
        self.phase = ModalPhase::Closing;
        Ok(())
    }

    /// Validates the draft and enters the saving state.
    pub fn begin_save(&mut self) -> Result<SaveRequest, ModalError> {
        let target = match (&self.target, self.is_visible()) {
            (Some(target), true) => target,
            _ => return Err(ModalError::NotOpen),
        };
        if self.is_saving() {
            return Err(ModalError::SaveInFlight);
        }
        let description = validate_description(&self.draft.description)?;

        let mut record = self.draft.to_record();
        record.id = None;
        record.date = format_calendar_date(target.date());
        record.kind = Some(EntryKind::Planned.as_wire().to_string());
        record.description = Some(description);
        record.notes = record.notes.filter(|n| !n.trim().is_empty());

        let request = match target.entry_id() {
            Some(id) => SaveRequest::Update { id, record },
            None => SaveRequest::Create(record),
        };
        self.gate = SaveGate::Saving;
        self.error_message = None;
        Ok(request)
    }

    /// Enters the saving state for a delete of the edited entry.
    pub fn begin_delete(&mut self) -> Result<i64, ModalError> {
        if !self.is_visible() {
            return Err(ModalError::NotOpen);
        }
        if self.is_saving() {
            return Err(ModalError::SaveInFlight);
        }
        let id = self
            .target
            .as_ref()
            .and_then(ModalTarget::entry_id)
            .ok_or(ModalError::NotDeletable)?;
        self.gate = SaveGate::Saving;
        self.error_message = None;
        Ok(id)
    }

    /// Settles a save or delete. Success closes the dialog, failure keeps it open with a message.
    pub fn finish(&mut self, result: Result<(), String>) {
        self.gate = SaveGate::Idle;
        match result {
            Ok(()) => self.phase = ModalPhase::Closing,
            Err(message) => {
                warn!("workout dialog request failed: {}", message);
                self.error_message = Some(message);
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }
}
