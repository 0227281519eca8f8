// src/lib.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

// --- Declare modules ---
mod config;
pub mod db;
pub mod drag;
pub mod http;
pub mod index;
pub mod modal;
pub mod model;
pub mod store;
pub mod throttle;
pub mod ui_state;
pub mod window;

// --- Expose public types ---
pub use config::{
    get_config_dir as get_config_dir_util, get_config_path as get_config_path_util,
    load as load_config_util, parse_color, save as save_config_util, Backend, Config,
    ConfigError, StandardColor, Theme,
};
pub use db::{DbError, SqliteStore};
pub use drag::{DragController, DragError, DragPayload, DragState, DropDecision};
pub use http::{CsrfSource, EndpointCsrf, HttpStore, StaticCsrf};
pub use index::{DayBucket, WorkoutIndex};
pub use modal::{
    Bounds, DismissReason, MemorySizeStore, ModalError, ModalKey, ModalManager, ModalPhase,
    ModalTarget, Position, ResizeHandle, SaveRequest, Size, SizeConstraints, SizeStore,
    ViewportProbe,
};
pub use model::{
    format_calendar_date, parse_calendar_date, validate_description, CalendarDate, EntryKind,
    PlanRecord, Targets, ValidationError, WorkoutEntry,
};
pub use store::{StoreError, WorkoutStore};
pub use ui_state::FileSizeStore;
pub use window::{
    monday_of, AnchorCompensation, DateWindow, Expansion, PickOutcome, ScrollMetrics, WeekStep,
    WindowManager, MAX_CONFIGURED_WEEKS,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Modal(#[from] ModalError),
    #[error(transparent)]
    Drag(#[from] DragError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Saved, but refreshing the calendar failed: {0}")]
    ReloadFailed(StoreError),
}

/// Whether async-style completions may still be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Mounted,
    Unmounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Applied { entries: usize },
    /// The view was torn down before the load completed.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Payload did not come from the calendar.
    Ignored,
    /// Dropped on its own date; no request was made.
    Unchanged,
    Moved { id: i64, to: CalendarDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(i64),
    Updated(i64),
    Deleted(i64),
}

pub struct CalendarService<S: WorkoutStore> {
    pub config: Config,
    pub config_path: PathBuf,
    store: S,
    index: WorkoutIndex,
    lifecycle: Lifecycle,
}

impl CalendarService<Box<dyn WorkoutStore>> {
    /// Loads the config and connects the configured store.
    /// # Errors
    /// Returns `anyhow::Error` if config loading or store construction fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let store: Box<dyn WorkoutStore> = match config.backend {
            Backend::Remote => Box::new(
                HttpStore::new(&config.api_url)
                    .with_context(|| format!("Failed to set up client for {}", config.api_url))?,
            ),
            Backend::Local => {
                let db_path = db::get_db_path().context("Failed to determine database path")?;
                Box::new(
                    SqliteStore::open(&db_path)
                        .with_context(|| format!("Failed to open database at {db_path:?}"))?,
                )
            }
        };
        info!(backend = ?config.backend, "calendar service initialised");
        Ok(Self::new(config, config_path, store))
    }
}

impl<S: WorkoutStore> CalendarService<S> {
    pub fn new(config: Config, config_path: PathBuf, store: S) -> Self {
        Self {
            config,
            config_path,
            store,
            index: WorkoutIndex::default(),
            lifecycle: Lifecycle::Mounted,
        }
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &WorkoutIndex {
        &self.index
    }

    pub fn lookup(&self, date: CalendarDate) -> &DayBucket {
        self.index.lookup(date)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// A window manager configured from the current settings.
    pub fn window_manager(&self, center: CalendarDate) -> WindowManager {
        WindowManager::new(
            center,
            self.config.weeks_back,
            self.config.weeks_forward,
            self.config.scroll_throttle(),
        )
    }

    /// Fetches the whole collection and rebuilds the index.
    pub fn reload(&mut self) -> Result<ReloadOutcome, StoreError> {
        let records = self.store.load_all()?;
        Ok(self.apply_records(records))
    }

    /// Completion half of a reload. Ignored once the view is torn down.
    pub fn apply_records(&mut self, records: Vec<PlanRecord>) -> ReloadOutcome {
        if self.lifecycle == Lifecycle::Unmounted {
            return ReloadOutcome::Discarded;
        }
        self.index = WorkoutIndex::build(records);
        ReloadOutcome::Applied {
            entries: self.index.entry_count(),
        }
    }

    fn reload_after_write(&mut self) -> Result<(), ServiceError> {
        self.reload().map(|_| ()).map_err(ServiceError::ReloadFailed)
    }

    /// Handles a drop of `raw` (the transfer payload) onto `target`.
    ///
    /// The index is only replaced by a reload after the server confirmed the move,
    /// so a failed move leaves the entry where it was.
    pub fn reschedule(
        &mut self,
        drag: &mut DragController,
        raw: &str,
        target: CalendarDate,
    ) -> Result<DropOutcome, ServiceError> {
        match drag.drop_on(raw, target)? {
            DropDecision::Ignored => Ok(DropOutcome::Ignored),
            DropDecision::NoOp => Ok(DropOutcome::Unchanged),
            DropDecision::Move { id, to, .. } => {
                let result = self.store.move_to(id, to);
                drag.finish_move();
                if let Err(e) = result {
                    warn!(id, %to, "move failed: {}", e);
                    return Err(e.into());
                }
                self.reload_after_write()?;
                Ok(DropOutcome::Moved { id, to })
            }
        }
    }

    /// Moves a known plan by id, with the same no-op rule as a drop.
    pub fn move_entry(&mut self, id: i64, to: CalendarDate) -> Result<DropOutcome, ServiceError> {
        let entry = self.index.find(id).ok_or(StoreError::NotFound(id))?;
        if !entry.is_draggable() {
            return Err(DragError::NotDraggable.into());
        }
        if entry.date == to {
            return Ok(DropOutcome::Unchanged);
        }
        self.store.move_to(id, to)?;
        self.reload_after_write()?;
        Ok(DropOutcome::Moved { id, to })
    }

    /// Runs the dialog's save: validate, create or update, settle the dialog, reload.
    pub fn save<V: ViewportProbe, P: SizeStore>(
        &mut self,
        modal: &mut ModalManager<V, P>,
    ) -> Result<SaveOutcome, ServiceError> {
        let request = match modal.begin_save() {
            Ok(request) => request,
            Err(e) => {
                modal.set_error(e.to_string());
                return Err(e.into());
            }
        };
        let result = match &request {
            SaveRequest::Create(record) => self.store.create(record).map(SaveOutcome::Created),
            SaveRequest::Update { id, record } => self
                .store
                .update(*id, record)
                .map(|()| SaveOutcome::Updated(*id)),
        };
        modal.finish(result.as_ref().map(|_| ()).map_err(|e| e.to_string()));
        let outcome = result?;
        self.reload_after_write()?;
        Ok(outcome)
    }

    /// Deletes the entry the dialog is editing.
    pub fn delete<V: ViewportProbe, P: SizeStore>(
        &mut self,
        modal: &mut ModalManager<V, P>,
    ) -> Result<SaveOutcome, ServiceError> {
        let id = modal.begin_delete()?;
        let result = self.store.delete(id);
        modal.finish(result.as_ref().map(|_| ()).map_err(|e| e.to_string()));
        result?;
        self.reload_after_write()?;
        Ok(SaveOutcome::Deleted(id))
    }

    /// Creates a planned entry outside the dialog (scripted use).
    pub fn create_plan(&mut self, mut record: PlanRecord) -> Result<i64, ServiceError> {
        let description = validate_description(record.description.as_deref().unwrap_or(""))?;
        record.id = None;
        record.description = Some(description);
        record.kind = Some(EntryKind::Planned.as_wire().to_string());
        let id = self.store.create(&record)?;
        self.reload_after_write()?;
        Ok(id)
    }

    /// Replaces a planned entry's fields (scripted use).
    pub fn update_plan(&mut self, id: i64, mut record: PlanRecord) -> Result<(), ServiceError> {
        let entry = self.index.find(id).ok_or(StoreError::NotFound(id))?;
        if !entry.is_editable() {
            return Err(DragError::NotDraggable.into());
        }
        let description = validate_description(record.description.as_deref().unwrap_or(""))?;
        record.id = None;
        record.description = Some(description);
        record.kind = Some(EntryKind::Planned.as_wire().to_string());
        self.store.update(id, &record)?;
        self.reload_after_write()
    }

    pub fn delete_plan(&mut self, id: i64) -> Result<(), ServiceError> {
        let entry = self.index.find(id).ok_or(StoreError::NotFound(id))?;
        if !entry.is_editable() {
            return Err(DragError::NotDraggable.into());
        }
        self.store.delete(id)?;
        self.reload_after_write()
    }

    /// Marks the view torn down; later completions are ignored.
    pub fn teardown(&mut self) {
        self.lifecycle = Lifecycle::Unmounted;
    }
}
