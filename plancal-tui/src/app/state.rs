//src/app/state.rs
use super::geometry::{rect_contains, rect_to_bounds};
use chrono::{Duration, Local, NaiveDate};
use plancal_lib::{
    CalendarService, DragController, FileSizeStore, ModalManager, ModalPhase, Position, ResizeHandle,
    ScrollMetrics, Size, ViewportProbe, WindowManager, WorkoutEntry, WorkoutStore,
};
use ratatui::layout::Rect;
use std::time::Instant;
use tracing::debug;

/// How long an error stays in the status bar.
pub const ERROR_DISPLAY_SECS: u64 = 5;

/// Terminal width check for the dialog's compact layout.
#[derive(Debug, Clone, Copy)]
pub struct TermViewport {
    pub width: u16,
    pub compact_width: u16,
}

impl ViewportProbe for TermViewport {
    fn is_compact(&self) -> bool {
        self.width < self.compact_width
    }
}

pub type WorkoutModal = ModalManager<TermViewport, FileSizeStore>;

// Fields within the add/edit workout dialog
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkoutField {
    Description,
    Distance,
    Warmup,
    Main,
    Cooldown,
    Terrain,
    Notes,
    Save,
    Delete,
    Cancel,
}

impl WorkoutField {
    pub fn is_text(self) -> bool {
        !matches!(self, Self::Save | Self::Delete | Self::Cancel)
    }
}

/// Text buffers behind the dialog inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkoutForm {
    pub description: String,
    pub distance: String,
    pub warmup: String,
    pub main: String,
    pub cooldown: String,
    pub terrain: String,
    pub notes: String,
}

impl WorkoutForm {
    pub fn from_entry(entry: &WorkoutEntry) -> Self {
        Self {
            description: entry.description.clone(),
            distance: entry.distance.map(|d| d.to_string()).unwrap_or_default(),
            warmup: entry.targets.warmup.clone().unwrap_or_default(),
            main: entry.targets.main.clone().unwrap_or_default(),
            cooldown: entry.targets.cooldown.clone().unwrap_or_default(),
            terrain: entry.terrain.clone().unwrap_or_default(),
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }

    pub fn input_mut(&mut self, field: WorkoutField) -> Option<&mut String> {
        match field {
            WorkoutField::Description => Some(&mut self.description),
            WorkoutField::Distance => Some(&mut self.distance),
            WorkoutField::Warmup => Some(&mut self.warmup),
            WorkoutField::Main => Some(&mut self.main),
            WorkoutField::Cooldown => Some(&mut self.cooldown),
            WorkoutField::Terrain => Some(&mut self.terrain),
            WorkoutField::Notes => Some(&mut self.notes),
            _ => None,
        }
    }

    pub fn input(&self, field: WorkoutField) -> &str {
        match field {
            WorkoutField::Description => &self.description,
            WorkoutField::Distance => &self.distance,
            WorkoutField::Warmup => &self.warmup,
            WorkoutField::Main => &self.main,
            WorkoutField::Cooldown => &self.cooldown,
            WorkoutField::Terrain => &self.terrain,
            WorkoutField::Notes => &self.notes,
            _ => "",
        }
    }
}

// Represents the state of active modals
#[derive(Clone, Debug, PartialEq)]
pub enum ActiveModal {
    None,
    Help,
    GoToDate {
        date_input: String,
        error_message: Option<String>,
    },
    Workout {
        focused_field: WorkoutField,
    },
}

/// Mouse gesture in progress between button down and button up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MouseGesture {
    None,
    /// Pressed on an entry; becomes a drag once the pointer moves.
    Pressed { date: NaiveDate, entry: usize },
    Dragging,
    Resizing {
        handle: ResizeHandle,
        origin: Position,
        start_size: Size,
    },
    Moving {
        grab: Position,
        start: Position,
        preview: Position,
    },
}

/// Screen regions recorded during the last render, for mouse hit testing.
#[derive(Clone, Debug, Default)]
pub struct HitMap {
    pub calendar: Rect,
    pub cells: Vec<(Rect, NaiveDate)>,
    pub entries: Vec<(Rect, NaiveDate, usize)>,
    pub add_buttons: Vec<(Rect, NaiveDate)>,
    pub modal: Option<Rect>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.add_buttons.clear();
        self.modal = None;
    }

    pub fn cell_at(&self, column: u16, row: u16) -> Option<NaiveDate> {
        self.cells
            .iter()
            .find(|(rect, _)| rect_contains(*rect, column, row))
            .map(|(_, date)| *date)
    }

    pub fn entry_at(&self, column: u16, row: u16) -> Option<(NaiveDate, usize)> {
        self.entries
            .iter()
            .find(|(rect, _, _)| rect_contains(*rect, column, row))
            .map(|(_, date, idx)| (*date, *idx))
    }

    pub fn add_button_at(&self, column: u16, row: u16) -> Option<NaiveDate> {
        self.add_buttons
            .iter()
            .find(|(rect, _)| rect_contains(*rect, column, row))
            .map(|(_, date)| *date)
    }
}

// Holds the application state
pub struct App {
    pub service: CalendarService<Box<dyn WorkoutStore>>,
    pub windows: WindowManager,
    pub drag: DragController,
    /// Serialised payload of the drag in progress (the transfer channel).
    pub drag_payload: Option<String>,
    pub modal: WorkoutModal,
    pub form: WorkoutForm,
    pub active_modal: ActiveModal,
    pub gesture: MouseGesture,
    pub hit_map: HitMap,

    pub today: NaiveDate,
    pub selected_date: NaiveDate,
    pub selected_entry: usize,
    /// Index of the first week row shown.
    pub first_visible_week: usize,
    /// Week rows that fit in the calendar area, set by the renderer.
    pub visible_weeks: usize,

    pub should_quit: bool,
    pub last_error: Option<String>, // To display errors
    pub(crate) error_clear_time: Option<Instant>,
}

impl App {
    pub fn new(
        service: CalendarService<Box<dyn WorkoutStore>>,
        sizes: FileSizeStore,
        terminal_width: u16,
    ) -> Self {
        let today = Local::now().date_naive();
        let viewport = TermViewport {
            width: terminal_width,
            compact_width: service.config.compact_width,
        };
        let modal = ModalManager::new(viewport, sizes, service.config.modal_constraints());
        let windows = service.window_manager(today);
        let mut app = App {
            service,
            windows,
            drag: DragController::new(),
            drag_payload: None,
            modal,
            form: WorkoutForm::default(),
            active_modal: ActiveModal::None,
            gesture: MouseGesture::None,
            hit_map: HitMap::default(),
            today,
            selected_date: today,
            selected_entry: 0,
            first_visible_week: 0,
            visible_weeks: 0,
            should_quit: false,
            last_error: None,
            error_clear_time: None,
        };
        app.reload();
        app
    }

    pub fn set_error(&mut self, msg: String) {
        self.last_error = Some(msg);
        self.error_clear_time =
            Some(Instant::now() + std::time::Duration::from_secs(ERROR_DISPLAY_SECS));
    }

    pub fn reload(&mut self) {
        if let Err(e) = self.service.reload() {
            self.set_error(format!("Error loading workouts: {}", e));
        }
    }

    pub fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.first_visible_week as f64,
            scroll_height: self.windows.window().weeks() as f64,
            client_height: self.visible_weeks as f64,
        }
    }

    fn max_first_week(&self) -> usize {
        self.windows
            .window()
            .weeks()
            .saturating_sub(self.visible_weeks.max(1))
    }

    /// Scrolls by whole week rows and reports the new offset to the window manager.
    pub fn scroll_by(&mut self, rows: i64, now: Instant) {
        let target = (self.first_visible_week as i64 + rows).max(0) as usize;
        self.first_visible_week = target.min(self.max_first_week());
        self.windows.on_scroll(now, self.scroll_metrics());
    }

    /// Puts the week holding `date` in the middle of the viewport.
    pub fn center_on(&mut self, date: NaiveDate) {
        if let Some(week) = self.windows.window().week_of(date) {
            let half = self.visible_weeks / 2;
            self.first_visible_week = week.saturating_sub(half).min(self.max_first_week());
        }
    }

    /// Keeps the selected date on screen, scrolling as little as possible.
    pub fn ensure_selected_visible(&mut self, now: Instant) {
        let Some(week) = self.windows.window().week_of(self.selected_date) else {
            return;
        };
        let rows = self.visible_weeks.max(1);
        if week < self.first_visible_week {
            self.scroll_by(week as i64 - self.first_visible_week as i64, now);
        } else if week >= self.first_visible_week + rows {
            self.scroll_by((week + 1 - rows) as i64 - self.first_visible_week as i64, now);
        }
    }

    pub fn move_selection(&mut self, days: i64, now: Instant) {
        let candidate = self.selected_date + Duration::days(days);
        let window = self.windows.window();
        self.selected_date = candidate.clamp(window.first(), window.last());
        self.selected_entry = 0;
        if self.drag.is_dragging() {
            self.drag.drag_over(self.selected_date);
        }
        self.ensure_selected_visible(now);
    }

    pub fn selected_entries(&self) -> Vec<WorkoutEntry> {
        self.service
            .lookup(self.selected_date)
            .entries()
            .cloned()
            .collect()
    }

    pub fn entry_at(&self, date: NaiveDate, index: usize) -> Option<WorkoutEntry> {
        self.service.lookup(date).entries().nth(index).cloned()
    }

    pub fn clear_expired_error(&mut self, now: Instant) {
        if let Some(clear_time) = self.error_clear_time {
            if now >= clear_time {
                self.last_error = None;
                self.error_clear_time = None;
            }
        }
    }

    /// Per-frame housekeeping: dialog transitions, initial centering, throttled scroll work.
    pub fn tick(&mut self, now: Instant) {
        self.clear_expired_error(now);

        let closing = self.modal.phase() == ModalPhase::Closing;
        self.modal.finish_transition();
        if closing {
            self.close_workout_modal_state();
        }

        if self.visible_weeks == 0 {
            return; // not laid out yet
        }
        if let Some(offset) = self.windows.initial_scroll(self.scroll_metrics()) {
            self.first_visible_week = (offset.round() as usize).min(self.max_first_week());
        }
        if let Some(target) = self.windows.take_scroll_target() {
            self.selected_date = target;
            self.selected_entry = 0;
            self.center_on(target);
        }
        if let Some(expansion) = self.windows.poll_scroll(now) {
            if let Some(compensation) = expansion.backward {
                let weeks = self.windows.window().weeks() as f64;
                let top = compensation.apply_to(self.first_visible_week as f64, weeks);
                self.first_visible_week = (top.round().max(0.0) as usize).min(self.max_first_week());
            }
            if !expansion.is_empty() {
                debug!(
                    first = %self.windows.window().first(),
                    last = %self.windows.window().last(),
                    "calendar expanded"
                );
            }
        }
    }

    pub(crate) fn close_workout_modal_state(&mut self) {
        if matches!(self.active_modal, ActiveModal::Workout { .. }) {
            self.active_modal = ActiveModal::None;
        }
        self.form = WorkoutForm::default();
        self.gesture = MouseGesture::None;
    }

    /// Tracks the terminal width for compactness and re-centres an open dialog.
    pub fn on_terminal_resize(&mut self, width: u16, calendar: Rect) {
        self.modal.viewport_mut().width = width;
        self.hit_map.calendar = calendar;
        self.modal.recenter(rect_to_bounds(calendar));
    }

    pub fn teardown(&mut self) {
        self.windows.teardown();
        self.drag.cancel();
        self.service.teardown();
    }
}
