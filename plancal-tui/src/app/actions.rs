// src/app/actions.rs
use super::geometry::rect_to_bounds;
use super::state::{ActiveModal, App, MouseGesture, WorkoutField, WorkoutForm};
use super::AppInputError;
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use plancal_lib::{
    DismissReason, DragError, DropOutcome, ModalError, ModalTarget, SaveOutcome, ServiceError,
    WeekStep, WorkoutEntry,
};
use tracing::{debug, info};

// --- Parsing Helpers ---

fn parse_optional_float(input: &str) -> Result<Option<f64>, AppInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| AppInputError::InvalidNumber(format!("'{}' is not a valid number", trimmed)))?;
    if value < 0.0 {
        return Err(AppInputError::InvalidNumber(
            "Distance cannot be negative".into(),
        ));
    }
    Ok(Some(value))
}

fn optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn parse_goto_date(input: &str, today: NaiveDate) -> Result<NaiveDate, AppInputError> {
    let trimmed = input.trim().to_lowercase();
    match trimmed.as_str() {
        "" => Err(AppInputError::InputEmpty),
        "today" | "t" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        "yesterday" => Ok(today - Duration::days(1)),
        _ => NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d")
            .map_err(|_| AppInputError::InvalidDate(input.to_string())),
    }
}

// --- Navigation ---

pub fn shift_week(app: &mut App, step: WeekStep) {
    app.windows.shift_week(step);
}

pub fn go_to_today(app: &mut App) {
    app.windows.go_to_today(app.today);
}

pub fn open_goto_modal(app: &mut App) {
    app.active_modal = ActiveModal::GoToDate {
        date_input: String::new(),
        error_message: None,
    };
}

pub fn submit_goto(app: &mut App, input: &str) -> Result<(), AppInputError> {
    let date = parse_goto_date(input, app.today)?;
    let outcome = app.windows.pick(date);
    debug!(?outcome, "date picked");
    app.active_modal = ActiveModal::None;
    Ok(())
}

pub fn cycle_selected_entry(app: &mut App) {
    let count = app.service.lookup(app.selected_date).len();
    app.selected_entry = if count == 0 {
        0
    } else {
        (app.selected_entry + 1) % count
    };
}

// --- Workout dialog ---

pub fn open_add_modal(app: &mut App, date: NaiveDate) -> Result<()> {
    cancel_drag(app);
    let anchor = rect_to_bounds(app.hit_map.calendar);
    app.modal.open(ModalTarget::Add { date }, anchor)?;
    app.form = WorkoutForm::default();
    app.selected_date = date;
    app.active_modal = ActiveModal::Workout {
        focused_field: WorkoutField::Description,
    };
    Ok(())
}

/// Opens the edit dialog. Non-editable entries are ignored.
pub fn open_edit_modal(app: &mut App, entry: WorkoutEntry) -> Result<()> {
    if !entry.is_editable() {
        return Ok(());
    }
    cancel_drag(app);
    let anchor = rect_to_bounds(app.hit_map.calendar);
    app.form = WorkoutForm::from_entry(&entry);
    app.modal.open(ModalTarget::Edit { entry }, anchor)?;
    app.active_modal = ActiveModal::Workout {
        focused_field: WorkoutField::Description,
    };
    Ok(())
}

pub fn open_selected_entry(app: &mut App) -> Result<()> {
    match app.entry_at(app.selected_date, app.selected_entry) {
        Some(entry) if entry.is_editable() => open_edit_modal(app, entry),
        Some(_) => {
            app.set_error("Imported activities are read-only.".to_string());
            Ok(())
        }
        None => {
            let date = app.selected_date;
            open_add_modal(app, date)
        }
    }
}

pub fn dismiss_workout_modal(app: &mut App, reason: DismissReason) {
    match app.modal.request_dismiss(reason) {
        Ok(()) => app.gesture = MouseGesture::None,
        Err(ModalError::SaveInFlight) => {
            app.modal
                .set_error("Please wait for the save to finish.".to_string());
        }
        Err(_) => app.close_workout_modal_state(),
    }
}

fn apply_form_to_draft(app: &mut App) -> Result<(), AppInputError> {
    let distance = parse_optional_float(&app.form.distance)?;
    let form = &app.form;
    let draft = app.modal.draft_mut();
    draft.description = form.description.clone();
    draft.distance = distance;
    draft.targets.warmup = optional_text(&form.warmup);
    draft.targets.main = optional_text(&form.main);
    draft.targets.cooldown = optional_text(&form.cooldown);
    draft.terrain = optional_text(&form.terrain);
    draft.notes = optional_text(&form.notes);
    Ok(())
}

fn report_service_error(app: &mut App, error: ServiceError) {
    match error {
        // The dialog closed; the write went through.
        ServiceError::ReloadFailed(_) => app.set_error(error.to_string()),
        // Everything else is already shown inside the dialog.
        other => debug!("workout dialog request failed: {}", other),
    }
}

pub fn submit_workout_modal(app: &mut App) {
    if let Err(e) = apply_form_to_draft(app) {
        app.modal.set_error(e.to_string());
        return;
    }
    match app.service.save(&mut app.modal) {
        Ok(SaveOutcome::Created(id)) => info!(id, "workout created from dialog"),
        Ok(outcome) => info!(?outcome, "workout saved from dialog"),
        Err(e) => report_service_error(app, e),
    }
}

pub fn delete_from_modal(app: &mut App) {
    match app.service.delete(&mut app.modal) {
        Ok(outcome) => {
            info!(?outcome, "workout deleted from dialog");
            app.selected_entry = 0;
        }
        Err(e) => report_service_error(app, e),
    }
}

// --- Rescheduling ---

/// Starts a keyboard move of the selected entry.
pub fn start_keyboard_move(app: &mut App) {
    let Some(entry) = app.entry_at(app.selected_date, app.selected_entry) else {
        return;
    };
    match app.drag.start(&entry) {
        Ok(payload) => {
            app.drag_payload = Some(payload);
            app.drag.drag_over(app.selected_date);
        }
        Err(DragError::NotDraggable) => {
            app.set_error("Only saved planned workouts can be moved.".to_string())
        }
        Err(e) => app.set_error(e.to_string()),
    }
}

pub fn cancel_drag(app: &mut App) {
    app.drag.cancel();
    app.drag_payload = None;
}

/// Drops the current payload on `date`.
pub fn drop_at(app: &mut App, date: NaiveDate) {
    let Some(payload) = app.drag_payload.take() else {
        app.drag.cancel();
        return;
    };
    match app.service.reschedule(&mut app.drag, &payload, date) {
        Ok(DropOutcome::Moved { id, to }) => {
            info!(id, %to, "workout rescheduled");
            app.selected_date = to;
            app.selected_entry = 0;
        }
        Ok(DropOutcome::Unchanged) | Ok(DropOutcome::Ignored) => {}
        Err(ServiceError::Store(e)) => app.set_error(format!("Could not move workout: {}", e)),
        Err(e) => app.set_error(e.to_string()),
    }
}
