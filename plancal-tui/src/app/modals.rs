// src/app/modals.rs
use super::actions::{
    delete_from_modal, dismiss_workout_modal, submit_goto, submit_workout_modal,
};
use super::state::{ActiveModal, App, WorkoutField};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use plancal_lib::{DismissReason, ResizeHandle, Size};

/// Keyboard resize step, one cell in each direction.
const RESIZE_STEP_X: f64 = super::geometry::CELL_WIDTH_PX;
const RESIZE_STEP_Y: f64 = super::geometry::CELL_HEIGHT_PX;

fn field_order(is_edit: bool) -> &'static [WorkoutField] {
    const EDIT: &[WorkoutField] = &[
        WorkoutField::Description,
        WorkoutField::Distance,
        WorkoutField::Warmup,
        WorkoutField::Main,
        WorkoutField::Cooldown,
        WorkoutField::Terrain,
        WorkoutField::Notes,
        WorkoutField::Save,
        WorkoutField::Delete,
        WorkoutField::Cancel,
    ];
    const ADD: &[WorkoutField] = &[
        WorkoutField::Description,
        WorkoutField::Distance,
        WorkoutField::Warmup,
        WorkoutField::Main,
        WorkoutField::Cooldown,
        WorkoutField::Terrain,
        WorkoutField::Notes,
        WorkoutField::Save,
        WorkoutField::Cancel,
    ];
    if is_edit {
        EDIT
    } else {
        ADD
    }
}

fn step_field(current: WorkoutField, is_edit: bool, forward: bool) -> WorkoutField {
    let order = field_order(is_edit);
    let pos = order.iter().position(|f| *f == current).unwrap_or(0);
    let next = if forward {
        (pos + 1) % order.len()
    } else {
        (pos + order.len() - 1) % order.len()
    };
    order[next]
}

fn set_focus(app: &mut App, field: WorkoutField) {
    app.active_modal = ActiveModal::Workout {
        focused_field: field,
    };
}

fn resize_with_keys(app: &mut App, code: KeyCode) {
    let current = app.modal.size();
    let (dw, dh) = match code {
        KeyCode::Left => (-RESIZE_STEP_X, 0.0),
        KeyCode::Right => (RESIZE_STEP_X, 0.0),
        KeyCode::Up => (0.0, -RESIZE_STEP_Y),
        KeyCode::Down => (0.0, RESIZE_STEP_Y),
        _ => return,
    };
    app.modal.on_resize(
        ResizeHandle::SE,
        Size {
            width: current.width + dw,
            height: current.height + dh,
        },
    );
    let final_size = app.modal.size();
    if let Err(e) = app.modal.on_resize_stop(final_size) {
        app.set_error(e.to_string());
    }
}

pub fn handle_workout_modal_input(app: &mut App, key: KeyEvent) -> Result<()> {
    let ActiveModal::Workout { focused_field } = app.active_modal else {
        return Ok(());
    };
    let is_edit = app.modal.target().is_some_and(|t| t.is_edit());

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => submit_workout_modal(app),
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                resize_with_keys(app, key.code)
            }
            _ => {}
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Esc => dismiss_workout_modal(app, DismissReason::Escape),
        KeyCode::Tab | KeyCode::Down => set_focus(app, step_field(focused_field, is_edit, true)),
        KeyCode::BackTab | KeyCode::Up => {
            set_focus(app, step_field(focused_field, is_edit, false))
        }
        KeyCode::Enter => match focused_field {
            WorkoutField::Save => submit_workout_modal(app),
            WorkoutField::Delete => delete_from_modal(app),
            WorkoutField::Cancel => dismiss_workout_modal(app, DismissReason::Cancel),
            other => set_focus(app, step_field(other, is_edit, true)),
        },
        KeyCode::Char(c) => {
            if let Some(input) = app.form.input_mut(focused_field) {
                input.push(c);
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = app.form.input_mut(focused_field) {
                input.pop();
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_goto_modal_input(app: &mut App, key: KeyEvent) -> Result<()> {
    let ActiveModal::GoToDate {
        ref mut date_input,
        ref mut error_message,
    } = app.active_modal
    else {
        return Ok(());
    };
    match key.code {
        KeyCode::Esc => app.active_modal = ActiveModal::None,
        KeyCode::Char(c) => {
            date_input.push(c);
            *error_message = None;
        }
        KeyCode::Backspace => {
            date_input.pop();
            *error_message = None;
        }
        KeyCode::Enter => {
            let input = date_input.clone();
            if let Err(e) = submit_goto(app, &input) {
                if let ActiveModal::GoToDate {
                    ref mut error_message,
                    ..
                } = app.active_modal
                {
                    *error_message = Some(e.to_string());
                }
            }
        }
        _ => {}
    }
    Ok(())
}
