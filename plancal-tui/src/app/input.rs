// src/app/input.rs
use super::{
    actions::{
        cancel_drag, cycle_selected_entry, drop_at, go_to_today, open_add_modal,
        open_goto_modal, open_selected_entry, shift_week, start_keyboard_move,
    },
    modals::{handle_goto_modal_input, handle_workout_modal_input},
    state::{ActiveModal, App},
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use plancal_lib::WeekStep;
use std::time::Instant;

// Main key event handler method on App
impl App {
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        let now = Instant::now();

        // Handle based on active modal first
        if self.active_modal != ActiveModal::None {
            return self.handle_modal_input(key);
        }
        if self.drag.is_dragging() {
            self.handle_move_input(key, now);
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.active_modal = ActiveModal::Help,
            KeyCode::Char('h') | KeyCode::Left => self.move_selection(-1, now),
            KeyCode::Char('l') | KeyCode::Right => self.move_selection(1, now),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-7, now),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(7, now),
            KeyCode::PageUp => self.scroll_by(-(self.visible_weeks.max(1) as i64), now),
            KeyCode::PageDown => self.scroll_by(self.visible_weeks.max(1) as i64, now),
            KeyCode::Tab => cycle_selected_entry(self),
            KeyCode::Char('t') => go_to_today(self),
            KeyCode::Char('[') => shift_week(self, WeekStep::Back),
            KeyCode::Char(']') => shift_week(self, WeekStep::Forward),
            KeyCode::Char('g') => open_goto_modal(self),
            KeyCode::Char('a') | KeyCode::Char('+') => {
                let date = self.selected_date;
                open_add_modal(self, date)?
            }
            KeyCode::Char('e') | KeyCode::Enter => open_selected_entry(self)?,
            KeyCode::Char('m') => start_keyboard_move(self),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        Ok(())
    }

    // Keyboard rescheduling: arrows pick the target, Enter drops, Esc cancels.
    fn handle_move_input(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.move_selection(-1, now),
            KeyCode::Char('l') | KeyCode::Right => self.move_selection(1, now),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-7, now),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(7, now),
            KeyCode::Enter | KeyCode::Char('m') => {
                let target = self.selected_date;
                drop_at(self, target);
            }
            KeyCode::Esc => cancel_drag(self),
            _ => {}
        }
    }

    // --- Modal Input Handling ---
    fn handle_modal_input(&mut self, key: KeyEvent) -> Result<()> {
        match self.active_modal {
            ActiveModal::Help => self.handle_help_modal_input(key),
            ActiveModal::GoToDate { .. } => handle_goto_modal_input(self, key)?,
            ActiveModal::Workout { .. } => handle_workout_modal_input(self, key)?,
            ActiveModal::None => {}
        }
        Ok(())
    }

    fn handle_help_modal_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter | KeyCode::Char('?') => {
                self.active_modal = ActiveModal::None;
            }
            _ => {} // Ignore other keys in help
        }
    }
}
