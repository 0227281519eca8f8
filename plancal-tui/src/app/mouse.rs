// src/app/mouse.rs
use super::{
    actions::{cancel_drag, dismiss_workout_modal, drop_at, open_add_modal, open_edit_modal},
    geometry::{cell_to_px, frame_hit, resized, FrameHit},
    state::{ActiveModal, App, MouseGesture},
};
use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use plancal_lib::{DismissReason, Position};
use std::time::Instant;

impl App {
    pub fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<()> {
        let now = Instant::now();
        let (column, row) = (event.column, event.row);
        match event.kind {
            MouseEventKind::ScrollUp if self.active_modal == ActiveModal::None => {
                self.scroll_by(-1, now)
            }
            MouseEventKind::ScrollDown if self.active_modal == ActiveModal::None => {
                self.scroll_by(1, now)
            }
            MouseEventKind::Down(MouseButton::Left) => self.mouse_down(column, row)?,
            MouseEventKind::Drag(MouseButton::Left) => self.mouse_drag(column, row),
            MouseEventKind::Up(MouseButton::Left) => self.mouse_up(column, row)?,
            _ => {}
        }
        Ok(())
    }

    fn mouse_down(&mut self, column: u16, row: u16) -> Result<()> {
        if let ActiveModal::Workout { .. } = self.active_modal {
            let compact = self.modal.is_compact();
            let hit = self.hit_map.modal.and_then(|r| frame_hit(r, column, row));
            match hit {
                Some(FrameHit::Handle(handle)) if !compact => {
                    self.gesture = MouseGesture::Resizing {
                        handle,
                        origin: cell_to_px(column, row),
                        start_size: self.modal.size(),
                    };
                }
                Some(FrameHit::TitleBar) if !compact => {
                    if let Some(start) = self.modal.position() {
                        self.gesture = MouseGesture::Moving {
                            grab: cell_to_px(column, row),
                            start,
                            preview: start,
                        };
                    }
                }
                Some(_) => {}
                None => dismiss_workout_modal(self, DismissReason::Backdrop),
            }
            return Ok(());
        }
        if self.active_modal != ActiveModal::None {
            return Ok(());
        }

        if let Some(date) = self.hit_map.add_button_at(column, row) {
            open_add_modal(self, date)?;
        } else if let Some((date, entry)) = self.hit_map.entry_at(column, row) {
            self.selected_date = date;
            self.selected_entry = entry;
            self.gesture = MouseGesture::Pressed { date, entry };
        } else if let Some(date) = self.hit_map.cell_at(column, row) {
            self.selected_date = date;
            self.selected_entry = 0;
        }
        Ok(())
    }

    fn mouse_drag(&mut self, column: u16, row: u16) {
        match self.gesture {
            MouseGesture::Pressed { date, entry } => {
                let Some(source) = self.entry_at(date, entry) else {
                    self.gesture = MouseGesture::None;
                    return;
                };
                match self.drag.start(&source) {
                    Ok(payload) => {
                        self.drag_payload = Some(payload);
                        self.gesture = MouseGesture::Dragging;
                        self.update_drag_hover(column, row);
                    }
                    // Imported entries simply don't drag.
                    Err(_) => self.gesture = MouseGesture::None,
                }
            }
            MouseGesture::Dragging => self.update_drag_hover(column, row),
            MouseGesture::Resizing {
                handle,
                origin,
                start_size,
            } => {
                let pointer = cell_to_px(column, row);
                let size = resized(
                    handle,
                    start_size,
                    pointer.x - origin.x,
                    pointer.y - origin.y,
                );
                self.modal.on_resize(handle, size);
            }
            MouseGesture::Moving { grab, start, .. } => {
                let pointer = cell_to_px(column, row);
                self.gesture = MouseGesture::Moving {
                    grab,
                    start,
                    preview: Position {
                        x: start.x + pointer.x - grab.x,
                        y: start.y + pointer.y - grab.y,
                    },
                };
            }
            MouseGesture::None => {}
        }
    }

    fn update_drag_hover(&mut self, column: u16, row: u16) {
        match self.hit_map.cell_at(column, row) {
            Some(date) => self.drag.drag_over(date),
            None => self.drag.drag_leave(),
        }
    }

    fn mouse_up(&mut self, column: u16, row: u16) -> Result<()> {
        let gesture = std::mem::replace(&mut self.gesture, MouseGesture::None);
        match gesture {
            MouseGesture::Pressed { date, entry } => {
                if let Some(clicked) = self.entry_at(date, entry) {
                    open_edit_modal(self, clicked)?;
                }
            }
            MouseGesture::Dragging => match self.hit_map.cell_at(column, row) {
                Some(target) => drop_at(self, target),
                None => cancel_drag(self),
            },
            MouseGesture::Resizing { .. } => {
                let final_size = self.modal.size();
                if let Err(e) = self.modal.on_resize_stop(final_size) {
                    self.set_error(e.to_string());
                }
            }
            MouseGesture::Moving { preview, .. } => self.modal.on_drag_stop(preview),
            MouseGesture::None => {}
        }
        Ok(())
    }
}
