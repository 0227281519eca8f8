// src/app/geometry.rs
// Conversions between terminal cells and the pixel units the modal state works in.
use plancal_lib::{Bounds, Position, ResizeHandle, Size};
use ratatui::layout::Rect;

/// Nominal size of one terminal cell in pixels.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

pub fn rect_to_bounds(rect: Rect) -> Bounds {
    Bounds {
        left: f64::from(rect.x) * CELL_WIDTH_PX,
        top: f64::from(rect.y) * CELL_HEIGHT_PX,
        width: f64::from(rect.width) * CELL_WIDTH_PX,
        height: f64::from(rect.height) * CELL_HEIGHT_PX,
    }
}

pub fn cell_to_px(column: u16, row: u16) -> Position {
    Position {
        x: f64::from(column) * CELL_WIDTH_PX,
        y: f64::from(row) * CELL_HEIGHT_PX,
    }
}

fn px_to_cells(px: f64, cell: f64) -> i32 {
    (px / cell).round() as i32
}

/// Screen rect for a dialog at `position` with `size`, kept inside `frame`.
pub fn modal_rect(position: Position, size: Size, frame: Rect) -> Rect {
    let width = px_to_cells(size.width, CELL_WIDTH_PX)
        .max(10)
        .min(i32::from(frame.width)) as u16;
    let height = px_to_cells(size.height, CELL_HEIGHT_PX)
        .max(5)
        .min(i32::from(frame.height)) as u16;
    let max_x = i32::from(frame.x) + i32::from(frame.width - width);
    let max_y = i32::from(frame.y) + i32::from(frame.height - height);
    let x = px_to_cells(position.x, CELL_WIDTH_PX).clamp(i32::from(frame.x), max_x) as u16;
    let y = px_to_cells(position.y, CELL_HEIGHT_PX).clamp(i32::from(frame.y), max_y) as u16;
    Rect::new(x, y, width, height)
}

/// Which part of the dialog frame a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHit {
    Handle(ResizeHandle),
    /// The title row just inside the top border.
    TitleBar,
    Body,
}

pub fn frame_hit(rect: Rect, column: u16, row: u16) -> Option<FrameHit> {
    if !rect_contains(rect, column, row) {
        return None;
    }
    let left = column == rect.x;
    let right = column == rect.x + rect.width - 1;
    let top = row == rect.y;
    let bottom = row == rect.y + rect.height - 1;
    let handle = match (top, bottom, left, right) {
        (true, _, true, _) => Some(ResizeHandle::NW),
        (true, _, _, true) => Some(ResizeHandle::NE),
        (_, true, true, _) => Some(ResizeHandle::SW),
        (_, true, _, true) => Some(ResizeHandle::SE),
        (true, _, _, _) => Some(ResizeHandle::N),
        (_, true, _, _) => Some(ResizeHandle::S),
        (_, _, true, _) => Some(ResizeHandle::W),
        (_, _, _, true) => Some(ResizeHandle::E),
        _ => None,
    };
    Some(match handle {
        Some(handle) => FrameHit::Handle(handle),
        None if row == rect.y + 1 => FrameHit::TitleBar,
        None => FrameHit::Body,
    })
}

/// Size after dragging `handle` by (`dx`, `dy`) pixels from `start`.
pub fn resized(handle: ResizeHandle, start: Size, dx: f64, dy: f64) -> Size {
    let width = if !handle.changes_width() {
        start.width
    } else if handle.moves_left_edge() {
        start.width - dx
    } else {
        start.width + dx
    };
    let height = if !handle.changes_height() {
        start.height
    } else if handle.moves_top_edge() {
        start.height - dy
    } else {
        start.height + dy
    };
    Size { width, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_hit_corners_edges_and_title() {
        let rect = Rect::new(10, 5, 20, 8);
        assert_eq!(frame_hit(rect, 10, 5), Some(FrameHit::Handle(ResizeHandle::NW)));
        assert_eq!(frame_hit(rect, 29, 12), Some(FrameHit::Handle(ResizeHandle::SE)));
        assert_eq!(frame_hit(rect, 15, 5), Some(FrameHit::Handle(ResizeHandle::N)));
        assert_eq!(frame_hit(rect, 10, 8), Some(FrameHit::Handle(ResizeHandle::W)));
        assert_eq!(frame_hit(rect, 15, 6), Some(FrameHit::TitleBar));
        assert_eq!(frame_hit(rect, 15, 9), Some(FrameHit::Body));
        assert_eq!(frame_hit(rect, 9, 9), None);
    }

    #[test]
    fn test_resized_follows_handle_direction() {
        let start = Size {
            width: 400.0,
            height: 300.0,
        };
        let west = resized(ResizeHandle::W, start, -50.0, 10.0);
        assert_eq!(west.width, 450.0);
        assert_eq!(west.height, 300.0);

        let se = resized(ResizeHandle::SE, start, 16.0, 32.0);
        assert_eq!(se.width, 416.0);
        assert_eq!(se.height, 332.0);

        let north = resized(ResizeHandle::N, start, 0.0, -16.0);
        assert_eq!(north.height, 316.0);
    }

    #[test]
    fn test_modal_rect_stays_inside_frame() {
        let frame = Rect::new(0, 0, 120, 40);
        let rect = modal_rect(
            Position { x: 900.0, y: -64.0 },
            Size {
                width: 400.0,
                height: 300.0,
            },
            frame,
        );
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 19);
        assert_eq!(rect.x, 70);
        assert_eq!(rect.y, 0);
    }
}
