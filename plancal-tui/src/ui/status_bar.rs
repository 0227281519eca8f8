// src/ui/status_bar.rs
use crate::app::{state::ActiveModal, App};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = match app.active_modal {
        ActiveModal::None if app.drag.is_dragging() => {
            " [←→↑↓/hjkl] Pick Day | [Enter/m] Drop | [Esc] Cancel Move "
        }
        ActiveModal::None => {
            " [←→↑↓/hjkl] Nav | [Tab] Workout | [a]dd | [e]dit | [m]ove | [t]oday | [g]o to | [?] Help | [q]uit "
        }
        ActiveModal::Help => " [Esc/Enter/?] Close Help ",
        ActiveModal::GoToDate { .. } => " [Esc] Cancel | [Enter] Go ",
        ActiveModal::Workout { .. } => {
            " [Esc] Close | [Ctrl+S] Save | [Tab/↑↓] Navigate | [Ctrl+Arrows] Resize "
        }
    };

    let error_text = app.last_error.as_deref().unwrap_or("");

    let status_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status_paragraph, status_chunks[0]);

    let error_paragraph = Paragraph::new(error_text)
        .style(Style::default().bg(Color::DarkGray).fg(Color::Red))
        .alignment(ratatui::layout::Alignment::Right);
    f.render_widget(error_paragraph, status_chunks[1]);
}
