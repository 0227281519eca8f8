// src/ui.rs
mod calendar;
mod layout;
mod modals;
mod status_bar;

pub use layout::{calendar_area, render_ui};
