// src/app.rs
use thiserror::Error;

mod actions;
pub mod geometry;
mod input;
mod modals;
mod mouse;
pub mod state;

pub use state::{ActiveModal, App, MouseGesture, WorkoutField};

// Custom Error type for input parsing within the TUI
#[derive(Error, Debug, Clone)]
pub enum AppInputError {
    #[error("Invalid date format: {0}. Use YYYY-MM-DD or 'today'.")]
    InvalidDate(String),
    #[error("Invalid number format: {0}")]
    InvalidNumber(String),
    #[error("Input field cannot be empty.")]
    InputEmpty,
}
