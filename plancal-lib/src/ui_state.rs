// src/ui_state.rs
use crate::config::ConfigError;
use crate::modal::{Size, SizeStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const UI_STATE_FILE_NAME: &str = "ui_state.toml";
/// Well-known key the dialog size is stored under.
pub const MODAL_SIZE_KEY: &str = "modal_size";

/// Keeps the dialog size in a small TOML file next to the config.
///
/// Other tables in the file are preserved when the size is rewritten.
#[derive(Debug, Clone)]
pub struct FileSizeStore {
    path: PathBuf,
}

impl FileSizeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(UI_STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<toml::Table, ConfigError> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content.parse::<toml::Table>()?)
    }
}

fn is_usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

impl SizeStore for FileSizeStore {
    fn load(&self) -> Option<Size> {
        let table = match self.read_table() {
            Ok(table) => table,
            Err(e) => {
                warn!("Ignoring unreadable UI state {:?}: {}", self.path, e);
                return None;
            }
        };
        let value = table.get(MODAL_SIZE_KEY)?.clone();
        match value.try_into::<Size>() {
            Ok(size) if is_usable(size.width) && is_usable(size.height) => Some(size),
            Ok(_) => None,
            Err(e) => {
                warn!("Ignoring malformed {} entry: {}", MODAL_SIZE_KEY, e);
                None
            }
        }
    }

    fn save(&mut self, size: Size) -> Result<(), ConfigError> {
        // A corrupt file is replaced rather than blocking the save.
        let mut table = self.read_table().unwrap_or_default();
        table.insert(MODAL_SIZE_KEY.to_string(), toml::Value::try_from(size)?);
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, toml::to_string_pretty(&table)?)?;
        Ok(())
    }
}
