//src/db.rs
use crate::model::{format_calendar_date, CalendarDate, PlanRecord};
use crate::store::{StoreError, WorkoutStore};
use rusqlite::{named_params, params, Connection, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const DB_FILE_NAME: &str = "plans.sqlite";
const APP_DATA_DIR: &str = "plancal";

// Custom Error type for DB operations
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database update failed: {0}")]
    UpdateFailed(rusqlite::Error),
    #[error("Database insert failed: {0}")]
    InsertFailed(rusqlite::Error),
    #[error("Database delete failed: {0}")]
    DeleteFailed(rusqlite::Error),
}

/// Gets the path to the SQLite database file within the app's data directory.
pub fn get_db_path() -> Result<PathBuf, DbError> {
    let data_dir = dirs::data_dir().ok_or(DbError::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR); // Same dir name as config
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, DbError> {
    let conn = Connection::open(path).map_err(DbError::Connection)?;
    Ok(conn)
}

/// Initializes the database tables if they don't exist.
/// Mirrors the plans API schema so records round-trip unchanged.
pub fn init_db(conn: &Connection) -> Result<(), DbError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS training_plan (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL, -- YYYY-MM-DD
            type TEXT,
            description TEXT,
            warmup_target TEXT,
            main_target TEXT,
            cooldown_target TEXT,
            terrain TEXT,
            notes TEXT,
            distance REAL
        )",
        [],
    )
    .map_err(DbError::Connection)?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_training_plan_date ON training_plan(date)",
        [],
    )
    .map_err(DbError::Connection)?;

    Ok(())
}

fn map_row_to_plan(row: &Row) -> Result<PlanRecord, rusqlite::Error> {
    Ok(PlanRecord {
        id: Some(row.get(0)?),
        date: row.get(1)?,
        kind: row.get(2)?,
        description: row.get(3)?,
        warmup_target: row.get(4)?,
        main_target: row.get(5)?,
        cooldown_target: row.get(6)?,
        terrain: row.get(7)?,
        notes: row.get(8)?,
        distance: row.get(9)?,
    })
}

pub fn list_plans(conn: &Connection) -> Result<Vec<PlanRecord>, DbError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, date, type, description, warmup_target, main_target,
                    cooldown_target, terrain, notes, distance
             FROM training_plan ORDER BY date ASC, id ASC",
        )
        .map_err(DbError::QueryFailed)?;
    let plan_iter = stmt
        .query_map([], map_row_to_plan)
        .map_err(DbError::QueryFailed)?;
    plan_iter
        .collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)
}

pub fn add_plan(conn: &Connection, record: &PlanRecord) -> Result<i64, DbError> {
    conn.execute(
        "INSERT INTO training_plan (date, type, description, warmup_target, main_target,
                                    cooldown_target, terrain, notes, distance)
         VALUES (:date, :type, :description, :warmup, :main, :cooldown, :terrain, :notes, :distance)",
        named_params! {
            ":date": record.date,
            ":type": record.kind,
            ":description": record.description,
            ":warmup": record.warmup_target,
            ":main": record.main_target,
            ":cooldown": record.cooldown_target,
            ":terrain": record.terrain,
            ":notes": record.notes,
            ":distance": record.distance,
        },
    )
    .map_err(DbError::InsertFailed)?;
    Ok(conn.last_insert_rowid())
}

/// Replaces every field of plan `id`. Returns the number of rows affected.
pub fn update_plan(conn: &Connection, id: i64, record: &PlanRecord) -> Result<usize, DbError> {
    conn.execute(
        "UPDATE training_plan SET date = :date, type = :type, description = :description,
                warmup_target = :warmup, main_target = :main, cooldown_target = :cooldown,
                terrain = :terrain, notes = :notes, distance = :distance
         WHERE id = :id",
        named_params! {
            ":id": id,
            ":date": record.date,
            ":type": record.kind,
            ":description": record.description,
            ":warmup": record.warmup_target,
            ":main": record.main_target,
            ":cooldown": record.cooldown_target,
            ":terrain": record.terrain,
            ":notes": record.notes,
            ":distance": record.distance,
        },
    )
    .map_err(DbError::UpdateFailed)
}

pub fn move_plan(conn: &Connection, id: i64, date: CalendarDate) -> Result<usize, DbError> {
    conn.execute(
        "UPDATE training_plan SET date = ?1 WHERE id = ?2",
        params![format_calendar_date(date), id],
    )
    .map_err(DbError::UpdateFailed)
}

pub fn delete_plan(conn: &Connection, id: i64) -> Result<usize, DbError> {
    conn.execute("DELETE FROM training_plan WHERE id = ?1", params![id])
        .map_err(DbError::DeleteFailed)
}

/// Offline store backed by a local SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = open_db(path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn require_row(id: i64, affected: usize) -> Result<(), StoreError> {
    if affected == 0 {
        Err(StoreError::NotFound(id))
    } else {
        Ok(())
    }
}

impl WorkoutStore for SqliteStore {
    fn load_all(&self) -> Result<Vec<PlanRecord>, StoreError> {
        Ok(list_plans(&self.conn)?)
    }

    fn create(&self, record: &PlanRecord) -> Result<i64, StoreError> {
        let id = add_plan(&self.conn, record)?;
        info!(id, date = %record.date, "plan created");
        Ok(id)
    }

    fn update(&self, id: i64, record: &PlanRecord) -> Result<(), StoreError> {
        require_row(id, update_plan(&self.conn, id, record)?)?;
        info!(id, "plan updated");
        Ok(())
    }

    fn move_to(&self, id: i64, date: CalendarDate) -> Result<(), StoreError> {
        require_row(id, move_plan(&self.conn, id, date)?)?;
        info!(id, %date, "plan moved");
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        require_row(id, delete_plan(&self.conn, id)?)?;
        info!(id, "plan deleted");
        Ok(())
    }
}
