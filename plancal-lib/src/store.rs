// src/store.rs
use crate::db::DbError;
use crate::model::{CalendarDate, PlanRecord};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Network(String),
    // The server's body text is the user-facing message.
    #[error("{body}")]
    Status { status: u16, body: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Could not obtain CSRF token: {0}")]
    Csrf(String),
    #[error("Plan not found: ID {0}")]
    NotFound(i64),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Remote (or local) collection of workout plans.
///
/// Every call is a full round trip; callers reload after any successful write.
pub trait WorkoutStore {
    fn load_all(&self) -> Result<Vec<PlanRecord>, StoreError>;
    fn create(&self, record: &PlanRecord) -> Result<i64, StoreError>;
    fn update(&self, id: i64, record: &PlanRecord) -> Result<(), StoreError>;
    fn move_to(&self, id: i64, date: CalendarDate) -> Result<(), StoreError>;
    fn delete(&self, id: i64) -> Result<(), StoreError>;
}

impl<S: WorkoutStore + ?Sized> WorkoutStore for Box<S> {
    fn load_all(&self) -> Result<Vec<PlanRecord>, StoreError> {
        (**self).load_all()
    }

    fn create(&self, record: &PlanRecord) -> Result<i64, StoreError> {
        (**self).create(record)
    }

    fn update(&self, id: i64, record: &PlanRecord) -> Result<(), StoreError> {
        (**self).update(id, record)
    }

    fn move_to(&self, id: i64, date: CalendarDate) -> Result<(), StoreError> {
        (**self).move_to(id, date)
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}
