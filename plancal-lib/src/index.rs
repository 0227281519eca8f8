// src/index.rs
use crate::model::{CalendarDate, EntryKind, PlanRecord, WorkoutEntry};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Entries anchored on one calendar day, split by kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DayBucket {
    pub planned: Vec<WorkoutEntry>,
    pub imported: Option<WorkoutEntry>,
}

static EMPTY_BUCKET: DayBucket = DayBucket {
    planned: Vec::new(),
    imported: None,
};

impl DayBucket {
    pub fn is_empty(&self) -> bool {
        self.planned.is_empty() && self.imported.is_none()
    }

    pub fn len(&self) -> usize {
        self.planned.len() + usize::from(self.imported.is_some())
    }

    /// Planned entries first, then the imported one, in display order.
    pub fn entries(&self) -> impl Iterator<Item = &WorkoutEntry> {
        self.planned.iter().chain(self.imported.iter())
    }
}

/// Date -> bucket mapping. Always rebuilt wholesale from a full record set.
#[derive(Debug, Clone, Default)]
pub struct WorkoutIndex {
    days: HashMap<CalendarDate, DayBucket>,
    skipped: usize,
}

impl WorkoutIndex {
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PlanRecord>,
    {
        let mut index = Self::default();
        for record in records {
            match WorkoutEntry::from_record(record) {
                Ok(entry) => index.insert(entry),
                Err(e) => {
                    warn!("Skipping workout record: {}", e);
                    index.skipped += 1;
                }
            }
        }
        debug!(
            days = index.days.len(),
            skipped = index.skipped,
            "workout index rebuilt"
        );
        index
    }

    fn insert(&mut self, entry: WorkoutEntry) {
        let bucket = self.days.entry(entry.date).or_default();
        match entry.kind {
            EntryKind::Planned => bucket.planned.push(entry),
            // Last one wins if the feed ever returns several imports for a day.
            EntryKind::Imported => bucket.imported = Some(entry),
        }
    }

    /// Never fails: unknown dates yield an empty bucket.
    pub fn lookup(&self, date: CalendarDate) -> &DayBucket {
        self.days.get(&date).unwrap_or(&EMPTY_BUCKET)
    }

    pub fn find(&self, id: i64) -> Option<&WorkoutEntry> {
        self.days
            .values()
            .flat_map(|bucket| bucket.entries())
            .find(|entry| entry.id == Some(id))
    }

    /// All entries within `[from, to]`, ordered by date.
    pub fn entries_between(&self, from: CalendarDate, to: CalendarDate) -> Vec<&WorkoutEntry> {
        let mut dates: Vec<_> = self
            .days
            .keys()
            .filter(|d| **d >= from && **d <= to)
            .copied()
            .collect();
        dates.sort_unstable();
        dates
            .into_iter()
            .flat_map(|d| self.lookup(d).entries())
            .collect()
    }

    pub fn entry_count(&self) -> usize {
        self.days.values().map(DayBucket::len).sum()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
