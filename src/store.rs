//! Persistence boundary.
//!
//! Entities come from an [`EntityRepository`] snapshot; generated entries go
//! to a [`TimetableStore`], which replaces its whole entry set in one step.

use crate::data::{Catalog, TimetableEntry};
use crate::error::ScheduleError;
use log::{info, warn};
use std::path::Path;
use std::sync::RwLock;

/// Read access to the externally managed entities.
pub trait EntityRepository: Send + Sync {
    /// Owned copy of every entity, used unchanged for one run.
    fn snapshot(&self) -> Result<Catalog, ScheduleError>;
}

impl EntityRepository for Catalog {
    fn snapshot(&self) -> Result<Catalog, ScheduleError> {
        Ok(self.clone())
    }
}

impl Catalog {
    /// Loads a JSON catalog. A missing file gives an empty catalog.
    pub fn load(path: &Path) -> Result<Self, ScheduleError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Catalog {} not found, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ScheduleError::Catalog(format!("{}: {}", path.display(), e)));
            }
        };
        let catalog: Catalog = serde_json::from_str(&raw)
            .map_err(|e| ScheduleError::Catalog(format!("{}: {}", path.display(), e)))?;
        info!(
            "Loaded catalog from {}: {} batches, {} subjects, {} faculties, {} rooms",
            path.display(),
            catalog.batches.len(),
            catalog.subjects.len(),
            catalog.faculties.len(),
            catalog.rooms.len()
        );
        Ok(catalog)
    }
}

/// Storage for generated timetable entries.
pub trait TimetableStore: Send + Sync {
    /// Discards every stored entry and stores `entries` instead. Either the
    /// whole replacement happens or nothing changes.
    fn replace_all(&self, entries: Vec<TimetableEntry>) -> Result<(), ScheduleError>;

    fn entries_for_batch(&self, batch_id: &str) -> Result<Vec<TimetableEntry>, ScheduleError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTimetableStore {
    entries: RwLock<Vec<TimetableEntry>>,
}

impl InMemoryTimetableStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> Result<usize, ScheduleError> {
        self.entries
            .read()
            .map(|e| e.len())
            .map_err(|e| ScheduleError::Persistence(e.to_string()))
    }
}

impl TimetableStore for InMemoryTimetableStore {
    fn replace_all(&self, entries: Vec<TimetableEntry>) -> Result<(), ScheduleError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|e| ScheduleError::Persistence(e.to_string()))?;
        *guard = entries;
        Ok(())
    }

    fn entries_for_batch(&self, batch_id: &str) -> Result<Vec<TimetableEntry>, ScheduleError> {
        let guard = self
            .entries
            .read()
            .map_err(|e| ScheduleError::Persistence(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|e| e.batch_id == batch_id)
            .cloned()
            .collect())
    }
}
