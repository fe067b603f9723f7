use crate::data::{BatchTimetable, GenerationSummary, ScheduleGrid, SessionCell};
use crate::error::ScheduleError;
use crate::solver;
use crate::store::{EntityRepository, TimetableStore};
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Runs generations against a repository and a store, and answers batch
/// timetable queries from what was stored last.
pub struct TimetableService {
    repository: Arc<dyn EntityRepository>,
    store: Arc<dyn TimetableStore>,
    grid: ScheduleGrid,
    seed: Option<u64>,
    run_lock: Mutex<()>,
}

impl TimetableService {
    pub fn new(
        repository: Arc<dyn EntityRepository>,
        store: Arc<dyn TimetableStore>,
        grid: ScheduleGrid,
    ) -> Self {
        Self {
            repository,
            store,
            grid,
            seed: None,
            run_lock: Mutex::new(()),
        }
    }

    /// Seeds every run with `seed`, making runs on the same catalog repeatable.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn grid(&self) -> &ScheduleGrid {
        &self.grid
    }

    /// Runs one full generation and replaces the stored entries with its
    /// result. Runs are serialized. On any error the previously stored
    /// entries are left untouched.
    pub fn generate_timetable(&self) -> Result<GenerationSummary, ScheduleError> {
        let _guard = self
            .run_lock
            .lock()
            .map_err(|e| ScheduleError::Persistence(format!("run lock poisoned: {}", e)))?;

        let catalog = self.repository.snapshot()?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let allocation = solver::allocate(&catalog, &self.grid, &mut rng).inspect_err(|e| {
            warn!("Generation rejected: {}", e);
        })?;
        let summary = GenerationSummary::from(&allocation);

        let stored = allocation.entries.len();
        self.store.replace_all(allocation.entries).inspect_err(|e| {
            error!("Keeping previous timetable: {}", e);
        })?;
        info!("Stored {} timetable entries", stored);

        Ok(summary)
    }

    /// Projects the stored entries of one batch onto the day x slot grid,
    /// resolving ids to names. Entries whose subject, faculty or room no
    /// longer exist, or that fall outside the grid, leave their cell empty.
    pub fn batch_timetable(&self, batch_id: &str) -> Result<BatchTimetable, ScheduleError> {
        let catalog = self.repository.snapshot()?;
        let subjects: HashMap<&str, &str> = catalog
            .subjects
            .iter()
            .map(|s| (s.id.as_str(), s.name.as_str()))
            .collect();
        let faculties: HashMap<&str, &str> = catalog
            .faculties
            .iter()
            .map(|f| (f.id.as_str(), f.name.as_str()))
            .collect();
        let rooms: HashMap<&str, &str> = catalog
            .rooms
            .iter()
            .map(|r| (r.id.as_str(), r.name.as_str()))
            .collect();

        let mut timetable = BatchTimetable::empty(&self.grid);
        for entry in self.store.entries_for_batch(batch_id)? {
            let resolved = (
                subjects.get(entry.subject_id.as_str()),
                faculties.get(entry.faculty_id.as_str()),
                rooms.get(entry.room_id.as_str()),
            );
            let (Some(subject), Some(faculty), Some(room)) = resolved else {
                debug!("Skipping unresolved entry {}", entry);
                continue;
            };
            let cell = SessionCell {
                subject: subject.to_string(),
                faculty: faculty.to_string(),
                room: room.to_string(),
            };
            if !timetable.set(&entry.day, entry.slot, cell) {
                debug!("Skipping entry outside the grid {}", entry);
            }
        }
        debug!("Batch {}: {} sessions", batch_id, timetable.occupied());
        Ok(timetable)
    }
}
