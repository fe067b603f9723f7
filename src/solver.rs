use crate::data::{Allocation, Catalog, ScheduleGrid, Slot, Subject, TimetableEntry};
use crate::error::ScheduleError;
use crate::occupancy::OccupancyTable;
use itertools::Itertools;
use log::{debug, info, trace, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::time::Instant;

/// Checks the grid and the catalog before a run.
///
/// Rejects an empty or repeating day list, a zero slot count, duplicate ids
/// within any entity kind, and subjects whose faculty is not in the catalog.
pub fn validate(catalog: &Catalog, grid: &ScheduleGrid) -> Result<(), ScheduleError> {
    if grid.days.is_empty() {
        return Err(ScheduleError::InvalidGrid("no days configured".to_string()));
    }
    if let Some(day) = grid.days.iter().duplicates().next() {
        return Err(ScheduleError::InvalidGrid(format!("day '{}' listed twice", day)));
    }
    if grid.slots_per_day == 0 {
        return Err(ScheduleError::InvalidGrid(
            "slots per day must be at least 1".to_string(),
        ));
    }

    reject_duplicates("batch", catalog.batches.iter().map(|b| b.id.as_str()))?;
    reject_duplicates("subject", catalog.subjects.iter().map(|s| s.id.as_str()))?;
    reject_duplicates("faculty", catalog.faculties.iter().map(|f| f.id.as_str()))?;
    reject_duplicates("room", catalog.rooms.iter().map(|r| r.id.as_str()))?;

    let faculty_ids: HashSet<&str> = catalog.faculties.iter().map(|f| f.id.as_str()).collect();
    if let Some(subject) = catalog
        .subjects
        .iter()
        .find(|s| !faculty_ids.contains(s.faculty_id.as_str()))
    {
        return Err(ScheduleError::UnknownFaculty {
            subject: subject.id.clone(),
            faculty: subject.faculty_id.clone(),
        });
    }

    Ok(())
}

fn reject_duplicates<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ScheduleError> {
    match ids.duplicates().next() {
        Some(id) => Err(ScheduleError::DuplicateId {
            kind,
            id: id.to_string(),
        }),
        None => Ok(()),
    }
}

/// Greedily fills every (batch, day, slot) of the grid.
///
/// Attempts run batch by batch, then day by day in grid order, then slot by
/// slot ascending. Each attempt draws a fresh random permutation of the
/// subjects and takes the first one whose faculty is free and for which a
/// room is free; the room is the first free one in catalog order. Placements
/// are never revisited, so a feasible full schedule may be missed.
pub fn allocate<R: Rng + ?Sized>(
    catalog: &Catalog,
    grid: &ScheduleGrid,
    rng: &mut R,
) -> Result<Allocation, ScheduleError> {
    validate(catalog, grid)?;
    let start_time = Instant::now();

    let days = grid.days.len();
    let slots = grid.slots_per_day as usize;
    info!(
        "Allocating {} batches over {} days x {} slots with {} subjects, {} faculties and {} rooms...",
        catalog.batches.len(),
        days,
        slots,
        catalog.subjects.len(),
        catalog.faculties.len(),
        catalog.rooms.len()
    );

    let mut faculty_busy = OccupancyTable::new(
        catalog.faculties.iter().map(|f| f.id.as_str()),
        days,
        slots,
    );
    let mut room_busy = OccupancyTable::new(catalog.rooms.iter().map(|r| r.id.as_str()), days, slots);

    let mut allocation = Allocation::default();
    let mut candidates: Vec<&Subject> = catalog.subjects.iter().collect();

    for batch in &catalog.batches {
        for (day_idx, day) in grid.days.iter().enumerate() {
            for slot in 0..slots {
                candidates.shuffle(rng);
                let placed = place(
                    &candidates,
                    catalog,
                    day_idx,
                    slot,
                    &mut faculty_busy,
                    &mut room_busy,
                );
                match placed {
                    Some((subject, room_id)) => {
                        allocation.entries.push(TimetableEntry {
                            batch_id: batch.id.clone(),
                            day: day.clone(),
                            slot: slot as Slot + 1,
                            subject_id: subject.id.clone(),
                            faculty_id: subject.faculty_id.clone(),
                            room_id,
                        });
                        allocation.scheduled += 1;
                    }
                    None => {
                        trace!("No free combination for {} on {} slot {}", batch.id, day, slot + 1);
                        allocation.unscheduled += 1;
                    }
                }
            }
        }
    }

    debug!(
        "Room cells in use: {}/{}, faculty cells in use: {}/{}",
        room_busy.occupied(),
        room_busy.len(),
        faculty_busy.occupied(),
        faculty_busy.len()
    );
    let total = catalog.batches.len() * grid.cells();
    debug_assert_eq!(allocation.attempts(), total);
    if allocation.unscheduled > 0 {
        warn!(
            "{} of {} attempts could not be scheduled",
            allocation.unscheduled, total
        );
    }
    info!(
        "Allocation finished in {:.2?}: {} scheduled, {} unscheduled",
        start_time.elapsed(),
        allocation.scheduled,
        allocation.unscheduled
    );
    Ok(allocation)
}

// Scans subjects in the given order and commits the first placement whose
// faculty and some room are both free at (day, slot).
fn place<'a>(
    candidates: &[&'a Subject],
    catalog: &Catalog,
    day: usize,
    slot: usize,
    faculty_busy: &mut OccupancyTable,
    room_busy: &mut OccupancyTable,
) -> Option<(&'a Subject, String)> {
    let free_room = catalog
        .rooms
        .iter()
        .find(|r| room_busy.is_free(&r.id, day, slot))?;

    let subject = candidates
        .iter()
        .copied()
        .find(|s| faculty_busy.is_free(&s.faculty_id, day, slot))?;

    faculty_busy.occupy(&subject.faculty_id, day, slot);
    room_busy.occupy(&free_room.id, day, slot);
    Some((subject, free_room.id.clone()))
}
