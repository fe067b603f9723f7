use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// Type aliases for clarity
pub type BatchId = String;
pub type SubjectId = String;
pub type FacultyId = String;
pub type RoomId = String;
/// 1-indexed slot within a day.
pub type Slot = u32;

/// A class group that needs a full week's schedule.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: BatchId,
    #[serde(default)]
    pub department: String,
    #[serde(default = "default_year")]
    pub year: u32,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub size: u32,
    #[serde(default = "default_shift")]
    pub shift: u32,
}

fn default_year() -> u32 {
    1
}

fn default_shift() -> u32 {
    1
}

/// A subject taught by exactly one faculty member. Any batch may take any subject.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub faculty_id: FacultyId,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
}

/// Represents a physical room. Capacity, type and resources are carried but
/// not consulted by the allocator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(rename = "type", default = "default_room_type")]
    pub room_type: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

fn default_room_type() -> String {
    "Lecture".to_string()
}

/// Snapshot of every entity a generation run reads.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub faculties: Vec<Faculty>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

/// The fixed weekly grid: ordered day names and slots per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleGrid {
    pub days: Vec<String>,
    pub slots_per_day: u32,
}

impl ScheduleGrid {
    pub fn new(days: Vec<String>, slots_per_day: u32) -> Self {
        Self {
            days,
            slots_per_day,
        }
    }

    /// Number of attempts per batch.
    pub fn cells(&self) -> usize {
        self.days.len() * self.slots_per_day as usize
    }
}

impl Default for ScheduleGrid {
    fn default() -> Self {
        Self::new(
            ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            6,
        )
    }
}

/// Represents a single placed session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub batch_id: BatchId,
    pub day: String,
    pub slot: Slot,
    pub subject_id: SubjectId,
    pub faculty_id: FacultyId,
    pub room_id: RoomId,
}

impl fmt::Display for TimetableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}#{}: {} / {} / {}",
            self.batch_id, self.day, self.slot, self.subject_id, self.faculty_id, self.room_id
        )
    }
}

/// Output of one allocator pass.
#[derive(Debug, Clone, Default)]
pub struct Allocation {
    pub entries: Vec<TimetableEntry>,
    pub scheduled: usize,
    pub unscheduled: usize,
}

impl Allocation {
    pub fn attempts(&self) -> usize {
        self.scheduled + self.unscheduled
    }
}

/// What the caller of a generation run gets back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub status: &'static str,
    pub scheduled: usize,
    pub unscheduled: usize,
}

impl From<&Allocation> for GenerationSummary {
    fn from(allocation: &Allocation) -> Self {
        Self {
            status: "ok",
            scheduled: allocation.scheduled,
            unscheduled: allocation.unscheduled,
        }
    }
}

/// Resolved names shown in one occupied cell of a batch timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionCell {
    pub subject: String,
    pub faculty: String,
    pub room: String,
}

/// Day x slot grid for one batch. Serializes as an object keyed by day name,
/// in grid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTimetable {
    days: Vec<(String, Vec<Option<SessionCell>>)>,
}

impl BatchTimetable {
    pub fn empty(grid: &ScheduleGrid) -> Self {
        Self {
            days: grid
                .days
                .iter()
                .map(|d| (d.clone(), vec![None; grid.slots_per_day as usize]))
                .collect(),
        }
    }

    /// Cells for `day`, 0-indexed by slot.
    #[cfg(test)]
    pub fn day(&self, day: &str) -> Option<&[Option<SessionCell>]> {
        self.days
            .iter()
            .find(|(d, _)| d == day)
            .map(|(_, cells)| cells.as_slice())
    }

    /// Places a cell at a 1-indexed slot. Returns false if the day or slot
    /// is outside the grid.
    pub fn set(&mut self, day: &str, slot: Slot, cell: SessionCell) -> bool {
        let Some((_, cells)) = self.days.iter_mut().find(|(d, _)| d == day) else {
            return false;
        };
        match (slot as usize).checked_sub(1).and_then(|i| cells.get_mut(i)) {
            Some(target) => {
                *target = Some(cell);
                true
            }
            None => false,
        }
    }

    pub fn occupied(&self) -> usize {
        self.days
            .iter()
            .flat_map(|(_, cells)| cells.iter())
            .filter(|c| c.is_some())
            .count()
    }
}

impl Serialize for BatchTimetable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, cells) in &self.days {
            map.serialize_entry(day, cells)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_defaults_match_reference_form() {
        let json = r#"{
            "batches": [{"id": "B1"}],
            "rooms": [{"id": "R1", "name": "Hall"}]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.batches[0].year, 1);
        assert_eq!(catalog.batches[0].shift, 1);
        assert_eq!(catalog.rooms[0].room_type, "Lecture");
        assert!(catalog.subjects.is_empty());
    }

    #[test]
    fn test_batch_timetable_set_bounds() {
        let grid = ScheduleGrid::default();
        let mut t = BatchTimetable::empty(&grid);
        let cell = SessionCell {
            subject: "Math".into(),
            faculty: "Dr. X".into(),
            room: "R1".into(),
        };
        assert!(t.set("Monday", 1, cell.clone()));
        assert!(t.set("Friday", 6, cell.clone()));
        assert!(!t.set("Monday", 0, cell.clone()));
        assert!(!t.set("Monday", 7, cell.clone()));
        assert!(!t.set("Sunday", 1, cell));
        assert_eq!(t.occupied(), 2);
    }

    #[test]
    fn test_batch_timetable_serializes_in_grid_order() {
        let grid = ScheduleGrid::new(vec!["Tue".into(), "Mon".into()], 2);
        let mut t = BatchTimetable::empty(&grid);
        t.set(
            "Mon",
            2,
            SessionCell {
                subject: "Math".into(),
                faculty: "Dr. X".into(),
                room: "R1".into(),
            },
        );
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(
            json,
            r#"{"Tue":[null,null],"Mon":[null,{"subject":"Math","faculty":"Dr. X","room":"R1"}]}"#
        );
    }
}
