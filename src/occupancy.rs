//! Per-run occupancy tracking.
//!
//! One table per resource kind (faculty, room). Each table holds a flat
//! `ids x days x slots` boolean matrix and is dropped when the run ends.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct OccupancyTable {
    index: HashMap<String, usize>,
    days: usize,
    slots_per_day: usize,
    busy: Vec<bool>,
}

impl OccupancyTable {
    /// Creates a table with every cell free.
    pub fn new<'a, I>(ids: I, days: usize, slots_per_day: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let index: HashMap<String, usize> = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), i))
            .collect();
        let busy = vec![false; index.len() * days * slots_per_day];
        Self {
            index,
            days,
            slots_per_day,
            busy,
        }
    }

    fn offset(&self, id: &str, day: usize, slot: usize) -> Option<usize> {
        if day >= self.days || slot >= self.slots_per_day {
            return None;
        }
        self.index
            .get(id)
            .map(|&row| (row * self.days + day) * self.slots_per_day + slot)
    }

    /// `day` and `slot` are 0-indexed. Unknown ids and out-of-range cells read
    /// as `None`.
    pub fn is_busy(&self, id: &str, day: usize, slot: usize) -> Option<bool> {
        self.offset(id, day, slot).map(|i| self.busy[i])
    }

    pub fn is_free(&self, id: &str, day: usize, slot: usize) -> bool {
        self.is_busy(id, day, slot) == Some(false)
    }

    /// Marks a cell busy. Returns false if the cell does not exist.
    pub fn occupy(&mut self, id: &str, day: usize, slot: usize) -> bool {
        match self.offset(id, day, slot) {
            Some(i) => {
                self.busy[i] = true;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.busy.len()
    }

    pub fn occupied(&self) -> usize {
        self.busy.iter().filter(|b| **b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_free() {
        let t = OccupancyTable::new(["R1", "R2"], 5, 6);
        assert_eq!(t.len(), 60);
        assert_eq!(t.occupied(), 0);
        assert!(t.is_free("R2", 4, 5));
    }

    #[test]
    fn test_occupy_is_cell_local() {
        let mut t = OccupancyTable::new(["F1", "F2"], 2, 3);
        assert!(t.occupy("F1", 1, 2));
        assert_eq!(t.is_busy("F1", 1, 2), Some(true));
        assert_eq!(t.is_busy("F1", 1, 1), Some(false));
        assert_eq!(t.is_busy("F1", 0, 2), Some(false));
        assert_eq!(t.is_busy("F2", 1, 2), Some(false));
        assert_eq!(t.occupied(), 1);
    }

    #[test]
    fn test_unknown_and_out_of_range() {
        let mut t = OccupancyTable::new(["R1"], 1, 1);
        assert_eq!(t.is_busy("nope", 0, 0), None);
        assert_eq!(t.is_busy("R1", 1, 0), None);
        assert_eq!(t.is_busy("R1", 0, 1), None);
        assert!(!t.is_free("nope", 0, 0));
        assert!(!t.occupy("nope", 0, 0));
    }
}
