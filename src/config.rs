use crate::data::ScheduleGrid;
use crate::error::ScheduleError;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const BIND_VAR: &str = "TIMETABLE_BIND";
pub const CATALOG_VAR: &str = "TIMETABLE_CATALOG";
pub const DAYS_VAR: &str = "TIMETABLE_DAYS";
pub const SLOTS_VAR: &str = "TIMETABLE_SLOTS_PER_DAY";
pub const SEED_VAR: &str = "TIMETABLE_SEED";

/// Runtime settings for the scheduler service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub catalog_path: PathBuf,
    pub grid: ScheduleGrid,
    /// When set, every generation run is seeded with this value.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            catalog_path: PathBuf::from("catalog.json"),
            grid: ScheduleGrid::default(),
            seed: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ScheduleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScheduleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bind) = lookup(BIND_VAR) {
            config.bind = bind
                .parse()
                .map_err(|e| ScheduleError::Config(format!("{}={}: {}", BIND_VAR, bind, e)))?;
        }
        if let Some(path) = lookup(CATALOG_VAR) {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(days) = lookup(DAYS_VAR) {
            config.grid.days = days
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(slots) = lookup(SLOTS_VAR) {
            config.grid.slots_per_day = slots
                .trim()
                .parse()
                .map_err(|e| ScheduleError::Config(format!("{}={}: {}", SLOTS_VAR, slots, e)))?;
        }
        if let Some(seed) = lookup(SEED_VAR) {
            let seed = seed
                .trim()
                .parse()
                .map_err(|e| ScheduleError::Config(format!("{}={}: {}", SEED_VAR, seed, e)))?;
            config.seed = Some(seed);
        }

        Ok(config)
    }
}
