use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("subject '{subject}' references unknown faculty '{faculty}'")]
    UnknownFaculty { subject: String, faculty: String },

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("invalid schedule grid: {0}")]
    InvalidGrid(String),

    #[error("failed to store timetable: {0}")]
    Persistence(String),

    #[error("failed to read catalog: {0}")]
    Catalog(String),

    #[error("generation task failed: {0}")]
    Task(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScheduleError {
    /// True for errors caused by the input entities or grid rather than the
    /// runtime environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownFaculty { .. } | Self::DuplicateId { .. } | Self::InvalidGrid(_)
        )
    }
}
