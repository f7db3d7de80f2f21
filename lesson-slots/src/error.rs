use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("slot {0} is outside of 0..=95")]
    OutOfRange(i64),
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time `{0}`, expected HH:MM")]
    InvalidTime(String),
    #[error("invalid span of {len} slots starting at slot {start} on {date}")]
    InvalidSpan { date: NaiveDate, start: u8, len: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimezoneError {
    #[error("unknown timezone `{0}`")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error(transparent)]
    Timezone(#[from] TimezoneError),
}

pub type Result<T, E = ProjectionError> = std::result::Result<T, E>;
