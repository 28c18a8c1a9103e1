pub mod column;
pub mod period;
pub mod time;
pub mod times_row;
pub mod timetable;

use thiserror::Error;

pub use column::{Column, ColumnId, ColumnKind, NewColumn};
pub use period::Period;
pub use time::{TimeOfDay, TimeParseError, format_range};
pub use times_row::{TimesCell, TimesRows};
pub use timetable::{AnchorOption, ColumnUpdate, Timetable};

/// Rejected structural mutations. The model is unchanged when one is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Cannot delete the last period.")]
    LastPeriod,
    #[error("no period at index {0}")]
    PeriodOutOfRange(usize),
    #[error("no column with id {0}")]
    UnknownColumn(ColumnId),
    #[error("anchor {after} is outside 0..={periods}")]
    AnchorOutOfRange { after: usize, periods: usize },
    #[error("no day at index {0}")]
    DayOutOfRange(usize),
    #[error("day {day} has no open times cell {slot}")]
    NoTimesCell { day: usize, slot: usize },
}
