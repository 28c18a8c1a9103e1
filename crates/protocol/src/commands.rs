use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;

/// A single, stateless grid render instruction.
///
/// The core emits a `Vec<GridCommand>` for the selected view. Renderers
/// consume this list sequentially; each command carries all the data it
/// needs. `Begin*` commands are closed by the matching `End*`/`EndRow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GridCommand {
    /// Replaces all cards when the selected view has no entities.
    EmptyState { message: String },

    /// Start one entity's card. `heading` is "Class: 7A" style text,
    /// `title` the timetable name, `dated` the formatted publish date.
    BeginCard {
        entity: String,
        heading: String,
        title: String,
        dated: String,
    },

    /// Start the column header row; `corner` labels the day column.
    BeginHeaderRow { corner: String },

    /// One header cell per column-sequence entry.
    HeaderCell {
        column: usize,
        label: String,
        time_range: String,
        slot: SlotRef,
        color: ThemeToken,
    },

    /// Start the times overlay row drawn above its day row.
    BeginTimesRow { day_index: usize, label: String },

    /// One free-text cell of a times overlay row.
    TimesCell {
        day_index: usize,
        column: usize,
        text: String,
    },

    /// Start a day row. `times_open` tells the toggle control which glyph
    /// to show.
    BeginDayRow {
        day_index: usize,
        day: String,
        times_open: bool,
        color: ThemeToken,
    },

    /// A period cell holding zero or more stacked lesson badges.
    LessonCell {
        column: usize,
        lessons: Vec<LessonBadge>,
    },

    /// A non-period cell repeating the column label.
    FillerCell {
        column: usize,
        label: String,
        color: ThemeToken,
    },

    /// Close the current header, times or day row.
    EndRow,

    /// Close the current card.
    EndCard,
}

/// Identifies what a header cell stands for, so hosts can route clicks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum SlotRef {
    Period { index: usize },
    Column { id: String, kind: String },
}

/// Display data of one lesson inside a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonBadge {
    pub subject: String,
    /// "<teacher> • <class>".
    pub detail: String,
    /// CSS colour used for the badge border and tint.
    pub color: String,
}

impl GridCommand {
    /// Header labels in column order, as a renderer would show them.
    pub fn header_labels(commands: &[GridCommand]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|cmd| match cmd {
                GridCommand::HeaderCell { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}
