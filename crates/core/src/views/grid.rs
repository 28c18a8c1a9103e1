use std::collections::BTreeMap;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use periodgrid_protocol::{
    EntityGrid, GridCommand, Lesson, LessonBadge, RawMeta, SlotRef, ThemeToken,
};

use super::View;
use crate::config::GridConfig;
use crate::model::{ColumnKind, Timetable};
use crate::sequence::SeqEntry;

/// Render every entity of the selected view as a card holding the week
/// grid: one header row of sequence columns, then one row per day, each
/// preceded by its times row when that is open.
///
/// Entities are emitted in ascending name order. An empty entity set
/// yields a single `EmptyState` command.
pub fn render_grid(
    view: View,
    grids: &BTreeMap<String, EntityGrid>,
    timetable: &Timetable,
    meta: Option<&RawMeta>,
    config: &GridConfig,
) -> Vec<GridCommand> {
    if grids.is_empty() {
        return vec![GridCommand::EmptyState {
            message: format!("No {view} found."),
        }];
    }

    let seq = timetable.sequence();
    let title = meta
        .and_then(RawMeta::display_name)
        .unwrap_or(&config.unnamed_title)
        .to_string();
    let dated = format_dated(meta.and_then(RawMeta::published), config);

    let rows_per_card = timetable.days().len() * 2 + 1;
    let mut commands = Vec::with_capacity(grids.len() * (rows_per_card * (seq.len() + 2) + 2));
    for (entity, grid) in grids {
        commands.push(GridCommand::BeginCard {
            entity: entity.clone(),
            heading: format!("{}: {entity}", view.title_prefix()),
            title: title.clone(),
            dated: dated.clone(),
        });
        render_table(&mut commands, grid, timetable, &seq, config);
        commands.push(GridCommand::EndCard);
    }
    commands
}

fn render_table(
    commands: &mut Vec<GridCommand>,
    grid: &EntityGrid,
    timetable: &Timetable,
    seq: &[SeqEntry<'_>],
    config: &GridConfig,
) {
    commands.push(GridCommand::BeginHeaderRow {
        corner: config.day_header.clone(),
    });
    for (column, entry) in seq.iter().enumerate() {
        let (slot, color) = match entry {
            SeqEntry::Period { index, .. } => {
                (SlotRef::Period { index: *index }, ThemeToken::PeriodHeader)
            }
            SeqEntry::Column(c) => (
                SlotRef::Column {
                    id: c.id.to_string(),
                    kind: c.kind.as_str().to_string(),
                },
                ThemeToken::ColumnHeader,
            ),
        };
        commands.push(GridCommand::HeaderCell {
            column,
            label: entry.label().to_string(),
            time_range: entry.time_range(),
            slot,
            color,
        });
    }
    commands.push(GridCommand::EndRow);

    let times_rows = timetable.times_rows();
    for (day_index, day) in timetable.days().iter().enumerate() {
        if let Some(cells) = times_rows.row(day_index) {
            commands.push(GridCommand::BeginTimesRow {
                day_index,
                label: config.times_label.clone(),
            });
            for column in 0..seq.len() {
                commands.push(GridCommand::TimesCell {
                    day_index,
                    column,
                    text: cells.get(column).map(|c| c.text.clone()).unwrap_or_default(),
                });
            }
            commands.push(GridCommand::EndRow);
        }

        commands.push(GridCommand::BeginDayRow {
            day_index,
            day: day.clone(),
            times_open: times_rows.is_open(day_index),
            color: if day_index % 2 == 0 {
                ThemeToken::DayRowEven
            } else {
                ThemeToken::DayRowOdd
            },
        });
        for (column, entry) in seq.iter().enumerate() {
            commands.push(match entry {
                SeqEntry::Period { index, .. } => GridCommand::LessonCell {
                    column,
                    lessons: grid
                        .lessons(day_index, *index)
                        .iter()
                        .map(|lesson| badge(lesson, config))
                        .collect(),
                },
                SeqEntry::Column(c) => GridCommand::FillerCell {
                    column,
                    label: c.label.clone(),
                    color: filler_color(&c.kind),
                },
            });
        }
        commands.push(GridCommand::EndRow);
    }
}

fn filler_color(kind: &ColumnKind) -> ThemeToken {
    match kind {
        ColumnKind::Break => ThemeToken::BreakFill,
        ColumnKind::Assembly => ThemeToken::AssemblyFill,
        ColumnKind::Other(_) => ThemeToken::ColumnFill,
    }
}

fn badge(lesson: &Lesson, config: &GridConfig) -> LessonBadge {
    let or_dash = |s: &Option<String>| {
        s.as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("-")
            .to_string()
    };
    LessonBadge {
        subject: or_dash(&lesson.subject),
        detail: format!("{} • {}", or_dash(&lesson.teacher), or_dash(&lesson.class)),
        color: lesson.color().unwrap_or(&config.lesson_color).to_string(),
    }
}

/// Format a publish timestamp as a date. Absent or unreadable input gives
/// the placeholder.
pub fn format_dated(raw: Option<&str>, config: &GridConfig) -> String {
    let Some(date) = raw.map(str::trim).and_then(parse_date) else {
        return config.dated_placeholder.clone();
    };
    let items: Vec<Item<'_>> = StrftimeItems::new(&config.date_format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return date.format("%Y-%m-%d").to_string();
    }
    date.format_with_items(items.into_iter()).to_string()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}
