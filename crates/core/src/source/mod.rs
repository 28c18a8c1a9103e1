//! Schedule source adapter: turns the payload a page receives into the
//! editable model plus the read-only lesson grids.

pub mod raw;

use std::collections::BTreeMap;

use periodgrid_protocol::{EntityGrid, RawMeta, RawSlot, SchedulePayload};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{ColumnKind, NewColumn, Period, TimeOfDay, Timetable};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid schedule payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only data carried alongside the timetable.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub classes: BTreeMap<String, EntityGrid>,
    pub teachers: BTreeMap<String, EntityGrid>,
    pub meta: Option<RawMeta>,
}

/// Decode either a prepared payload or a raw timetable export, telling
/// them apart by shape.
pub fn load(data: &[u8]) -> Result<SchedulePayload, SourceError> {
    let value: Value = serde_json::from_slice(data)?;
    if let Some(timetable) = raw::unwrap_envelope(&value) {
        debug!("reading raw timetable export");
        return Ok(raw::build_payload(timetable));
    }
    Ok(serde_json::from_value(value)?)
}

/// Split a payload into the editable timetable and the lesson data.
///
/// Regular periods keep their order. Every other slot becomes a column
/// anchored after however many periods precede it in the list.
pub fn from_payload(payload: SchedulePayload) -> (Timetable, Schedule) {
    let SchedulePayload {
        days,
        periods: slots,
        classes_grid,
        teachers_grid,
        raw_meta,
    } = payload;

    let mut periods = Vec::new();
    let mut columns = Vec::new();
    for slot in &slots {
        let start = lenient_time(slot, slot.start_time.as_deref());
        let end = lenient_time(slot, slot.end_time.as_deref());
        if slot.is_period() {
            periods.push(Period::new(slot.name.clone(), start, end));
        } else {
            columns.push(NewColumn {
                kind: ColumnKind::from(slot.kind.as_deref().unwrap_or_default()),
                label: slot.name.clone(),
                after: periods.len(),
                start,
                end,
            });
        }
    }

    let mut timetable = Timetable::new(days, periods);
    for column in columns {
        // Anchors never exceed the periods seen so far.
        if let Err(err) = timetable.add_column(column) {
            warn!(%err, "dropping column");
        }
    }

    info!(
        days = timetable.days().len(),
        periods = timetable.periods().len(),
        columns = timetable.columns().len(),
        classes = classes_grid.len(),
        teachers = teachers_grid.len(),
        "schedule loaded"
    );

    let schedule = Schedule {
        classes: classes_grid,
        teachers: teachers_grid,
        meta: raw_meta,
    };
    (timetable, schedule)
}

fn lenient_time(slot: &RawSlot, raw: Option<&str>) -> Option<TimeOfDay> {
    TimeOfDay::parse_opt(raw).unwrap_or_else(|err| {
        warn!(slot = %slot.name, %err, "ignoring unreadable time");
        None
    })
}
