//! Normalisation of raw timetable API exports into a `SchedulePayload`.
//!
//! Exports come in several envelopes and with several spellings for the
//! same field, so everything here reads `serde_json::Value` leniently and
//! falls back to defaults instead of failing.

use std::collections::{BTreeMap, HashMap};

use periodgrid_protocol::{EntityGrid, Lesson, RawMeta, RawSlot, SchedulePayload};
use serde_json::{Map, Value};
use tracing::{debug, warn};

const DEFAULT_DAYS: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const TIMETABLE_KEYS: [&str; 6] = [
    "_id",
    "generalSettings",
    "schedule",
    "subjects",
    "classes",
    "teachers",
];

/// Find the timetable document inside a response envelope.
///
/// Listings pick the first published timetable, else the first entry.
pub fn unwrap_envelope(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(obj) if looks_like_timetable(obj) => Some(obj),
        Value::Object(obj) => obj
            .get("data")
            .filter(|data| is_truthy(data))
            .or_else(|| obj.get("timetables").filter(|list| is_truthy(list)))
            .and_then(unwrap_envelope),
        Value::Array(items) => {
            let chosen = items
                .iter()
                .find(|t| str_field(t, &["status"]) == Some("published"))
                .or_else(|| items.first())?;
            unwrap_envelope(chosen)
        }
        _ => None,
    }
}

fn looks_like_timetable(obj: &Map<String, Value>) -> bool {
    TIMETABLE_KEYS.iter().any(|k| obj.contains_key(*k))
}

/// Shape one timetable document into a payload.
pub fn build_payload(raw: &Map<String, Value>) -> SchedulePayload {
    let general = raw.get("generalSettings").unwrap_or(&Value::Null);

    let days: Vec<String> = ["dayNames", "days"]
        .iter()
        .filter_map(|k| general.get(*k).and_then(Value::as_array))
        .find(|list| !list.is_empty())
        .map(|list| list.iter().map(display_string).collect())
        .unwrap_or_else(|| DEFAULT_DAYS.iter().map(|d| (*d).to_string()).collect());

    let raw_periods: &[Value] = general
        .get("periods")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);
    let per_day = periods_per_day(general).unwrap_or(raw_periods.len());

    let periods: Vec<RawSlot> = (0..per_day)
        .map(|i| {
            let p = raw_periods.get(i).unwrap_or(&Value::Null);
            RawSlot {
                name: str_field(p, &["name", "label"])
                    .map_or_else(|| format!("Period {}", i + 1), str::to_string),
                kind: None,
                start_time: str_field(p, &["start_time", "startTime", "start"]).map(str::to_string),
                end_time: str_field(p, &["end_time", "endTime", "end"]).map(str::to_string),
            }
        })
        .collect();

    let classes = index_by_id(raw.get("classes"));
    let teachers = index_by_id(raw.get("teachers"));
    let subjects = index_by_id(raw.get("subjects").or_else(|| raw.get("lessons")));

    let mut classes_grid: BTreeMap<String, EntityGrid> = BTreeMap::new();
    let mut teachers_grid: BTreeMap<String, EntityGrid> = BTreeMap::new();

    let entries = raw
        .get("schedule")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);
    for entry in entries {
        let day = resolve_day(entry, &days);
        let period = resolve_period(entry);

        let (subject, subject_color) = lookup(entry, &["subjectIds", "subjectId"], &subjects);
        let (teacher, teacher_color) = lookup(entry, &["teacherIds", "teacherId"], &teachers);
        let (class, class_color) = lookup(entry, &["classIds", "classId"], &classes);
        let lesson = Lesson {
            subject: Some(subject),
            subject_color,
            teacher: Some(teacher.clone()),
            teacher_color,
            class: Some(class.clone()),
            class_color,
            length: entry
                .get("length")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(1),
        };

        // Entities get a grid even when this entry falls outside it.
        let class_grid = classes_grid.entry(class).or_default();
        let teacher_grid = teachers_grid.entry(teacher).or_default();
        let slot = period
            .and_then(|p| usize::try_from(p).ok())
            .filter(|p| *p < per_day);
        match slot {
            Some(period) if day < days.len() => {
                class_grid.push(day, period, lesson.clone());
                teacher_grid.push(day, period, lesson);
            }
            _ => warn!(day, ?period, "schedule entry outside the grid"),
        }
    }

    let meta = RawMeta {
        id: ["_id", "id"]
            .iter()
            .find_map(|k| raw.get(*k).filter(|v| is_truthy(v)))
            .map(display_string),
        name: str_field_in(raw, &["name"])
            .or_else(|| str_field(general, &["timetableName"]))
            .or_else(|| str_field_in(raw, &["title"]))
            .map(str::to_string),
        title: None,
        published_at_camel: str_field_in(
            raw,
            &["publishedAt", "published_at", "createdAt", "created_at"],
        )
        .map(str::to_string),
        ..RawMeta::default()
    };

    debug!(
        days = days.len(),
        periods = periods.len(),
        entries = entries.len(),
        "export normalised"
    );

    SchedulePayload {
        days,
        periods,
        classes_grid,
        teachers_grid,
        raw_meta: Some(meta),
    }
}

fn periods_per_day(general: &Value) -> Option<usize> {
    let raw = ["periodsPerDay", "periods_per_day"]
        .iter()
        .find_map(|k| general.get(*k).filter(|v| is_truthy(v)))?;
    let n = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    usize::try_from(n).ok().filter(|n| *n > 0)
}

fn resolve_day(entry: &Value, days: &[String]) -> usize {
    let Some(name) = str_field(entry, &["day", "dayName", "day_name"]) else {
        return 0;
    };
    if let Some(i) = days.iter().position(|d| d == name) {
        return i;
    }
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    days.iter()
        .position(|d| d.to_lowercase().starts_with(&prefix))
        .unwrap_or_else(|| {
            warn!(day = name, "unknown day name, using the first day");
            0
        })
}

/// Signed so that negative indices reach the range check. A missing key
/// means the first period; an unreadable one is `None`.
fn resolve_period(entry: &Value) -> Option<i64> {
    let value = ["period_index", "period", "periodIndex", "index"]
        .iter()
        .find_map(|k| entry.get(*k).filter(|v| !v.is_null()));
    match value {
        None => Some(0),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    }
}

/// Index a list of objects by `id`/`_id`, falling back to `name`/`title`.
fn index_by_id(list: Option<&Value>) -> HashMap<String, &Value> {
    list.and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| {
            let key = ["id", "_id"]
                .iter()
                .find_map(|k| item.get(*k).filter(|v| !v.is_null()))
                .or_else(|| {
                    ["name", "title"]
                        .iter()
                        .find_map(|k| item.get(*k).filter(|v| !v.is_null()))
                })?;
            Some((display_string(key), item))
        })
        .collect()
}

/// Resolve the first referenced id to `(name, colour)`; unresolved names
/// are `"-"`.
fn lookup(
    entry: &Value,
    keys: &[&str; 2],
    index: &HashMap<String, &Value>,
) -> (String, Option<String>) {
    let [many, one] = *keys;
    let id = match entry.get(many).filter(|v| is_truthy(v)) {
        Some(Value::Array(ids)) => ids.first(),
        Some(_) => None,
        None => entry.get(one).filter(|v| is_truthy(v)),
    };
    let Some(found) = id.and_then(|id| index.get(&display_string(id))) else {
        return ("-".to_string(), None);
    };
    let name = str_field(found, &["name", "title"]).unwrap_or("-").to_string();
    let color = str_field(found, &["color"]).map(str::to_string);
    (name, color)
}

fn str_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    value.as_object().and_then(|obj| str_field_in(obj, keys))
}

fn str_field_in<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Mirrors the loose "is this set" checks exports rely on.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
