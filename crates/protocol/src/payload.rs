use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// The schedule document a page is rendered from.
///
/// Every field tolerates being absent or `null`; a missing section is the
/// same as an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub days: Vec<String>,
    /// Regular periods and auxiliary columns in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub periods: Vec<RawSlot>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classes_grid: BTreeMap<String, EntityGrid>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teachers_grid: BTreeMap<String, EntityGrid>,
    #[serde(default)]
    pub raw_meta: Option<RawMeta>,
}

/// One entry of the flat slot list: either a regular period or an
/// auxiliary column (break, assembly, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSlot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl RawSlot {
    /// A missing, empty or `"period"` type marks a regular period.
    pub fn is_period(&self) -> bool {
        self.kind
            .as_deref()
            .is_none_or(|k| k.is_empty() || k == "period")
    }
}

/// Optional descriptive metadata about the timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMeta {
    #[serde(
        default,
        alias = "_id",
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "publishedAt", default, skip_serializing_if = "Option::is_none")]
    pub published_at_camel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at_camel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl RawMeta {
    /// Display name of the timetable (`name`, then `title`).
    pub fn display_name(&self) -> Option<&str> {
        first_present([self.name.as_deref(), self.title.as_deref()])
    }

    /// Publish timestamp, falling back to the creation timestamp.
    pub fn published(&self) -> Option<&str> {
        first_present([
            self.published_at_camel.as_deref(),
            self.published_at.as_deref(),
            self.created_at_camel.as_deref(),
            self.created_at.as_deref(),
        ])
    }
}

fn first_present<const N: usize>(candidates: [Option<&str>; N]) -> Option<&str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

/// A single scheduled lesson occupying a period slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub subject_color: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub teacher_color: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub class_color: Option<String>,
    /// Number of consecutive periods the lesson spans.
    #[serde(default = "default_length", deserialize_with = "lenient_length")]
    pub length: u32,
}

fn default_length() -> u32 {
    1
}

/// Scalar forms seen for loosely typed fields in exports.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Accepts a number or numeric string; anything else, `null` and zero mean
/// a single period.
fn lenient_length<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = match Loose::deserialize(deserializer)? {
        Loose::Int(n) => u32::try_from(n).ok(),
        Loose::Float(f) if (1.0..=f64::from(u32::MAX)).contains(&f) => Some(f as u32),
        Loose::Text(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(n.filter(|n| *n > 0).unwrap_or_else(default_length))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Int(n) => Some(n.to_string()),
        Loose::Signed(n) => Some(n.to_string()),
        Loose::Text(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

impl Lesson {
    /// Badge colour: subject, then class, then teacher colour.
    pub fn color(&self) -> Option<&str> {
        first_present([
            self.subject_color.as_deref(),
            self.class_color.as_deref(),
            self.teacher_color.as_deref(),
        ])
    }
}

/// Lessons of one entity (class or teacher), keyed by day index, then
/// period index.
///
/// Accepts both the dense `[day][period] -> [lesson]` matrix form and the
/// sparse `{"day": {"period": [lesson]}}` map form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntityGrid {
    slots: BTreeMap<usize, BTreeMap<usize, Vec<Lesson>>>,
}

impl EntityGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lessons scheduled at `(day, period)`; empty when nothing is there.
    pub fn lessons(&self, day: usize, period: usize) -> &[Lesson] {
        self.slots
            .get(&day)
            .and_then(|periods| periods.get(&period))
            .map_or(&[][..], Vec::as_slice)
    }

    pub fn push(&mut self, day: usize, period: usize, lesson: Lesson) {
        self.slots
            .entry(day)
            .or_default()
            .entry(period)
            .or_default()
            .push(lesson);
    }

    /// Total number of lessons across all slots.
    pub fn lesson_count(&self) -> usize {
        self.slots
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GridShape {
    Dense(Vec<Vec<Option<Vec<Lesson>>>>),
    Sparse(BTreeMap<String, BTreeMap<String, Option<Vec<Lesson>>>>),
}

impl<'de> Deserialize<'de> for EntityGrid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut grid = EntityGrid::new();
        let cells: Vec<(usize, usize, Vec<Lesson>)> =
            match Option::<GridShape>::deserialize(deserializer)? {
                None => Vec::new(),
                Some(GridShape::Dense(days)) => days
                    .into_iter()
                    .enumerate()
                    .flat_map(|(day, periods)| {
                        periods
                            .into_iter()
                            .enumerate()
                            .filter_map(move |(period, lessons)| Some((day, period, lessons?)))
                    })
                    .collect(),
                // Buffered untagged content loses serde_json's numeric-key
                // coercion, so sparse keys arrive as strings.
                Some(GridShape::Sparse(days)) => days
                    .into_iter()
                    .filter_map(|(day, periods)| Some((day.trim().parse::<usize>().ok()?, periods)))
                    .flat_map(|(day, periods)| {
                        periods.into_iter().filter_map(move |(period, lessons)| {
                            Some((day, period.trim().parse::<usize>().ok()?, lessons?))
                        })
                    })
                    .collect(),
            };
        for (day, period, lessons) in cells {
            for lesson in lessons {
                grid.push(day, period, lesson);
            }
        }
        Ok(grid)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
