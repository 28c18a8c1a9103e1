use serde::{Deserialize, Serialize};

use crate::model::ColumnKind;

/// Display texts and editor defaults. Every field has a default, so a
/// partial config file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Card title when the timetable has no name.
    pub unnamed_title: String,
    /// "Dated" text when no publish timestamp is known or it cannot be read.
    pub dated_placeholder: String,
    /// `chrono` format string for the dated field.
    pub date_format: String,
    /// Kind prefilled when adding a column.
    pub new_column_kind: ColumnKind,
    /// Name prefilled when adding a column.
    pub new_column_name: String,
    /// Badge colour for lessons without any colour.
    pub lesson_color: String,
    pub times_label: String,
    pub day_header: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            unnamed_title: "Unnamed School".to_string(),
            dated_placeholder: "N/A".to_string(),
            date_format: "%-m/%-d/%Y".to_string(),
            new_column_kind: ColumnKind::Break,
            new_column_name: "Break".to_string(),
            lesson_color: "#e5e7eb".to_string(),
            times_label: "Times".to_string(),
            day_header: "Day".to_string(),
        }
    }
}
