use std::fmt;

use serde::{Deserialize, Serialize};

use super::time::TimeOfDay;

/// Unique, never reused identifier of an auxiliary column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an auxiliary column represents. Drives its cell styling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnKind {
    #[default]
    Break,
    Assembly,
    Other(String),
}

impl ColumnKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Break => "break",
            Self::Assembly => "assembly",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for ColumnKind {
    fn from(value: &str) -> Self {
        match value.trim() {
            "" | "break" => Self::Break,
            "assembly" => Self::Assembly,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ColumnKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ColumnKind> for String {
    fn from(value: ColumnKind) -> Self {
        value.as_str().to_string()
    }
}

/// An auxiliary (non-period) column anchored after a period.
///
/// `after == 0` places the column before the first period; `after == k`
/// places it right after period `k` (1-indexed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub kind: ColumnKind,
    pub label: String,
    pub after: usize,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
}

/// Fields of a column that does not exist yet; the timetable assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewColumn {
    pub kind: ColumnKind,
    pub label: String,
    pub after: usize,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_label() {
        assert_eq!(ColumnKind::from("break"), ColumnKind::Break);
        assert_eq!(ColumnKind::from("assembly"), ColumnKind::Assembly);
        assert_eq!(ColumnKind::from(""), ColumnKind::Break);
        assert_eq!(ColumnKind::from("lunch"), ColumnKind::Other("lunch".into()));
        assert_eq!(ColumnKind::Other("lunch".into()).as_str(), "lunch");
    }
}
