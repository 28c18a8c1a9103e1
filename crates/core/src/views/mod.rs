pub mod grid;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which entity set the grid shows. Switching never touches the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Classes,
    Teachers,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view: {0:?}")]
pub struct UnknownView(pub String);

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classes => "classes",
            Self::Teachers => "teachers",
        }
    }

    /// Prefix of a card heading, e.g. "Class: 7A".
    pub fn title_prefix(self) -> &'static str {
        match self {
            Self::Classes => "Class",
            Self::Teachers => "Teacher",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Classes => Self::Teachers,
            Self::Teachers => Self::Classes,
        }
    }
}

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "classes" => Ok(Self::Classes),
            "teachers" => Ok(Self::Teachers),
            other => Err(UnknownView(other.to_string())),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
