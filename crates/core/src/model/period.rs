use serde::{Deserialize, Serialize};

use super::time::TimeOfDay;

/// A fixed instructional slot shared by every day, identified by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub name: String,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
}

impl Period {
    pub fn new(name: impl Into<String>, start: Option<TimeOfDay>, end: Option<TimeOfDay>) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }
}
