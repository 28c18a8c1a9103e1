//! The modal column editor: opening it for a sequence position, filling
//! the form, and committing or discarding the result.
//!
//! Every operation is a plain method so hosts (DOM bridge, terminal, tests)
//! drive it the same way. The editor never renders; callers re-render after
//! any committed change.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::GridConfig;
use crate::model::{
    AnchorOption, ColumnId, ColumnKind, ColumnUpdate, ModelError, NewColumn, TimeOfDay, Timetable,
};
use crate::sequence::SeqEntry;

/// Form field named in validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Start,
    End,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Start => "start",
            Self::End => "end",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Please fill all fields.")]
    MissingField(Field),
    #[error("Invalid {0} time.")]
    InvalidTime(Field),
    #[error("Start time must be before end time.")]
    StartNotBeforeEnd,
    #[error("the editor is not open")]
    NotOpen,
    #[error("nothing to delete")]
    NotDeletable,
    #[error("no column at position {0}")]
    NoSuchColumn(usize),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EditError {
    /// Whether the user can fix this by changing the form.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidTime(_)
                | Self::StartNotBeforeEnd
                | Self::Model(ModelError::AnchorOutOfRange { .. })
        )
    }
}

/// Asks the user to confirm an irreversible action.
pub trait Prompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Prompt for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorMode {
    Add,
    Edit,
    EditCol,
}

/// What a save or delete applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorTarget {
    NewColumn,
    Period(usize),
    Column(ColumnId),
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorForm {
    pub name: String,
    pub kind: String,
    pub start: String,
    pub end: String,
    pub after: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenEditor {
    mode: EditorMode,
    target: EditorTarget,
    pub form: EditorForm,
    deletable: bool,
    anchors: Vec<AnchorOption>,
}

impl OpenEditor {
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn target(&self) -> &EditorTarget {
        &self.target
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            EditorMode::Add => "Add New Column",
            EditorMode::Edit | EditorMode::EditCol => "Edit Column",
        }
    }

    /// Periods cannot change type.
    pub fn kind_locked(&self) -> bool {
        self.mode == EditorMode::Edit
    }

    pub fn deletable(&self) -> bool {
        self.deletable
    }

    pub fn anchor_options(&self) -> &[AnchorOption] {
        &self.anchors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Closed,
    Open(OpenEditor),
}

#[derive(Debug, Clone, Default)]
pub struct Editor {
    state: EditorState,
}

struct Checked {
    name: String,
    start: TimeOfDay,
    end: TimeOfDay,
}

impl Editor {
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn open(&self) -> Option<&OpenEditor> {
        match &self.state {
            EditorState::Open(open) => Some(open),
            EditorState::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open().is_some()
    }

    pub fn form_mut(&mut self) -> Option<&mut EditorForm> {
        match &mut self.state {
            EditorState::Open(open) => Some(&mut open.form),
            EditorState::Closed => None,
        }
    }

    /// Open for a new column inserted after sequence position `ci`.
    ///
    /// The form is prefilled with the configured default kind and name,
    /// the previous period's end and the next period's start.
    pub fn open_insert_after(&mut self, timetable: &Timetable, ci: usize, config: &GridConfig) {
        let after = timetable.insertion_anchor(ci);
        let periods = timetable.periods();
        let prev = after.checked_sub(1).and_then(|i| periods.get(i));
        let next = periods.get(after);
        let form = EditorForm {
            name: config.new_column_name.clone(),
            kind: config.new_column_kind.as_str().to_string(),
            start: time_text(prev.and_then(|p| p.end)),
            end: time_text(next.and_then(|p| p.start)),
            after,
        };
        debug!(ci, after, "editor opened for insert");
        self.state = EditorState::Open(OpenEditor {
            mode: EditorMode::Add,
            target: EditorTarget::NewColumn,
            form,
            deletable: false,
            anchors: timetable.anchor_options(),
        });
    }

    /// Open for the sequence entry at `ci` (a header or body cell click).
    /// Returns `false`, leaving the editor as it was, if there is none.
    pub fn open_at(&mut self, timetable: &Timetable, ci: usize) -> bool {
        let seq = timetable.sequence();
        let Some(entry) = seq.get(ci) else {
            return false;
        };
        let open = match entry {
            SeqEntry::Period { index, period } => OpenEditor {
                mode: EditorMode::Edit,
                target: EditorTarget::Period(*index),
                form: EditorForm {
                    name: period.name.clone(),
                    kind: "period".to_string(),
                    start: time_text(period.start),
                    end: time_text(period.end),
                    after: *index,
                },
                deletable: timetable.periods().len() > 1,
                anchors: timetable.anchor_options(),
            },
            SeqEntry::Column(column) => OpenEditor {
                mode: EditorMode::EditCol,
                target: EditorTarget::Column(column.id.clone()),
                form: EditorForm {
                    name: column.label.clone(),
                    kind: column.kind.as_str().to_string(),
                    start: time_text(column.start),
                    end: time_text(column.end),
                    after: column.after,
                },
                deletable: true,
                anchors: timetable.anchor_options(),
            },
        };
        debug!(ci, mode = ?open.mode, "editor opened");
        self.state = EditorState::Open(open);
        true
    }

    /// Validate the form and apply it. On any error the editor stays open
    /// and the timetable is untouched.
    pub fn save(&mut self, timetable: &mut Timetable) -> Result<(), EditError> {
        let open = self.open().ok_or(EditError::NotOpen)?;
        let checked = validate(&open.form)?;
        let form = &open.form;
        match &open.target {
            EditorTarget::NewColumn => {
                timetable.add_column(NewColumn {
                    kind: ColumnKind::from(form.kind.as_str()),
                    label: checked.name,
                    after: form.after,
                    start: Some(checked.start),
                    end: Some(checked.end),
                })?;
            }
            EditorTarget::Period(index) => {
                timetable.update_period(
                    *index,
                    checked.name,
                    Some(checked.start),
                    Some(checked.end),
                )?;
            }
            EditorTarget::Column(id) => {
                timetable.update_column(
                    id,
                    ColumnUpdate {
                        kind: ColumnKind::from(form.kind.as_str()),
                        label: checked.name,
                        after: form.after,
                        start: Some(checked.start),
                        end: Some(checked.end),
                    },
                )?;
            }
        }
        self.close();
        Ok(())
    }

    /// Delete the edited period or column after confirmation.
    ///
    /// Returns `Ok(false)` if the user declined; the editor stays open.
    pub fn delete(
        &mut self,
        timetable: &mut Timetable,
        prompt: &mut impl Prompt,
    ) -> Result<bool, EditError> {
        let open = self.open().ok_or(EditError::NotOpen)?;
        match open.target.clone() {
            EditorTarget::NewColumn => Err(EditError::NotDeletable),
            EditorTarget::Period(index) => {
                if timetable.periods().len() <= 1 {
                    return Err(ModelError::LastPeriod.into());
                }
                if !prompt.confirm("Are you sure you want to delete this?") {
                    return Ok(false);
                }
                timetable.remove_period(index)?;
                self.close();
                Ok(true)
            }
            EditorTarget::Column(id) => {
                if !prompt.confirm("Are you sure you want to delete this?") {
                    return Ok(false);
                }
                timetable.remove_column(&id)?;
                self.close();
                Ok(true)
            }
        }
    }

    /// Cancel, Escape and backdrop clicks all discard the form.
    pub fn cancel(&mut self) {
        if self.is_open() {
            debug!("editor cancelled");
        }
        self.close();
    }

    fn close(&mut self) {
        self.state = EditorState::Closed;
    }
}

/// Delete the sequence entry at `ci` straight from its header control.
pub fn delete_at(
    timetable: &mut Timetable,
    ci: usize,
    prompt: &mut impl Prompt,
) -> Result<bool, EditError> {
    let target = match timetable.sequence().get(ci) {
        None => return Err(EditError::NoSuchColumn(ci)),
        Some(SeqEntry::Period { index, .. }) => EditorTarget::Period(*index),
        Some(SeqEntry::Column(column)) => EditorTarget::Column(column.id.clone()),
    };
    if matches!(target, EditorTarget::Period(_)) && timetable.periods().len() <= 1 {
        return Err(ModelError::LastPeriod.into());
    }
    if !prompt.confirm("Are you sure you want to delete this column?") {
        return Ok(false);
    }
    match target {
        EditorTarget::Period(index) => {
            timetable.remove_period(index)?;
        }
        EditorTarget::Column(id) => {
            timetable.remove_column(&id)?;
        }
        EditorTarget::NewColumn => return Err(EditError::NotDeletable),
    }
    Ok(true)
}

fn validate(form: &EditorForm) -> Result<Checked, EditError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(EditError::MissingField(Field::Name));
    }
    let start = required_time(&form.start, Field::Start)?;
    let end = required_time(&form.end, Field::End)?;
    if start >= end {
        return Err(EditError::StartNotBeforeEnd);
    }
    Ok(Checked {
        name: name.to_string(),
        start,
        end,
    })
}

fn required_time(raw: &str, field: Field) -> Result<TimeOfDay, EditError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(EditError::MissingField(field));
    }
    raw.parse().map_err(|_| EditError::InvalidTime(field))
}

fn time_text(time: Option<TimeOfDay>) -> String {
    time.map(|t| t.to_string()).unwrap_or_default()
}
