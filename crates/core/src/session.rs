//! Page-lifetime application state.
//!
//! A `Session` owns the editable timetable, the read-only lesson grids, the
//! selected view and the editor. Hosts construct one at load, route every
//! user action through it, and re-render after any call that returns
//! success. Nothing here is global.

use periodgrid_protocol::{GridCommand, SchedulePayload};
use tracing::debug;

use crate::config::GridConfig;
use crate::editor::{self, EditError, Editor, EditorForm, Prompt};
use crate::model::{ModelError, Timetable};
use crate::source::{self, Schedule, SourceError};
use crate::views::View;
use crate::views::grid::render_grid;

#[derive(Debug, Clone, Default)]
pub struct Session {
    timetable: Timetable,
    schedule: Schedule,
    view: View,
    editor: Editor,
    config: GridConfig,
    revision: u64,
}

impl Session {
    pub fn new(timetable: Timetable, schedule: Schedule, config: GridConfig) -> Self {
        Self {
            timetable,
            schedule,
            view: View::default(),
            editor: Editor::default(),
            config,
            revision: 0,
        }
    }

    pub fn from_payload(payload: SchedulePayload, config: GridConfig) -> Self {
        let (timetable, schedule) = source::from_payload(payload);
        Self::new(timetable, schedule, config)
    }

    /// Load from payload or raw export bytes.
    pub fn load(data: &[u8], config: GridConfig) -> Result<Self, SourceError> {
        Ok(Self::from_payload(source::load(data)?, config))
    }

    /// A session with no data; renders the empty state.
    pub fn empty(config: GridConfig) -> Self {
        Self::new(Timetable::default(), Schedule::default(), config)
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Bumped on every committed change to the timetable.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Select the entity set to show. Returns whether it changed.
    pub fn set_view(&mut self, view: View) -> bool {
        if self.view == view {
            return false;
        }
        debug!(from = %self.view, to = %view, "switching view");
        self.view = view;
        true
    }

    /// Render the selected view from the current model.
    pub fn render(&self) -> Vec<GridCommand> {
        let grids = match self.view {
            View::Classes => &self.schedule.classes,
            View::Teachers => &self.schedule.teachers,
        };
        render_grid(
            self.view,
            grids,
            &self.timetable,
            self.schedule.meta.as_ref(),
            &self.config,
        )
    }

    pub fn open_insert_after(&mut self, ci: usize) {
        self.editor.open_insert_after(&self.timetable, ci, &self.config);
    }

    pub fn open_at(&mut self, ci: usize) -> bool {
        self.editor.open_at(&self.timetable, ci)
    }

    pub fn form_mut(&mut self) -> Option<&mut EditorForm> {
        self.editor.form_mut()
    }

    pub fn save(&mut self) -> Result<(), EditError> {
        self.editor.save(&mut self.timetable)?;
        self.committed();
        Ok(())
    }

    pub fn delete(&mut self, prompt: &mut impl Prompt) -> Result<bool, EditError> {
        let deleted = self.editor.delete(&mut self.timetable, prompt)?;
        if deleted {
            self.committed();
        }
        Ok(deleted)
    }

    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    /// Header quick-delete. An open editor is discarded first since its
    /// target may not survive the deletion.
    pub fn delete_at(&mut self, ci: usize, prompt: &mut impl Prompt) -> Result<bool, EditError> {
        self.editor.cancel();
        let deleted = editor::delete_at(&mut self.timetable, ci, prompt)?;
        if deleted {
            self.committed();
        }
        Ok(deleted)
    }

    pub fn toggle_times_row(&mut self, day: usize) -> Result<bool, ModelError> {
        let open = self.timetable.toggle_times_row(day)?;
        debug!(day, open, "toggled times row");
        self.committed();
        Ok(open)
    }

    pub fn commit_times_cell(
        &mut self,
        day: usize,
        slot: usize,
        text: &str,
    ) -> Result<(), ModelError> {
        self.timetable.set_times_text(day, slot, text)?;
        self.committed();
        Ok(())
    }

    fn committed(&mut self) {
        self.revision += 1;
    }
}
