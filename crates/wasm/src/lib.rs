//! Browser bridge. One `Session` lives for the lifetime of the page; every
//! DOM event maps to one exported function, and functions that change what
//! is shown return freshly rendered HTML for the grid container.

#[cfg(target_arch = "wasm32")]
mod console;

use std::sync::{Mutex, MutexGuard};

use periodgrid_core::editor::{EditError, EditorForm, EditorMode, OpenEditor};
use periodgrid_core::model::{AnchorOption, ModelError};
use periodgrid_core::views::UnknownView;
use periodgrid_core::{GridConfig, Session, View, html};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use wasm_bindgen::prelude::*;

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = window)]
    fn confirm(message: &str) -> bool;
}

#[derive(Debug, Error)]
enum BridgeError {
    #[error("no schedule loaded")]
    NotLoaded,
    #[error("session state is unavailable")]
    Poisoned,
    #[error("no column at index {0}")]
    NoSuchColumn(usize),
    #[error("invalid config: {0}")]
    Config(serde_json::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    View(#[from] UnknownView),
}

/// What the modal needs to draw itself.
#[derive(Debug, Serialize)]
struct EditorView<'a> {
    mode: EditorMode,
    title: &'static str,
    kind_locked: bool,
    deletable: bool,
    form: &'a EditorForm,
    anchors: &'a [AnchorOption],
}

impl<'a> From<&'a OpenEditor> for EditorView<'a> {
    fn from(open: &'a OpenEditor) -> Self {
        Self {
            mode: open.mode(),
            title: open.title(),
            kind_locked: open.kind_locked(),
            deletable: open.deletable(),
            form: &open.form,
            anchors: open.anchor_options(),
        }
    }
}

fn lock() -> Result<MutexGuard<'static, Option<Session>>, BridgeError> {
    SESSION.lock().map_err(|_| BridgeError::Poisoned)
}

fn with_session<T>(
    f: impl FnOnce(&mut Session) -> Result<T, BridgeError>,
) -> Result<T, BridgeError> {
    let mut guard = lock()?;
    let session = guard.as_mut().ok_or(BridgeError::NotLoaded)?;
    f(session)
}

fn rendered(session: &Session) -> String {
    html::render_html(&session.render())
}

fn editor_json(session: &Session) -> Result<String, BridgeError> {
    let view = session.editor().open().map(EditorView::from);
    Ok(serde_json::to_string(&view)?)
}

/// Build the page session. Unreadable schedule data yields an empty
/// session rather than a failure, so the page still shows its empty state.
fn build_session(data: &[u8], config: GridConfig) -> Session {
    match Session::load(data, config.clone()) {
        Ok(session) => session,
        Err(err) => {
            error!(%err, "schedule unreadable, starting empty");
            Session::empty(config)
        }
    }
}

fn open_column(session: &mut Session, ci: usize) -> Result<String, BridgeError> {
    if !session.open_at(ci) {
        return Err(BridgeError::NoSuchColumn(ci));
    }
    editor_json(session)
}

fn parse_config(config_json: Option<&str>) -> Result<GridConfig, BridgeError> {
    match config_json.map(str::trim).filter(|s| !s.is_empty()) {
        Some(json) => serde_json::from_str(json).map_err(BridgeError::Config),
        None => Ok(GridConfig::default()),
    }
}

/// Runs once when the module is instantiated.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console::install();
}

/// Load the schedule embedded in the page and return the initial grid.
#[wasm_bindgen]
pub fn load(data: &[u8], config_json: Option<String>) -> Result<String, JsError> {
    let config = parse_config(config_json.as_deref())?;
    let session = build_session(data, config);
    let html = rendered(&session);
    *lock()? = Some(session);
    info!("page session ready");
    Ok(html)
}

/// Render the selected view as HTML.
#[wasm_bindgen]
pub fn render_html() -> Result<String, JsError> {
    Ok(with_session(|s| Ok(rendered(s)))?)
}

/// Render the selected view as JSON grid commands.
#[wasm_bindgen]
pub fn render_commands() -> Result<String, JsError> {
    Ok(with_session(|s| Ok(serde_json::to_string(&s.render())?))?)
}

/// Switch between "classes" and "teachers".
#[wasm_bindgen]
pub fn set_view(name: &str) -> Result<String, JsError> {
    let view: View = name.parse().map_err(BridgeError::from)?;
    Ok(with_session(|s| {
        s.set_view(view);
        Ok(rendered(s))
    })?)
}

/// "+" on a header: open the editor to insert after column `ci`.
#[wasm_bindgen]
pub fn open_insert_after(ci: usize) -> Result<String, JsError> {
    Ok(with_session(|s| {
        s.open_insert_after(ci);
        editor_json(s)
    })?)
}

/// Header or body cell click: open the editor for column `ci`.
#[wasm_bindgen]
pub fn open_editor(ci: usize) -> Result<String, JsError> {
    Ok(with_session(|s| open_column(s, ci))?)
}

/// Current editor state as JSON, `null` when closed.
#[wasm_bindgen]
pub fn editor_state() -> Result<String, JsError> {
    Ok(with_session(|s| editor_json(s))?)
}

/// Replace the form contents with what the modal currently shows.
#[wasm_bindgen]
pub fn update_form(form_json: &str) -> Result<(), JsError> {
    let form: EditorForm = serde_json::from_str(form_json).map_err(BridgeError::from)?;
    Ok(with_session(|s| {
        let current = s.form_mut().ok_or(EditError::NotOpen)?;
        *current = form;
        Ok(())
    })?)
}

/// Save the form. Validation failures come back as errors carrying the
/// message to show; the editor stays open.
#[wasm_bindgen]
pub fn save_editor() -> Result<String, JsError> {
    Ok(with_session(|s| {
        s.save()?;
        Ok(rendered(s))
    })?)
}

/// Delete whatever the editor is showing, asking the user first.
#[wasm_bindgen]
pub fn delete_in_editor() -> Result<String, JsError> {
    Ok(with_session(|s| {
        s.delete(&mut |message: &str| confirm(message))?;
        Ok(rendered(s))
    })?)
}

/// Cancel button, Escape key and backdrop click.
#[wasm_bindgen]
pub fn cancel_editor() -> Result<(), JsError> {
    Ok(with_session(|s| {
        s.cancel();
        Ok(())
    })?)
}

/// Header "×": delete column `ci` without opening the editor.
#[wasm_bindgen]
pub fn delete_column(ci: usize) -> Result<String, JsError> {
    Ok(with_session(|s| {
        s.delete_at(ci, &mut |message: &str| confirm(message))?;
        Ok(rendered(s))
    })?)
}

/// Day toggle button.
#[wasm_bindgen]
pub fn toggle_times_row(day: usize) -> Result<String, JsError> {
    Ok(with_session(|s| {
        s.toggle_times_row(day)?;
        Ok(rendered(s))
    })?)
}

/// Blur of an edited times cell. Nothing is re-rendered so the caret stays
/// where the user left it.
#[wasm_bindgen]
pub fn commit_times_cell(day: usize, ci: usize, text: &str) -> Result<(), JsError> {
    Ok(with_session(|s| Ok(s.commit_times_cell(day, ci, text)?))?)
}

/// Bumped on every committed change.
#[wasm_bindgen]
pub fn revision() -> Result<u64, JsError> {
    Ok(with_session(|s| Ok(s.revision()))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &[u8] = br#"{
        "days": ["Mon"],
        "periods": [{"name": "P1", "start_time": "08:00", "end_time": "08:45"}],
        "classes_grid": {"7A": {}}
    }"#;

    #[test]
    fn malformed_schedule_starts_empty() {
        let session = build_session(b"<html>", GridConfig::default());
        assert!(session.timetable().sequence().is_empty());
        assert!(rendered(&session).contains("No classes found."));
    }

    #[test]
    fn config_is_optional() {
        assert_eq!(parse_config(None).unwrap(), GridConfig::default());
        assert_eq!(parse_config(Some("  ")).unwrap(), GridConfig::default());
        let config = parse_config(Some(r#"{"times_label": "Bell"}"#)).unwrap();
        assert_eq!(config.times_label, "Bell");
        assert!(matches!(
            parse_config(Some("{")),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn editor_json_shape() {
        let mut session = build_session(PAYLOAD, GridConfig::default());
        assert_eq!(editor_json(&session).unwrap(), "null");

        let value: serde_json::Value =
            serde_json::from_str(&open_column(&mut session, 0).unwrap()).unwrap();
        assert_eq!(value["mode"], "edit");
        assert_eq!(value["title"], "Edit Column");
        assert_eq!(value["kind_locked"], true);
        assert_eq!(value["deletable"], false);
        assert_eq!(value["form"]["name"], "P1");
        assert_eq!(value["anchors"][0]["label"], "Before P1");
    }

    #[test]
    fn open_editor_rejects_missing_column() {
        let mut session = build_session(PAYLOAD, GridConfig::default());
        assert!(matches!(
            open_column(&mut session, 5),
            Err(BridgeError::NoSuchColumn(5))
        ));
        assert!(session.editor().open().is_none());
        assert_eq!(editor_json(&session).unwrap(), "null");
    }
}
