pub mod config;
pub mod editor;
pub mod html;
pub mod model;
pub mod sequence;
pub mod session;
pub mod source;
pub mod views;

pub use config::GridConfig;
pub use editor::{EditError, Editor, EditorForm, EditorMode, EditorState, Prompt};
pub use session::Session;
pub use views::View;
