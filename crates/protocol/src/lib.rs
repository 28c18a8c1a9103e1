pub mod commands;
pub mod payload;
pub mod theme;

pub use commands::{GridCommand, LessonBadge, SlotRef};
pub use payload::{EntityGrid, Lesson, RawMeta, RawSlot, SchedulePayload};
pub use theme::ThemeToken;
