use serde::{Deserialize, Serialize};

/// Semantic styling tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    // Card chrome
    CardBackground,
    CardBorder,
    HeadingText,
    TitleText,
    TextMuted,

    // Table
    TableBorder,
    PeriodHeader,
    ColumnHeader,
    DayRowEven,
    DayRowOdd,
    TimesRow,

    // Non-period cells, one per column kind
    BreakFill,
    AssemblyFill,
    ColumnFill,
}

impl ThemeToken {
    /// Stable CSS class name for HTML renderers.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::CardBackground => "pg-card",
            Self::CardBorder => "pg-card-border",
            Self::HeadingText => "pg-heading",
            Self::TitleText => "pg-title",
            Self::TextMuted => "pg-muted",
            Self::TableBorder => "pg-table",
            Self::PeriodHeader => "pg-head-period",
            Self::ColumnHeader => "pg-head-column",
            Self::DayRowEven => "pg-row-even",
            Self::DayRowOdd => "pg-row-odd",
            Self::TimesRow => "pg-times",
            Self::BreakFill => "pg-fill-break",
            Self::AssemblyFill => "pg-fill-assembly",
            Self::ColumnFill => "pg-fill",
        }
    }
}
