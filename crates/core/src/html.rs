//! HTML renderer: converts `GridCommand` lists into markup.
//!
//! Output mirrors the interactive page: cards holding one table each, with
//! `data-*` attributes hosts use to route clicks back to editor commands.

use periodgrid_protocol::{GridCommand, LessonBadge, SlotRef, ThemeToken};

const STYLE: &str = "\
.pg-card{border:1px solid #d1d5db;border-radius:8px;margin:16px 0;padding:12px;background:#fff}\
.pg-heading{margin:0 0 4px}.pg-muted{color:#6b7280;font-size:12px}\
.pg-table{border-collapse:collapse;width:100%}\
.pg-table th,.pg-table td{border:1px solid #e5e7eb;padding:4px;vertical-align:top}\
.pg-head-column,.pg-fill{background:#f3f4f6}.pg-fill-break{background:#fef3c7}\
.pg-fill-assembly{background:#e0e7ff}.pg-times{background:#f9fafb;font-size:12px}\
.pg-row-odd{background:#fafafa}.pg-badge{border-left:3px solid;margin:2px 0;padding:2px 4px}\
.pg-empty{color:#6b7280;padding:24px;text-align:center}";

/// Render a list of commands as an HTML fragment.
pub fn render_html(commands: &[GridCommand]) -> String {
    let mut html = String::with_capacity(commands.len() * 120);
    let mut in_header = false;

    for cmd in commands {
        match cmd {
            GridCommand::EmptyState { message } => {
                html.push_str(&format!(
                    r#"<div class="pg-empty">{}</div>"#,
                    escape_html(message)
                ));
            }
            GridCommand::BeginCard {
                entity,
                heading,
                title,
                dated,
            } => {
                html.push_str(&format!(
                    r#"<div class="{}" data-entity="{}"><h3 class="{}">{}</h3><div class="{}">{} · Dated: {}</div>"#,
                    ThemeToken::CardBackground.css_class(),
                    escape_html(entity),
                    ThemeToken::HeadingText.css_class(),
                    escape_html(heading),
                    ThemeToken::TextMuted.css_class(),
                    escape_html(title),
                    escape_html(dated),
                ));
            }
            GridCommand::BeginHeaderRow { corner } => {
                in_header = true;
                html.push_str(&format!(
                    r#"<table class="{}"><thead><tr><th>{}</th>"#,
                    ThemeToken::TableBorder.css_class(),
                    escape_html(corner),
                ));
            }
            GridCommand::HeaderCell {
                column,
                label,
                time_range,
                slot,
                color,
            } => {
                html.push_str(&format!(
                    r#"<th class="{}" data-col-index="{column}" {}><span class="pg-label">{}</span><button class="pg-delete" data-col-index="{column}" title="Delete">×</button>"#,
                    color.css_class(),
                    slot_attrs(slot),
                    escape_html(label),
                ));
                if !time_range.is_empty() {
                    html.push_str(&format!(
                        r#"<div class="pg-muted">{}</div>"#,
                        escape_html(time_range)
                    ));
                }
                html.push_str(&format!(
                    r#"<button class="pg-insert" data-col-index="{column}" title="Insert column after">+</button></th>"#
                ));
            }
            GridCommand::BeginTimesRow { day_index, label } => {
                html.push_str(&format!(
                    r#"<tr class="{}" data-day-index="{day_index}"><th>{}</th>"#,
                    ThemeToken::TimesRow.css_class(),
                    escape_html(label),
                ));
            }
            GridCommand::TimesCell {
                day_index,
                column,
                text,
            } => {
                html.push_str(&format!(
                    r#"<td contenteditable="true" data-day-index="{day_index}" data-col-index="{column}">{}</td>"#,
                    escape_html(text),
                ));
            }
            GridCommand::BeginDayRow {
                day_index,
                day,
                times_open,
                color,
            } => {
                let glyph = if *times_open { "−" } else { "+" };
                html.push_str(&format!(
                    r#"<tr class="{}" data-day-index="{day_index}"><th>{}<button class="pg-times-toggle" data-day-index="{day_index}">{glyph}</button></th>"#,
                    color.css_class(),
                    escape_html(day),
                ));
            }
            GridCommand::LessonCell { column, lessons } => {
                html.push_str(&format!(r#"<td data-col-index="{column}">"#));
                for badge in lessons {
                    push_badge(&mut html, badge);
                }
                html.push_str("</td>");
            }
            GridCommand::FillerCell {
                column,
                label,
                color,
            } => {
                html.push_str(&format!(
                    r#"<td class="{}" data-col-index="{column}">{}</td>"#,
                    color.css_class(),
                    escape_html(label),
                ));
            }
            GridCommand::EndRow => {
                if in_header {
                    in_header = false;
                    html.push_str("</tr></thead><tbody>");
                } else {
                    html.push_str("</tr>");
                }
            }
            GridCommand::EndCard => html.push_str("</tbody></table></div>"),
        }
    }

    html
}

/// Wrap the rendered fragment in a standalone document with inline styles.
pub fn render_document(commands: &[GridCommand], title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title><style>{STYLE}</style></head><body>{}</body></html>\n",
        escape_html(title),
        render_html(commands),
    )
}

fn push_badge(html: &mut String, badge: &LessonBadge) {
    let color = escape_html(&badge.color);
    html.push_str(&format!(
        r#"<div class="pg-badge" style="border-color:{color}"><strong>{}</strong><div class="pg-muted">{}</div></div>"#,
        escape_html(&badge.subject),
        escape_html(&badge.detail),
    ));
}

fn slot_attrs(slot: &SlotRef) -> String {
    match slot {
        SlotRef::Period { index } => format!(r#"data-period-index="{index}""#),
        SlotRef::Column { id, kind } => format!(
            r#"data-column-id="{}" data-kind="{}""#,
            escape_html(id),
            escape_html(kind)
        ),
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Vec<GridCommand> {
        vec![
            GridCommand::BeginCard {
                entity: "7A".into(),
                heading: "Class: 7A".into(),
                title: "North <High>".into(),
                dated: "N/A".into(),
            },
            GridCommand::BeginHeaderRow {
                corner: "Day".into(),
            },
            GridCommand::HeaderCell {
                column: 0,
                label: "P1".into(),
                time_range: "08:00 - 08:45".into(),
                slot: SlotRef::Period { index: 0 },
                color: ThemeToken::PeriodHeader,
            },
            GridCommand::HeaderCell {
                column: 1,
                label: "Recess".into(),
                time_range: String::new(),
                slot: SlotRef::Column {
                    id: "break-1".into(),
                    kind: "break".into(),
                },
                color: ThemeToken::ColumnHeader,
            },
            GridCommand::EndRow,
            GridCommand::BeginTimesRow {
                day_index: 0,
                label: "Times".into(),
            },
            GridCommand::TimesCell {
                day_index: 0,
                column: 0,
                text: "08:00 - 08:45".into(),
            },
            GridCommand::TimesCell {
                day_index: 0,
                column: 1,
                text: String::new(),
            },
            GridCommand::EndRow,
            GridCommand::BeginDayRow {
                day_index: 0,
                day: "Mon".into(),
                times_open: true,
                color: ThemeToken::DayRowEven,
            },
            GridCommand::LessonCell {
                column: 0,
                lessons: vec![LessonBadge {
                    subject: "R&D".into(),
                    detail: "Ms. O'Neil • 7A".into(),
                    color: "#2563eb".into(),
                }],
            },
            GridCommand::FillerCell {
                column: 1,
                label: "Recess".into(),
                color: ThemeToken::BreakFill,
            },
            GridCommand::EndRow,
            GridCommand::EndCard,
        ]
    }

    #[test]
    fn card_structure() {
        let html = render_html(&card());
        assert_eq!(html.matches("<table").count(), 1);
        assert_eq!(html.matches("</thead><tbody>").count(), 1);
        assert!(html.ends_with("</tbody></table></div>"));
        assert_eq!(html.matches("<tr").count(), html.matches("</tr>").count());
        assert!(html.contains(r#"data-period-index="0""#));
        assert!(html.contains(r#"data-column-id="break-1" data-kind="break""#));
        assert!(html.contains(r#"<td contenteditable="true" data-day-index="0" data-col-index="1"></td>"#));
        assert!(html.contains(r#"class="pg-fill-break" data-col-index="1">Recess</td>"#));
        assert!(html.contains("pg-times-toggle\" data-day-index=\"0\">−</button>"));
    }

    #[test]
    fn text_is_escaped() {
        let html = render_html(&card());
        assert!(html.contains("North &lt;High&gt;"));
        assert!(html.contains("<strong>R&amp;D</strong>"));
        assert!(html.contains("Ms. O&#39;Neil • 7A"));
        assert!(!html.contains("<High>"));
    }

    #[test]
    fn closed_times_row_shows_plus() {
        let html = render_html(&[GridCommand::BeginDayRow {
            day_index: 3,
            day: "Thu".into(),
            times_open: false,
            color: ThemeToken::DayRowOdd,
        }]);
        assert!(html.contains(r#"class="pg-row-odd" data-day-index="3""#));
        assert!(html.contains(">+</button>"));
    }

    #[test]
    fn empty_state_document() {
        let doc = render_document(
            &[GridCommand::EmptyState {
                message: "No teachers found.".into(),
            }],
            "Week",
        );
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Week</title>"));
        assert!(doc.contains(r#"<div class="pg-empty">No teachers found.</div>"#));
    }
}
