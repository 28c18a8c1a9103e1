use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use periodgrid_core::Session;
use periodgrid_protocol::{GridCommand, ThemeToken};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::CardBackground => Color::Black,
        ThemeToken::CardBorder | ThemeToken::TableBorder => Color::DarkGray,
        ThemeToken::HeadingText => Color::White,
        ThemeToken::TitleText => Color::Gray,
        ThemeToken::TextMuted => Color::DarkGray,
        ThemeToken::PeriodHeader => Color::LightCyan,
        ThemeToken::ColumnHeader => Color::Gray,
        ThemeToken::DayRowEven => Color::White,
        ThemeToken::DayRowOdd => Color::Rgb(210, 210, 210),
        ThemeToken::TimesRow => Color::Cyan,
        ThemeToken::BreakFill => Color::Yellow,
        ThemeToken::AssemblyFill => Color::LightBlue,
        ThemeToken::ColumnFill => Color::Gray,
    }
}

/// What the terminal shows for the selected view.
#[derive(Debug, PartialEq)]
enum Screen {
    Empty(String),
    Cards(Vec<CardView>),
}

#[derive(Debug, PartialEq)]
struct CardView {
    heading: String,
    subtitle: String,
    corner: String,
    header: Vec<HeaderView>,
    rows: Vec<RowView>,
}

#[derive(Debug, PartialEq)]
struct HeaderView {
    label: String,
    time_range: String,
    color: ThemeToken,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RowKind {
    Times,
    Day { day_index: usize },
}

#[derive(Debug, PartialEq)]
struct RowView {
    kind: RowKind,
    label: String,
    color: ThemeToken,
    cells: Vec<CellView>,
}

#[derive(Debug, PartialEq)]
struct CellView {
    lines: Vec<String>,
    color: ThemeToken,
}

/// Regroup the flat command list into cards of rows.
fn screen(commands: &[GridCommand]) -> Screen {
    let mut cards = Vec::new();
    let mut card: Option<CardView> = None;
    let mut row: Option<RowView> = None;

    for cmd in commands {
        match cmd {
            GridCommand::EmptyState { message } => return Screen::Empty(message.clone()),
            GridCommand::BeginCard {
                heading,
                title,
                dated,
                ..
            } => {
                card = Some(CardView {
                    heading: heading.clone(),
                    subtitle: format!("{title} · Dated: {dated}"),
                    corner: String::new(),
                    header: Vec::new(),
                    rows: Vec::new(),
                });
            }
            GridCommand::BeginHeaderRow { corner } => {
                if let Some(card) = card.as_mut() {
                    card.corner = corner.clone();
                }
            }
            GridCommand::HeaderCell {
                label,
                time_range,
                color,
                ..
            } => {
                if let Some(card) = card.as_mut() {
                    card.header.push(HeaderView {
                        label: label.clone(),
                        time_range: time_range.clone(),
                        color: *color,
                    });
                }
            }
            GridCommand::BeginTimesRow { label, .. } => {
                row = Some(RowView {
                    kind: RowKind::Times,
                    label: label.clone(),
                    color: ThemeToken::TimesRow,
                    cells: Vec::new(),
                });
            }
            GridCommand::BeginDayRow {
                day_index,
                day,
                times_open,
                color,
            } => {
                let glyph = if *times_open { "−" } else { "+" };
                row = Some(RowView {
                    kind: RowKind::Day {
                        day_index: *day_index,
                    },
                    label: format!("{day} [{glyph}]"),
                    color: *color,
                    cells: Vec::new(),
                });
            }
            GridCommand::TimesCell { text, .. } => {
                push_cell(&mut row, vec![text.clone()], ThemeToken::TimesRow);
            }
            GridCommand::LessonCell { lessons, .. } => {
                let lines = lessons
                    .iter()
                    .flat_map(|b| [b.subject.clone(), format!(" {}", b.detail)])
                    .collect();
                let color = row.as_ref().map_or(ThemeToken::DayRowEven, |r| r.color);
                push_cell(&mut row, lines, color);
            }
            GridCommand::FillerCell { label, color, .. } => {
                push_cell(&mut row, vec![label.clone()], *color);
            }
            GridCommand::EndRow => {
                if let (Some(done), Some(card)) = (row.take(), card.as_mut()) {
                    card.rows.push(done);
                }
            }
            GridCommand::EndCard => cards.extend(card.take()),
        }
    }
    Screen::Cards(cards)
}

fn push_cell(row: &mut Option<RowView>, lines: Vec<String>, color: ThemeToken) {
    if let Some(row) = row.as_mut() {
        row.cells.push(CellView { lines, color });
    }
}

/// Viewer position within the rendered screen.
#[derive(Debug, Default)]
struct Cursor {
    entity: usize,
    day: usize,
}

pub fn render_tui(session: &mut Session) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, session);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, session: &mut Session) -> Result<()> {
    let mut cursor = Cursor::default();
    let mut status = String::new();
    let days = session.timetable().days().len();

    loop {
        let screen = screen(&session.render());
        let cards = match &screen {
            Screen::Cards(cards) => cards.len(),
            Screen::Empty(_) => 0,
        };
        cursor.entity = cursor.entity.min(cards.saturating_sub(1));

        terminal.draw(|frame| draw(frame, session, &screen, &cursor, &status))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Tab => {
                    session.set_view(session.view().toggled());
                    cursor.entity = 0;
                    status.clear();
                }
                KeyCode::Left if cards > 0 => {
                    cursor.entity = (cursor.entity + cards - 1) % cards;
                }
                KeyCode::Right if cards > 0 => {
                    cursor.entity = (cursor.entity + 1) % cards;
                }
                KeyCode::Up => cursor.day = cursor.day.saturating_sub(1),
                KeyCode::Down => cursor.day = (cursor.day + 1).min(days.saturating_sub(1)),
                KeyCode::Char('t') => {
                    status = match session.toggle_times_row(cursor.day) {
                        Ok(true) => "times row opened".to_string(),
                        Ok(false) => "times row closed".to_string(),
                        Err(err) => err.to_string(),
                    };
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => {
                    cursor.day = (cursor.day + 1).min(days.saturating_sub(1));
                }
                MouseEventKind::ScrollUp => cursor.day = cursor.day.saturating_sub(1),
                _ => {}
            },
            _ => {}
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, session: &Session, screen: &Screen, cursor: &Cursor, status: &str) {
    let [header_area, subtitle_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let cards = match screen {
        Screen::Empty(message) => {
            draw_bar(frame, header_area, &format!(" periodgrid — {} ", session.view()));
            let empty = Paragraph::new(message.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme_to_color(ThemeToken::TextMuted)));
            frame.render_widget(empty, body_area);
            draw_status(frame, status_area, status);
            return;
        }
        Screen::Cards(cards) => cards,
    };
    let Some(card) = cards.get(cursor.entity) else {
        return;
    };

    draw_bar(
        frame,
        header_area,
        &format!(
            " periodgrid — {} ({}/{}) | Tab view | ←→ entity | ↑↓ day | t times | q quit ",
            card.heading,
            cursor.entity + 1,
            cards.len()
        ),
    );
    frame.render_widget(
        Paragraph::new(card.subtitle.as_str())
            .style(Style::default().fg(theme_to_color(ThemeToken::TitleText))),
        subtitle_area,
    );

    let header = Row::new(
        std::iter::once(Cell::from(card.corner.as_str())).chain(card.header.iter().map(|h| {
            let mut lines = vec![Line::from(h.label.as_str())];
            if !h.time_range.is_empty() {
                lines.push(Line::from(h.time_range.as_str()));
            }
            Cell::from(Text::from(lines)).style(
                Style::default()
                    .fg(theme_to_color(h.color))
                    .add_modifier(Modifier::BOLD),
            )
        })),
    )
    .height(2);

    let rows = card.rows.iter().map(|row| {
        let height = row.cells.iter().map(|c| c.lines.len()).max().unwrap_or(1).max(1);
        let cells = std::iter::once(Cell::from(row.label.as_str())).chain(row.cells.iter().map(
            |cell| {
                let text: Vec<Line> = cell.lines.iter().map(|l| Line::from(l.as_str())).collect();
                Cell::from(Text::from(text)).style(Style::default().fg(theme_to_color(cell.color)))
            },
        ));
        Row::new(cells)
            .height(u16::try_from(height).unwrap_or(u16::MAX))
            .style(Style::default().fg(theme_to_color(row.color)))
    });

    let widths = std::iter::once(Constraint::Length(12))
        .chain(card.header.iter().map(|_| Constraint::Fill(1)));
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme_to_color(ThemeToken::CardBorder))),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let selected = card
        .rows
        .iter()
        .position(|r| r.kind == RowKind::Day { day_index: cursor.day });
    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, body_area, &mut state);

    draw_status(frame, status_area, status);
}

fn draw_bar(frame: &mut Frame, area: Rect, text: &str) {
    let bar = Block::default()
        .title(text.to_string())
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(bar, area);
}

fn draw_status(frame: &mut Frame, area: Rect, status: &str) {
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(theme_to_color(ThemeToken::TextMuted))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use periodgrid_core::GridConfig;
    use ratatui::backend::TestBackend;

    const PAYLOAD: &[u8] = br#"{
        "days": ["Mon", "Tue"],
        "periods": [
            {"name": "P1", "start_time": "08:00", "end_time": "08:45"},
            {"name": "Recess", "type": "break"},
            {"name": "P2", "start_time": "09:05", "end_time": "09:50"}
        ],
        "classes_grid": {
            "7A": {"0": {"0": [{"subject": "Maths", "teacher": "Mr. Lee", "class": "7A"}]}},
            "7B": {}
        }
    }"#;

    fn session() -> Session {
        Session::load(PAYLOAD, GridConfig::default()).unwrap()
    }

    #[test]
    fn commands_regroup_into_cards() {
        let mut session = session();
        session.toggle_times_row(1).unwrap();
        let Screen::Cards(cards) = screen(&session.render()) else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 2);
        let card = &cards[0];
        assert_eq!(card.heading, "Class: 7A");
        assert_eq!(card.corner, "Day");
        let labels: Vec<&str> = card.header.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, ["P1", "Recess", "P2"]);

        let kinds: Vec<RowKind> = card.rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            [
                RowKind::Day { day_index: 0 },
                RowKind::Times,
                RowKind::Day { day_index: 1 }
            ]
        );
        assert_eq!(card.rows[0].label, "Mon [+]");
        assert_eq!(card.rows[2].label, "Tue [−]");
        assert_eq!(card.rows[0].cells[0].lines, ["Maths", " Mr. Lee • 7A"]);
        assert_eq!(card.rows[0].cells[1].lines, ["Recess"]);
        assert_eq!(card.rows[0].cells[1].color, ThemeToken::BreakFill);
        assert_eq!(card.rows[1].cells[0].lines, ["08:00 - 08:45"]);
    }

    #[test]
    fn empty_view_has_a_message() {
        let mut session = session();
        session.set_view(session.view().toggled());
        assert_eq!(
            screen(&session.render()),
            Screen::Empty("No teachers found.".to_string())
        );
    }

    #[test]
    fn draws_selected_card() {
        let session = session();
        let screen = screen(&session.render());
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|frame| draw(frame, &session, &screen, &Cursor::default(), "ready"))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Class: 7A (1/2)"));
        assert!(text.contains("Maths"));
        assert!(text.contains("ready"));
    }
}
