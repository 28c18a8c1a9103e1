//! Integration test: load a schedule into a `Session` and drive the editor
//! headlessly the way a page would, checking the grid after each command.

use periodgrid_core::editor::{EditError, EditorMode, Field};
use periodgrid_core::html::render_html;
use periodgrid_core::model::{ColumnKind, ModelError, NewColumn, Period, Timetable};
use periodgrid_core::sequence::{SeqEntry, sequence};
use periodgrid_core::{GridConfig, Session, View};
use periodgrid_protocol::GridCommand;

fn session() -> Session {
    Session::load(include_bytes!("fixtures/schedule.json"), GridConfig::default())
        .expect("fixture should load")
}

fn labels(session: &Session) -> Vec<String> {
    session
        .timetable()
        .sequence()
        .iter()
        .map(|e| e.label().to_string())
        .collect()
}

fn headings(commands: &[GridCommand]) -> Vec<&str> {
    commands
        .iter()
        .filter_map(|c| match c {
            GridCommand::BeginCard { heading, .. } => Some(heading.as_str()),
            _ => None,
        })
        .collect()
}

fn accept(_: &str) -> bool {
    true
}

#[test]
fn fixture_loads_into_sequence() {
    let session = session();
    assert_eq!(
        labels(&session),
        ["Assembly", "P1", "P2", "Recess", "P3", "P4", "Lunch"]
    );
    let kinds: Vec<&ColumnKind> = session.timetable().columns().iter().map(|c| &c.kind).collect();
    assert_eq!(
        kinds,
        [
            &ColumnKind::Assembly,
            &ColumnKind::Break,
            &ColumnKind::Other("lunch".into())
        ]
    );

    let commands = session.render();
    assert_eq!(headings(&commands), ["Class: 7A", "Class: 7B"]);
    match &commands[0] {
        GridCommand::BeginCard { title, dated, .. } => {
            assert_eq!(title, "Northfield High");
            assert_eq!(dated, "9/1/2025");
        }
        other => panic!("expected a card, got {other:?}"),
    }
}

#[test]
fn header_labels_round_trip() {
    let session = session();
    let commands = session.render();
    let headers = GridCommand::header_labels(&commands);
    let expected = labels(&session);
    // One header row per card.
    assert_eq!(headers.len(), expected.len() * 2);
    for card in headers.chunks(expected.len()) {
        assert_eq!(card, expected.as_slice());
    }
}

#[test]
fn insert_lands_after_columns_sharing_the_anchor() {
    let mut session = session();
    // Position 2 is P2; Recess already follows it.
    session.open_insert_after(2);
    let open = session.editor().open().unwrap();
    assert_eq!(open.mode(), EditorMode::Add);
    assert_eq!(open.form.after, 2);
    assert_eq!(open.form.start, "09:35");
    assert_eq!(open.form.end, "09:55");

    let form = session.form_mut().unwrap();
    form.name = "Snack".into();
    form.start = "09:55".into();
    form.end = "10:00".into();
    session.save().unwrap();

    assert_eq!(
        labels(&session),
        ["Assembly", "P1", "P2", "Recess", "Snack", "P3", "P4", "Lunch"]
    );
    assert_eq!(session.revision(), 1);
}

#[test]
fn deleting_a_period_renumbers_later_anchors() {
    let mut session = session();
    let before: Vec<usize> = session.timetable().columns().iter().map(|c| c.after).collect();
    assert_eq!(before, [0, 2, 4]);

    assert!(session.open_at(1));
    assert_eq!(session.delete(&mut accept), Ok(true));

    let after: Vec<usize> = session.timetable().columns().iter().map(|c| c.after).collect();
    assert_eq!(after, [0, 1, 3]);
    assert_eq!(
        labels(&session),
        ["Assembly", "P2", "Recess", "P3", "P4", "Lunch"]
    );
}

#[test]
fn header_quick_delete_of_a_column() {
    let mut session = session();
    let mut asked = Vec::new();
    let mut prompt = |message: &str| {
        asked.push(message.to_string());
        true
    };
    assert_eq!(session.delete_at(3, &mut prompt), Ok(true));
    assert_eq!(asked, ["Are you sure you want to delete this column?"]);
    assert_eq!(
        labels(&session),
        ["Assembly", "P1", "P2", "P3", "P4", "Lunch"]
    );
}

#[test]
fn save_rejections_leave_the_model_alone() {
    let mut session = session();
    session.open_at(4);
    let before = serde_json::to_value(session.timetable()).unwrap();

    for (start, end, expected) in [
        ("09:00", "09:00", EditError::StartNotBeforeEnd),
        ("09:00", "08:59", EditError::StartNotBeforeEnd),
        ("", "08:59", EditError::MissingField(Field::Start)),
    ] {
        let form = session.form_mut().unwrap();
        form.start = start.into();
        form.end = end.into();
        assert_eq!(session.save(), Err(expected));
        assert!(session.editor().is_open());
        assert_eq!(serde_json::to_value(session.timetable()).unwrap(), before);
    }

    session.form_mut().unwrap().name = "   ".into();
    assert_eq!(
        session.save().map_err(|e| e.to_string()),
        Err("Please fill all fields.".to_string())
    );

    let form = session.form_mut().unwrap();
    form.name = "Period 3".into();
    form.start = "08:00".into();
    form.end = "09:00".into();
    assert_eq!(session.save(), Ok(()));
    assert_eq!(session.timetable().periods()[2].name, "Period 3");
    assert_eq!(session.revision(), 1);
}

#[test]
fn sole_period_cannot_be_deleted() {
    let payload = br#"{"days": ["Mon"], "periods": [{"name": "Only"}, {"name": "Lunch", "type": "lunch"}]}"#;
    let mut session = Session::load(payload, GridConfig::default()).unwrap();

    assert_eq!(
        session.delete_at(0, &mut accept),
        Err(EditError::Model(ModelError::LastPeriod))
    );
    session.open_at(0);
    let err = session.delete(&mut accept).unwrap_err();
    assert_eq!(err.to_string(), "Cannot delete the last period.");
    assert!(session.editor().is_open());
    assert_eq!(session.timetable().periods().len(), 1);

    // The column can still go.
    assert_eq!(session.delete_at(1, &mut accept), Ok(true));
    assert_eq!(labels(&session), ["Only"]);
}

#[test]
fn times_row_regenerates_after_reopening() {
    let mut session = session();
    assert_eq!(session.toggle_times_row(1), Ok(true));
    session.commit_times_cell(1, 1, "8:00\u{a0}-\u{a0}8:40 ").unwrap();

    let row = session.timetable().times_rows().row(1).unwrap();
    assert_eq!(row.len(), 7);
    assert_eq!(row[1].text, "8:00 - 8:40");

    // A structural edit keeps the edited text with its period.
    session.open_insert_after(0);
    let form = session.form_mut().unwrap();
    form.name = "Roll call".into();
    form.start = "07:40".into();
    form.end = "07:45".into();
    session.save().unwrap();
    let row = session.timetable().times_rows().row(1).unwrap();
    assert_eq!(row.len(), 8);
    assert_eq!(row[2].text, "8:00 - 8:40");

    assert_eq!(session.toggle_times_row(1), Ok(false));
    assert!(session.timetable().times_rows().row(1).is_none());
    assert_eq!(session.toggle_times_row(1), Ok(true));
    let row = session.timetable().times_rows().row(1).unwrap();
    assert_eq!(row.len(), session.timetable().sequence().len());
    assert_eq!(row[2].text, "08:00 - 08:45");

    assert_eq!(
        session.toggle_times_row(3),
        Err(ModelError::DayOutOfRange(3))
    );
}

#[test]
fn times_row_renders_above_its_day() {
    let mut session = session();
    session.toggle_times_row(0).unwrap();
    let html = render_html(&session.render());
    assert_eq!(html.matches(r#"class="pg-times" data-day-index="0""#).count(), 2);
    assert_eq!(html.matches("contenteditable").count(), 14);
}

#[test]
fn view_switch_never_touches_the_model() {
    let mut session = session();
    session.toggle_times_row(2).unwrap();
    let before = serde_json::to_value(session.timetable()).unwrap();
    let revision = session.revision();

    assert!(session.set_view(View::Teachers));
    let commands = session.render();
    assert_eq!(headings(&commands), ["Teacher: Mr. Lee", "Teacher: Ms. Ortiz"]);
    assert!(session.set_view("classes".parse().unwrap()));
    assert!(session.set_view(session.view().toggled()));

    assert_eq!(serde_json::to_value(session.timetable()).unwrap(), before);
    assert_eq!(session.revision(), revision);
    assert!("rooms".parse::<View>().is_err());
}

#[test]
fn raw_export_loads_like_a_payload() {
    let session = Session::load(include_bytes!("fixtures/raw-export.json"), GridConfig::default())
        .unwrap();
    assert_eq!(session.timetable().days(), ["Monday", "Tuesday"]);
    assert_eq!(labels(&session), ["P1", "P2", "Period 3"]);

    let grid = &session.schedule().classes["7A"];
    assert_eq!(grid.lessons(0, 0).len(), 1);
    assert_eq!(grid.lessons(1, 2).len(), 1);
    assert_eq!(grid.lesson_count(), 2);
    assert_eq!(grid.lessons(0, 0)[0].color(), Some("#2563eb"));

    let commands = session.render();
    assert_eq!(headings(&commands), ["Class: 7A"]);
}

#[test]
fn sequence_ordering_law_holds_for_every_anchor_layout() {
    let periods: Vec<Period> = (1..=3)
        .map(|i| Period::new(format!("P{i}"), None, None))
        .collect();
    // Every assignment of three columns to anchors 0..=3.
    for code in 0..64 {
        let anchors = [code % 4, (code / 4) % 4, (code / 16) % 4];
        let mut tt = Timetable::new(vec![], periods.clone());
        for (n, after) in anchors.into_iter().enumerate() {
            tt.add_column(NewColumn {
                kind: ColumnKind::Break,
                label: format!("C{n}"),
                after,
                start: None,
                end: None,
            })
            .unwrap();
        }
        let seq = sequence(tt.periods(), tt.columns());
        assert_eq!(seq.len(), 6);

        let mut periods_seen = 0;
        for entry in &seq {
            match entry {
                SeqEntry::Period { index, .. } => {
                    assert_eq!(*index, periods_seen);
                    periods_seen += 1;
                }
                SeqEntry::Column(column) => assert_eq!(column.after, periods_seen),
            }
        }
        assert_eq!(periods_seen, 3);
    }
}
