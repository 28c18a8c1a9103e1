use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ModelError;
use super::column::{Column, ColumnId, ColumnKind, NewColumn};
use super::period::Period;
use super::time::TimeOfDay;
use super::times_row::TimesRows;
use crate::sequence::{SeqEntry, insertion_anchor, sequence};

/// The editable structure of the week: days, periods, anchored columns and
/// the per-day times overlay.
///
/// All structural mutations go through methods here so that column anchors
/// and open times rows stay consistent with the period list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    days: Vec<String>,
    periods: Vec<Period>,
    columns: Vec<Column>,
    times_rows: TimesRows,
    next_column: u64,
}

/// One choice for a column's anchor, as offered by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorOption {
    pub after: usize,
    pub label: String,
}

/// Field values applied to an existing column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnUpdate {
    pub kind: ColumnKind,
    pub label: String,
    pub after: usize,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
}

impl Timetable {
    pub fn new(days: Vec<String>, periods: Vec<Period>) -> Self {
        Self {
            days,
            periods,
            ..Self::default()
        }
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn times_rows(&self) -> &TimesRows {
        &self.times_rows
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// The current column sequence, freshly computed.
    pub fn sequence(&self) -> Vec<SeqEntry<'_>> {
        sequence(&self.periods, &self.columns)
    }

    /// Anchor a column inserted after sequence position `ci` would get.
    pub fn insertion_anchor(&self, ci: usize) -> usize {
        insertion_anchor(&self.sequence(), ci)
    }

    /// "Before P1", then "After <name>" for every period.
    pub fn anchor_options(&self) -> Vec<AnchorOption> {
        let first = AnchorOption {
            after: 0,
            label: "Before P1".to_string(),
        };
        std::iter::once(first)
            .chain(self.periods.iter().enumerate().map(|(i, p)| AnchorOption {
                after: i + 1,
                label: format!("After {}", p.name),
            }))
            .collect()
    }

    fn check_anchor(&self, after: usize) -> Result<(), ModelError> {
        if after > self.periods.len() {
            return Err(ModelError::AnchorOutOfRange {
                after,
                periods: self.periods.len(),
            });
        }
        Ok(())
    }

    /// Append a column with a fresh id. Columns sharing its anchor keep
    /// their order; the new one goes last among them.
    pub fn add_column(&mut self, column: NewColumn) -> Result<ColumnId, ModelError> {
        self.check_anchor(column.after)?;
        self.next_column += 1;
        let id = ColumnId::new(format!("{}-{}", column.kind.as_str(), self.next_column));
        debug!(%id, after = column.after, "adding column");
        self.columns.push(Column {
            id: id.clone(),
            kind: column.kind,
            label: column.label,
            after: column.after,
            start: column.start,
            end: column.end,
        });
        self.reconcile_times_rows();
        Ok(id)
    }

    /// Replace a period's fields in place; its index does not change.
    pub fn update_period(
        &mut self,
        index: usize,
        name: String,
        start: Option<TimeOfDay>,
        end: Option<TimeOfDay>,
    ) -> Result<(), ModelError> {
        let period = self
            .periods
            .get_mut(index)
            .ok_or(ModelError::PeriodOutOfRange(index))?;
        period.name = name;
        period.start = start;
        period.end = end;
        Ok(())
    }

    /// Mutate a column found by id, possibly moving it to another anchor.
    pub fn update_column(&mut self, id: &ColumnId, update: ColumnUpdate) -> Result<(), ModelError> {
        self.check_anchor(update.after)?;
        let column = self
            .columns
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| ModelError::UnknownColumn(id.clone()))?;
        let moved = column.after != update.after;
        column.kind = update.kind;
        column.label = update.label;
        column.after = update.after;
        column.start = update.start;
        column.end = update.end;
        if moved {
            self.reconcile_times_rows();
        }
        Ok(())
    }

    /// Remove the period at `index`. The last remaining period can never be
    /// removed.
    ///
    /// Every column anchored after a later period moves down by one so it
    /// stays after the same period it followed before.
    pub fn remove_period(&mut self, index: usize) -> Result<Period, ModelError> {
        if index >= self.periods.len() {
            return Err(ModelError::PeriodOutOfRange(index));
        }
        if self.periods.len() <= 1 {
            return Err(ModelError::LastPeriod);
        }
        let removed = self.periods.remove(index);
        for column in &mut self.columns {
            if column.after > index {
                column.after -= 1;
            }
        }
        self.times_rows.forget_period(index);
        self.reconcile_times_rows();
        debug!(index, name = %removed.name, "removed period");
        Ok(removed)
    }

    pub fn remove_column(&mut self, id: &ColumnId) -> Result<Column, ModelError> {
        let pos = self
            .columns
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| ModelError::UnknownColumn(id.clone()))?;
        let removed = self.columns.remove(pos);
        self.reconcile_times_rows();
        debug!(%id, "removed column");
        Ok(removed)
    }

    /// Open or close the times row of `day`. Returns whether it is open now.
    pub fn toggle_times_row(&mut self, day: usize) -> Result<bool, ModelError> {
        if day >= self.days.len() {
            return Err(ModelError::DayOutOfRange(day));
        }
        let seq = sequence(&self.periods, &self.columns);
        Ok(self.times_rows.toggle(day, &seq))
    }

    /// Commit edited text of one times-row cell.
    pub fn set_times_text(
        &mut self,
        day: usize,
        slot: usize,
        text: &str,
    ) -> Result<(), ModelError> {
        if self.times_rows.set_text(day, slot, text) {
            Ok(())
        } else {
            Err(ModelError::NoTimesCell { day, slot })
        }
    }

    fn reconcile_times_rows(&mut self) {
        let seq = sequence(&self.periods, &self.columns);
        self.times_rows.reconcile(&seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SlotKey;

    fn timetable(periods: usize) -> Timetable {
        Timetable::new(
            vec!["Mon".into(), "Tue".into()],
            (1..=periods)
                .map(|i| Period::new(format!("P{i}"), None, None))
                .collect(),
        )
    }

    fn new_column(label: &str, after: usize) -> NewColumn {
        NewColumn {
            kind: ColumnKind::Break,
            label: label.into(),
            after,
            start: None,
            end: None,
        }
    }

    fn labels(tt: &Timetable) -> Vec<String> {
        tt.sequence().iter().map(|e| e.label().to_string()).collect()
    }

    #[test]
    fn removing_a_period_renumbers_later_anchors() {
        let mut tt = timetable(3);
        let x = tt.add_column(new_column("X", 2)).unwrap();
        let before = tt.add_column(new_column("Early", 0)).unwrap();
        let at_first = tt.add_column(new_column("AfterP1", 1)).unwrap();

        tt.remove_period(0).unwrap();

        assert_eq!(tt.column(&x).map(|c| c.after), Some(1));
        assert_eq!(tt.column(&before).map(|c| c.after), Some(0));
        // Anchored on the removed period itself: now before the new first.
        assert_eq!(tt.column(&at_first).map(|c| c.after), Some(0));
        assert_eq!(labels(&tt), ["Early", "AfterP1", "P2", "X", "P3"]);
    }

    #[test]
    fn removing_a_middle_period_keeps_earlier_anchors() {
        let mut tt = timetable(3);
        let a = tt.add_column(new_column("A", 1)).unwrap();
        let b = tt.add_column(new_column("B", 3)).unwrap();
        tt.remove_period(1).unwrap();
        assert_eq!(tt.column(&a).map(|c| c.after), Some(1));
        assert_eq!(tt.column(&b).map(|c| c.after), Some(2));
        assert_eq!(labels(&tt), ["P1", "A", "P3", "B"]);
    }

    #[test]
    fn last_period_is_kept() {
        let mut tt = timetable(1);
        assert_eq!(tt.remove_period(0), Err(ModelError::LastPeriod));
        assert_eq!(tt.periods().len(), 1);
        assert_eq!(tt.remove_period(5), Err(ModelError::PeriodOutOfRange(5)));
    }

    #[test]
    fn anchors_are_bounded() {
        let mut tt = timetable(2);
        assert!(tt.add_column(new_column("ok", 2)).is_ok());
        assert_eq!(
            tt.add_column(new_column("bad", 3)),
            Err(ModelError::AnchorOutOfRange {
                after: 3,
                periods: 2
            })
        );
    }

    #[test]
    fn ids_are_unique_even_after_removal() {
        let mut tt = timetable(1);
        let a = tt.add_column(new_column("A", 0)).unwrap();
        tt.remove_column(&a).unwrap();
        let b = tt.add_column(new_column("B", 0)).unwrap();
        assert_ne!(a, b);
        assert!(tt.remove_column(&a).is_err());
    }

    #[test]
    fn anchor_option_labels() {
        let tt = timetable(2);
        let labels: Vec<String> = tt.anchor_options().into_iter().map(|o| o.label).collect();
        assert_eq!(labels, ["Before P1", "After P1", "After P2"]);
    }

    #[test]
    fn times_rows_track_structure() {
        let mut tt = timetable(2);
        assert!(tt.toggle_times_row(1).unwrap());
        assert_eq!(tt.toggle_times_row(2), Err(ModelError::DayOutOfRange(2)));

        tt.add_column(new_column("Lunch", 1)).unwrap();
        assert_eq!(tt.times_rows().row(1).map(<[_]>::len), Some(3));

        tt.remove_period(1).unwrap();
        assert_eq!(tt.times_rows().row(1).map(<[_]>::len), Some(2));

        tt.set_times_text(1, 0, "early").unwrap();
        assert!(tt.set_times_text(0, 0, "closed day").is_err());
    }

    #[test]
    fn moving_a_column_carries_its_times_cell() {
        let mut tt = timetable(3);
        let lunch = tt.add_column(new_column("Lunch", 1)).unwrap();
        tt.toggle_times_row(0).unwrap();
        tt.set_times_text(0, 1, "12:00").unwrap();
        tt.set_times_text(0, 3, "late").unwrap();

        let update = ColumnUpdate {
            kind: ColumnKind::Break,
            label: "Lunch".into(),
            after: 2,
            start: None,
            end: None,
        };
        tt.update_column(&lunch, update).unwrap();
        assert_eq!(labels(&tt), ["P1", "P2", "Lunch", "P3"]);

        let row = tt.times_rows().row(0).unwrap();
        let slots: Vec<&SlotKey> = row.iter().map(|cell| &cell.slot).collect();
        assert_eq!(
            slots,
            [
                &SlotKey::Period(0),
                &SlotKey::Period(1),
                &SlotKey::Column(lunch),
                &SlotKey::Period(2)
            ]
        );
        assert_eq!(row[2].text, "12:00");
        assert_eq!(row[3].text, "late");
    }
}
