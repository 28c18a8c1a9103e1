//! Column sequencing: merges periods and anchored columns into the single
//! ordered list every row of the grid is laid out by.
//!
//! The sequence is a derived view. It is recomputed from the model on every
//! read and never stored, so mutations only have to keep `after` anchors
//! consistent.

use serde::{Deserialize, Serialize};

use crate::model::{Column, ColumnId, Period, TimeOfDay, format_range};

/// One entry of the column sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqEntry<'a> {
    Period { index: usize, period: &'a Period },
    Column(&'a Column),
}

impl<'a> SeqEntry<'a> {
    /// Identifying text: the period name or the column label.
    pub fn label(&self) -> &'a str {
        match self {
            Self::Period { period, .. } => &period.name,
            Self::Column(column) => &column.label,
        }
    }

    pub fn start(&self) -> Option<TimeOfDay> {
        match self {
            Self::Period { period, .. } => period.start,
            Self::Column(column) => column.start,
        }
    }

    pub fn end(&self) -> Option<TimeOfDay> {
        match self {
            Self::Period { period, .. } => period.end,
            Self::Column(column) => column.end,
        }
    }

    pub fn time_range(&self) -> String {
        format_range(self.start(), self.end())
    }

    pub fn period_index(&self) -> Option<usize> {
        match self {
            Self::Period { index, .. } => Some(*index),
            Self::Column(_) => None,
        }
    }

    /// Owned identity of the entry, independent of its sequence position.
    pub fn key(&self) -> SlotKey {
        match self {
            Self::Period { index, .. } => SlotKey::Period(*index),
            Self::Column(column) => SlotKey::Column(column.id.clone()),
        }
    }
}

/// Identity of a sequence entry: a period position or a column id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKey {
    Period(usize),
    Column(ColumnId),
}

/// Merge periods and columns into display order.
///
/// Columns anchored at 0 come first, then period 1 followed by the columns
/// anchored at 1, and so on. Columns sharing an anchor keep their relative
/// order from `columns`. An anchor past the last period is treated as
/// "after the last period".
pub fn sequence<'a>(periods: &'a [Period], columns: &'a [Column]) -> Vec<SeqEntry<'a>> {
    let mut buckets: Vec<Vec<&Column>> = vec![Vec::new(); periods.len() + 1];
    for column in columns {
        let slot = column.after.min(periods.len());
        buckets[slot].push(column);
    }

    let mut seq = Vec::with_capacity(periods.len() + columns.len());
    let mut buckets = buckets.into_iter();
    if let Some(leading) = buckets.next() {
        seq.extend(leading.into_iter().map(SeqEntry::Column));
    }
    for ((index, period), trailing) in periods.iter().enumerate().zip(buckets) {
        seq.push(SeqEntry::Period { index, period });
        seq.extend(trailing.into_iter().map(SeqEntry::Column));
    }
    seq
}

/// Anchor for a column inserted after sequence position `ci`: one past the
/// nearest period at or before `ci`, or 0 when no period precedes it.
pub fn insertion_anchor(seq: &[SeqEntry<'_>], ci: usize) -> usize {
    let Some(last) = seq.len().checked_sub(1) else {
        return 0;
    };
    seq[..=ci.min(last)]
        .iter()
        .rev()
        .find_map(SeqEntry::period_index)
        .map_or(0, |index| index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnKind;

    fn periods(n: usize) -> Vec<Period> {
        (1..=n)
            .map(|i| Period::new(format!("P{i}"), None, None))
            .collect()
    }

    fn column(id: &str, after: usize) -> Column {
        Column {
            id: ColumnId::new(id),
            kind: ColumnKind::Break,
            label: id.to_uppercase(),
            after,
            start: None,
            end: None,
        }
    }

    fn labels(seq: &[SeqEntry<'_>]) -> Vec<String> {
        seq.iter().map(|e| e.label().to_string()).collect()
    }

    #[test]
    fn merges_by_anchor() {
        let periods = periods(3);
        let columns = vec![column("b", 2), column("a", 0), column("c", 3), column("d", 2)];
        let seq = sequence(&periods, &columns);
        assert_eq!(labels(&seq), ["A", "P1", "P2", "B", "D", "P3", "C"]);
    }

    #[test]
    fn contains_every_period_and_column_once() {
        let periods = periods(4);
        let columns = vec![column("x", 1), column("y", 4), column("z", 0), column("w", 1)];
        let seq = sequence(&periods, &columns);
        assert_eq!(seq.len(), periods.len() + columns.len());

        let period_indices: Vec<usize> = seq.iter().filter_map(SeqEntry::period_index).collect();
        assert_eq!(period_indices, [0, 1, 2, 3]);

        // Columns appear in non-decreasing anchor order.
        let anchors: Vec<usize> = seq
            .iter()
            .filter_map(|e| match e {
                SeqEntry::Column(c) => Some(c.after),
                SeqEntry::Period { .. } => None,
            })
            .collect();
        assert!(anchors.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn column_lands_between_neighbouring_periods() {
        let periods = periods(3);
        for k in 0..=periods.len() {
            let columns = vec![column("n", k)];
            let seq = sequence(&periods, &columns);
            let pos = seq
                .iter()
                .position(|e| matches!(e, SeqEntry::Column(_)))
                .unwrap();
            if k > 0 {
                assert_eq!(seq[pos - 1].period_index(), Some(k - 1));
            } else {
                assert_eq!(pos, 0);
            }
            match seq.get(pos + 1) {
                Some(next) => assert_eq!(next.period_index(), Some(k)),
                None => assert_eq!(k, periods.len()),
            }
        }
    }

    #[test]
    fn degenerate_inputs() {
        let columns = vec![column("a", 0), column("b", 0)];
        assert_eq!(labels(&sequence(&[], &columns)), ["A", "B"]);

        let periods = periods(2);
        assert_eq!(labels(&sequence(&periods, &[])), ["P1", "P2"]);

        assert!(sequence(&[], &[]).is_empty());
    }

    #[test]
    fn dangling_anchor_goes_last() {
        let periods = periods(2);
        let columns = vec![column("late", 9)];
        assert_eq!(labels(&sequence(&periods, &columns)), ["P1", "P2", "LATE"]);
    }

    #[test]
    fn insertion_anchor_scans_backwards() {
        let periods = periods(2);
        let columns = vec![column("a", 0), column("b", 1), column("c", 1)];
        let seq = sequence(&periods, &columns);
        // A P1 B C P2
        assert_eq!(insertion_anchor(&seq, 0), 0);
        assert_eq!(insertion_anchor(&seq, 1), 1);
        assert_eq!(insertion_anchor(&seq, 3), 1);
        assert_eq!(insertion_anchor(&seq, 4), 2);
        assert_eq!(insertion_anchor(&seq, 99), 2);
        assert_eq!(insertion_anchor(&[], 0), 0);
    }
}
