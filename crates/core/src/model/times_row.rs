use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sequence::{SeqEntry, SlotKey};

/// One free-text cell of a times row, remembering which sequence entry it
/// was created for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesCell {
    pub slot: SlotKey,
    pub text: String,
}

/// Per-day overlay rows of editable time text, one cell per sequence entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesRows {
    rows: BTreeMap<usize, Vec<TimesCell>>,
}

impl TimesRows {
    pub fn is_open(&self, day: usize) -> bool {
        self.rows.contains_key(&day)
    }

    /// Cells of an open row, in sequence order.
    pub fn row(&self, day: usize) -> Option<&[TimesCell]> {
        self.rows.get(&day).map(Vec::as_slice)
    }

    /// Close the row if open, otherwise open it with default text captured
    /// from `seq`. Returns whether the row is open afterwards.
    pub fn toggle(&mut self, day: usize, seq: &[SeqEntry<'_>]) -> bool {
        if self.rows.remove(&day).is_some() {
            return false;
        }
        self.rows.insert(day, seq.iter().map(default_cell).collect());
        true
    }

    /// Store edited text for `slot` of `day`, normalising non-breaking
    /// spaces and trimming. Returns `false` when there is no such cell.
    pub fn set_text(&mut self, day: usize, slot: usize, text: &str) -> bool {
        let Some(cell) = self.rows.get_mut(&day).and_then(|row| row.get_mut(slot)) else {
            return false;
        };
        cell.text = text.replace('\u{a0}', " ").trim().to_string();
        true
    }

    /// Period at `removed` is gone: drop its cells and shift later period
    /// keys down by one, mirroring the column anchor renumbering.
    pub(crate) fn forget_period(&mut self, removed: usize) {
        for row in self.rows.values_mut() {
            row.retain(|cell| cell.slot != SlotKey::Period(removed));
            for cell in row.iter_mut() {
                if let SlotKey::Period(index) = &mut cell.slot
                    && *index > removed
                {
                    *index -= 1;
                }
            }
        }
    }

    /// Realign every open row to `seq`: cells follow their entry, cells of
    /// vanished entries are dropped, new entries get default text.
    pub(crate) fn reconcile(&mut self, seq: &[SeqEntry<'_>]) {
        for row in self.rows.values_mut() {
            let mut previous = std::mem::take(row);
            *row = seq
                .iter()
                .map(|entry| {
                    let key = entry.key();
                    match previous.iter().position(|cell| cell.slot == key) {
                        Some(pos) => previous.swap_remove(pos),
                        None => default_cell(entry),
                    }
                })
                .collect();
        }
    }
}

fn default_cell(entry: &SeqEntry<'_>) -> TimesCell {
    TimesCell {
        slot: entry.key(),
        text: entry.time_range(),
    }
}
