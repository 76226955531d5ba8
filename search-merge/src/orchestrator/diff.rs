//! Incremental update computation between two published sequences.
//!
//! Items are matched by `stable_id`. The longest common subsequence of ids
//! (Myers diff via [`similar`]) stays where it is; every other item is
//! removed, inserted, or (with move detection) moved. Matched items whose
//! content differs additionally get a [`EditOp::Change`].
//!
//! Ops are applied one after another; each position refers to the list as
//! it stands when that op runs.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::error::SearchError;
use crate::types::ResultRecord;

/// A single step of an [`EditScript`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Insert `record` at `position`.
    Insert {
        position: usize,
        record: ResultRecord,
    },
    /// Remove the item at `position`.
    Remove { position: usize },
    /// Remove the item at `from`, then insert it at `to`.
    Move { from: usize, to: usize },
    /// Replace the item at `position` with updated content of the same identity.
    Change {
        position: usize,
        record: ResultRecord,
    },
}

/// Ordered edit operations turning one sequence into another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    ops: Vec<EditOp>,
    old_len: usize,
    new_len: usize,
}

impl EditScript {
    /// The operations, in application order.
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Length of the sequence the script applies to.
    pub fn old_len(&self) -> usize {
        self.old_len
    }

    /// Length of the sequence after the script is applied.
    pub fn new_len(&self) -> usize {
        self.new_len
    }

    /// Whether the script changes nothing.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn insertions(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Insert { .. }))
    }

    pub fn removals(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Remove { .. }))
    }

    pub fn moves(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Move { .. }))
    }

    pub fn changes(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Change { .. }))
    }

    fn count(&self, pred: impl Fn(&EditOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// Applies the script to `list` in place.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Script`] if `list` does not have the length the
    /// script was computed for, or an op addresses a position that does not
    /// exist. `list` may be partially updated in that case.
    pub fn apply(&self, list: &mut Vec<ResultRecord>) -> Result<(), SearchError> {
        if list.len() != self.old_len {
            return Err(SearchError::Script(format!(
                "script expects {} items, list has {}",
                self.old_len,
                list.len()
            )));
        }
        for op in &self.ops {
            match op {
                EditOp::Insert { position, record } => {
                    check_position(*position, list.len() + 1)?;
                    list.insert(*position, record.clone());
                }
                EditOp::Remove { position } => {
                    check_position(*position, list.len())?;
                    list.remove(*position);
                }
                EditOp::Move { from, to } => {
                    check_position(*from, list.len())?;
                    let item = list.remove(*from);
                    check_position(*to, list.len() + 1)?;
                    list.insert(*to, item);
                }
                EditOp::Change { position, record } => {
                    check_position(*position, list.len())?;
                    list[*position] = record.clone();
                }
            }
        }
        Ok(())
    }

    /// Returns a copy of `old` with the script applied.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply).
    pub fn applied_to(&self, old: &[ResultRecord]) -> Result<Vec<ResultRecord>, SearchError> {
        let mut list = old.to_vec();
        self.apply(&mut list)?;
        Ok(list)
    }
}

fn check_position(position: usize, bound: usize) -> Result<(), SearchError> {
    if position < bound {
        Ok(())
    } else {
        Err(SearchError::Script(format!(
            "position {position} out of bounds (limit {bound})"
        )))
    }
}

/// Where an item of the working list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Old(usize),
    Inserted,
}

/// Computes [`EditScript`]s between sequences of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceDiffer {
    detect_moves: bool,
}

impl SequenceDiffer {
    /// Creates a differ. Without move detection, an item that changes
    /// position outside the common subsequence is removed and re-inserted.
    pub fn new(detect_moves: bool) -> Self {
        Self { detect_moves }
    }

    /// Computes the script turning `old` into `new`.
    pub fn diff(&self, old: &[ResultRecord], new: &[ResultRecord]) -> EditScript {
        let old_ids: Vec<i64> = old.iter().map(|r| r.stable_id).collect();
        let new_ids: Vec<i64> = new.iter().map(|r| r.stable_id).collect();

        // new index -> old index for items that stay in place
        let mut anchored_from: Vec<Option<usize>> = vec![None; new.len()];
        let mut old_kept = vec![false; old.len()];
        for op in capture_diff_slices(Algorithm::Myers, &old_ids, &new_ids) {
            if let DiffOp::Equal {
                old_index,
                new_index,
                len,
            } = op
            {
                for k in 0..len {
                    anchored_from[new_index + k] = Some(old_index + k);
                    old_kept[old_index + k] = true;
                }
            }
        }

        // new index -> old index for items that change position
        let mut moved_from: Vec<Option<usize>> = vec![None; new.len()];
        if self.detect_moves {
            let mut pending: HashMap<i64, VecDeque<usize>> = HashMap::new();
            for (i, id) in old_ids.iter().enumerate() {
                if !old_kept[i] {
                    pending.entry(*id).or_default().push_back(i);
                }
            }
            for (j, id) in new_ids.iter().enumerate() {
                if anchored_from[j].is_some() {
                    continue;
                }
                if let Some(i) = pending.get_mut(id).and_then(VecDeque::pop_front) {
                    moved_from[j] = Some(i);
                    old_kept[i] = true;
                }
            }
        }

        let mut ops = Vec::new();

        // Removals run back to front so earlier positions stay valid.
        for i in (0..old.len()).rev() {
            if !old_kept[i] {
                ops.push(EditOp::Remove { position: i });
            }
        }
        let mut working: Vec<Slot> = (0..old.len())
            .filter(|&i| old_kept[i])
            .map(Slot::Old)
            .collect();

        // Everything before `cursor` already matches new[..j].
        let mut cursor = 0;
        for (j, record) in new.iter().enumerate() {
            if let Some(i) = anchored_from[j] {
                let Some(offset) = working[cursor..].iter().position(|s| *s == Slot::Old(i))
                else {
                    tracing::error!(stable_id = record.stable_id, "anchored item missing from working list");
                    continue;
                };
                let position = cursor + offset;
                if old[i] != *record {
                    ops.push(EditOp::Change {
                        position,
                        record: record.clone(),
                    });
                }
                cursor = position + 1;
            } else if let Some(i) = moved_from[j] {
                let Some(from) = working.iter().position(|s| *s == Slot::Old(i)) else {
                    tracing::error!(stable_id = record.stable_id, "moved item missing from working list");
                    continue;
                };
                let slot = working.remove(from);
                if from < cursor {
                    cursor -= 1;
                }
                working.insert(cursor, slot);
                ops.push(EditOp::Move { from, to: cursor });
                if old[i] != *record {
                    ops.push(EditOp::Change {
                        position: cursor,
                        record: record.clone(),
                    });
                }
                cursor += 1;
            } else {
                working.insert(cursor, Slot::Inserted);
                ops.push(EditOp::Insert {
                    position: cursor,
                    record: record.clone(),
                });
                cursor += 1;
            }
        }

        EditScript {
            ops,
            old_len: old.len(),
            new_len: new.len(),
        }
    }
}
