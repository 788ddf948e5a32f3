//! Mutation operators: add, edit and remove
//!
//! Edits and removals are planned against a snapshot of one group's
//! members and applied back to the full item list by matching each
//! member's original identity tuple.

use thiserror::Error;

use crate::core::condense::{sorted_groups, CondensedGroup};
use crate::core::item::{Identity, LineItem};
use crate::core::schema::CategorySchema;
use crate::core::validate::{ItemInput, ValidationError};

/// Errors raised while planning a mutation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("batch {batch}: {source}")]
    InvalidBatch {
        batch: usize,
        #[source]
        source: ValidationError,
    },

    #[error("row {row} does not exist ({available} row(s) listed)")]
    RowOutOfRange { row: usize, available: usize },

    #[error("batch {batch} does not exist ({available} batch(es) in this group)")]
    BatchOutOfRange { batch: usize, available: usize },

    #[error("no quantity entered to remove")]
    NothingToRemove,

    #[error("no changes were made")]
    NothingToEdit,

    #[error("batch {batch}: cannot remove {requested}, only {available} in stock")]
    RemovalExceedsStock {
        batch: usize,
        requested: u32,
        available: u32,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("malformed argument '{0}'")]
    MalformedArgument(String),

    #[error("expected {expected} value(s), got {found}")]
    InputCountMismatch { expected: usize, found: usize },

    #[error("cannot {action} while the form is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

// ============================================================================
// Add
// ============================================================================

/// What `add_item` did with the new line item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Appended,
    Merged { new_qty: u32 },
}

/// Add a validated line item, merging into an exact identity match when
/// `merge` is set.
pub fn add_item(items: &mut Vec<LineItem>, item: LineItem, merge: bool) -> AddOutcome {
    if merge {
        let identity = item.identity();
        if let Some(existing) = items.iter_mut().find(|i| i.matches(&identity)) {
            existing.qty = existing.qty.saturating_add(item.qty);
            tracing::debug!(reference = %item.reference, lot = %item.lot, qty = existing.qty, "merged into existing line item");
            return AddOutcome::Merged {
                new_qty: existing.qty,
            };
        }
    }
    tracing::debug!(reference = %item.reference, lot = %item.lot, "appended line item");
    items.push(item);
    AddOutcome::Appended
}

// ============================================================================
// Group selection
// ============================================================================

/// One displayed row, resolved back to its member line items
#[derive(Debug, Clone)]
pub struct GroupSelection {
    /// Zero-based row in the sorted display
    pub row: usize,
    pub group: CondensedGroup,
    /// Members in file order
    pub members: Vec<LineItem>,
}

/// Re-derive the sorted condensation and pick the group at `row`
pub fn select_group(items: &[LineItem], row: usize) -> Result<GroupSelection, OpError> {
    let groups = sorted_groups(items);
    let available = groups.len();
    let group = groups
        .into_iter()
        .nth(row)
        .ok_or(OpError::RowOutOfRange {
            row: row + 1,
            available,
        })?;
    let members = items
        .iter()
        .filter(|item| group.contains(item))
        .cloned()
        .collect();

    Ok(GroupSelection {
        row,
        group,
        members,
    })
}

// ============================================================================
// Edit
// ============================================================================

/// A single line item change: matched by `original`, replaced by `updated`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditChange {
    pub original: LineItem,
    pub updated: LineItem,
    /// Rank among earlier members sharing the original identity
    pub occurrence: usize,
}

impl EditChange {
    pub fn original_identity(&self) -> Identity {
        self.original.identity()
    }

    /// "Original → New" line for the confirmation diff
    pub fn diff_line(&self, schema: &CategorySchema) -> String {
        let changed_attrs: Vec<(usize, &str)> = schema
            .attributes
            .iter()
            .enumerate()
            .filter(|(i, _)| self.original.attributes.get(*i) != self.updated.attributes.get(*i))
            .map(|(i, a)| (i, a.label))
            .collect();

        let describe = |item: &LineItem| {
            let mut parts: Vec<String> = changed_attrs
                .iter()
                .map(|(i, label)| {
                    format!("{} {}", label, item.attributes.get(*i).map_or("", String::as_str))
                })
                .collect();
            parts.push(item.batch_label());
            parts.join(", ")
        };

        format!("{} → {}", describe(&self.original), describe(&self.updated))
    }
}

/// Validated set of edits for one group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPlan {
    pub changes: Vec<EditChange>,
}

impl EditPlan {
    /// Validate one input per member. Inputs still holding the member's
    /// stored text are dropped without validation, so a stored value in a
    /// non-canonical form never counts as an edit.
    pub fn build(
        schema: &CategorySchema,
        members: &[LineItem],
        inputs: &[ItemInput],
    ) -> Result<Self, OpError> {
        if members.len() != inputs.len() {
            return Err(OpError::InputCountMismatch {
                expected: members.len(),
                found: inputs.len(),
            });
        }

        let occurrences = occurrences(members);
        let mut changes = Vec::new();
        for (idx, (member, input)) in members.iter().zip(inputs).enumerate() {
            if *input == ItemInput::from_item(member) {
                continue;
            }
            let updated = input
                .validate(schema)
                .map_err(|source| OpError::InvalidBatch {
                    batch: idx + 1,
                    source,
                })?;
            if &updated != member {
                changes.push(EditChange {
                    original: member.clone(),
                    updated,
                    occurrence: occurrences[idx],
                });
            }
        }

        if changes.is_empty() {
            return Err(OpError::NothingToEdit);
        }
        Ok(Self { changes })
    }

    /// One "Original → New" line per changed line item
    pub fn diff_lines(&self, schema: &CategorySchema) -> Vec<String> {
        self.changes.iter().map(|c| c.diff_line(schema)).collect()
    }
}

/// Write each change onto the item matching its original identity.
///
/// Targets are resolved before anything is written, so one change never
/// shifts another onto a different batch. Changes whose original can no
/// longer be found are skipped. Returns the number applied.
pub fn apply_edit(items: &mut [LineItem], plan: &EditPlan) -> usize {
    let targets: Vec<Option<usize>> = plan
        .changes
        .iter()
        .map(|change| locate(items, &change.original_identity(), change.occurrence))
        .collect();

    let mut applied = 0;
    for (change, target) in plan.changes.iter().zip(targets) {
        match target {
            Some(pos) => {
                items[pos] = change.updated.clone();
                applied += 1;
            }
            None => {
                tracing::warn!(reference = %change.original.reference, lot = %change.original.lot, "edited line item no longer present, skipping");
            }
        }
    }
    applied
}

/// Rank of each member among the earlier members with the same identity
fn occurrences(members: &[LineItem]) -> Vec<usize> {
    members
        .iter()
        .enumerate()
        .map(|(idx, member)| {
            let identity = member.identity();
            members[..idx].iter().filter(|m| m.matches(&identity)).count()
        })
        .collect()
}

/// Position of the `occurrence`-th item (0-based) matching `identity`.
///
/// Batches sharing an identity always fall in the same group, so the n-th
/// such member of a group is the n-th such item in the store.
fn locate(items: &[LineItem], identity: &Identity, occurrence: usize) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.matches(identity))
        .map(|(pos, _)| pos)
        .nth(occurrence)
}

// ============================================================================
// Remove
// ============================================================================

/// Quantity to take from one line item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub item: LineItem,
    pub amount: u32,
    /// Rank among earlier members sharing the item's identity
    pub occurrence: usize,
}

impl Removal {
    /// True if the removal empties the batch
    pub fn empties_batch(&self) -> bool {
        self.amount >= self.item.qty
    }
}

/// Validated removals for one group; only nonzero amounts are kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalPlan {
    pub removals: Vec<Removal>,
}

impl RemovalPlan {
    /// Check one amount per member, each bounded to the member's qty
    pub fn build(members: &[LineItem], amounts: &[u32]) -> Result<Self, OpError> {
        if members.len() != amounts.len() {
            return Err(OpError::InputCountMismatch {
                expected: members.len(),
                found: amounts.len(),
            });
        }

        let occurrences = occurrences(members);
        let mut removals = Vec::new();
        for (idx, (member, &amount)) in members.iter().zip(amounts).enumerate() {
            if amount > member.qty {
                return Err(OpError::RemovalExceedsStock {
                    batch: idx + 1,
                    requested: amount,
                    available: member.qty,
                });
            }
            if amount > 0 {
                removals.push(Removal {
                    item: member.clone(),
                    amount,
                    occurrence: occurrences[idx],
                });
            }
        }

        if removals.is_empty() {
            return Err(OpError::NothingToRemove);
        }
        Ok(Self { removals })
    }

    /// Total units this plan takes out
    pub fn total_units(&self) -> u64 {
        self.removals.iter().map(|r| u64::from(r.amount)).sum()
    }

    /// Confirmation text, one line per affected batch
    pub fn summary_lines(&self) -> Vec<String> {
        self.removals
            .iter()
            .map(|r| {
                let suffix = if r.empties_batch() {
                    " (batch removed)"
                } else {
                    ""
                };
                format!(
                    "REF {}, LOT {}, Expiry {}: remove {} of {}{}",
                    r.item.reference, r.item.lot, r.item.expiry, r.amount, r.item.qty, suffix
                )
            })
            .collect()
    }
}

/// Counts from applying a removal plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub decremented: usize,
    pub deleted: usize,
    pub units: u64,
}

/// Decrement or delete the matched line items.
///
/// Targets are resolved up front and emptied batches are deleted last, so
/// a deletion never shifts a later removal onto another batch.
pub fn apply_removal(items: &mut Vec<LineItem>, plan: &RemovalPlan) -> RemovalOutcome {
    let targets: Vec<Option<usize>> = plan
        .removals
        .iter()
        .map(|removal| locate(items, &removal.item.identity(), removal.occurrence))
        .collect();

    let mut outcome = RemovalOutcome::default();
    let mut emptied = Vec::new();
    for (removal, target) in plan.removals.iter().zip(targets) {
        let Some(pos) = target else {
            tracing::warn!(reference = %removal.item.reference, lot = %removal.item.lot, "line item to remove no longer present, skipping");
            continue;
        };

        let current = items[pos].qty;
        if current > removal.amount {
            items[pos].qty = current - removal.amount;
            outcome.decremented += 1;
            outcome.units += u64::from(removal.amount);
        } else {
            emptied.push(pos);
            outcome.deleted += 1;
            outcome.units += u64::from(current);
        }
    }

    emptied.sort_unstable_by(|a, b| b.cmp(a));
    for pos in emptied {
        items.remove(pos);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Category;

    fn item(attrs: &[&str], reference: &str, expiry: &str, qty: u32) -> LineItem {
        LineItem::new(
            attrs.iter().map(|s| s.to_string()).collect(),
            reference,
            "LOT1",
            expiry,
            qty,
        )
    }

    fn stock() -> Vec<LineItem> {
        vec![
            item(&["Straumann", "RC"], "S1", "2027-01-01", 4),
            item(&["Nobel", "NP"], "N1", "2026-05-01", 3),
            item(&["Nobel", "NP"], "N2", "2027-05-01", 2),
        ]
    }

    #[test]
    fn test_add_appends_without_merge() {
        let mut items = stock();
        let dup = items[1].clone();
        assert_eq!(add_item(&mut items, dup, false), AddOutcome::Appended);
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn test_add_merges_exact_identity() {
        let mut items = stock();
        let mut dup = items[1].clone();
        dup.qty = 5;
        assert_eq!(
            add_item(&mut items, dup, true),
            AddOutcome::Merged { new_qty: 8 }
        );
        assert_eq!(items.len(), 3);

        // a different lot is a different batch
        let mut other = items[1].clone();
        other.lot = "LOT2".into();
        assert_eq!(add_item(&mut items, other, true), AddOutcome::Appended);
    }

    #[test]
    fn test_select_group_uses_sorted_rows() {
        let items = stock();
        let sel = select_group(&items, 0).unwrap();
        assert_eq!(sel.group.attributes, vec!["Nobel", "NP"]);
        assert_eq!(sel.members.len(), 2);

        let sel = select_group(&items, 1).unwrap();
        assert_eq!(sel.group.attributes, vec!["Straumann", "RC"]);

        assert_eq!(
            select_group(&items, 2).unwrap_err(),
            OpError::RowOutOfRange {
                row: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_remove_decrements_and_deletes() {
        let mut items = stock();
        let members = select_group(&items, 0).unwrap().members;

        let plan = RemovalPlan::build(&members, &[1, 2]).unwrap();
        assert_eq!(plan.total_units(), 3);
        let outcome = apply_removal(&mut items, &plan);

        assert_eq!(outcome.decremented, 1);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].reference, "N1");
        assert_eq!(items[1].qty, 2);
    }

    #[test]
    fn test_remove_all_zero_is_rejected() {
        let members = select_group(&stock(), 0).unwrap().members;
        assert_eq!(
            RemovalPlan::build(&members, &[0, 0]).unwrap_err(),
            OpError::NothingToRemove
        );
    }

    #[test]
    fn test_remove_bounded_by_stock() {
        let members = select_group(&stock(), 0).unwrap().members;
        assert_eq!(
            RemovalPlan::build(&members, &[4, 0]).unwrap_err(),
            OpError::RemovalExceedsStock {
                batch: 1,
                requested: 4,
                available: 3
            }
        );
    }

    #[test]
    fn test_edit_diff_one_line_per_changed_item() {
        let schema = Category::CoverScrews.schema();
        let members = select_group(&stock(), 0).unwrap().members;

        let mut inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
        inputs[1].qty = "7".into();

        let plan = EditPlan::build(&schema, &members, &inputs).unwrap();
        let lines = plan.diff_lines(&schema);
        assert_eq!(lines.len(), 1);
        insta::assert_snapshot!(
            lines[0].as_str(),
            @"REF N2, LOT LOT1, Expiry 2027-05-01, Qty 2 → REF N2, LOT LOT1, Expiry 2027-05-01, Qty 7"
        );
    }

    #[test]
    fn test_edit_diff_includes_changed_attributes() {
        let schema = Category::CoverScrews.schema();
        let members = select_group(&stock(), 0).unwrap().members;

        let mut inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
        inputs[0].set(&schema, "platform", "RP");

        let plan = EditPlan::build(&schema, &members, &inputs).unwrap();
        insta::assert_snapshot!(
            plan.diff_lines(&schema)[0].as_str(),
            @"Platform NP, REF N1, LOT LOT1, Expiry 2026-05-01, Qty 3 → Platform RP, REF N1, LOT LOT1, Expiry 2026-05-01, Qty 3"
        );
    }

    #[test]
    fn test_edit_without_changes_is_rejected() {
        let schema = Category::CoverScrews.schema();
        let members = select_group(&stock(), 0).unwrap().members;
        let inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
        assert_eq!(
            EditPlan::build(&schema, &members, &inputs).unwrap_err(),
            OpError::NothingToEdit
        );
    }

    #[test]
    fn test_edit_validation_names_batch() {
        let schema = Category::CoverScrews.schema();
        let members = select_group(&stock(), 0).unwrap().members;
        let mut inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
        inputs[1].expiry = "soon".into();

        assert!(matches!(
            EditPlan::build(&schema, &members, &inputs),
            Err(OpError::InvalidBatch {
                batch: 2,
                source: ValidationError::BadDate(_)
            })
        ));
    }

    #[test]
    fn test_apply_edit_matches_original_identity() {
        let schema = Category::CoverScrews.schema();
        let mut items = stock();
        let members = select_group(&items, 0).unwrap().members;

        let mut inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
        inputs[0].lot = "LOT9".into();
        inputs[1].qty = "10".into();
        let plan = EditPlan::build(&schema, &members, &inputs).unwrap();

        assert_eq!(apply_edit(&mut items, &plan), 2);
        assert_eq!(items[1].lot, "LOT9");
        assert_eq!(items[2].qty, 10);

        // applying again finds nothing for the re-lotted batch
        assert_eq!(apply_edit(&mut items, &plan), 1);
    }

    /// Two batches received separately with the same REF, LOT and expiry
    fn duplicate_batches() -> Vec<LineItem> {
        vec![
            item(&["Nobel", "NP"], "N1", "2027-01-01", 1),
            item(&["Straumann", "RC"], "S1", "2027-01-01", 4),
            item(&["Nobel", "NP"], "N1", "2027-01-01", 5),
        ]
    }

    #[test]
    fn test_remove_targets_selected_duplicate_batch() {
        let mut items = duplicate_batches();
        let members = select_group(&items, 0).unwrap().members;
        assert_eq!(members.len(), 2);

        let plan = RemovalPlan::build(&members, &[0, 5]).unwrap();
        let outcome = apply_removal(&mut items, &plan);

        assert_eq!(
            outcome,
            RemovalOutcome {
                decremented: 0,
                deleted: 1,
                units: 5
            }
        );
        let qtys: Vec<u32> = items.iter().map(|i| i.qty).collect();
        assert_eq!(qtys, vec![1, 4]);
    }

    #[test]
    fn test_remove_from_both_duplicates() {
        let mut items = duplicate_batches();
        let members = select_group(&items, 0).unwrap().members;

        // emptying the first must not shift the second removal
        let plan = RemovalPlan::build(&members, &[1, 2]).unwrap();
        let outcome = apply_removal(&mut items, &plan);

        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.decremented, 1);
        assert_eq!(outcome.units, 3);
        let qtys: Vec<u32> = items.iter().map(|i| i.qty).collect();
        assert_eq!(qtys, vec![4, 3]);
    }

    #[test]
    fn test_edit_targets_selected_duplicate_batch() {
        let schema = Category::CoverScrews.schema();
        let mut items = duplicate_batches();
        let members = select_group(&items, 0).unwrap().members;

        let mut inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
        inputs[1].qty = "7".into();
        let plan = EditPlan::build(&schema, &members, &inputs).unwrap();

        assert_eq!(apply_edit(&mut items, &plan), 1);
        let qtys: Vec<u32> = items.iter().map(|i| i.qty).collect();
        assert_eq!(qtys, vec![1, 4, 7]);
    }

    #[test]
    fn test_edit_of_first_duplicate_leaves_second() {
        let schema = Category::CoverScrews.schema();
        let mut items = duplicate_batches();
        let members = select_group(&items, 0).unwrap().members;

        // the first batch takes a new LOT; the second keeps the old identity
        let mut inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
        inputs[0].lot = "LOT2".into();
        inputs[1].qty = "6".into();
        let plan = EditPlan::build(&schema, &members, &inputs).unwrap();

        assert_eq!(apply_edit(&mut items, &plan), 2);
        assert_eq!(items[0].lot, "LOT2");
        assert_eq!(items[0].qty, 1);
        assert_eq!(items[2].lot, "LOT1");
        assert_eq!(items[2].qty, 6);
    }

    #[test]
    fn test_untouched_noncanonical_row_is_not_an_edit() {
        let schema = Category::CoverScrews.schema();
        let mut items = vec![
            item(&["Nobel", "NP"], "R1", "2027-4-9", 2),
            item(&["Nobel", "NP"], "R2", "2027-05-01", 3),
        ];
        let members = select_group(&items, 0).unwrap().members;

        let mut inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
        inputs[1].qty = "4".into();
        let plan = EditPlan::build(&schema, &members, &inputs).unwrap();

        let lines = plan.diff_lines(&schema);
        assert_eq!(lines.len(), 1);
        insta::assert_snapshot!(
            lines[0].as_str(),
            @"REF R2, LOT LOT1, Expiry 2027-05-01, Qty 3 → REF R2, LOT LOT1, Expiry 2027-05-01, Qty 4"
        );

        assert_eq!(apply_edit(&mut items, &plan), 1);
        assert_eq!(items[0].expiry, "2027-4-9");
        assert_eq!(items[1].qty, 4);
    }

    #[test]
    fn test_touched_noncanonical_row_is_normalized() {
        let schema = Category::CoverScrews.schema();
        let members = vec![item(&["Nobel", "NP"], "R1", "2027-4-9", 2)];

        let mut inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
        inputs[0].qty = "1".into();
        let plan = EditPlan::build(&schema, &members, &inputs).unwrap();

        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].updated.expiry, "2027-04-09");
    }
}
