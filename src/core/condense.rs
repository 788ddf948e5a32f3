//! Condensation engine
//!
//! Folds raw line items into one [`CondensedGroup`] per distinct attribute
//! tuple, then orders the groups for display. The sorted position of a
//! group is the row number the command line uses to address it, so the
//! order must be a deterministic function of the line items alone.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::core::item::{GroupKey, LineItem};
use crate::core::status::{StockStatus, Thresholds};

/// Read-only aggregate of every line item sharing one attribute tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CondensedGroup {
    pub attributes: Vec<String>,
    pub total_qty: u64,
    /// Latest parseable expiry among members
    pub most_recent_expiry: Option<NaiveDate>,
    /// Units expiring on `most_recent_expiry` (ties are summed)
    pub most_recent_expiry_qty: u64,
    /// Number of member line items
    pub batches: usize,
    /// Members whose expiry could not be parsed
    pub invalid_expiries: usize,
}

impl CondensedGroup {
    pub fn key(&self) -> GroupKey {
        GroupKey(self.attributes.clone())
    }

    /// True if `item` belongs to this group
    pub fn contains(&self, item: &LineItem) -> bool {
        item.attributes == self.attributes
    }

    pub fn status(&self, today: NaiveDate, thresholds: &Thresholds) -> StockStatus {
        StockStatus::evaluate(self.total_qty, self.most_recent_expiry, today, thresholds)
    }
}

struct Accumulator {
    attributes: Vec<String>,
    total_qty: u64,
    expiries: Vec<(NaiveDate, u32)>,
    batches: usize,
    invalid_expiries: usize,
}

impl Accumulator {
    fn finish(mut self) -> CondensedGroup {
        self.expiries.sort_by(|a, b| b.0.cmp(&a.0));
        let most_recent_expiry = self.expiries.first().map(|(date, _)| *date);
        let most_recent_expiry_qty = most_recent_expiry
            .map(|latest| {
                self.expiries
                    .iter()
                    .filter(|(date, _)| *date == latest)
                    .map(|(_, qty)| u64::from(*qty))
                    .sum()
            })
            .unwrap_or(0);

        CondensedGroup {
            attributes: self.attributes,
            total_qty: self.total_qty,
            most_recent_expiry,
            most_recent_expiry_qty,
            batches: self.batches,
            invalid_expiries: self.invalid_expiries,
        }
    }
}

/// Group line items by attribute tuple, in first-seen order.
///
/// Items with an unparseable expiry still count toward `total_qty` but are
/// left out of the expiry computation.
pub fn condense(items: &[LineItem]) -> Vec<CondensedGroup> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut accumulators: Vec<Accumulator> = Vec::new();

    for item in items {
        let slot = *index.entry(item.group_key()).or_insert_with(|| {
            accumulators.push(Accumulator {
                attributes: item.attributes.clone(),
                total_qty: 0,
                expiries: Vec::new(),
                batches: 0,
                invalid_expiries: 0,
            });
            accumulators.len() - 1
        });

        let acc = &mut accumulators[slot];
        acc.total_qty += u64::from(item.qty);
        acc.batches += 1;
        match item.expiry_date() {
            Some(date) => acc.expiries.push((date, item.qty)),
            None => {
                tracing::warn!(
                    reference = %item.reference,
                    lot = %item.lot,
                    expiry = %item.expiry,
                    "line item has an unparseable expiry"
                );
                acc.invalid_expiries += 1;
            }
        }
    }

    accumulators.into_iter().map(Accumulator::finish).collect()
}

/// Order groups by attribute tuple, then most recent expiry
pub fn sort_groups(groups: &mut [CondensedGroup]) {
    groups.sort_by(|a, b| {
        a.attributes
            .cmp(&b.attributes)
            .then_with(|| a.most_recent_expiry.cmp(&b.most_recent_expiry))
    });
}

/// Condense and sort: the row order every command displays
pub fn sorted_groups(items: &[LineItem]) -> Vec<CondensedGroup> {
    let mut groups = condense(items);
    sort_groups(&mut groups);
    groups
}
