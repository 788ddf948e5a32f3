//! Low-stock / expiring-soon evaluation for condensed groups

use chrono::NaiveDate;
use serde::Serialize;

/// Default number of days before expiry at which stock is flagged
pub const DEFAULT_DAYS_FROM_EXPIRY: i64 = 180;

/// Default low-stock threshold for most categories
pub const DEFAULT_LOW_QUANTITY: u32 = 2;

/// Per-category thresholds used to flag a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    /// A group is low on stock when its total is at or below this
    pub low_quantity: u32,
    /// A group is expiring soon when fewer than this many days remain
    pub days_from_expiry: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_quantity: DEFAULT_LOW_QUANTITY,
            days_from_expiry: DEFAULT_DAYS_FROM_EXPIRY,
        }
    }
}

/// Display flags for a condensed group. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StockStatus {
    pub low_stock: bool,
    pub expiring_soon: bool,
}

impl StockStatus {
    /// Evaluate the flags for a group against `today`.
    ///
    /// An unknown expiry never triggers "Expiring Soon".
    pub fn evaluate(
        total_qty: u64,
        most_recent_expiry: Option<NaiveDate>,
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> Self {
        let low_stock = total_qty <= u64::from(thresholds.low_quantity);
        let expiring_soon = most_recent_expiry
            .map(|expiry| (expiry - today).num_days() < thresholds.days_from_expiry)
            .unwrap_or(false);

        Self {
            low_stock,
            expiring_soon,
        }
    }

    /// True if any flag is raised
    pub fn is_flagged(&self) -> bool {
        self.low_stock || self.expiring_soon
    }

    /// Comma-joined label, empty when nothing is flagged
    pub fn label(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if self.low_stock {
            parts.push("Low Stock");
        }
        if self.expiring_soon {
            parts.push("Expiring Soon");
        }
        parts.join(", ")
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}
