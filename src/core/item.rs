//! Line items - one physical batch of stock

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::schema::CategorySchema;

/// Date format used in files and on the command line
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Batch fields shared by every category, as (field name, column label)
pub const UNIVERSAL_FIELDS: [(&str, &str); 4] = [
    ("ref", "REF"),
    ("lot", "LOT"),
    ("expiry", "Expiry"),
    ("qty", "Qty"),
];

/// One stock record: a product variant plus its batch details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Category attribute values, in schema order
    pub attributes: Vec<String>,
    /// Manufacturer reference code
    #[serde(rename = "ref")]
    pub reference: String,
    pub lot: String,
    /// Expiry as written in the file; normally `YYYY-MM-DD`
    pub expiry: String,
    pub qty: u32,
}

/// The values that make two line items "the same batch"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub attributes: Vec<String>,
    pub reference: String,
    pub lot: String,
    pub expiry: String,
}

/// Grouping key: the category attribute tuple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(pub Vec<String>);

impl LineItem {
    pub fn new(
        attributes: Vec<String>,
        reference: impl Into<String>,
        lot: impl Into<String>,
        expiry: impl Into<String>,
        qty: u32,
    ) -> Self {
        Self {
            attributes,
            reference: reference.into(),
            lot: lot.into(),
            expiry: expiry.into(),
            qty,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            attributes: self.attributes.clone(),
            reference: self.reference.clone(),
            lot: self.lot.clone(),
            expiry: self.expiry.clone(),
        }
    }

    /// True if this item's identity tuple equals `identity`
    pub fn matches(&self, identity: &Identity) -> bool {
        self.attributes == identity.attributes
            && self.reference == identity.reference
            && self.lot == identity.lot
            && self.expiry == identity.expiry
    }

    pub fn group_key(&self) -> GroupKey {
        GroupKey(self.attributes.clone())
    }

    /// Parsed expiry, or None if the stored text is not a valid date
    pub fn expiry_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.expiry.trim(), DATE_FORMAT).ok()
    }

    /// Read any field by name as text
    pub fn field(&self, schema: &CategorySchema, name: &str) -> Option<String> {
        match name {
            "ref" => Some(self.reference.clone()),
            "lot" => Some(self.lot.clone()),
            "expiry" => Some(self.expiry.clone()),
            "qty" => Some(self.qty.to_string()),
            _ => schema
                .attribute_index(name)
                .and_then(|i| self.attributes.get(i).cloned()),
        }
    }

    /// Short batch description used in summaries
    pub fn batch_label(&self) -> String {
        format!(
            "REF {}, LOT {}, Expiry {}, Qty {}",
            self.reference, self.lot, self.expiry, self.qty
        )
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" / "))
    }
}
