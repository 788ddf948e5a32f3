//! Category schema descriptors
//!
//! A schema describes one product category: which attributes define a
//! product (and therefore a condensed group), the CSV file it lives in,
//! its thresholds, and the choice rules used by interactive prompts.

use crate::core::item::UNIVERSAL_FIELDS;
use crate::core::status::Thresholds;

/// A product-defining attribute (part of the grouping key)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Field name used on the command line (e.g. "collar_height")
    pub key: &'static str,
    /// Column header in the CSV file and tables (e.g. "Collar Height")
    pub label: &'static str,
}

impl Attribute {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Upstream condition for a field rule: `field` must hold one of `any_of`
#[derive(Debug, Clone, Copy)]
pub struct Condition {
    pub field: &'static str,
    pub any_of: &'static [&'static str],
}

impl Condition {
    pub const fn new(field: &'static str, any_of: &'static [&'static str]) -> Self {
        Self { field, any_of }
    }
}

/// One edge set of the field dependency graph.
///
/// When every condition holds, `values` are the choices offered for
/// `field`. An open rule lets the operator enter a value not in the list.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub when: &'static [Condition],
    pub values: &'static [&'static str],
    pub open: bool,
}

impl FieldRule {
    pub const fn new(
        field: &'static str,
        when: &'static [Condition],
        values: &'static [&'static str],
    ) -> Self {
        Self {
            field,
            when,
            values,
            open: false,
        }
    }

    /// Same rule, but allowing values outside the list
    pub const fn open(mut self) -> Self {
        self.open = true;
        self
    }

    /// A single closed choice is a fixed value, not a question
    pub fn is_fixed(&self) -> bool {
        !self.open && self.values.len() == 1
    }

    fn applies<'a>(&self, upstream: impl Fn(&str) -> Option<&'a str>) -> bool {
        self.when.iter().all(|cond| {
            upstream(cond.field)
                .map(|v| cond.any_of.contains(&v))
                .unwrap_or(false)
        })
    }
}

/// Full description of a product category
#[derive(Debug, Clone)]
pub struct CategorySchema {
    /// Command-line name (e.g. "healing-abutments")
    pub slug: &'static str,
    /// Display name for tabs/headings (e.g. "Healing Abutments")
    pub title: &'static str,
    /// Singular item name for messages (e.g. "healing abutment")
    pub item_name: &'static str,
    /// Ordered grouping attributes
    pub attributes: &'static [Attribute],
    /// Choice rules for interactive prompts
    pub rules: &'static [FieldRule],
    /// CSV file name inside the data directory
    pub file_name: String,
    pub thresholds: Thresholds,
    /// Add merges into an existing line item with the same identity
    pub merge_on_add: bool,
}

impl CategorySchema {
    /// Number of grouping attributes
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Total number of CSV columns (attributes + REF, LOT, Expiry, Qty)
    pub fn column_count(&self) -> usize {
        self.attributes.len() + UNIVERSAL_FIELDS.len()
    }

    /// CSV header row
    pub fn header_labels(&self) -> Vec<&'static str> {
        self.attributes
            .iter()
            .map(|a| a.label)
            .chain(UNIVERSAL_FIELDS.iter().map(|(_, label)| *label))
            .collect()
    }

    /// Every editable field name, attributes first
    pub fn field_names(&self) -> Vec<&'static str> {
        self.attributes
            .iter()
            .map(|a| a.key)
            .chain(UNIVERSAL_FIELDS.iter().map(|(key, _)| *key))
            .collect()
    }

    /// Position of an attribute in the grouping key
    pub fn attribute_index(&self, key: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.key == key)
    }

    /// Human label for any field name
    pub fn label_for(&self, field: &str) -> Option<&'static str> {
        self.attributes
            .iter()
            .find(|a| a.key == field)
            .map(|a| a.label)
            .or_else(|| {
                UNIVERSAL_FIELDS
                    .iter()
                    .find(|(key, _)| *key == field)
                    .map(|(_, label)| *label)
            })
    }

    /// Resolve a field name given either its key or its label
    pub fn resolve_field(&self, name: &str) -> Option<&'static str> {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");
        self.field_names()
            .into_iter()
            .find(|f| *f == normalized)
    }

    /// The first rule for `field` whose conditions hold against `upstream`
    pub fn rule_for<'a>(
        &self,
        field: &str,
        upstream: impl Fn(&str) -> Option<&'a str> + Copy,
    ) -> Option<&'static FieldRule> {
        self.rules
            .iter()
            .find(|rule| rule.field == field && rule.applies(upstream))
    }

    /// Allowed values for `field`, or None for free text
    pub fn allowed_values<'a>(
        &self,
        field: &str,
        upstream: impl Fn(&str) -> Option<&'a str> + Copy,
    ) -> Option<&'static [&'static str]> {
        self.rule_for(field, upstream).map(|rule| rule.values)
    }
}
