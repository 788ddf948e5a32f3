//! Input validation shared by the add and edit forms

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::item::{LineItem, DATE_FORMAT};
use crate::core::schema::CategorySchema;

/// Reasons a form submission is rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("all fields are required (missing: {})", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("expiry must be a date in YYYY-MM-DD format, got '{0}'")]
    BadDate(String),

    #[error("quantity must be a whole number of zero or more, got '{0}'")]
    BadQuantity(String),
}

/// Raw text entered for one line item, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemInput {
    pub attributes: Vec<String>,
    pub reference: String,
    pub lot: String,
    pub expiry: String,
    pub qty: String,
}

impl ItemInput {
    /// Blank input sized for a schema
    pub fn blank(schema: &CategorySchema) -> Self {
        Self {
            attributes: vec![String::new(); schema.attribute_count()],
            ..Default::default()
        }
    }

    /// Pre-filled input for editing an existing line item
    pub fn from_item(item: &LineItem) -> Self {
        Self {
            attributes: item.attributes.clone(),
            reference: item.reference.clone(),
            lot: item.lot.clone(),
            expiry: item.expiry.clone(),
            qty: item.qty.to_string(),
        }
    }

    /// Current text of a field
    pub fn get(&self, schema: &CategorySchema, field: &str) -> Option<&str> {
        match field {
            "ref" => Some(&self.reference),
            "lot" => Some(&self.lot),
            "expiry" => Some(&self.expiry),
            "qty" => Some(&self.qty),
            _ => schema
                .attribute_index(field)
                .and_then(|i| self.attributes.get(i))
                .map(String::as_str),
        }
    }

    /// Set a field by name. Returns false if the schema has no such field.
    pub fn set(&mut self, schema: &CategorySchema, field: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        match field {
            "ref" => self.reference = value,
            "lot" => self.lot = value,
            "expiry" => self.expiry = value,
            "qty" => self.qty = value,
            _ => match schema.attribute_index(field) {
                Some(i) => {
                    if self.attributes.len() < schema.attribute_count() {
                        self.attributes.resize(schema.attribute_count(), String::new());
                    }
                    self.attributes[i] = value;
                }
                None => return false,
            },
        }
        true
    }

    /// Check every field and build a line item.
    ///
    /// Values are trimmed and the expiry is rewritten as `YYYY-MM-DD`.
    pub fn validate(&self, schema: &CategorySchema) -> Result<LineItem, ValidationError> {
        let missing: Vec<String> = schema
            .field_names()
            .into_iter()
            .filter(|field| {
                self.get(schema, field)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .filter_map(|field| schema.label_for(field).map(str::to_string))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let expiry = parse_expiry(&self.expiry)?;
        let qty = parse_quantity(&self.qty)?;

        Ok(LineItem {
            attributes: self.attributes.iter().map(|a| a.trim().to_string()).collect(),
            reference: self.reference.trim().to_string(),
            lot: self.lot.trim().to_string(),
            expiry: expiry.format(DATE_FORMAT).to_string(),
            qty,
        })
    }
}

/// Parse a `YYYY-MM-DD` expiry
pub fn parse_expiry(text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::BadDate(text.trim().to_string()))
}

/// Parse a non-negative whole quantity
pub fn parse_quantity(text: &str) -> Result<u32, ValidationError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::BadQuantity(text.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Category;

    fn filled() -> ItemInput {
        let schema = Category::CoverScrews.schema();
        let mut input = ItemInput::blank(&schema);
        input.set(&schema, "brand", " Nobel ");
        input.set(&schema, "platform", "NP");
        input.set(&schema, "ref", "300212");
        input.set(&schema, "lot", "13579");
        input.set(&schema, "expiry", "2027-4-9");
        input.set(&schema, "qty", "5");
        input
    }

    #[test]
    fn test_valid_input_is_normalized() {
        let schema = Category::CoverScrews.schema();
        let item = filled().validate(&schema).unwrap();
        assert_eq!(item.attributes, vec!["Nobel", "NP"]);
        assert_eq!(item.expiry, "2027-04-09");
        assert_eq!(item.qty, 5);
    }

    #[test]
    fn test_missing_fields_listed_by_label() {
        let schema = Category::CoverScrews.schema();
        let mut input = filled();
        input.set(&schema, "platform", "  ");
        input.set(&schema, "lot", "");

        let err = input.validate(&schema).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["Platform".into(), "LOT".into()])
        );
    }

    #[test]
    fn test_bad_date() {
        let schema = Category::CoverScrews.schema();
        let mut input = filled();
        input.set(&schema, "expiry", "2027-13-01");
        assert!(matches!(
            input.validate(&schema),
            Err(ValidationError::BadDate(_))
        ));
    }

    #[test]
    fn test_bad_quantity() {
        assert!(parse_quantity("-1").is_err());
        assert!(parse_quantity("2.5").is_err());
        assert!(parse_quantity("ten").is_err());
        assert_eq!(parse_quantity(" 0 "), Ok(0));
    }

    #[test]
    fn test_set_unknown_field() {
        let schema = Category::CoverScrews.schema();
        let mut input = ItemInput::blank(&schema);
        assert!(!input.set(&schema, "colour", "blue"));
    }
}
