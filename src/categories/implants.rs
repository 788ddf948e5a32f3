//! Dental implants

use crate::categories::IMPLANT_BRANDS;
use crate::core::schema::{Attribute, Condition, FieldRule};

pub const ATTRIBUTES: &[Attribute] = &[
    Attribute::new("brand", "Brand"),
    Attribute::new("type", "Type"),
    Attribute::new("platform", "Platform"),
    Attribute::new("width", "Width"),
    Attribute::new("length", "Length"),
];

const NOBEL: &[Condition] = &[Condition::new("brand", &["Nobel"])];

pub const RULES: &[FieldRule] = &[
    FieldRule::new("brand", &[], IMPLANT_BRANDS).open(),
    FieldRule::new(
        "type",
        NOBEL,
        &["NobelParallel TiUltra", "NobelActive TiUltra"],
    ),
    FieldRule::new("platform", NOBEL, &["3.0", "RP", "NP", "WP"]),
    FieldRule::new("width", NOBEL, &["3.0", "3.5", "3.75", "4.3", "5.0", "5.5"]),
    FieldRule::new("length", NOBEL, &["7.0", "8.5", "10.0", "11.5", "13", "15", "18"]),
];
