//! Cover screws

use crate::categories::IMPLANT_BRANDS;
use crate::core::schema::{Attribute, Condition, FieldRule};

pub const ATTRIBUTES: &[Attribute] = &[
    Attribute::new("brand", "Brand"),
    Attribute::new("platform", "Platform"),
];

pub const RULES: &[FieldRule] = &[
    FieldRule::new("brand", &[], IMPLANT_BRANDS).open(),
    FieldRule::new(
        "platform",
        &[Condition::new("brand", &["Nobel"])],
        &["3.0", "NP", "RP", "WP"],
    ),
];
