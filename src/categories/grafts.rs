//! Bone grafts

use crate::categories::IMPLANT_BRANDS;
use crate::core::schema::{Attribute, FieldRule};

pub const ATTRIBUTES: &[Attribute] = &[
    Attribute::new("brand", "Brand"),
    Attribute::new("type", "Type"),
    Attribute::new("particulate", "Particulate"),
    Attribute::new("granule_size", "Granule Size"),
    Attribute::new("amount", "Amount"),
];

pub const RULES: &[FieldRule] = &[FieldRule::new("brand", &[], IMPLANT_BRANDS).open()];
