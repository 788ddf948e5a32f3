//! Healing and temporary abutments

use crate::categories::IMPLANT_BRANDS;
use crate::core::schema::{Attribute, Condition, FieldRule};

pub const HEALING_ATTRIBUTES: &[Attribute] = &[
    Attribute::new("brand", "Brand"),
    Attribute::new("type", "Type"),
    Attribute::new("platform", "Platform"),
    Attribute::new("width", "Width"),
    Attribute::new("height", "Height"),
];

pub const HEALING_RULES: &[FieldRule] = &[FieldRule::new("brand", &[], IMPLANT_BRANDS).open()];

pub const TEMPORARY_ATTRIBUTES: &[Attribute] = &[
    Attribute::new("brand", "Brand"),
    Attribute::new("engagement", "Engagement"),
    Attribute::new("platform", "Platform"),
    Attribute::new("collar_height", "Collar Height"),
    Attribute::new("height", "Height"),
];

const NOBEL: Condition = Condition::new("brand", &["Nobel"]);

// Rules are tried in order; the first whose conditions all hold wins.
pub const TEMPORARY_RULES: &[FieldRule] = &[
    FieldRule::new("brand", &[], IMPLANT_BRANDS).open(),
    FieldRule::new(
        "engagement",
        &[NOBEL],
        &["Snap Engaging", "Snap Multi-unit", "Engaging", "Non-engaging"],
    ),
    // platform
    FieldRule::new(
        "platform",
        &[NOBEL, Condition::new("engagement", &["Snap Engaging", "Non-engaging"])],
        &["NP", "RP", "WP"],
    ),
    FieldRule::new(
        "platform",
        &[NOBEL, Condition::new("engagement", &["Snap Multi-unit"])],
        &["NP,RP,WP"],
    ),
    FieldRule::new(
        "platform",
        &[NOBEL, Condition::new("engagement", &["Engaging"])],
        &["3.0", "NP", "RP", "WP"],
    ),
    // collar height
    FieldRule::new(
        "collar_height",
        &[NOBEL, Condition::new("platform", &["3.0"])],
        &["1.5 mm"],
    ),
    FieldRule::new(
        "collar_height",
        &[
            NOBEL,
            Condition::new("platform", &["NP", "RP"]),
            Condition::new("engagement", &["Snap Engaging"]),
        ],
        &["1.5 mm", "3.0 mm"],
    ),
    FieldRule::new(
        "collar_height",
        &[
            NOBEL,
            Condition::new("platform", &["NP", "RP"]),
            Condition::new("engagement", &["Engaging", "Non-engaging"]),
        ],
        &["1.5 mm"],
    ),
    FieldRule::new(
        "collar_height",
        &[NOBEL, Condition::new("platform", &["WP"])],
        &["1.5 mm", "3.0 mm"],
    ),
    FieldRule::new(
        "collar_height",
        &[NOBEL, Condition::new("platform", &["NP,RP,WP"])],
        &["N/A"],
    ),
    // height
    FieldRule::new(
        "height",
        &[
            NOBEL,
            Condition::new("engagement", &["Snap Engaging"]),
            Condition::new("platform", &["WP"]),
        ],
        &["4 mm"],
    ),
    FieldRule::new(
        "height",
        &[
            NOBEL,
            Condition::new("engagement", &["Engaging"]),
            Condition::new("platform", &["3.0"]),
        ],
        &["9 mm"],
    ),
    FieldRule::new("height", &[NOBEL], &["10 mm"]),
];

#[cfg(test)]
mod tests {
    use crate::categories::Category;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_temporary_height_cascade() {
        let schema = Category::TemporaryAbutments.schema();

        let wp = lookup(&[("brand", "Nobel"), ("engagement", "Snap Engaging"), ("platform", "WP")]);
        assert_eq!(
            schema.allowed_values("height", |f| wp.get(f).copied()),
            Some(&["4 mm"][..])
        );

        let np = lookup(&[("brand", "Nobel"), ("engagement", "Snap Engaging"), ("platform", "NP")]);
        assert_eq!(
            schema.allowed_values("height", |f| np.get(f).copied()),
            Some(&["10 mm"][..])
        );
    }

    #[test]
    fn test_multi_unit_platform_is_fixed() {
        let schema = Category::TemporaryAbutments.schema();
        let mu = lookup(&[("brand", "Nobel"), ("engagement", "Snap Multi-unit")]);
        let rule = schema.rule_for("platform", |f| mu.get(f).copied()).unwrap();
        assert!(rule.is_fixed());
        assert_eq!(rule.values, &["NP,RP,WP"]);
    }

    #[test]
    fn test_other_brand_is_free_text() {
        let schema = Category::TemporaryAbutments.schema();
        let other = lookup(&[("brand", "Straumann")]);
        assert!(schema
            .allowed_values("engagement", |f| other.get(f).copied())
            .is_none());
    }
}
