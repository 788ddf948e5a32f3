//! Barrier membranes
//!
//! The cascade runs brand → biologic type → membrane type → shape, with
//! size and thickness fixed by shape for titanium-reinforced membranes.

use crate::core::schema::{Attribute, Condition, FieldRule};

pub const ATTRIBUTES: &[Attribute] = &[
    Attribute::new("brand", "Brand"),
    Attribute::new("biologic_type", "Biologic Type"),
    Attribute::new("membrane_type", "Membrane Type"),
    Attribute::new("shape", "Shape"),
    Attribute::new("size", "Size"),
    Attribute::new("thickness", "Thickness"),
    Attribute::new("sn", "SN"),
];

const TI_SHAPES: &[&str] = &[
    "ANL", "ANL30", "AS", "BL", "BLL", "PS", "PST", "PL", "PLT", "XLK", "XL", "ATC", "PTC", "PD",
    "K2",
];

const fn membrane(types: &'static [&'static str]) -> Condition {
    Condition::new("membrane_type", types)
}

const fn shape(shapes: &'static [&'static str]) -> Condition {
    Condition::new("shape", shapes)
}

const TI: Condition = membrane(&["Ti-reinforced PTFE"]);

pub const RULES: &[FieldRule] = &[
    FieldRule::new("brand", &[], &["creos", "Osteogenics"]).open(),
    FieldRule::new(
        "biologic_type",
        &[Condition::new("brand", &["creos"])],
        &["Allograft", "Xenograft"],
    ),
    FieldRule::new(
        "biologic_type",
        &[Condition::new("brand", &["Osteogenics"])],
        &["Xenograft", "Synthetic"],
    ),
    FieldRule::new(
        "membrane_type",
        &[Condition::new("biologic_type", &["Allograft"])],
        &["Pericardium"],
    ),
    FieldRule::new(
        "membrane_type",
        &[Condition::new("biologic_type", &["Xenograft"])],
        &["Collagen"],
    ),
    FieldRule::new(
        "membrane_type",
        &[Condition::new("biologic_type", &["Synthetic"])],
        &["d-PTFE", "Ti-reinforced PTFE"],
    ),
    // shape
    FieldRule::new(
        "shape",
        &[membrane(&["Pericardium", "Collagen", "d-PTFE"])],
        &["Rectangular"],
    ),
    FieldRule::new("shape", &[TI], TI_SHAPES),
    // size
    FieldRule::new(
        "size",
        &[membrane(&["Pericardium"])],
        &["10 x 10 mm", "15 x 20 mm", "20 x 30 mm"],
    ),
    FieldRule::new(
        "size",
        &[membrane(&["Collagen"])],
        &["15 x 20 mm", "25 x 30 mm", "30 x 40 mm"],
    ),
    FieldRule::new(
        "size",
        &[membrane(&["d-PTFE"])],
        &["12 x 24 mm", "12 x 30 mm", "25 x 30 mm"],
    ),
    FieldRule::new("size", &[TI, shape(&["ANL"])], &["12 x 24 mm"]),
    FieldRule::new("size", &[TI, shape(&["ANL30"])], &["12 x 30 mm"]),
    FieldRule::new("size", &[TI, shape(&["AS"])], &["14 x 24 mm"]),
    FieldRule::new("size", &[TI, shape(&["BL"])], &["17 x 25 mm"]),
    FieldRule::new("size", &[TI, shape(&["BLL"])], &["17 x 30 mm"]),
    FieldRule::new("size", &[TI, shape(&["PS"])], &["20 x 25 mm"]),
    FieldRule::new("size", &[TI, shape(&["PST"])], &["36 x 25 mm"]),
    FieldRule::new("size", &[TI, shape(&["PL"])], &["25 x 30 mm"]),
    FieldRule::new("size", &[TI, shape(&["PLT"])], &["30 x 41 mm"]),
    FieldRule::new("size", &[TI, shape(&["XLK", "XL"])], &["30 x 40 mm"]),
    FieldRule::new("size", &[TI, shape(&["ATC"])], &["24 x 38 mm"]),
    FieldRule::new("size", &[TI, shape(&["PTC", "PD"])], &["38 x 38 mm"]),
    FieldRule::new("size", &[TI, shape(&["K2"])], &["40 x 50 mm"]),
    // thickness
    FieldRule::new(
        "thickness",
        &[membrane(&["Pericardium", "Collagen", "d-PTFE"])],
        &["N/A"],
    ),
    FieldRule::new("thickness", &[TI, shape(&["ANL30"])], &["250 um"]),
    FieldRule::new("thickness", &[TI], &["150 um", "250 um"]),
    // serial numbers are only tracked for allografts
    FieldRule::new(
        "sn",
        &[Condition::new("biologic_type", &["Xenograft", "Synthetic"])],
        &["N/A"],
    ),
];

#[cfg(test)]
mod tests {
    use crate::categories::Category;
    use std::collections::HashMap;

    fn values(pairs: &[(&'static str, &'static str)], field: &str) -> Option<Vec<&'static str>> {
        let map: HashMap<&'static str, &'static str> = pairs.iter().copied().collect();
        Category::Membranes
            .schema()
            .allowed_values(field, |f| map.get(f).copied())
            .map(|v| v.to_vec())
    }

    #[test]
    fn test_biologic_type_depends_on_brand() {
        assert_eq!(
            values(&[("brand", "Osteogenics")], "biologic_type"),
            Some(vec!["Xenograft", "Synthetic"])
        );
        assert_eq!(values(&[("brand", "Acme")], "biologic_type"), None);
    }

    #[test]
    fn test_titanium_shape_fixes_size_and_thickness() {
        let anl30 = [("membrane_type", "Ti-reinforced PTFE"), ("shape", "ANL30")];
        assert_eq!(values(&anl30, "size"), Some(vec!["12 x 30 mm"]));
        assert_eq!(values(&anl30, "thickness"), Some(vec!["250 um"]));

        let xl = [("membrane_type", "Ti-reinforced PTFE"), ("shape", "XL")];
        assert_eq!(values(&xl, "thickness"), Some(vec!["150 um", "250 um"]));
    }

    #[test]
    fn test_serial_number_only_for_allografts() {
        assert_eq!(values(&[("biologic_type", "Xenograft")], "sn"), Some(vec!["N/A"]));
        assert_eq!(values(&[("biologic_type", "Allograft")], "sn"), None);
    }
}
