//! Built-in product categories
//!
//! Each category is pure data: an ordered attribute list and a set of
//! field rules describing the brand → type → size cascades offered when
//! entering stock.

pub mod abutments;
pub mod cover_screws;
pub mod grafts;
pub mod implants;
pub mod membranes;

use clap::ValueEnum;
use serde::Serialize;

use crate::core::schema::CategorySchema;
use crate::core::status::{Thresholds, DEFAULT_DAYS_FROM_EXPIRY, DEFAULT_LOW_QUANTITY};

/// Brands offered for Nobel/Straumann product lines
pub(crate) const IMPLANT_BRANDS: &[&str] = &["Nobel", "Straumann"];

/// Product categories tracked by the clinic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Implants,
    HealingAbutments,
    TemporaryAbutments,
    BoneGrafts,
    Membranes,
    CoverScrews,
}

impl Category {
    /// Every category, in display order
    pub fn all() -> &'static [Category] {
        &[
            Category::Implants,
            Category::HealingAbutments,
            Category::TemporaryAbutments,
            Category::BoneGrafts,
            Category::Membranes,
            Category::CoverScrews,
        ]
    }

    /// Command-line and config name
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Implants => "implants",
            Category::HealingAbutments => "healing-abutments",
            Category::TemporaryAbutments => "temporary-abutments",
            Category::BoneGrafts => "bone-grafts",
            Category::Membranes => "membranes",
            Category::CoverScrews => "cover-screws",
        }
    }

    /// Built-in schema with default thresholds
    pub fn schema(&self) -> CategorySchema {
        let (title, item_name, attributes, rules) = match self {
            Category::Implants => (
                "Implants",
                "implant",
                implants::ATTRIBUTES,
                implants::RULES,
            ),
            Category::HealingAbutments => (
                "Healing Abutments",
                "healing abutment",
                abutments::HEALING_ATTRIBUTES,
                abutments::HEALING_RULES,
            ),
            Category::TemporaryAbutments => (
                "Temporary Abutments",
                "temporary abutment",
                abutments::TEMPORARY_ATTRIBUTES,
                abutments::TEMPORARY_RULES,
            ),
            Category::BoneGrafts => (
                "Bone Grafts",
                "bone graft",
                grafts::ATTRIBUTES,
                grafts::RULES,
            ),
            Category::Membranes => (
                "Membranes",
                "membrane",
                membranes::ATTRIBUTES,
                membranes::RULES,
            ),
            Category::CoverScrews => (
                "Cover Screws",
                "cover screw",
                cover_screws::ATTRIBUTES,
                cover_screws::RULES,
            ),
        };

        CategorySchema {
            slug: self.slug(),
            title,
            item_name,
            attributes,
            rules,
            file_name: self.default_file_name().to_string(),
            thresholds: Thresholds {
                low_quantity: self.default_low_quantity(),
                days_from_expiry: DEFAULT_DAYS_FROM_EXPIRY,
            },
            merge_on_add: matches!(self, Category::Implants),
        }
    }

    /// File name inside the data directory
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Category::Implants => "implants.csv",
            Category::HealingAbutments => "healing_abutments.csv",
            Category::TemporaryAbutments => "temporary_abutments.csv",
            Category::BoneGrafts => "bone_grafts.csv",
            Category::Membranes => "membranes.csv",
            Category::CoverScrews => "cover_screws.csv",
        }
    }

    /// Implants are reordered at one left; everything else at two
    pub fn default_low_quantity(&self) -> u32 {
        match self {
            Category::Implants => 1,
            _ => DEFAULT_LOW_QUANTITY,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        Category::all()
            .iter()
            .copied()
            .find(|c| c.slug() == normalized)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}
