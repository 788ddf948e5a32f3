//! Configuration management with layered hierarchy
//!
//! Sources, lowest to highest priority: built-in defaults, the global
//! user config, the project's `.istock/config.yaml`, then environment
//! variables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::categories::Category;
use crate::core::schema::CategorySchema;
use crate::core::Project;

/// Overrides the data directory
pub const ENV_DATA_DIR: &str = "ISTOCK_DATA_DIR";
/// Overrides the expiry window for every category
pub const ENV_EXPIRY_DAYS: &str = "ISTOCK_EXPIRY_DAYS";

/// Per-category settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CategoryOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_quantity: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_on_add: Option<bool>,

    /// File name inside the data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl CategoryOverride {
    fn merge(&mut self, other: CategoryOverride) {
        if other.low_quantity.is_some() {
            self.low_quantity = other.low_quantity;
        }
        if other.merge_on_add.is_some() {
            self.merge_on_add = other.merge_on_add;
        }
        if other.file.is_some() {
            self.file = other.file;
        }
    }
}

/// Inventory configuration with layered hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding category files, relative to the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Days before expiry at which a group is flagged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_from_expiry: Option<i64>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Keyed by category slug
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, CategoryOverride>,
}

impl Config {
    /// Load configuration for a known project (or none)
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/istock/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // Project config (.istock/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "istock")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read config");
                return None;
            }
        };
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                None
            }
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(days) = lookup(ENV_EXPIRY_DAYS) {
            match days.trim().parse::<i64>() {
                Ok(days) => self.days_from_expiry = Some(days),
                Err(_) => tracing::warn!(value = %days, "ignoring non-numeric {}", ENV_EXPIRY_DAYS),
            }
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.days_from_expiry.is_some() {
            self.days_from_expiry = other.days_from_expiry;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        for (slug, category) in other.categories {
            self.categories.entry(slug).or_default().merge(category);
        }
    }

    /// The category's built-in schema with configured thresholds applied
    pub fn schema_for(&self, category: Category) -> CategorySchema {
        let mut schema = category.schema();

        if let Some(days) = self.days_from_expiry {
            schema.thresholds.days_from_expiry = days;
        }

        if let Some(over) = self.categories.get(category.slug()) {
            if let Some(low) = over.low_quantity {
                schema.thresholds.low_quantity = low;
            }
            if let Some(merge) = over.merge_on_add {
                schema.merge_on_add = merge;
            }
            if let Some(file) = &over.file {
                schema.file_name = file.clone();
            }
        }

        schema
    }

    /// Config keys that do not name a known category
    pub fn unknown_categories(&self) -> Vec<&str> {
        self.categories
            .keys()
            .filter(|slug| slug.parse::<Category>().is_err())
            .map(String::as_str)
            .collect()
    }
}
