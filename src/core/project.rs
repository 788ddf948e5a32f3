//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::schema::CategorySchema;
use crate::core::Config;

/// Name of the marker directory holding project configuration
pub const MARKER_DIR: &str = ".istock";

/// Default directory for category files, relative to the project root
pub const DEFAULT_DATA_DIR: &str = "Inventory";

/// Represents an inventory project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .istock/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(MARKER_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(MARKER_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::write_structure(root)
    }

    /// Initialize even if .istock/ exists, resetting its config.
    /// Existing inventory files are left alone.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_structure(root)
    }

    fn write_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let marker = root.join(MARKER_DIR);
        std::fs::create_dir_all(&marker).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(marker.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::create_dir_all(root.join(DEFAULT_DATA_DIR))
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Implant stock configuration

# Directory holding the category CSV files, relative to the project root
# data_dir: Inventory

# Batches expiring within this many days are flagged
# days_from_expiry: 180

# Default output format (auto, tsv, csv, md, json)
# default_format: auto

# Per-category overrides
# categories:
#   implants:
#     low_quantity: 1
#     merge_on_add: true
#   membranes:
#     low_quantity: 3
#     file: membranes.csv
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .istock configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    /// Directory holding the category files
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        let dir = config.data_dir.as_deref().unwrap_or(Path::new(DEFAULT_DATA_DIR));
        self.root.join(dir)
    }

    /// Path of the CSV file backing a category
    pub fn category_file(&self, schema: &CategorySchema, config: &Config) -> PathBuf {
        self.data_dir(config).join(&schema.file_name)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an inventory project (searched from {searched_from:?}). Run 'istock init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("inventory project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Category;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.config_dir().join("config.yaml").exists());
        assert!(project.root().join("Inventory").is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));

        // --force keeps stock files
        let stock = tmp.path().join("Inventory/implants.csv");
        std::fs::write(&stock, "x").unwrap();
        Project::init_force(tmp.path()).unwrap();
        assert!(stock.exists());
    }

    #[test]
    fn test_project_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("Inventory/archive/2026");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_category_file_honors_data_dir() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let schema = Category::BoneGrafts.schema();

        let default = Config::default();
        assert_eq!(
            project.category_file(&schema, &default),
            project.root().join("Inventory/bone_grafts.csv")
        );

        let custom = Config {
            data_dir: Some(PathBuf::from("stock")),
            ..Config::default()
        };
        assert_eq!(
            project.category_file(&schema, &custom),
            project.root().join("stock/bone_grafts.csv")
        );
    }
}
