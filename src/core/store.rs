//! Flat-file persistence for one category's line items
//!
//! Each category lives in a CSV file whose header row is the category's
//! attribute labels followed by `REF, LOT, Expiry, Qty`.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::categories::Category;
use crate::core::condense::{sorted_groups, CondensedGroup};
use crate::core::item::LineItem;
use crate::core::ops::{select_group, GroupSelection, OpError};
use crate::core::project::Project;
use crate::core::schema::CategorySchema;
use crate::core::Config;

/// Errors reading or writing a category file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read or write CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Why a row in the file was not loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ColumnCount { expected: usize, found: usize },
    BadQuantity(String),
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ColumnCount { expected, found } => {
                write!(f, "expected {} columns, found {}", expected, found)
            }
            SkipReason::BadQuantity(q) => write!(f, "quantity '{}' is not a whole number", q),
            SkipReason::Unreadable(e) => write!(f, "unreadable row: {}", e),
        }
    }
}

/// A data row that was skipped during load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the file
    pub line: u64,
    pub reason: SkipReason,
}

/// Notes from loading one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// The file did not exist yet; it will be created on save
    pub first_run: bool,
    pub skipped: Vec<SkippedRow>,
}

/// One category's line items bound to their file
#[derive(Debug, Clone)]
pub struct Inventory {
    schema: CategorySchema,
    path: PathBuf,
    items: Vec<LineItem>,
}

impl Inventory {
    /// Empty inventory that will save to `path`
    pub fn new(schema: CategorySchema, path: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            path: path.into(),
            items: Vec::new(),
        }
    }

    /// Load from `path`. A missing file is an empty first-run inventory.
    pub fn load(
        schema: CategorySchema,
        path: impl Into<PathBuf>,
    ) -> Result<(Self, LoadReport), StoreError> {
        let mut inventory = Self::new(schema, path);
        let mut report = LoadReport::default();

        let file = match File::open(&inventory.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %inventory.path.display(), "no inventory file yet");
                report.first_run = true;
                return Ok((inventory, report));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: inventory.path.clone(),
                    source,
                })
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let expected = inventory.schema.column_count();
        for result in rdr.records() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                        return Err(StoreError::Csv {
                            path: inventory.path.clone(),
                            source: e,
                        });
                    }
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    report.skipped.push(SkippedRow {
                        line,
                        reason: SkipReason::Unreadable(e.to_string()),
                    });
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            if inventory.is_header(&record) {
                continue;
            }
            if record.len() != expected {
                report.skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::ColumnCount {
                        expected,
                        found: record.len(),
                    },
                });
                continue;
            }

            match parse_record(&record, inventory.schema.attribute_count()) {
                Ok(item) => inventory.items.push(item),
                Err(reason) => report.skipped.push(SkippedRow { line, reason }),
            }
        }

        for skipped in &report.skipped {
            tracing::warn!(
                path = %inventory.path.display(),
                line = skipped.line,
                reason = %skipped.reason,
                "skipped row"
            );
        }
        tracing::debug!(
            path = %inventory.path.display(),
            items = inventory.items.len(),
            "loaded inventory"
        );

        Ok((inventory, report))
    }

    /// Header detection: first cell is the first attribute label, or the
    /// expiry column says "Expiry" (case-insensitive).
    fn is_header(&self, record: &csv::StringRecord) -> bool {
        let first_label = self
            .schema
            .attributes
            .first()
            .map(|a| a.label)
            .unwrap_or("REF");
        let first_matches = record
            .get(0)
            .map(|c| c.trim().eq_ignore_ascii_case(first_label))
            .unwrap_or(false);
        let expiry_matches = record
            .get(self.schema.attribute_count() + 2)
            .map(|c| c.trim().eq_ignore_ascii_case("expiry"))
            .unwrap_or(false);
        first_matches || expiry_matches
    }

    /// Write every line item, replacing the file
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let csv_err = |source| StoreError::Csv {
            path: self.path.clone(),
            source,
        };

        let mut wtr = csv::Writer::from_path(&self.path).map_err(csv_err)?;
        wtr.write_record(self.schema.header_labels()).map_err(csv_err)?;
        for item in &self.items {
            let qty = item.qty.to_string();
            let row = item
                .attributes
                .iter()
                .map(String::as_str)
                .chain([
                    item.reference.as_str(),
                    item.lot.as_str(),
                    item.expiry.as_str(),
                    qty.as_str(),
                ]);
            wtr.write_record(row).map_err(csv_err)?;
        }
        wtr.flush().map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), items = self.items.len(), "saved inventory");
        Ok(())
    }

    pub fn schema(&self) -> &CategorySchema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<LineItem> {
        &mut self.items
    }

    /// Condensed groups in display order
    pub fn groups(&self) -> Vec<CondensedGroup> {
        sorted_groups(&self.items)
    }

    /// Resolve a zero-based display row to its group and members
    pub fn select(&self, row: usize) -> Result<GroupSelection, OpError> {
        select_group(&self.items, row)
    }

    /// Total units across all line items
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.qty)).sum()
    }
}

fn parse_record(record: &csv::StringRecord, attr_count: usize) -> Result<LineItem, SkipReason> {
    let cell = |i: usize| record.get(i).unwrap_or("").to_string();
    let qty_text = cell(attr_count + 3);
    let qty = qty_text
        .trim()
        .parse::<u32>()
        .map_err(|_| SkipReason::BadQuantity(qty_text.clone()))?;

    Ok(LineItem {
        attributes: (0..attr_count).map(cell).collect(),
        reference: cell(attr_count),
        lot: cell(attr_count + 1),
        expiry: cell(attr_count + 2),
        qty,
    })
}

/// Result of loading one category as part of a full pass
#[derive(Debug)]
pub struct CategoryLoad {
    pub category: Category,
    pub result: Result<(Inventory, LoadReport), StoreError>,
}

/// Load every category independently.
///
/// A failure in one category is recorded for that category only.
pub fn load_all(project: &Project, config: &Config) -> Vec<CategoryLoad> {
    Category::all()
        .iter()
        .map(|&category| {
            let schema = config.schema_for(category);
            let path = project.category_file(&schema, config);
            let result = Inventory::load(schema, path);
            if let Err(e) = &result {
                tracing::error!(category = category.slug(), error = %e, "failed to load category");
            }
            CategoryLoad { category, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn schema() -> CategorySchema {
        Category::CoverScrews.schema()
    }

    #[test]
    fn test_missing_file_is_first_run() {
        let dir = tempdir().unwrap();
        let (inv, report) = Inventory::load(schema(), dir.path().join("none.csv")).unwrap();
        assert!(inv.items().is_empty());
        assert!(report.first_run);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/cover_screws.csv");

        let mut inv = Inventory::new(schema(), &path);
        inv.items_mut().push(LineItem::new(
            vec!["Nobel".into(), "NP".into()],
            "300212",
            "L,1",
            "2027-01-01",
            4,
        ));
        inv.items_mut().push(LineItem::new(
            vec!["Straumann".into(), "RC".into()],
            "048.372",
            "\"quoted\"",
            "2026-06-30",
            0,
        ));
        inv.save().unwrap();

        let (loaded, report) = Inventory::load(schema(), &path).unwrap();
        assert!(!report.first_run);
        assert!(report.skipped.is_empty());
        assert_eq!(loaded.items(), inv.items());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Brand,Platform,REF,LOT,Expiry,Qty"));
    }

    #[test]
    fn test_load_skips_bad_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover_screws.csv");
        fs::write(
            &path,
            "brand,platform,ref,lot,expiry,qty\n\
             Nobel,NP,R1,L1,2027-01-01,3\n\
             Nobel,NP,R2,L2,2027-01-01\n\
             Nobel,NP,R3,L3,2027-01-01,many\n\
             Nobel,NP,R4,L4,2027-01-01,-2\n\
             \n\
             Nobel,RP,R5,L5,bad-date,1\n",
        )
        .unwrap();

        let (inv, report) = Inventory::load(schema(), &path).unwrap();
        assert_eq!(inv.items().len(), 2);
        assert_eq!(inv.items()[1].expiry, "bad-date");

        let reasons: Vec<&SkipReason> = report.skipped.iter().map(|s| &s.reason).collect();
        assert_eq!(reasons.len(), 3);
        assert_eq!(
            reasons[0],
            &SkipReason::ColumnCount {
                expected: 6,
                found: 5
            }
        );
        assert_eq!(reasons[1], &SkipReason::BadQuantity("many".into()));
        assert_eq!(report.skipped[0].line, 3);
    }

    #[test]
    fn test_header_detected_by_expiry_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover_screws.csv");
        fs::write(&path, "Make,Fit,Ref,Lot,EXPIRY,Count\nNobel,NP,R1,L1,2027-01-01,3\n").unwrap();

        let (inv, report) = Inventory::load(schema(), &path).unwrap();
        assert_eq!(inv.items().len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_select_row() {
        let mut inv = Inventory::new(schema(), "unused.csv");
        inv.items_mut().push(LineItem::new(
            vec!["Nobel".into(), "WP".into()],
            "R1",
            "L1",
            "2027-01-01",
            1,
        ));
        inv.items_mut().push(LineItem::new(
            vec!["Nobel".into(), "NP".into()],
            "R2",
            "L2",
            "2027-01-01",
            2,
        ));

        let sel = inv.select(0).unwrap();
        assert_eq!(sel.group.attributes, vec!["Nobel", "NP"]);
        assert_eq!(inv.total_units(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_all_isolates_failures() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let config = Config::default();

        // A directory where the implants file should be cannot be read
        fs::create_dir_all(dir.path().join("Inventory/implants.csv")).unwrap();
        fs::write(
            dir.path().join("Inventory/cover_screws.csv"),
            "Brand,Platform,REF,LOT,Expiry,Qty\nNobel,NP,R1,L1,2027-01-01,3\n",
        )
        .unwrap();

        let loads = load_all(&project, &config);
        assert_eq!(loads.len(), Category::all().len());

        let implants = loads.iter().find(|l| l.category == Category::Implants).unwrap();
        assert!(implants.result.is_err());

        let screws = loads.iter().find(|l| l.category == Category::CoverScrews).unwrap();
        let (inv, _) = screws.result.as_ref().unwrap();
        assert_eq!(inv.total_units(), 3);

        let membranes = loads.iter().find(|l| l.category == Category::Membranes).unwrap();
        assert!(membranes.result.as_ref().unwrap().1.first_run);
    }
}
