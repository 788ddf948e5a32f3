//! Shared utilities for CLI commands

use console::style;
use miette::Result;

use crate::categories::Category;
use crate::cli::GlobalOpts;
use crate::cli::helpers::to_index;
use crate::core::ops::{GroupSelection, OpError};
use crate::core::project::Project;
use crate::core::store::{Inventory, LoadReport, StoreError};
use crate::core::Config;

/// Find the project, honoring `--project`
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Project plus its effective configuration
pub fn open_project_with_config(global: &GlobalOpts) -> Result<(Project, Config)> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    for slug in config.unknown_categories() {
        tracing::warn!(category = slug, "config names an unknown category");
    }
    Ok((project, config))
}

/// Load one category's inventory, reporting skipped rows
pub fn open_inventory(global: &GlobalOpts, category: Category) -> Result<(Config, Inventory)> {
    let (project, config) = open_project_with_config(global)?;
    let schema = config.schema_for(category);
    let path = project.category_file(&schema, &config);
    let (inventory, report) =
        Inventory::load(schema, path).map_err(|e| miette::miette!("{}", e))?;
    print_load_report(category, &inventory, &report, global.quiet);
    Ok((config, inventory))
}

/// Warn about rows that could not be loaded
pub fn print_load_report(category: Category, inventory: &Inventory, report: &LoadReport, quiet: bool) {
    if report.first_run && !quiet {
        eprintln!(
            "{} No {} file yet; it will be created at {}",
            style("•").dim(),
            category,
            style(inventory.path().display()).cyan()
        );
    }
    for skipped in &report.skipped {
        eprintln!(
            "{} {} line {}: {} (row ignored)",
            style("!").yellow(),
            inventory.path().display(),
            skipped.line,
            skipped.reason
        );
    }
}

/// Turn the result of a save into the command's exit status.
///
/// The in-memory change has already been reported, so a failure here is a
/// warning that the file on disk is now stale.
pub fn finish_save(result: std::result::Result<(), StoreError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!(
                "{} Changes were applied but could not be saved",
                style("!").yellow()
            );
            Err(miette::miette!("{}", e))
        }
    }
}

/// Print a success line unless quiet
pub fn success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Resolve a 1-based row number from `istock list`
pub fn select_row(inventory: &Inventory, row: usize) -> Result<GroupSelection> {
    to_index(row)
        .ok_or_else(|| OpError::RowOutOfRange {
            row,
            available: inventory.groups().len(),
        })
        .and_then(|index| inventory.select(index))
        .map_err(|e| miette::miette!("{}", e))
}
