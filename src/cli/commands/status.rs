//! `istock status` command - Stock dashboard across every category

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::categories::Category;
use crate::cli::commands::utils::open_project_with_config;
use crate::cli::helpers::today;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::{load_all, CategoryLoad};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Also list every flagged row
    #[arg(long)]
    pub detailed: bool,
}

/// A flagged row, addressed the same way `istock list` numbers it
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
struct FlaggedRow {
    row: usize,
    attributes: Vec<String>,
    total_qty: u64,
    status: String,
}

#[derive(Serialize, Debug, Default)]
struct CategoryMetrics {
    category: Option<Category>,
    groups: usize,
    batches: usize,
    units: u64,
    low_stock: usize,
    expiring_soon: usize,
    skipped_rows: usize,
    invalid_expiries: usize,
    first_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    flagged: Vec<FlaggedRow>,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project_with_config(global)?;
    let today = today();

    let metrics: Vec<CategoryMetrics> = load_all(&project, &config)
        .into_iter()
        .map(|load| collect_metrics(load, today, args.detailed))
        .collect();

    match global.format.resolve(&config) {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "date": today,
                "data_dir": project.data_dir(&config),
                "categories": metrics,
            });
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
        }
        format => {
            let mut builder = Builder::default();
            builder.push_record([
                "Category",
                "Groups",
                "Units",
                "Low Stock",
                "Expiring Soon",
                "Notes",
            ]);
            for m in &metrics {
                builder.push_record([
                    m.category.map(|c| c.to_string()).unwrap_or_default(),
                    m.groups.to_string(),
                    m.units.to_string(),
                    m.low_stock.to_string(),
                    m.expiring_soon.to_string(),
                    notes(m),
                ]);
            }
            let table = if format == OutputFormat::Md {
                builder.build().with(Style::markdown()).to_string()
            } else {
                builder.build().with(Style::rounded()).to_string()
            };

            if !global.quiet {
                println!(
                    "{} {}",
                    style("Stock Status").bold().underlined(),
                    style(today).dim()
                );
                println!();
            }
            println!("{}", table);

            if args.detailed {
                for m in metrics.iter().filter(|m| !m.flagged.is_empty()) {
                    let category = m.category.map(|c| c.to_string()).unwrap_or_default();
                    println!();
                    println!("{}", style(&category).bold());
                    for row in &m.flagged {
                        println!(
                            "  {:>3}  {}  qty {}  {}",
                            style(row.row).cyan(),
                            row.attributes.join(" / "),
                            row.total_qty,
                            style(&row.status).yellow()
                        );
                    }
                }
            }

            if !global.quiet {
                let flagged: usize = metrics.iter().map(|m| m.low_stock + m.expiring_soon).sum();
                println!();
                if flagged == 0 {
                    println!("{} Nothing to reorder", style("✓").green());
                } else {
                    println!(
                        "{} {} flag(s) raised. Use {} to see them.",
                        style("!").yellow(),
                        flagged,
                        style("istock list <category> --flagged").yellow()
                    );
                }
            }
        }
    }

    Ok(())
}

fn collect_metrics(load: CategoryLoad, today: chrono::NaiveDate, detailed: bool) -> CategoryMetrics {
    let mut metrics = CategoryMetrics {
        category: Some(load.category),
        ..Default::default()
    };

    let (inventory, report) = match load.result {
        Ok(loaded) => loaded,
        Err(e) => {
            metrics.error = Some(e.to_string());
            return metrics;
        }
    };

    let thresholds = inventory.schema().thresholds;
    let groups = inventory.groups();
    metrics.groups = groups.len();
    metrics.batches = inventory.items().len();
    metrics.units = inventory.total_units();
    metrics.skipped_rows = report.skipped.len();
    metrics.first_run = report.first_run;

    for (idx, group) in groups.iter().enumerate() {
        let status = group.status(today, &thresholds);
        if status.low_stock {
            metrics.low_stock += 1;
        }
        if status.expiring_soon {
            metrics.expiring_soon += 1;
        }
        metrics.invalid_expiries += group.invalid_expiries;
        if detailed && status.is_flagged() {
            metrics.flagged.push(FlaggedRow {
                row: idx + 1,
                attributes: group.attributes.clone(),
                total_qty: group.total_qty,
                status: status.label(),
            });
        }
    }

    metrics
}

fn notes(metrics: &CategoryMetrics) -> String {
    if let Some(error) = &metrics.error {
        return format!("failed to load: {}", error);
    }
    let mut notes = Vec::new();
    if metrics.first_run {
        notes.push("no file yet".to_string());
    }
    if metrics.skipped_rows > 0 {
        notes.push(format!("{} row(s) skipped", metrics.skipped_rows));
    }
    if metrics.invalid_expiries > 0 {
        notes.push(format!("{} unreadable expiry", metrics.invalid_expiries));
    }
    notes.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::LineItem;
    use crate::core::store::{Inventory, LoadReport};
    use chrono::NaiveDate;

    fn load(items: Vec<LineItem>) -> CategoryLoad {
        let mut inventory = Inventory::new(Category::CoverScrews.schema(), "cover_screws.csv");
        inventory.items_mut().extend(items);
        CategoryLoad {
            category: Category::CoverScrews,
            result: Ok((inventory, LoadReport::default())),
        }
    }

    #[test]
    fn test_metrics_count_flags() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let items = vec![
            LineItem::new(vec!["Nobel".into(), "NP".into()], "R1", "L1", "2030-01-01", 10),
            LineItem::new(vec!["Nobel".into(), "RP".into()], "R2", "L2", "2026-12-01", 1),
            LineItem::new(vec!["Nobel".into(), "WP".into()], "R3", "L3", "someday", 4),
        ];

        let m = collect_metrics(load(items), today, true);
        assert_eq!(m.groups, 3);
        assert_eq!(m.units, 15);
        assert_eq!(m.low_stock, 1);
        assert_eq!(m.expiring_soon, 1);
        assert_eq!(m.invalid_expiries, 1);
        assert_eq!(m.flagged.len(), 1);
        assert_eq!(m.flagged[0].row, 2);
        assert_eq!(m.flagged[0].status, "Low Stock, Expiring Soon");
        assert_eq!(notes(&m), "1 unreadable expiry");
    }
}
