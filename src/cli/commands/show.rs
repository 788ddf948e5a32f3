//! `istock show` command - Batches behind one row

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::categories::Category;
use crate::cli::commands::utils::{open_inventory, select_row};
use crate::cli::helpers::{escape_csv, today};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::item::LineItem;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Category of the row
    #[arg(value_enum)]
    pub category: Category,

    /// Row number from `istock list`
    pub row: usize,
}

#[derive(Serialize)]
struct BatchJson<'a> {
    batch: usize,
    #[serde(flatten)]
    item: &'a LineItem,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (config, inventory) = open_inventory(global, args.category)?;
    let schema = inventory.schema();

    let selection = select_row(&inventory, args.row)?;
    let group = &selection.group;
    let status = group.status(today(), &schema.thresholds);

    match global.format.resolve(&config) {
        OutputFormat::Json => {
            let batches: Vec<BatchJson> = selection
                .members
                .iter()
                .enumerate()
                .map(|(i, item)| BatchJson {
                    batch: i + 1,
                    item,
                })
                .collect();
            let json = serde_json::json!({
                "row": args.row,
                "category": args.category,
                "group": group,
                "status": status,
                "status_label": status.label(),
                "batches": batches,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("batch,REF,LOT,Expiry,Qty");
            for (i, item) in selection.members.iter().enumerate() {
                println!(
                    "{},{},{},{},{}",
                    i + 1,
                    escape_csv(&item.reference),
                    escape_csv(&item.lot),
                    escape_csv(&item.expiry),
                    item.qty
                );
            }
        }
        format => {
            println!(
                "{} {}",
                style(format!("Row {}", args.row)).bold(),
                style(schema.title).dim()
            );
            for (attr, value) in schema.attributes.iter().zip(&group.attributes) {
                println!("  {}: {}", style(attr.label).cyan(), value);
            }
            println!(
                "  {}: {}",
                style("Total Qty").cyan(),
                style(group.total_qty).yellow()
            );
            if status.is_flagged() {
                println!("  {}: {}", style("Status").cyan(), style(status.label()).red());
            }
            println!();

            let mut builder = Builder::default();
            builder.push_record(["Batch", "REF", "LOT", "Expiry", "Qty"]);
            for (i, item) in selection.members.iter().enumerate() {
                let expiry = if item.expiry_date().is_some() {
                    item.expiry.clone()
                } else {
                    format!("{} (unreadable)", item.expiry)
                };
                builder.push_record([
                    (i + 1).to_string(),
                    item.reference.clone(),
                    item.lot.clone(),
                    expiry,
                    item.qty.to_string(),
                ]);
            }
            let table = if format == OutputFormat::Md {
                builder.build().with(Style::markdown()).to_string()
            } else {
                builder.build().with(Style::rounded()).to_string()
            };
            println!("{}", table);
        }
    }

    Ok(())
}

