//! `istock list` command - Condensed stock table

use chrono::NaiveDate;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::{Serialize, Serializer};

use crate::categories::Category;
use crate::cli::commands::utils::open_inventory;
use crate::cli::helpers::today;
use crate::cli::table::{group_columns, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::condense::CondensedGroup;
use crate::core::status::StockStatus;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Category to list
    #[arg(value_enum)]
    pub category: Category,

    /// Only rows with any flag raised
    #[arg(long, conflicts_with_all = ["low", "expiring"])]
    pub flagged: bool,

    /// Only rows that are low on stock
    #[arg(long)]
    pub low: bool,

    /// Only rows expiring soon
    #[arg(long)]
    pub expiring: bool,

    /// Print only the number of matching rows
    #[arg(long)]
    pub count: bool,
}

impl ListArgs {
    fn keep(&self, status: &StockStatus) -> bool {
        if self.flagged {
            return status.is_flagged();
        }
        (!self.low || status.low_stock) && (!self.expiring || status.expiring_soon)
    }
}

/// JSON shape of one listed row
#[derive(Serialize)]
struct GroupJson<'a> {
    row: usize,
    #[serde(serialize_with = "attributes_in_order")]
    attributes: Vec<(&'static str, &'a str)>,
    total_qty: u64,
    most_recent_expiry: Option<NaiveDate>,
    most_recent_expiry_qty: u64,
    batches: usize,
    invalid_expiries: usize,
    status: StockStatus,
    status_label: String,
}

/// Attributes as a JSON object keyed in column order
fn attributes_in_order<S: Serializer>(
    attributes: &[(&'static str, &str)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(attributes.iter().copied())
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (config, inventory) = open_inventory(global, args.category)?;
    let schema = inventory.schema();
    let thresholds = schema.thresholds;
    let today = today();

    // Row numbers are positions in the full sorted table, so filtering
    // never renumbers a group.
    let listed: Vec<(usize, CondensedGroup, StockStatus)> = inventory
        .groups()
        .into_iter()
        .enumerate()
        .map(|(idx, group)| {
            let status = group.status(today, &thresholds);
            (idx + 1, group, status)
        })
        .filter(|(_, _, status)| args.keep(status))
        .collect();

    if args.count {
        println!("{}", listed.len());
        return Ok(());
    }

    let format = global.format.resolve(&config);
    if format == OutputFormat::Json {
        let rows: Vec<GroupJson> = listed
            .iter()
            .map(|(row, group, status)| GroupJson {
                row: *row,
                attributes: schema
                    .attributes
                    .iter()
                    .zip(&group.attributes)
                    .map(|(attr, value)| (attr.key, value.as_str()))
                    .collect(),
                total_qty: group.total_qty,
                most_recent_expiry: group.most_recent_expiry,
                most_recent_expiry_qty: group.most_recent_expiry_qty,
                batches: group.batches,
                invalid_expiries: group.invalid_expiries,
                status: *status,
                status_label: status.label(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
        return Ok(());
    }

    if listed.is_empty() {
        if !global.quiet {
            println!(
                "No {} stock{}.",
                schema.item_name,
                if args.flagged || args.low || args.expiring {
                    " matches the filter"
                } else {
                    " recorded"
                }
            );
        }
        return Ok(());
    }

    let rows: Vec<TableRow> = listed
        .iter()
        .map(|(row, group, _)| TableRow::for_group(*row, schema, group, today, &thresholds))
        .collect();

    let columns = group_columns(schema);
    let config = if global.quiet {
        TableConfig::for_pipe()
    } else {
        TableConfig::default()
    };
    TableFormatter::new(&columns, schema.item_name)
        .with_config(config)
        .output(&rows, format);

    if !global.quiet && format != OutputFormat::Csv && format != OutputFormat::Md {
        let invalid: usize = listed.iter().map(|(_, g, _)| g.invalid_expiries).sum();
        if invalid > 0 {
            println!(
                "{} {} batch(es) have an unreadable expiry and are not counted in expiry dates",
                style("!").yellow(),
                invalid
            );
        }
    }

    Ok(())
}
