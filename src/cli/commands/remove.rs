//! `istock remove` command - Take stock out of one row's batches

use console::style;
use miette::Result;

use crate::categories::Category;
use crate::cli::commands::utils::{finish_save, open_inventory, select_row, success};
use crate::cli::helpers::{parse_take, to_index};
use crate::cli::prompt::{confirm, stdin_is_interactive, StockWizard};
use crate::cli::GlobalOpts;
use crate::core::dialog::{Dialog, RemoveFromGroup};
use crate::core::ops::OpError;

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Category of the row
    #[arg(value_enum)]
    pub category: Category,

    /// Row number from `istock list`
    pub row: usize,

    /// Units to take from one batch, e.g. `1=2` (repeatable). Without any,
    /// an amount is prompted for per batch.
    #[arg(long = "take", short = 't', value_name = "BATCH=QTY")]
    pub takes: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut inventory) = open_inventory(global, args.category)?;
    let schema = inventory.schema().clone();
    let selection = select_row(&inventory, args.row)?;
    let members = selection.members;

    let mut amounts = vec![0u32; members.len()];
    let mut given = vec![false; members.len()];
    for arg in &args.takes {
        let (batch, qty) = parse_take(arg).map_err(|e| miette::miette!("{}", e))?;
        let index = to_index(batch)
            .filter(|i| *i < members.len())
            .ok_or_else(|| {
                miette::miette!(
                    "{}",
                    OpError::BatchOutOfRange {
                        batch,
                        available: members.len(),
                    }
                )
            })?;
        if given[index] {
            return Err(miette::miette!(
                "{}: batch {} given more than once",
                OpError::MalformedArgument(arg.clone()),
                batch
            ));
        }
        given[index] = true;
        amounts[index] = qty;
    }

    let interactive = args.takes.is_empty();
    if interactive && !stdin_is_interactive() {
        return Err(miette::miette!(
            "no --take given and stdin is not a terminal; use --take BATCH=QTY"
        ));
    }

    let wizard = StockWizard::new(&schema);
    let mut dialog = Dialog::new(RemoveFromGroup {
        members: members.clone(),
    });

    loop {
        if interactive {
            println!(
                "{} row {} ({})",
                style("Remove from").bold(),
                args.row,
                selection.group.attributes.join(" / ")
            );
            amounts = wizard.removal_amounts(&members)?;
        }

        let (lines, units) = match dialog.submit(amounts.clone()) {
            Ok(plan) => (plan.summary_lines(), plan.total_units()),
            Err(e) if interactive => {
                eprintln!("{} {}", style("✗").red(), e);
                continue;
            }
            Err(e) => return Err(miette::miette!("{}", e)),
        };

        if !global.quiet || !args.yes {
            println!("{} {} unit(s):", style("Remove").bold(), units);
            for line in &lines {
                println!("  {}", line);
            }
        }
        if confirm(args.yes)? {
            break;
        }

        if interactive {
            dialog.reject().map_err(|e| miette::miette!("{}", e))?;
            continue;
        }
        dialog.cancel().map_err(|e| miette::miette!("{}", e))?;
        println!("Aborted.");
        return Ok(());
    }

    let outcome = *dialog
        .accept(inventory.items_mut())
        .map_err(|e| miette::miette!("{}", e))?;
    let saved = inventory.save();

    success(
        global,
        format!(
            "Removed {} {}(s): {} batch(es) reduced, {} batch(es) emptied and deleted",
            outcome.units, schema.item_name, outcome.decremented, outcome.deleted
        ),
    );

    finish_save(saved)
}
