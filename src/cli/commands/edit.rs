//! `istock edit` command - Edit the batches behind one row

use console::style;
use miette::Result;

use crate::categories::Category;
use crate::cli::commands::utils::{finish_save, open_inventory, select_row, success};
use crate::cli::helpers::{parse_change, to_index};
use crate::cli::prompt::{confirm, stdin_is_interactive, StockWizard};
use crate::cli::GlobalOpts;
use crate::core::dialog::{Dialog, EditGroup};
use crate::core::ops::OpError;
use crate::core::validate::ItemInput;

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Category of the row
    #[arg(value_enum)]
    pub category: Category,

    /// Row number from `istock list`
    pub row: usize,

    /// New value for one batch's field, e.g. `2:qty=5` or `1:expiry=2027-01-31`
    /// (repeatable). Without any, every field of every batch is prompted for.
    #[arg(long = "change", short = 'c', value_name = "BATCH:FIELD=VALUE")]
    pub changes: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut inventory) = open_inventory(global, args.category)?;
    let schema = inventory.schema().clone();
    let selection = select_row(&inventory, args.row)?;
    let members = selection.members;

    let mut inputs: Vec<ItemInput> = members.iter().map(ItemInput::from_item).collect();
    for arg in &args.changes {
        let change = parse_change(&schema, arg).map_err(|e| miette::miette!("{}", e))?;
        let available = inputs.len();
        let input = to_index(change.batch)
            .and_then(|i| inputs.get_mut(i))
            .ok_or_else(|| {
                miette::miette!(
                    "{}",
                    OpError::BatchOutOfRange {
                        batch: change.batch,
                        available,
                    }
                )
            })?;
        input.set(&schema, change.field, change.value);
    }

    let interactive = args.changes.is_empty();
    if interactive && !stdin_is_interactive() {
        return Err(miette::miette!(
            "no --change given and stdin is not a terminal; use --change BATCH:FIELD=VALUE"
        ));
    }

    let wizard = StockWizard::new(&schema);
    let mut dialog = Dialog::new(EditGroup {
        schema: &schema,
        members,
    });

    loop {
        if interactive {
            for (i, input) in inputs.iter_mut().enumerate() {
                println!("{}", style(format!("Batch {}", i + 1)).bold());
                wizard.fill_item(input)?;
            }
        }

        let lines = match dialog.submit(inputs.clone()) {
            Ok(plan) => plan.diff_lines(&schema),
            Err(OpError::NothingToEdit) if interactive => {
                println!("No changes made.");
                return Ok(());
            }
            Err(e) if interactive => {
                eprintln!("{} {}", style("✗").red(), e);
                continue;
            }
            Err(e) => return Err(miette::miette!("{}", e)),
        };

        if !global.quiet || !args.yes {
            println!("{} row {}:", style("Edit").bold(), args.row);
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

    let applied = *dialog
        .accept(inventory.items_mut())
        .map_err(|e| miette::miette!("{}", e))?;
    let saved = inventory.save();

    success(
        global,
        format!("Updated {} {} batch(es)", applied, schema.item_name),
    );

    finish_save(saved)
}
