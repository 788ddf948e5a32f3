//! `istock add` command - Record a batch of stock

use console::style;
use miette::Result;

use crate::categories::Category;
use crate::cli::commands::utils::{finish_save, open_inventory, success};
use crate::cli::helpers::parse_assignment;
use crate::cli::prompt::{confirm, stdin_is_interactive, StockWizard};
use crate::cli::GlobalOpts;
use crate::core::dialog::{AddItem, Dialog};
use crate::core::item::LineItem;
use crate::core::ops::AddOutcome;
use crate::core::schema::CategorySchema;
use crate::core::validate::ItemInput;

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Category to add to
    #[arg(value_enum)]
    pub category: Category,

    /// Attribute value, by key or column label (repeatable)
    #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Manufacturer reference code
    #[arg(long = "ref", value_name = "REF")]
    pub reference: Option<String>,

    /// Lot number
    #[arg(long)]
    pub lot: Option<String>,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub expiry: Option<String>,

    /// Quantity received
    #[arg(long)]
    pub qty: Option<String>,

    /// Prompt for every field, even ones given on the command line
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut inventory) = open_inventory(global, args.category)?;
    let schema = inventory.schema().clone();

    let mut input = ItemInput::blank(&schema);
    for arg in &args.set {
        let (field, value) = parse_assignment(&schema, arg).map_err(|e| miette::miette!("{}", e))?;
        input.set(&schema, field, value);
    }
    for (field, value) in [
        ("ref", &args.reference),
        ("lot", &args.lot),
        ("expiry", &args.expiry),
        ("qty", &args.qty),
    ] {
        if let Some(value) = value {
            input.set(&schema, field, value.as_str());
        }
    }

    let incomplete = schema.field_names().into_iter().any(|field| {
        input
            .get(&schema, field)
            .map(|v| v.trim().is_empty())
            .unwrap_or(true)
    });
    let interactive = args.interactive || (incomplete && stdin_is_interactive());

    let wizard = StockWizard::new(&schema);
    let mut dialog = Dialog::new(AddItem { schema: &schema });

    loop {
        if interactive {
            wizard.fill_item(&mut input)?;
        }

        let item = match dialog.submit(input.clone()) {
            Ok(item) => item.clone(),
            Err(e) if interactive => {
                eprintln!("{} {}", style("✗").red(), e);
                continue;
            }
            Err(e) => return Err(miette::miette!("{}", e)),
        };

        if !global.quiet || !args.yes {
            print_preview(&schema, &item, inventory.items());
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

    match outcome {
        AddOutcome::Appended => success(
            global,
            format!(
                "Added {} to {}",
                schema.item_name,
                style(inventory.path().display()).cyan()
            ),
        ),
        AddOutcome::Merged { new_qty } => success(
            global,
            format!(
                "Merged into existing {} batch, quantity now {}",
                schema.item_name,
                style(new_qty).yellow()
            ),
        ),
    }

    finish_save(saved)
}

fn print_preview(schema: &CategorySchema, item: &LineItem, existing: &[LineItem]) {
    println!("{} {}:", style("Add").bold(), schema.item_name);
    for field in schema.field_names() {
        let label = schema.label_for(field).unwrap_or(field);
        let value = item.field(schema, field).unwrap_or_default();
        println!("  {}: {}", style(label).cyan(), value);
    }

    if schema.merge_on_add {
        let identity = item.identity();
        if let Some(current) = existing.iter().find(|i| i.matches(&identity)) {
            println!(
                "{} Same batch already in stock; quantity {} → {}",
                style("•").dim(),
                current.qty,
                current.qty.saturating_add(item.qty)
            );
        }
    }
}
