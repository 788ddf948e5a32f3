//! `istock categories` command - Category catalog

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::categories::Category;
use crate::cli::commands::utils::open_project_with_config;
use crate::cli::helpers::escape_csv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::schema::CategorySchema;
use crate::core::status::Thresholds;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct CategoriesArgs {
    /// Show the built-in defaults instead of the project's effective settings
    #[arg(long)]
    pub defaults: bool,
}

#[derive(Serialize)]
struct CategoryInfo {
    category: Category,
    title: &'static str,
    attributes: Vec<&'static str>,
    thresholds: Thresholds,
    merge_on_add: bool,
    file: String,
}

impl CategoryInfo {
    fn new(category: Category, schema: &CategorySchema) -> Self {
        Self {
            category,
            title: schema.title,
            attributes: schema.attributes.iter().map(|a| a.label).collect(),
            thresholds: schema.thresholds,
            merge_on_add: schema.merge_on_add,
            file: schema.file_name.clone(),
        }
    }
}

pub fn run(args: CategoriesArgs, global: &GlobalOpts) -> Result<()> {
    // Outside a project the built-in catalog is still useful
    let config = if args.defaults {
        Config::default()
    } else {
        open_project_with_config(global)
            .map(|(_, config)| config)
            .unwrap_or_else(|_| Config::load_for(None))
    };

    let schemas: Vec<(Category, CategorySchema)> = Category::all()
        .iter()
        .map(|&c| (c, config.schema_for(c)))
        .collect();

    match global.format.resolve(&config) {
        OutputFormat::Json => {
            let infos: Vec<CategoryInfo> = schemas
                .iter()
                .map(|(category, schema)| CategoryInfo::new(*category, schema))
                .collect();
            println!("{}", serde_json::to_string_pretty(&infos).into_diagnostic()?);
        }
        format => {
            let header = [
                "Category",
                "Attributes",
                "Low Qty",
                "Expiry Days",
                "Merge",
                "File",
            ];
            let records: Vec<[String; 6]> = schemas
                .iter()
                .map(|(_, schema)| {
                    let attributes: Vec<&str> =
                        schema.attributes.iter().map(|a| a.label).collect();
                    [
                        schema.slug.to_string(),
                        attributes.join(", "),
                        schema.thresholds.low_quantity.to_string(),
                        schema.thresholds.days_from_expiry.to_string(),
                        if schema.merge_on_add { "yes" } else { "no" }.to_string(),
                        schema.file_name.clone(),
                    ]
                })
                .collect();

            if format == OutputFormat::Csv {
                println!("{}", header.join(","));
                for record in &records {
                    let cells: Vec<String> = record.iter().map(|c| escape_csv(c)).collect();
                    println!("{}", cells.join(","));
                }
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(header);
            for record in records {
                builder.push_record(record);
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
