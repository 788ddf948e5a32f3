//! `istock config` command - Configuration inspection

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::categories::Category;
use crate::cli::commands::utils::open_project;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::{ENV_DATA_DIR, ENV_EXPIRY_DAYS};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show,

    /// Show paths to configuration files
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global).ok();
    let config = Config::load_for(project.as_ref());

    if global.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&config).into_diagnostic()?);
        return Ok(());
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    let data_dir = match &project {
        Some(project) => project.data_dir(&config).display().to_string(),
        None => config
            .data_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(no project)".to_string()),
    };
    print_config_value("data_dir", Some(&data_dir));
    print_config_value(
        "days_from_expiry",
        config.days_from_expiry.map(|d| d.to_string()).as_deref(),
    );
    print_config_value("default_format", config.default_format.as_deref());

    println!();
    println!("{}", style("Categories").bold());
    for &category in Category::all() {
        let schema = config.schema_for(category);
        println!(
            "  {}: low_quantity {}, days_from_expiry {}, merge_on_add {}, file {}",
            style(category).cyan(),
            style(schema.thresholds.low_quantity).yellow(),
            style(schema.thresholds.days_from_expiry).yellow(),
            style(schema.merge_on_add).yellow(),
            style(&schema.file_name).yellow()
        );
    }
    for slug in config.unknown_categories() {
        println!(
            "  {} {} is not a known category and is ignored",
            style("!").yellow(),
            slug
        );
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  {}", style(format!("1. Environment ({}, {})", ENV_DATA_DIR, ENV_EXPIRY_DAYS)).dim());
    if let Some(project) = &project {
        println!(
            "  {}",
            style(format!("2. Project: {}", project.config_dir().join("config.yaml").display())).dim()
        );
    }
    if let Some(global_path) = Config::global_config_path() {
        println!("  {}", style(format!("3. Global: {}", global_path.display())).dim());
    }
    println!("  {}", style("4. Built-in defaults").dim());

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global).ok();

    println!("{}", style("Configuration file paths:").bold());
    println!();
    if let Some(global_path) = Config::global_config_path() {
        print_path("Global:", &global_path);
    }
    match &project {
        Some(project) => print_path("Project:", &project.config_dir().join("config.yaml")),
        None => println!("  {} {}", style("Project:").cyan(), style("(not in a project)").dim()),
    }

    Ok(())
}

fn print_path(label: &str, path: &Path) {
    println!("  {} {}", style(label).cyan(), path.display());
    if path.exists() {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}
