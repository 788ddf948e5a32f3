//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    add::AddArgs, categories::CategoriesArgs, completions::CompletionsArgs,
    config::ConfigCommands, edit::EditArgs, init::InitArgs, list::ListArgs, remove::RemoveArgs,
    show::ShowArgs, status::StatusArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "istock")]
#[command(author, version, about = "Dental implant clinic stock tracker")]
#[command(long_about = "Track implants, abutments, grafts, membranes and cover screws as plain CSV files, \
one file per category, condensed into one row per product variant.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .istock/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new stock project
    Init(InitArgs),

    /// List the product categories and their settings
    Categories(CategoriesArgs),

    /// Condensed stock table for one category
    List(ListArgs),

    /// Batches behind one row of the stock table
    Show(ShowArgs),

    /// Add a batch of stock
    Add(AddArgs),

    /// Edit the batches behind one row
    Edit(EditArgs),

    /// Take stock out of the batches behind one row
    Remove(RemoveArgs),

    /// Stock dashboard across every category
    Status(StatusArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Use the configured default, else an aligned table
    #[default]
    Auto,
    /// Aligned columns (for terminals and piping)
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// JSON format (for programming)
    Json,
}

impl OutputFormat {
    /// Replace `Auto` with the configured default format, if any
    pub fn resolve(self, config: &Config) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        config
            .default_format
            .as_deref()
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resolves_from_config() {
        let config = Config {
            default_format: Some("md".to_string()),
            ..Config::default()
        };
        assert_eq!(OutputFormat::Auto.resolve(&config), OutputFormat::Md);
        assert_eq!(OutputFormat::Csv.resolve(&config), OutputFormat::Csv);

        let bogus = Config {
            default_format: Some("yaml".to_string()),
            ..Config::default()
        };
        assert_eq!(OutputFormat::Auto.resolve(&bogus), OutputFormat::Auto);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
