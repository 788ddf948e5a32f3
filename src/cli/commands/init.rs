//! `istock init` command - Initialize a new stock project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::categories::Category;
use crate::core::project::{Project, ProjectError, DEFAULT_DATA_DIR, MARKER_DIR};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the project config even if .istock/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized stock project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            print_structure(project.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Record a delivery",
                style("istock add implants").yellow()
            );
            println!(
                "  {} See condensed stock",
                style("istock list implants").yellow()
            );
            println!(
                "  {} Check for low or expiring stock",
                style("istock status").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Stock project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("istock init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    println!("  📁 {}", style(format!("{}/", MARKER_DIR)).dim());
    println!("  📄 {}", style(format!("{}/config.yaml", MARKER_DIR)).dim());
    println!("  📁 {}", style(format!("{}/", DEFAULT_DATA_DIR)).dim());

    for category in Category::all() {
        let file = Path::new(DEFAULT_DATA_DIR).join(category.default_file_name());
        if root.join(&file).exists() {
            println!("  📄 {}", style(file.display()).dim());
        }
    }
}
