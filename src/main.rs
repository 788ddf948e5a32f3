use clap::Parser;
use istock::cli::{Cli, Commands};
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => istock::cli::commands::init::run(args),
        Commands::Categories(args) => istock::cli::commands::categories::run(args, &global),
        Commands::List(args) => istock::cli::commands::list::run(args, &global),
        Commands::Show(args) => istock::cli::commands::show::run(args, &global),
        Commands::Add(args) => istock::cli::commands::add::run(args, &global),
        Commands::Edit(args) => istock::cli::commands::edit::run(args, &global),
        Commands::Remove(args) => istock::cli::commands::remove::run(args, &global),
        Commands::Status(args) => istock::cli::commands::status::run(args, &global),
        Commands::Config(cmd) => istock::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => istock::cli::commands::completions::run(args),
    }
}

/// Log to stderr; RUST_LOG wins over --verbose
fn init_tracing(verbose: bool) {
    let default = if verbose { "istock=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
