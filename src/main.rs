//! cert-convert - repackage certificate/key pairs
//!
//! Converts between PKCS#12 containers (.pfx) and split .cer/.key files.

use cert_convert::cli::{Cli, Commands};
use cert_convert::{commands, config};
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Handle color preference
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let settings = config::load_settings(cli.config.as_deref())?;

    match &cli.command {
        Commands::List(args) => commands::run_list(args, &settings),
        Commands::Targets(args) => commands::run_targets(args),
        Commands::Inspect(args) => commands::run_inspect(args, &settings),
        Commands::Convert(args) => commands::run_convert(args, &settings),
        Commands::Interactive(args) => commands::run_interactive(args, &settings),
    }
}
