//! Source discovery and target listing commands

use crate::cert_ops::{discovery, runner};
use crate::cli::{ListArgs, TargetsArgs};
use crate::config::Settings;
use console::style;

/// Run the `list` command
pub fn run_list(args: &ListArgs, settings: &Settings) -> anyhow::Result<()> {
    let sources = discovery::find_sources(&args.dir, &settings.discovery.extensions)?;

    if sources.is_empty() {
        println!(
            "  {} No convertible files in {}",
            style("!").yellow(),
            args.dir.display()
        );
        return Ok(());
    }

    for source in sources {
        println!(
            "  {}",
            source.file_name().unwrap_or_default().to_string_lossy()
        );
    }
    Ok(())
}

/// Run the `targets` command
pub fn run_targets(args: &TargetsArgs) -> anyhow::Result<()> {
    let format = runner::source_format(&args.source)?;

    println!(
        "  {} {}",
        style("Source format:").bold(),
        style(format.label()).cyan()
    );
    for target in format.allowed_targets() {
        println!("  {} {}", style("→").green(), target.label());
    }
    Ok(())
}
