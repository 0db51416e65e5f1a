//! Conversion commands

use crate::cert_ops::{discovery, runner, ConvertOutcome, ConvertRequest, ExportOptions, Format};
use crate::cli::interactive::{prompt_export_password, select_source, select_target};
use crate::cli::{ConvertArgs, InteractiveArgs, TerminalPrompter};
use crate::config::Settings;
use console::style;

/// Run the `convert` command
pub fn run_convert(args: &ConvertArgs, settings: &Settings) -> anyhow::Result<()> {
    let request = ConvertRequest {
        source: args.source.clone(),
        target: args.to.into(),
        password: args.password.clone(),
        export: ExportOptions {
            include_chain: settings.conversion.include_chain && !args.no_chain,
            password: args.export_password.clone(),
        },
        output_dir: args.output_dir.clone(),
        max_password_attempts: settings.conversion.max_password_attempts,
    };

    let mut prompter = TerminalPrompter::new(args.yes);
    report_outcome(runner::convert(&request, &mut prompter)?)
}

/// Run the interactive workflow: pick a source, pick a target, convert
pub fn run_interactive(args: &InteractiveArgs, settings: &Settings) -> anyhow::Result<()> {
    let sources = discovery::find_sources(&args.dir, &settings.discovery.extensions)?;
    if sources.is_empty() {
        anyhow::bail!("No convertible files in {}", args.dir.display());
    }

    let Some(source) = select_source(&sources)? else {
        return Ok(());
    };

    let format = runner::source_format(&source)?;
    let Some(target) = select_target(&format.allowed_targets())? else {
        return Ok(());
    };

    let export_password = if target == Format::Pfx {
        prompt_export_password()?
    } else {
        None
    };

    let request = ConvertRequest {
        source,
        target,
        password: None,
        export: ExportOptions {
            include_chain: settings.conversion.include_chain,
            password: export_password,
        },
        output_dir: args.output_dir.clone(),
        max_password_attempts: settings.conversion.max_password_attempts,
    };

    let mut prompter = TerminalPrompter::new(false);
    report_outcome(runner::convert(&request, &mut prompter)?)
}

fn report_outcome(outcome: ConvertOutcome) -> anyhow::Result<()> {
    match outcome {
        ConvertOutcome::Written(paths) => {
            for path in paths {
                println!("  {} Wrote {}", style("✓").green(), path.display());
            }
            Ok(())
        }
        ConvertOutcome::Declined(path) => {
            println!(
                "  {} Kept existing {}; nothing written",
                style("!").yellow(),
                path.display()
            );
            Ok(())
        }
        ConvertOutcome::Cancelled => {
            anyhow::bail!("Unable to read source file(s). Aborting conversion.")
        }
    }
}
