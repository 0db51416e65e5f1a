//! Bundle inspection command

use crate::cert_ops::runner;
use crate::cli::{InspectArgs, TerminalPrompter};
use crate::config::Settings;
use crate::models::{BundleSummary, CertificateSummary};
use chrono::Utc;
use console::style;

/// Run the `inspect` command
pub fn run_inspect(args: &InspectArgs, settings: &Settings) -> anyhow::Result<()> {
    let format = runner::source_format(&args.source)?;
    let mut prompter = TerminalPrompter::new(false);

    let Some(bundle) = runner::read_bundle(
        &args.source,
        args.password.clone(),
        settings.conversion.max_password_attempts,
        &mut prompter,
    )?
    else {
        anyhow::bail!("Unable to read source file(s). Aborting.");
    };

    let summary = BundleSummary::new(format.label(), &bundle);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", style("Certificate Details").bold().underlined());
    println!("  {:<16} {}", "Format:", summary.format);
    println!(
        "  {:<16} {}",
        "Friendly name:",
        summary.friendly_name.as_deref().unwrap_or("-")
    );
    println!("  {:<16} {}", "Key:", summary.key_algorithm);
    print_certificate(&summary.certificate);

    let validity = if summary.is_current(Utc::now()) {
        style("valid now").green()
    } else {
        style("not currently valid").red()
    };
    println!("  {:<16} {}", "Status:", validity);

    if !summary.chain.is_empty() {
        println!();
        println!(
            "{} ({})",
            style("Chain").bold().underlined(),
            summary.chain.len()
        );
        for cert in &summary.chain {
            print_certificate(cert);
            println!();
        }
    }
    Ok(())
}

fn print_certificate(cert: &CertificateSummary) {
    println!("  {:<16} {}", "Subject:", cert.subject);
    println!("  {:<16} {}", "Issuer:", cert.issuer);
    println!("  {:<16} {}", "Serial:", cert.serial);
    println!(
        "  {:<16} {}",
        "Valid from:",
        cert.not_before.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  {:<16} {}",
        "Valid until:",
        cert.not_after.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  {:<16} {}", "Public key:", cert.public_key_algorithm);
    println!("  {:<16} {}", "SHA-256:", cert.sha256_fingerprint);
}
