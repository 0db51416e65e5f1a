//! CLI argument definitions using clap

use crate::cert_ops::Format;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cert-convert")]
#[command(author = "Russ McKendrick")]
#[command(version)]
#[command(
    about = "Convert certificate/key pairs between .pfx containers and .cer/.key files",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (default: config/default.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List convertible source files in a directory
    List(ListArgs),

    /// Show which formats a source can be converted to
    Targets(TargetsArgs),

    /// Show the certificate, chain and key type held by a source
    Inspect(InspectArgs),

    /// Convert a source to another format
    Convert(ConvertArgs),

    /// Pick a source and target format interactively
    Interactive(InteractiveArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Args)]
pub struct TargetsArgs {
    /// Source file (.pfx, .cer or .key)
    #[arg(required = true)]
    pub source: PathBuf,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Source file (.pfx, .cer or .key)
    #[arg(required = true)]
    pub source: PathBuf,

    /// Password for a .pfx source
    #[arg(short, long)]
    pub password: Option<String>,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Source file (.pfx, or either half of a .cer/.key pair)
    #[arg(required = true)]
    pub source: PathBuf,

    /// Target format
    #[arg(long, value_enum)]
    pub to: TargetFormat,

    /// Password for a .pfx source
    #[arg(short, long)]
    pub password: Option<String>,

    /// Password protecting .pfx output (default: empty)
    #[arg(long)]
    pub export_password: Option<String>,

    /// Leave chain certificates out of .pfx output
    #[arg(long)]
    pub no_chain: bool,

    /// Directory for output files (default: the source's directory)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Overwrite existing output files without asking
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct InteractiveArgs {
    /// Directory to pick sources from
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Directory for output files (default: the source's directory)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    /// PKCS#12 container (.pfx)
    Pfx,
    /// DER certificate and PEM key (.cer + .key)
    #[value(name = "cer-key", aliases = ["cer", "key"])]
    CerKey,
}

impl From<TargetFormat> for Format {
    fn from(target: TargetFormat) -> Self {
        match target {
            TargetFormat::Pfx => Format::Pfx,
            TargetFormat::CerKey => Format::CerAndKey,
        }
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetFormat::Pfx => write!(f, "pfx"),
            TargetFormat::CerKey => write!(f, "cer-key"),
        }
    }
}
