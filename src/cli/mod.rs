//! Command-line interface module
//!
//! This module handles CLI argument parsing using Clap and the terminal
//! prompts the conversion runner asks through.

pub mod args;
pub mod interactive;

pub use args::{
    Cli, Commands, ConvertArgs, InspectArgs, InteractiveArgs, ListArgs, TargetFormat, TargetsArgs,
};
pub use interactive::TerminalPrompter;
