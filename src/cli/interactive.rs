//! Terminal prompts for cert-convert
//!
//! Password entry, overwrite confirmation and the source/target pickers used
//! by the interactive workflow.

use crate::cert_ops::{Format, Prompter};
use crate::utils::{ConvertError, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Password, Select};
use std::path::{Path, PathBuf};

fn prompt_error(err: dialoguer::Error) -> ConvertError {
    ConvertError::Prompt {
        message: err.to_string(),
    }
}

/// [`Prompter`] backed by the terminal.
///
/// Without a terminal nothing is asked: a needed password surfaces as the
/// password error and an existing output fails unless `assume_yes` is set.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
    interactive: bool,
    assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            theme: ColorfulTheme::default(),
            interactive: console::Term::stderr().is_term(),
            assume_yes,
        }
    }
}

impl Prompter for TerminalPrompter {
    fn password(&mut self, source: &Path, retry: bool) -> Result<Option<String>> {
        if !self.interactive {
            return Err(if retry {
                ConvertError::IncorrectPassword
            } else {
                ConvertError::PasswordRequired
            });
        }

        let name = source.file_name().unwrap_or_default().to_string_lossy();
        let prompt = if retry {
            format!("Incorrect password. Password for {} (empty to cancel)", name)
        } else {
            format!("Password for {} (empty to cancel)", name)
        };

        let pwd = Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)?;

        Ok((!pwd.is_empty()).then_some(pwd))
    }

    fn confirm_overwrite(&mut self, path: &Path) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        if !self.interactive {
            return Err(ConvertError::Prompt {
                message: format!(
                    "Output file {} already exists (use --yes to overwrite)",
                    path.display()
                ),
            });
        }

        Confirm::with_theme(&self.theme)
            .with_prompt(format!(
                "Output file \"{}\" already exists. Overwrite?",
                path.display()
            ))
            .default(false)
            .interact()
            .map_err(prompt_error)
    }
}

/// Pick one of the discovered sources. `None` when the list is empty or the
/// picker is dismissed.
pub fn select_source(sources: &[PathBuf]) -> Result<Option<PathBuf>> {
    if sources.is_empty() {
        return Ok(None);
    }

    let items: Vec<String> = sources
        .iter()
        .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Convert source")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?;

    Ok(selection.map(|i| sources[i].clone()))
}

/// Pick an output format from the allowed targets
pub fn select_target(targets: &[Format]) -> Result<Option<Format>> {
    if targets.is_empty() {
        return Ok(None);
    }

    let items: Vec<&str> = targets.iter().map(|f| f.label()).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Output format")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?;

    Ok(selection.map(|i| targets[i]))
}

/// Ask for the password protecting a new container; empty means none
pub fn prompt_export_password() -> Result<Option<String>> {
    let pwd = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password for the new .pfx (leave empty for none)")
        .with_confirmation("Repeat password", "Passwords do not match")
        .allow_empty_password(true)
        .interact()
        .map_err(prompt_error)?;

    Ok((!pwd.is_empty()).then_some(pwd))
}
