//! Runner for a single conversion
//!
//! Reads the source through its registry format, asking again for a
//! password while the container refuses the one it was given, encodes the
//! target format, and writes the output files only once every overwrite has
//! been confirmed.

use crate::cert_ops::bundle::Bundle;
use crate::cert_ops::registry::{source_stem, ExportOptions, Format};
use crate::utils::{ConvertError, Result};
use std::path::{Path, PathBuf};

/// Interactive collaborators a conversion needs
pub trait Prompter {
    /// Ask for the container password of `source`. `retry` is set after an
    /// incorrect password. `Ok(None)` cancels the conversion.
    fn password(&mut self, source: &Path, retry: bool) -> Result<Option<String>>;

    /// Confirm replacing the existing file at `path`
    fn confirm_overwrite(&mut self, path: &Path) -> Result<bool>;
}

/// Parameters for [`convert`]
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub target: Format,
    /// Password tried before any prompt
    pub password: Option<String>,
    pub export: ExportOptions,
    /// Defaults to the source's directory
    pub output_dir: Option<PathBuf>,
    /// Maximum number of password prompts; `None` keeps asking
    pub max_password_attempts: Option<u32>,
}

/// How a conversion ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// All output files were written
    Written(Vec<PathBuf>),
    /// The password prompt was cancelled; nothing was written
    Cancelled,
    /// Overwriting this existing file was declined; nothing was written
    Declined(PathBuf),
}

/// Find the format that reads `source`
pub fn source_format(source: &Path) -> Result<Format> {
    Format::match_source(source).ok_or_else(|| ConvertError::UnsupportedSource {
        path: source.display().to_string(),
    })
}

/// Read `source`, prompting for a password as long as the container needs
/// one. Returns `Ok(None)` when the prompt is cancelled.
pub fn read_bundle(
    source: &Path,
    password: Option<String>,
    max_password_attempts: Option<u32>,
    prompter: &mut dyn Prompter,
) -> Result<Option<Bundle>> {
    let format = source_format(source)?;
    let mut password = password;
    let mut prompts = 0u32;

    loop {
        match format.read(source, password.as_deref()) {
            Ok(bundle) => return Ok(Some(bundle)),
            Err(e) if e.needs_password() => {
                if max_password_attempts.is_some_and(|max| prompts >= max) {
                    return Err(e);
                }
                prompts += 1;

                let retry = matches!(e, ConvertError::IncorrectPassword);
                match prompter.password(source, retry)? {
                    Some(pwd) => password = Some(pwd),
                    None => {
                        tracing::debug!("Password prompt cancelled for {}", source.display());
                        return Ok(None);
                    }
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run one conversion end to end
pub fn convert(request: &ConvertRequest, prompter: &mut dyn Prompter) -> Result<ConvertOutcome> {
    let format = source_format(&request.source)?;
    format.check_target(request.target)?;

    let Some(bundle) = read_bundle(
        &request.source,
        request.password.clone(),
        request.max_password_attempts,
        prompter,
    )?
    else {
        return Ok(ConvertOutcome::Cancelled);
    };

    let dir = request.output_dir.clone().unwrap_or_else(|| {
        request
            .source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    let stem = source_stem(&request.source);
    let files = request.target.encode(&bundle, &dir, &stem, &request.export)?;

    for file in &files {
        if file.path.exists() && !prompter.confirm_overwrite(&file.path)? {
            tracing::debug!("Overwrite of {} declined", file.path.display());
            return Ok(ConvertOutcome::Declined(file.path.clone()));
        }
    }

    // Replaced files are kept in memory so a failed write can put them back
    let mut previous: Vec<Option<Vec<u8>>> = Vec::with_capacity(files.len());
    for file in &files {
        let contents = if file.path.is_file() {
            Some(std::fs::read(&file.path).map_err(|e| ConvertError::Write {
                path: file.path.display().to_string(),
                message: format!("cannot read the existing file: {}", e),
            })?)
        } else {
            None
        };
        previous.push(contents);
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(files.len());
    for file in &files {
        if let Err(e) = std::fs::write(&file.path, &file.contents) {
            roll_back(&written, &previous);
            return Err(ConvertError::Write {
                path: file.path.display().to_string(),
                message: e.to_string(),
            });
        }
        written.push(file.path.clone());
    }

    tracing::debug!(
        "Converted {} ({}) to {}",
        request.source.display(),
        format,
        request.target
    );
    Ok(ConvertOutcome::Written(written))
}

/// Undo the writes of a failed conversion: files that existed get their old
/// contents back, files this conversion created are removed.
///
/// `previous` is indexed like the output files; only the first
/// `written.len()` entries are used.
fn roll_back(written: &[PathBuf], previous: &[Option<Vec<u8>>]) {
    for (path, contents) in written.iter().zip(&previous[..written.len()]).rev() {
        let result = match contents {
            Some(contents) => std::fs::write(path, contents),
            None => std::fs::remove_file(path),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to roll back {}: {}", path.display(), e);
        }
    }
}
