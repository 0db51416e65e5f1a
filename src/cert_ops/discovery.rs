//! Candidate source discovery
//!
//! Lists files in a directory that can start a conversion.

use crate::utils::{ConvertError, Result};
use std::path::{Path, PathBuf};

/// Files directly inside `dir` whose extension is one of `extensions`
/// (compared case-insensitively, leading dot optional), sorted by file name.
pub fn find_sources(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConvertError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut sources: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, extensions))
        .collect();

    sources.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    tracing::debug!("Found {} candidate source(s) in {}", sources.len(), dir.display());
    Ok(sources)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}
