//! Conversion registry
//!
//! The closed set of supported formats, how a source path selects its
//! reader, and which formats a source may be converted to. A format is never
//! offered as a target for its own sources.

use crate::cert_ops::bundle::Bundle;
use crate::cert_ops::split::{self, strip_suffix_ignore_case, CER_EXTENSION, KEY_EXTENSION};
use crate::cert_ops::pfx;
use crate::utils::{ConvertError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

pub const PFX_EXTENSION: &str = ".pfx";

/// A supported on-disk representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Password-protected PKCS#12 container
    Pfx,
    /// DER certificate plus PEM private key
    CerAndKey,
}

/// Options applied when encoding a bundle
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Carry chain certificates into container output
    pub include_chain: bool,
    /// Container password; `None` means empty-string protection
    pub password: Option<String>,
}

/// One encoded output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Format {
    /// Every handler, in registration order
    pub const ALL: [Format; 2] = [Format::Pfx, Format::CerAndKey];

    pub fn label(&self) -> &'static str {
        match self {
            Format::Pfx => ".pfx",
            Format::CerAndKey => ".cer and .key",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Pfx => &[PFX_EXTENSION],
            Format::CerAndKey => &[CER_EXTENSION, KEY_EXTENSION],
        }
    }

    /// Whether `path` ends in one of this format's extensions (case-insensitive)
    pub fn is_allowed_source(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.extensions()
            .iter()
            .any(|ext| strip_suffix_ignore_case(&text, ext).is_some())
    }

    /// Find the format that reads `path`
    pub fn match_source(path: &Path) -> Option<Format> {
        Self::ALL.into_iter().find(|f| f.is_allowed_source(path))
    }

    /// Look a format up by label, with or without the leading dot
    pub fn from_label(label: &str) -> Option<Format> {
        let wanted = label.trim().trim_start_matches('.');
        Self::ALL.into_iter().find(|f| {
            f.label()
                .trim_start_matches('.')
                .eq_ignore_ascii_case(wanted)
        })
    }

    /// All other formats, sorted by label
    pub fn allowed_targets(&self) -> Vec<Format> {
        let mut targets: Vec<Format> = Self::ALL.into_iter().filter(|f| f != self).collect();
        targets.sort_by_key(|f| f.label());
        targets
    }

    /// Reject self-conversion
    pub fn check_target(&self, target: Format) -> Result<()> {
        if !self.allowed_targets().contains(&target) {
            return Err(ConvertError::UnsupportedTarget {
                label: target.label().to_string(),
            });
        }
        Ok(())
    }

    /// Read a bundle from `source`.
    ///
    /// Split sources resolve their sibling file first; `password` only
    /// applies to containers.
    pub fn read(&self, source: &Path, password: Option<&str>) -> Result<Bundle> {
        match self {
            Format::Pfx => {
                let data = split::read_file(source)?;
                pfx::read_pfx(&data, password)
            }
            Format::CerAndKey => {
                let (cer_path, key_path) = split::resolve_pair(source)?;
                split::read_split_files(&cer_path, &key_path)
            }
        }
    }

    /// Paths this format writes for `<dir>/<stem>`
    pub fn output_paths(&self, dir: &Path, stem: &str) -> Vec<PathBuf> {
        match self {
            Format::Pfx => vec![dir.join(format!("{}{}", stem, PFX_EXTENSION))],
            Format::CerAndKey => vec![
                dir.join(format!("{}{}", stem, CER_EXTENSION)),
                dir.join(format!("{}{}", stem, KEY_EXTENSION)),
            ],
        }
    }

    /// Encode `bundle` into this format's files under `<dir>/<stem>`
    pub fn encode(
        &self,
        bundle: &Bundle,
        dir: &Path,
        stem: &str,
        options: &ExportOptions,
    ) -> Result<Vec<OutputFile>> {
        let paths = self.output_paths(dir, stem);
        let contents = match self {
            Format::Pfx => vec![pfx::write_pfx(
                bundle,
                options.include_chain,
                options.password.as_deref(),
            )?],
            Format::CerAndKey => {
                let files = split::write_split(bundle)?;
                vec![files.certificate, files.private_key]
            }
        };

        Ok(paths
            .into_iter()
            .zip(contents)
            .map(|(path, contents)| OutputFile { path, contents })
            .collect())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// File name of `source` without its last extension
pub fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}
