//! The per-file pipeline: read, decode, reformat, and report. Files are
//! never rewritten when the formatted output equals the input.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pyfmt_core::{reformat_source, LineRange};
use pyfmt_style::Style;
use serde::Serialize;

use crate::diff::unified_diff;
use crate::error::{ServiceError, ServiceResult};

const BOM: &str = "\u{feff}";

/// Shared, read-only configuration for a formatting run.
#[derive(Clone)]
pub struct FormatOptions {
    pub style: Arc<Style>,
    /// Write changed files back to disk.
    pub in_place: bool,
    /// Produce a unified diff for changed files.
    pub print_diff: bool,
    /// Restrict reformatting to these 1-based inclusive line ranges.
    pub ranges: Option<Vec<LineRange>>,
}

impl FormatOptions {
    pub fn new(style: Style) -> Self {
        Self {
            style: Arc::new(style),
            in_place: false,
            print_diff: false,
            ranges: None,
        }
    }
}

/// Outcome of formatting one file. Errors are carried in the report so a
/// run over many files can finish and summarize.
#[derive(Clone, Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn failed(path: &Path, error: &ServiceError) -> Self {
        Self {
            path: path.to_path_buf(),
            changed: false,
            formatted: None,
            diff: None,
            error: Some(error.to_string()),
        }
    }
}

/// Format one file and describe what happened. Failures become part of the
/// report; the caller decides process-level consequences.
pub fn format_file(path: &Path, options: &FormatOptions) -> FileReport {
    match process_file(path, options) {
        Ok(report) => report,
        Err(error) => {
            log::warn!("skipping {}: {error}", path.display());
            FileReport::failed(path, &error)
        }
    }
}

fn process_file(path: &Path, options: &FormatOptions) -> ServiceResult<FileReport> {
    let bytes = std::fs::read(path).map_err(|source| ServiceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = String::from_utf8(bytes).map_err(|_| ServiceError::Encoding {
        path: path.to_path_buf(),
    })?;

    // A byte-order mark is not part of the source text; detach it and put it
    // back on the way out.
    let (bom, body) = match source.strip_prefix(BOM) {
        Some(rest) => (BOM, rest),
        None => ("", source.as_str()),
    };

    let mut formatted =
        reformat_source(body, &options.style, options.ranges.as_deref())?;
    if !bom.is_empty() {
        formatted.insert_str(0, bom);
    }

    let changed = formatted != source;
    if changed && options.in_place {
        std::fs::write(path, &formatted).map_err(|source| ServiceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let diff = (changed && options.print_diff)
        .then(|| unified_diff(&source, &formatted, &path.display().to_string()));

    Ok(FileReport {
        path: path.to_path_buf(),
        changed,
        formatted: (!options.in_place).then_some(formatted),
        diff,
        error: None,
    })
}
