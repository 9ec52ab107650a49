//! File-level formatting service on top of the core: source discovery with
//! ignore patterns, the per-file pipeline, unified diffs, and a bounded
//! parallel runner for whole-tree formatting.

mod diff;
mod discover;
mod error;
mod pipeline;
mod runner;

pub use diff::unified_diff;
pub use discover::{discover_files, IGNORE_FILE_NAME};
pub use error::{ServiceError, ServiceResult};
pub use pipeline::{format_file, FileReport, FormatOptions};
pub use runner::format_files;

// The library surface the CLI builds on.
pub use pyfmt_core::{reformat_source, FormatError, LineRange};
pub use pyfmt_style::{Style, StyleError};
