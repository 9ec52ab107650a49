//! The formatter core. Given tokenized source, it builds logical lines,
//! annotates them with spacing and split costs, runs the reflow search per
//! line, and emits text. Everything here is synchronous and CPU-bound; the
//! style is read-only and may be shared across workers.

use std::sync::atomic::{AtomicBool, Ordering};

use pyfmt_style::Style;
use pyfmt_syntax::LogicalLine;

mod blank_lines;
mod disabled;
mod emitter;
mod error;
mod joiner;
mod logical_lines;
mod penalties;
mod reflow;
mod spacing;
mod subtypes;

pub use error::{FormatError, FormatResult};
pub use reflow::{reflow_line, RenderedToken};

/// Inclusive 1-based physical line range, as used for range formatting.
pub type LineRange = (u32, u32);

/// Run the three annotation passes over one logical line. Annotation is a
/// pure function of the tokens and the style; repeated runs agree.
pub fn annotate_line(line: &mut LogicalLine, style: &Style) {
    subtypes::assign(line);
    spacing::assign(line, style);
    penalties::assign(line, style);
}

/// Reformat a whole source file. When `ranges` is given, only logical lines
/// intersecting one of the inclusive 1-based line ranges are reformatted;
/// everything else passes through verbatim.
pub fn reformat_source(
    source: &str,
    style: &Style,
    ranges: Option<&[LineRange]>,
) -> FormatResult<String> {
    reformat_source_cancellable(source, style, ranges, None)
}

/// Like [`reformat_source`], checking the cancellation flag between logical
/// lines.
pub fn reformat_source_cancellable(
    source: &str,
    style: &Style,
    ranges: Option<&[LineRange]>,
    cancel: Option<&AtomicBool>,
) -> FormatResult<String> {
    let tokens = pyfmt_parser::tokenize(source)?;
    let mut lines = logical_lines::build(tokens);
    if lines.is_empty() {
        return Ok(String::new());
    }
    log::debug!("reformatting {} logical lines", lines.len());

    disabled::mark_disabled(&mut lines, style);
    if let Some(ranges) = ranges {
        for line in &mut lines {
            if !intersects_ranges(line, ranges) {
                line.disable = true;
            }
        }
    }

    for line in &mut lines {
        if !line.disable {
            annotate_line(line, style);
        }
    }
    joiner::join_lines(&mut lines, style);
    blank_lines::plan(&mut lines, style);

    let mut emitter = emitter::Emitter::new(source, style);
    let mut previous_end = 0u32;
    for line in &lines {
        if let Some(cancel) = cancel {
            if cancel.load(Ordering::Relaxed) {
                return Err(FormatError::Cancelled);
            }
        }
        if line.disable {
            // The blank gap above a disabled line is part of the region and
            // must survive byte-for-byte, whitespace and all.
            let first = line.first().original_line;
            if line.blank_lines_before > 0 && first > previous_end + 1 {
                emitter.verbatim_range(previous_end + 1, first - 1);
            }
            emitter.verbatim(line);
        } else {
            emitter.blank_lines(line.blank_lines_before, line.depth);
            let rendered = reflow::reflow_line(line, style)?;
            emitter.formatted(line, &rendered);
        }
        previous_end = line.last().last_original_line();
    }
    Ok(emitter.finish())
}

fn intersects_ranges(line: &LogicalLine, ranges: &[LineRange]) -> bool {
    let first = line.first().original_line;
    let last = line.last().last_original_line();
    ranges
        .iter()
        .any(|(start, end)| first <= *end && last >= *start)
}
