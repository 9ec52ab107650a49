//! Turns placement instructions back into source text: indentation policy,
//! blank lines, original end-of-line sequence, and verbatim passthrough for
//! disabled lines.

use pyfmt_style::Style;
use pyfmt_syntax::LogicalLine;

use crate::reflow::RenderedToken;

pub(crate) struct Emitter<'a> {
    style: &'a Style,
    source_lines: Vec<&'a str>,
    eol: &'static str,
    out: String,
}

impl<'a> Emitter<'a> {
    pub fn new(source: &'a str, style: &'a Style) -> Self {
        let eol = if source.contains("\r\n") { "\r\n" } else { "\n" };
        let source_lines = source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        Self {
            style,
            source_lines,
            eol,
            out: String::new(),
        }
    }

    pub fn blank_lines(&mut self, count: u32, depth: usize) {
        for _ in 0..count {
            if self.style.indent_blank_lines && depth > 0 {
                let column = depth as u32 * self.style.indent_width;
                self.push_indent(column, depth);
            }
            self.out.push_str(self.eol);
        }
    }

    /// Emit the physical source lines this logical line occupied, untouched.
    pub fn verbatim(&mut self, line: &LogicalLine) {
        let first = line.first().original_line;
        let last = line.last().last_original_line();
        self.verbatim_range(first, last);
    }

    /// Emit an inclusive range of original physical lines untouched. Used
    /// for disabled lines and for the blank gaps between them, which must
    /// survive byte-for-byte.
    pub fn verbatim_range(&mut self, first: u32, last: u32) {
        for number in first..=last {
            if let Some(text) = self.source_lines.get(number as usize - 1) {
                self.out.push_str(text);
            }
            self.out.push_str(self.eol);
        }
    }

    pub fn formatted(&mut self, line: &LogicalLine, rendered: &[RenderedToken]) {
        let indent = line.depth as u32 * self.style.indent_width;
        self.push_indent(indent, line.depth);
        for (index, (token, placement)) in line.tokens.iter().zip(rendered).enumerate() {
            if index > 0 {
                if placement.newline {
                    self.out.push_str(self.eol);
                    self.push_indent(placement.start_column, line.depth);
                } else {
                    for _ in 0..placement.spaces {
                        self.out.push(' ');
                    }
                }
            }
            self.out.push_str(&token.text);
        }
        self.out.push_str(self.eol);
    }

    pub fn finish(self) -> String {
        self.out
    }

    /// One tab per indent level when tabs are on; columns beyond the block
    /// indent are alignment and stay spaces.
    fn push_indent(&mut self, column: u32, depth: usize) {
        if self.style.use_tabs {
            let base = depth as u32 * self.style.indent_width;
            if column >= base {
                for _ in 0..depth {
                    self.out.push('\t');
                }
                for _ in 0..column - base {
                    self.out.push(' ');
                }
                return;
            }
        }
        for _ in 0..column {
            self.out.push(' ');
        }
    }
}
