//! Chooses the number of blank lines between finished logical lines.
//! Disabled lines keep whatever the original source had.

use pyfmt_style::Style;
use pyfmt_syntax::{LogicalLine, TokenKind};

/// Hard cap on consecutive blank lines in formatted output.
const MAX_BLANK_LINES: u32 = 2;

pub fn plan(lines: &mut [LogicalLine], style: &Style) {
    // Whether the most recent top-level statement opened a def or class,
    // which makes the next top-level statement want surrounding blanks.
    let mut after_top_level_definition = false;

    for index in 0..lines.len() {
        if lines[index].disable {
            track_top_level(&lines[index], &mut after_top_level_definition);
            continue;
        }
        if index == 0 {
            lines[0].blank_lines_before = 0;
            track_top_level(&lines[0], &mut after_top_level_definition);
            continue;
        }

        let original = lines[index].blank_lines_before.min(MAX_BLANK_LINES);
        let depth = lines[index].depth;
        let previous = &lines[index - 1];
        let mut want = original;

        if is_definition(&lines[index]) {
            if is_decorator(previous) && previous.depth == depth {
                // A decorator binds to the definition under it.
                want = 0;
            } else if depth == 0 {
                want = style.blank_lines_around_top_level_definition;
            } else if previous.depth < depth {
                // First statement of a new suite.
                let configured = style.blank_line_before_nested_class_or_def as u32;
                want = original.min(1).max(configured);
            } else {
                // Sibling definitions inside a class or function body.
                want = original.max(1);
            }
        } else if depth == 0 && previous.depth > 0 && after_top_level_definition {
            // First statement after a top-level def/class body ends.
            want = want.max(style.blank_lines_around_top_level_definition);
        } else if depth == 0
            && is_import(previous)
            && !is_import(&lines[index])
            && !is_definition(&lines[index])
        {
            want = want.max(style.blank_lines_between_top_level_imports_and_variables);
        }

        if is_docstring(&lines[index]) {
            if previous.is_block_header() && previous.starts_with_keyword("class") {
                if style.blank_line_before_class_docstring {
                    want = want.max(1);
                } else {
                    want = 0;
                }
            } else if depth == 0 && previous.is_comment_only() {
                if style.blank_line_before_module_docstring {
                    want = want.max(1);
                }
            }
        }

        lines[index].blank_lines_before = want;
        track_top_level(&lines[index], &mut after_top_level_definition);
    }
}

fn track_top_level(line: &LogicalLine, after_top_level_definition: &mut bool) {
    if line.depth == 0 && !line.is_comment_only() {
        *after_top_level_definition = is_definition(line);
    }
}

/// A def/class statement or a decorator attached to one.
fn is_definition(line: &LogicalLine) -> bool {
    line.starts_with_keyword("def")
        || line.starts_with_keyword("class")
        || (line.starts_with_keyword("async")
            && line.tokens.get(1).is_some_and(|token| token.is_keyword("def")))
        || is_decorator(line)
}

fn is_decorator(line: &LogicalLine) -> bool {
    !line.tokens.is_empty() && line.first().kind == TokenKind::At
}

fn is_import(line: &LogicalLine) -> bool {
    line.starts_with_keyword("import") || line.starts_with_keyword("from")
}

fn is_docstring(line: &LogicalLine) -> bool {
    line.first().is_string() && line.tokens.iter().skip(1).all(|token| token.is_comment())
}
