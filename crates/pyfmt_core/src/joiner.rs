//! Joins short compound statements (`if cond: stmt`) back onto one physical
//! line when the style allows it and the joined form fits.

use pyfmt_style::Style;
use pyfmt_syntax::{LogicalLine, TokenKind};

const JOINABLE_HEADERS: &[&str] = &["if", "while", "for", "with"];
const SUITE_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "with", "try", "except", "finally", "def", "class",
    "async",
];
const TRAILING_CLAUSES: &[&str] = &["elif", "else", "except", "finally"];

pub fn join_lines(lines: &mut Vec<LogicalLine>, style: &Style) {
    if !style.join_multiple_lines {
        return;
    }
    let mut index = 0;
    while index < lines.len() {
        if let Some(merged) = try_join(lines, index, style) {
            lines[index] = merged;
            lines.remove(index + 1);
        }
        index += 1;
    }
}

fn try_join(lines: &[LogicalLine], index: usize, style: &Style) -> Option<LogicalLine> {
    let header = lines.get(index)?;
    let body = lines.get(index + 1)?;

    let joinable_header = !header.disable
        && !header.contains_comment()
        && header.is_block_header()
        && JOINABLE_HEADERS
            .iter()
            .any(|keyword| header.starts_with_keyword(keyword));
    if !joinable_header {
        return None;
    }

    let simple_body = !body.disable
        && body.depth == header.depth + 1
        && !body.contains_comment()
        && !body.is_block_header()
        && !SUITE_KEYWORDS
            .iter()
            .any(|keyword| body.starts_with_keyword(keyword));
    if !simple_body {
        return None;
    }

    // The body must be the entire suite, and no dangling clause may follow.
    if let Some(following) = lines.get(index + 2) {
        if following.depth > header.depth {
            return None;
        }
        if TRAILING_CLAUSES
            .iter()
            .any(|keyword| following.starts_with_keyword(keyword))
        {
            return None;
        }
    }

    let mut merged = LogicalLine::new(
        header.depth,
        header
            .tokens
            .iter()
            .chain(body.tokens.iter())
            .cloned()
            .collect(),
    );
    merged.blank_lines_before = header.blank_lines_before;

    // Re-annotate from a clean slate; the per-line annotations of the two
    // halves do not survive concatenation.
    for token in &mut merged.tokens {
        token.spaces_required_before = 0;
        token.can_break_before = true;
        token.must_break_before = false;
        token.split_penalty = 0;
        token.matching_bracket = None;
    }
    pair_merged_brackets(&mut merged);
    crate::annotate_line(&mut merged, style);

    let indent = merged.depth as u32 * style.indent_width;
    if merged.has_forced_break() || merged.single_line_width(indent) > style.column_limit {
        return None;
    }
    Some(merged)
}

fn pair_merged_brackets(line: &mut LogicalLine) {
    let mut stack: Vec<usize> = Vec::new();
    for index in 0..line.tokens.len() {
        match line.tokens[index].kind {
            TokenKind::OpenBracket => stack.push(index),
            TokenKind::CloseBracket => {
                if let Some(open) = stack.pop() {
                    line.tokens[open].matching_bracket = Some(index);
                    line.tokens[index].matching_bracket = Some(open);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{annotate_line, logical_lines};
    use pyfmt_parser::tokenize;

    fn joined(source: &str, style: &Style) -> Vec<String> {
        let mut lines = logical_lines::build(tokenize(source).unwrap());
        for line in &mut lines {
            annotate_line(line, style);
        }
        join_lines(&mut lines, style);
        lines
            .iter()
            .map(|line| {
                let mut out = String::new();
                for (index, token) in line.tokens.iter().enumerate() {
                    if index > 0 {
                        for _ in 0..token.spaces_required_before {
                            out.push(' ');
                        }
                    }
                    out.push_str(&token.text);
                }
                out
            })
            .collect()
    }

    #[test]
    fn joins_short_conditional() {
        let lines = joined("if a == 42:\n    continue\n", &Style::default());
        assert_eq!(lines, vec!["if a == 42: continue"]);
    }

    #[test]
    fn knob_disables_joining() {
        let mut style = Style::default();
        style.set_knob("JOIN_MULTIPLE_LINES", "false").unwrap();
        let lines = joined("if a == 42:\n    continue\n", &style);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn multi_statement_suite_is_not_joined() {
        let lines = joined("if a:\n    b = 1\n    c = 2\n", &Style::default());
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn else_clause_blocks_joining() {
        let lines = joined("if a:\n    b\nelse:\n    c\n", &Style::default());
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn nested_suite_is_not_joined() {
        let lines = joined("if a:\n    if b:\n        c\n", &Style::default());
        // The outer body is itself a block header; only the inner pair
        // collapses.
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "if b: c");
    }

    #[test]
    fn overlong_join_is_rejected() {
        let mut style = Style::default();
        style.set_knob("COLUMN_LIMIT", "20").unwrap();
        let lines = joined("if condition:\n    do_something(x)\n", &style);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn def_bodies_are_not_joined() {
        let lines = joined("def f():\n    return 1\n", &Style::default());
        assert_eq!(lines.len(), 2);
    }
}
