//! Groups the flat token stream into logical lines: one per statement, with
//! bracketed and backslash continuations already folded in by the tokenizer.

use pyfmt_syntax::{LogicalLine, Token, TokenKind};

/// Build the ordered sequence of logical lines. Every non-layout token from
/// the stream appears in exactly one output line, in original order.
pub fn build(tokens: Vec<Token>) -> Vec<LogicalLine> {
    let mut lines: Vec<LogicalLine> = Vec::new();
    let mut buffer: Vec<Token> = Vec::new();
    let mut depth = 0usize;

    for token in tokens {
        match token.kind {
            TokenKind::Indent => depth += 1,
            TokenKind::Dedent => depth = depth.saturating_sub(1),
            TokenKind::Newline | TokenKind::EndOfFile => {
                if !buffer.is_empty() {
                    lines.push(LogicalLine::new(depth, std::mem::take(&mut buffer)));
                }
            }
            TokenKind::Continuation => {}
            _ => buffer.push(token),
        }
    }
    if !buffer.is_empty() {
        lines.push(LogicalLine::new(depth, buffer));
    }

    for line in &mut lines {
        pair_brackets(line);
    }
    fix_comment_depths(&mut lines);
    record_original_blanks(&mut lines);
    lines
}

/// Cross-reference each bracket with its partner. The tokenizer has already
/// rejected unbalanced input, so within one logical line the pairing always
/// resolves.
fn pair_brackets(line: &mut LogicalLine) {
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
    debug_assert!(stack.is_empty(), "unbalanced brackets in a logical line");
}

/// Standalone comments are lexed before the indent tokens of the block they
/// belong to, so the builder sees them one level too shallow when they lead
/// an indented block. Adopt the depth of the following statement when the
/// comment is aligned with it.
fn fix_comment_depths(lines: &mut [LogicalLine]) {
    for index in 0..lines.len() {
        if !lines[index].is_comment_only() {
            continue;
        }
        let comment_column = lines[index].first().original_column;
        let next = lines[index + 1..]
            .iter()
            .find(|line| !line.is_comment_only());
        if let Some(next) = next {
            if next.first().original_column == comment_column {
                let depth = next.depth;
                lines[index].depth = depth;
            }
        }
    }
}

/// Derive the original blank-line counts from the gaps between each line's
/// physical positions. The blank-line planner later rewrites these for
/// enabled lines.
fn record_original_blanks(lines: &mut [LogicalLine]) {
    let mut previous_end = 0u32;
    for line in lines.iter_mut() {
        let start = line.first().original_line;
        line.blank_lines_before = start.saturating_sub(previous_end + 1);
        previous_end = line.last().last_original_line();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfmt_parser::tokenize;

    fn lines_of(source: &str) -> Vec<LogicalLine> {
        build(tokenize(source).unwrap())
    }

    #[test]
    fn one_line_per_statement() {
        let lines = lines_of("x = 1\ny = 2\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].tokens.len(), 3);
    }

    #[test]
    fn bracketed_continuation_is_one_line() {
        let lines = lines_of("x = (1 +\n     2)\n");
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn depth_tracks_blocks() {
        let lines = lines_of("if a:\n    if b:\n        c\nd\n");
        let depths: Vec<usize> = lines.iter().map(|l| l.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 0]);
    }

    #[test]
    fn brackets_are_paired() {
        let lines = lines_of("f(g(x))\n");
        let tokens = &lines[0].tokens;
        // f ( g ( x ) )
        assert_eq!(tokens[1].matching_bracket, Some(6));
        assert_eq!(tokens[6].matching_bracket, Some(1));
        assert_eq!(tokens[3].matching_bracket, Some(5));
    }

    #[test]
    fn blank_lines_are_counted() {
        let lines = lines_of("a\n\n\nb\n");
        assert_eq!(lines[0].blank_lines_before, 0);
        assert_eq!(lines[1].blank_lines_before, 2);
    }

    #[test]
    fn multiline_string_does_not_inflate_blanks() {
        let lines = lines_of("x = '''a\n\nb'''\ny = 1\n");
        assert_eq!(lines[1].blank_lines_before, 0);
    }

    #[test]
    fn leading_comment_adopts_block_depth() {
        let lines = lines_of("if a:\n    # setup\n    b\n");
        assert_eq!(lines[1].depth, 1);
    }

    #[test]
    fn trailing_block_comment_keeps_depth() {
        let lines = lines_of("if a:\n    b\n    # tail\nc\n");
        assert_eq!(lines[2].depth, 1);
        assert_eq!(lines[3].depth, 0);
    }
}
