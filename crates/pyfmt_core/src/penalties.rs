//! Third annotation pass: split penalties and forced breaks. Base penalties
//! come from the token's kind and subtype; the bracket-level heuristics
//! (comment-in-list, trailing comma, overlong dicts and comprehensions, the
//! split-all knobs) are resolved here into `must_break_before` flags so the
//! reflow engine only ever sees per-token state.

use pyfmt_style::Style;
use pyfmt_syntax::{LogicalLine, Subtype, Token, TokenKind};

/// Breaking between a value and the attribute dot that follows it reads
/// badly; make it one of the most reluctant legal breaks.
const DOTTED_NAME_PENALTY: u32 = 4000;
/// Breaking after a binary operator instead of before it costs this much on
/// top of the operator's own weight.
const AFTER_OPERATOR_PENALTY: u32 = 2000;
/// Applied to breaks before keyword arguments when the style prefers to keep
/// them attached.
const NAMED_ASSIGN_SPLIT_PENALTY: u32 = 1500;

pub fn assign(line: &mut LogicalLine, style: &Style) {
    if line.tokens.is_empty() {
        return;
    }
    let enclosing = enclosing_opens(&line.tokens);
    base_penalties(line, style, &enclosing);
    forced_breaks(line, style, &enclosing);
    compute_total_lengths(line);
}

/// For each token, the index of the opening bracket of the innermost bracket
/// containing it. A closing bracket maps to its own opener.
fn enclosing_opens(tokens: &[Token]) -> Vec<Option<usize>> {
    let mut stack: Vec<usize> = Vec::new();
    let mut enclosing = Vec::with_capacity(tokens.len());
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenBracket => {
                enclosing.push(stack.last().copied());
                stack.push(index);
            }
            TokenKind::CloseBracket => {
                enclosing.push(stack.last().copied());
                stack.pop();
            }
            _ => enclosing.push(stack.last().copied()),
        }
    }
    enclosing
}

fn operator_penalty(op: &Token, style: &Style) -> u32 {
    match op.text.as_str() {
        "+" | "-" | "*" | "/" | "//" | "%" | "**" | "@" => style.split_penalty_arithmetic_operator,
        "&" | "|" | "^" | "<<" | ">>" => style.split_penalty_bitwise_operator,
        _ => style.split_penalty_logical_operator,
    }
}

fn base_penalties(line: &mut LogicalLine, style: &Style, enclosing: &[Option<usize>]) {
    let is_import_line =
        line.starts_with_keyword("import") || line.starts_with_keyword("from");

    for index in 1..line.tokens.len() {
        let mut penalty = 0u32;
        let prev = &line.tokens[index - 1];
        let curr = &line.tokens[index];

        if prev.is_open_bracket() {
            let cheap_first_split = style.split_before_first_argument
                && prev.has_subtype(Subtype::CALL | Subtype::DEF_PARAMS);
            if !cheap_first_split {
                penalty += style.split_penalty_after_opening_bracket;
            }
        }
        if curr.is_operator(".") {
            penalty += DOTTED_NAME_PENALTY;
        }
        if curr.has_subtype(Subtype::BINARY_OPERATOR) {
            penalty += operator_penalty(curr, style);
        } else if prev.has_subtype(Subtype::BINARY_OPERATOR) {
            penalty += operator_penalty(prev, style) + AFTER_OPERATOR_PENALTY;
        }
        if curr.has_subtype(Subtype::COMP_FOR | Subtype::COMP_IF) {
            penalty += style.split_penalty_comprehension;
        }
        if curr.kind == TokenKind::Keyword
            && matches!(curr.text.as_str(), "if" | "else")
            && !curr.has_subtype(Subtype::COMP_IF)
            && enclosing[index].is_some()
        {
            penalty += style.split_penalty_before_if_expression;
        }
        if curr.has_subtype(Subtype::KEYWORD_ARG_NAME) && !style.split_before_named_assigns {
            penalty += NAMED_ASSIGN_SPLIT_PENALTY;
        }
        if is_import_line && curr.is_name() {
            penalty += style.split_penalty_import_names;
        }

        line.tokens[index].split_penalty = penalty;
    }
}

fn forced_breaks(line: &mut LogicalLine, style: &Style, enclosing: &[Option<usize>]) {
    let token_count = line.tokens.len();

    // A comment always ends its physical line.
    for index in 1..token_count {
        if line.tokens[index - 1].is_comment() {
            line.tokens[index].must_break_before = true;
            line.tokens[index].can_break_before = true;
        }
    }

    let end_columns = single_line_end_columns(line, style);
    let line_fits = end_columns[token_count - 1] <= style.column_limit;

    let opens: Vec<usize> = (0..token_count)
        .filter(|index| line.tokens[*index].is_open_bracket())
        .collect();

    for &open in &opens {
        let Some(close) = line.tokens[open].matching_bracket else {
            continue;
        };
        if close <= open + 1 {
            continue;
        }
        let elements = element_starts(&line.tokens, enclosing, open, close);
        let contains_comment = line.tokens[open + 1..close].iter().any(Token::is_comment);
        let comma_terminated = line.tokens[open + 1..close]
            .iter()
            .rev()
            .find(|token| !token.is_comment())
            .is_some_and(|token| token.kind == TokenKind::Comma);
        let bracket_fits = end_columns[close] <= style.column_limit;

        if contains_comment {
            if let Some(first) = elements.first() {
                force(line, *first);
            }
            force(line, close);
            if !style.disable_split_list_with_comment {
                for element in &elements {
                    force(line, *element);
                }
            }
        }

        if comma_terminated
            && line.tokens[open].has_subtype(Subtype::CALL | Subtype::DEF_PARAMS)
            && style.split_arguments_when_comma_terminated
            && !style.disable_ending_comma_heuristic
        {
            for element in &elements {
                force(line, *element);
            }
            force(line, close);
        }

        if line.tokens[open].has_subtype(Subtype::DICT_LITERAL)
            && (style.force_multiline_dict
                || (style.each_dict_entry_on_separate_line && !bracket_fits))
        {
            for element in &elements {
                force(line, *element);
            }
            force(line, close);
        }

        if line.tokens[open].has_subtype(Subtype::COMPREHENSION)
            && style.split_complex_comprehension
            && !bracket_fits
        {
            for index in open + 1..close {
                if enclosing[index] == Some(open)
                    && line.tokens[index].has_subtype(Subtype::COMP_FOR | Subtype::COMP_IF)
                {
                    force(line, index);
                }
            }
        }
    }

    if style.split_all_comma_separated_values && !line_fits {
        for index in 0..token_count {
            if line.tokens[index].kind == TokenKind::Comma && enclosing[index].is_some() {
                if let Some(element) = next_element(&line.tokens, index) {
                    force(line, element);
                }
            }
        }
    } else if style.split_all_top_level_comma_separated_values && !line_fits {
        for &open in &opens {
            if enclosing[open].is_none() {
                split_top_level(line, style, enclosing, &end_columns, open, true);
            }
        }
    }
}

/// The top-level variant splits a bracket's elements only when the bracket
/// does not fit, then recurses into the over-wide children; a subexpression
/// that would fit on its own continuation line stays intact.
/// FORCE_MULTILINE_DICT takes precedence for dictionaries, whose entries
/// were already handled above.
fn split_top_level(
    line: &mut LogicalLine,
    style: &Style,
    enclosing: &[Option<usize>],
    end_columns: &[u32],
    open: usize,
    at_statement_level: bool,
) {
    if line.tokens[open].has_subtype(Subtype::DICT_LITERAL) && style.force_multiline_dict {
        return;
    }
    let Some(close) = line.tokens[open].matching_bracket else {
        return;
    };
    // An outermost bracket is judged in place; a nested one is judged as if
    // moved to a fresh continuation line.
    let fits = if at_statement_level {
        end_columns[close] <= style.column_limit
    } else {
        let span = end_columns[close] - end_columns[open] + line.tokens[open].width();
        let own_line_start =
            line.depth as u32 * style.indent_width + style.continuation_indent_width;
        own_line_start + span <= style.column_limit
    };
    if fits {
        return;
    }
    for element in element_starts(&line.tokens, enclosing, open, close) {
        force(line, element);
    }
    for index in open + 1..close {
        if line.tokens[index].is_open_bracket() && enclosing[index] == Some(open) {
            split_top_level(line, style, enclosing, end_columns, index, false);
        }
    }
}

/// Token indices that begin each comma-separated element directly inside the
/// bracket: the first significant token after the open bracket and after
/// every top-level comma. Trailing commas contribute nothing.
fn element_starts(
    tokens: &[Token],
    enclosing: &[Option<usize>],
    open: usize,
    close: usize,
) -> Vec<usize> {
    let mut starts = Vec::new();
    if let Some(first) = next_significant(tokens, open, close) {
        starts.push(first);
    }
    for index in open + 1..close {
        if tokens[index].kind == TokenKind::Comma && enclosing[index] == Some(open) {
            if let Some(element) = next_significant(tokens, index, close) {
                starts.push(element);
            }
        }
    }
    starts
}

fn next_significant(tokens: &[Token], after: usize, close: usize) -> Option<usize> {
    (after + 1..close).find(|index| !tokens[*index].is_comment())
}

fn next_element(tokens: &[Token], comma: usize) -> Option<usize> {
    (comma + 1..tokens.len())
        .find(|index| !tokens[*index].is_comment())
        .filter(|index| !tokens[*index].is_close_bracket())
}

/// Force a break before the token when a break there is structurally legal.
fn force(line: &mut LogicalLine, index: usize) {
    if index == 0 || !line.tokens[index].can_break_before {
        return;
    }
    line.tokens[index].must_break_before = true;
}

/// Column each token would end at if the line were rendered without breaks.
fn single_line_end_columns(line: &LogicalLine, style: &Style) -> Vec<u32> {
    let mut column = line.depth as u32 * style.indent_width;
    let mut ends = Vec::with_capacity(line.tokens.len());
    for (index, token) in line.tokens.iter().enumerate() {
        if index > 0 {
            column += token.spaces_required_before;
        }
        column += token.width();
        ends.push(column);
    }
    ends
}

/// Accumulate each token's width forward to the next legal break point; the
/// engine reads this to judge whether a candidate tail can ever fit.
fn compute_total_lengths(line: &mut LogicalLine) {
    let token_count = line.tokens.len();
    let mut next_total = 0u32;
    for index in (0..token_count).rev() {
        let width = line.tokens[index].width();
        let total = if index + 1 < token_count && !line.tokens[index + 1].can_break_before {
            width + line.tokens[index + 1].spaces_required_before + next_total
        } else {
            width
        };
        line.tokens[index].total_length = total;
        next_total = total;
    }
}
