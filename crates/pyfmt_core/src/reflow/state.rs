//! The reflow search node and its transition function. States are value
//! copies: the search clones one per branch, and the bracket stack rides
//! along inside the state so equivalent layouts hash identically.

use pyfmt_style::{ContinuationAlignStyle, SpacesBeforeComment, Style};
use pyfmt_syntax::{LogicalLine, Subtype, TokenKind};

/// Penalty for keeping an argument on the current line after its argument
/// list already broke at the opening bracket; this is what pushes argument
/// lists toward all-or-none splitting.
const ARG_IMBALANCE_PENALTY: u64 = 10_000;

/// Per-bracket search state, one per open bracket on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ParenState {
    /// Column continuation lines inside this bracket indent to.
    pub indent: u32,
    /// The hanging-indent alternative, latched into `indent` when the break
    /// is taken directly after the opening bracket.
    pub hanging_indent: u32,
    /// Column at which the token before the open bracket ended.
    pub last_space: u32,
    /// Column the closing bracket lands on when it breaks.
    pub closing_scope_indent: u32,
    /// Once true, the closing bracket must start its own line.
    pub split_before_closing_bracket: bool,
    /// Whether the break after the opening bracket was taken.
    pub broke_at_open: bool,
    /// Call or parameter-list bracket, subject to all-or-none splitting.
    pub is_arg_list: bool,
    /// Container literal bracket (list/dict/set/tuple), whose closing
    /// bracket moves to its own line once the literal breaks open.
    pub is_literal: bool,
    pub num_line_splits: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FormatDecisionState {
    pub next_token: usize,
    /// Column the next token would start at if placed without breaking.
    pub column: u32,
    pub line_count: u32,
    /// Column the current physical line started at.
    pub line_start_column: u32,
    /// Shallowest bracket level touched on the current physical line.
    pub lowest_level_on_line: usize,
    pub stack: Vec<ParenState>,
}

/// The transition function over [`FormatDecisionState`], parameterized by
/// one logical line and the active style.
pub(crate) struct Reflow<'a> {
    line: &'a LogicalLine,
    style: &'a Style,
}

impl<'a> Reflow<'a> {
    pub fn new(line: &'a LogicalLine, style: &'a Style) -> Self {
        Self { line, style }
    }

    pub fn token_count(&self) -> usize {
        self.line.tokens.len()
    }

    /// The state before any token has been placed.
    pub fn fresh_state(&self) -> FormatDecisionState {
        let indent = self.line.depth as u32 * self.style.indent_width;
        FormatDecisionState {
            next_token: 0,
            column: indent,
            line_count: 1,
            line_start_column: indent,
            lowest_level_on_line: 0,
            stack: vec![ParenState {
                indent: indent + self.style.continuation_indent_width,
                hanging_indent: indent + self.style.continuation_indent_width,
                last_space: indent,
                closing_scope_indent: indent,
                split_before_closing_bracket: false,
                broke_at_open: false,
                is_arg_list: false,
                is_literal: false,
                num_line_splits: 0,
            }],
        }
    }

    pub fn must_split(&self, state: &FormatDecisionState) -> bool {
        let token = &self.line.tokens[state.next_token];
        token.must_break_before
            || (token.is_close_bracket()
                && state.stack.last().is_some_and(|top| top.split_before_closing_bracket))
    }

    pub fn can_split(&self, state: &FormatDecisionState) -> bool {
        self.line.tokens[state.next_token].can_break_before
    }

    /// Column the next token starts at if a break is taken before it.
    pub fn newline_column(&self, state: &FormatDecisionState) -> u32 {
        let token = &self.line.tokens[state.next_token];
        let top = state.stack.last().expect("bracket stack always has a root");
        if token.is_close_bracket() {
            return top.closing_scope_indent;
        }
        if token.has_subtype(Subtype::DICT_VALUE) && self.style.indent_dictionary_value {
            return top.indent + self.style.indent_width;
        }
        top.indent
    }

    /// Spaces before the token when it stays on the current line, resolving
    /// comment alignment columns against the live position.
    pub fn spaces_before(&self, column: u32, index: usize) -> u32 {
        let token = &self.line.tokens[index];
        if token.is_comment() {
            if matches!(
                self.style.spaces_before_comment,
                SpacesBeforeComment::Aligned(_)
            ) {
                return self.style.comment_spaces(column);
            }
        }
        token.spaces_required_before
    }

    /// Advance the state over the next token, breaking before it or not.
    /// Returns the penalty the move incurs.
    pub fn place_token(&self, state: &mut FormatDecisionState, newline: bool) -> u64 {
        let index = state.next_token;
        let token = &self.line.tokens[index];
        let mut penalty: u64 = 0;

        if newline {
            penalty += token.split_penalty as u64
                + self.style.split_penalty_for_added_line_split as u64;
            let column = self.newline_column(state);
            state.column = column;
            state.line_start_column = column;
            state.line_count += 1;
            state.lowest_level_on_line = state.stack.len() - 1;

            if state.stack.len() > 1 {
                let broke_at_open = index > 0
                    && self.line.tokens[index - 1].is_open_bracket()
                    && !token.is_close_bracket();
                let top = state
                    .stack
                    .last_mut()
                    .expect("bracket stack always has a root");
                top.num_line_splits += 1;
                if broke_at_open {
                    top.indent = top.hanging_indent;
                    top.broke_at_open = true;
                    // Calls keep their closing bracket glued to the last
                    // argument; container literals move it to its own line.
                    top.split_before_closing_bracket = self.style.dedent_closing_brackets
                        || self.style.indent_closing_brackets
                        || (self.style.split_before_closing_bracket && top.is_literal);
                }
            }
        } else {
            if index > 0 {
                state.column += self.spaces_before(state.column, index);
                let top = state.stack.last().expect("bracket stack always has a root");
                if top.broke_at_open
                    && top.is_arg_list
                    && top.num_line_splits > 0
                    && self.line.tokens[index - 1].kind == TokenKind::Comma
                {
                    penalty += ARG_IMBALANCE_PENALTY;
                }
            }
            state.lowest_level_on_line =
                state.lowest_level_on_line.min(state.stack.len() - 1);
        }

        penalty + self.advance_over_token(state)
    }

    fn advance_over_token(&self, state: &mut FormatDecisionState) -> u64 {
        let index = state.next_token;
        let token = &self.line.tokens[index];
        let start_column = state.column;
        let first_line_end = start_column + token.width();
        state.column = if token.contains_newline() {
            token.last_segment_width()
        } else {
            first_line_end
        };

        // Exceeding the column limit is allowed but paid for per character,
        // so a slight overflow can beat an expensive forced split.
        let mut penalty = 0u64;
        let limit = self.style.column_limit;
        if first_line_end > limit {
            let charge_from = start_column.max(limit);
            penalty += (first_line_end - charge_from) as u64
                * self.style.split_penalty_excess_character as u64;
        }

        if token.is_open_bracket() {
            let interior_spaces = self
                .line
                .tokens
                .get(index + 1)
                .map(|next| next.spaces_required_before)
                .unwrap_or(0);
            let visual = state.column + interior_spaces;
            let hanging = state.line_start_column + self.style.continuation_indent_width;
            let indent = match self.style.continuation_align_style {
                ContinuationAlignStyle::Space => visual,
                ContinuationAlignStyle::Fixed => hanging,
                ContinuationAlignStyle::ValignRight => {
                    round_up(visual, self.style.indent_width)
                }
            };
            let closing_scope_indent = if self.style.indent_closing_brackets {
                state.line_start_column + self.style.continuation_indent_width
            } else {
                state.line_start_column
            };
            state.stack.push(ParenState {
                indent,
                hanging_indent: hanging,
                last_space: start_column,
                closing_scope_indent,
                split_before_closing_bracket: false,
                broke_at_open: false,
                is_arg_list: token.has_subtype(Subtype::CALL | Subtype::DEF_PARAMS),
                is_literal: token.has_subtype(
                    Subtype::DICT_LITERAL
                        | Subtype::SET_LITERAL
                        | Subtype::LIST_LITERAL
                        | Subtype::TUPLE_PAREN,
                ),
                num_line_splits: 0,
            });
        } else if token.is_close_bracket() && state.stack.len() > 1 {
            state.stack.pop();
        }

        state.next_token += 1;
        penalty
    }
}

fn round_up(value: u32, multiple: u32) -> u32 {
    if multiple == 0 {
        return value;
    }
    value.div_ceil(multiple) * multiple
}
