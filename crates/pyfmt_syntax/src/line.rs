use crate::{Token, TokenKind};

/// A maximal run of tokens the target language treats as one statement, with
/// bracketed and backslash continuations folded in. The unit of work for the
/// reflow engine.
#[derive(Clone, Debug)]
pub struct LogicalLine {
    pub tokens: Vec<Token>,
    /// Block nesting depth in indent levels.
    pub depth: usize,
    /// When set, the reflow engine is bypassed and the line is emitted
    /// verbatim from the original source.
    pub disable: bool,
    /// Blank lines preceding this line. Initialized from the original source
    /// and rewritten by the blank-line planner for enabled lines.
    pub blank_lines_before: u32,
}

impl LogicalLine {
    pub fn new(depth: usize, tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            depth,
            disable: false,
            blank_lines_before: 0,
        }
    }

    pub fn first(&self) -> &Token {
        &self.tokens[0]
    }

    pub fn last(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    pub fn is_comment_only(&self) -> bool {
        self.tokens.iter().all(Token::is_comment)
    }

    pub fn starts_with_keyword(&self, word: &str) -> bool {
        !self.tokens.is_empty() && self.first().is_keyword(word)
    }

    /// True when the line opens a suite, i.e. ends with a `:` header colon.
    pub fn is_block_header(&self) -> bool {
        self.tokens
            .iter()
            .rev()
            .find(|token| !token.is_comment())
            .is_some_and(|token| token.kind == TokenKind::Colon)
    }

    pub fn contains_comment(&self) -> bool {
        self.tokens.iter().any(Token::is_comment)
    }

    /// Width of the line when rendered on a single physical line starting at
    /// `indent` columns, using the annotated spacing.
    pub fn single_line_width(&self, indent: u32) -> u32 {
        let mut width = indent;
        for (index, token) in self.tokens.iter().enumerate() {
            if index > 0 {
                width += token.spaces_required_before;
            }
            width += token.width();
        }
        width
    }

    /// True when any token demands a break, which rules out single-line
    /// rendering regardless of width.
    pub fn has_forced_break(&self) -> bool {
        self.tokens.iter().skip(1).any(|token| token.must_break_before)
    }
}
