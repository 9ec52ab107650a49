use crate::{Subtype, TokenKind};

/// One lexeme of the source plus everything the annotator decides about it.
///
/// Tokens are built by the tokenizer with neutral annotation state and then
/// mutated in place by the annotation passes. Once annotation finishes they
/// are treated as immutable by the reflow engine.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub subtypes: Subtype,
    /// 1-based physical line the token starts on in the original source.
    pub original_line: u32,
    /// 0-based column the token starts at in the original source.
    pub original_column: u32,
    /// Spaces the emitter must place before this token when it stays on the
    /// same physical line as its predecessor.
    pub spaces_required_before: u32,
    /// Whether the reflow engine may place a line break before this token.
    pub can_break_before: bool,
    /// Whether the reflow engine must place a line break before this token.
    /// Implies `can_break_before`.
    pub must_break_before: bool,
    /// Cost of taking a break before this token. Values at or above
    /// [`crate::UNBREAKABLE_PENALTY`] are treated as forbidden.
    pub split_penalty: u32,
    /// Index of the partner bracket within the owning logical line. This is a
    /// lookup, not ownership; the token list owns both halves.
    pub matching_bracket: Option<usize>,
    /// Width of this token plus every following token up to (excluding) the
    /// next position where a break is allowed, spacing included.
    pub total_length: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            subtypes: Subtype::empty(),
            original_line: line,
            original_column: column,
            spaces_required_before: 0,
            can_break_before: true,
            must_break_before: false,
            split_penalty: 0,
            matching_bracket: None,
            total_length: 0,
        }
    }

    /// Display width of the token text up to its first newline. Multi-line
    /// strings only count their first segment against the current line.
    pub fn width(&self) -> u32 {
        match self.text.find('\n') {
            Some(index) => self.text[..index].chars().count() as u32,
            None => self.text.chars().count() as u32,
        }
    }

    /// Display width of the text after the last newline, i.e. the number of
    /// columns this token leaves occupied on its final physical line.
    pub fn last_segment_width(&self) -> u32 {
        match self.text.rfind('\n') {
            Some(index) => self.text[index + 1..].chars().count() as u32,
            None => self.text.chars().count() as u32,
        }
    }

    pub fn contains_newline(&self) -> bool {
        self.text.contains('\n')
    }

    /// 1-based physical line this token ends on in the original source.
    pub fn last_original_line(&self) -> u32 {
        self.original_line + self.text.matches('\n').count() as u32
    }

    pub fn is_open_bracket(&self) -> bool {
        self.kind == TokenKind::OpenBracket
    }

    pub fn is_close_bracket(&self) -> bool {
        self.kind == TokenKind::CloseBracket
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    pub fn is_string(&self) -> bool {
        self.kind == TokenKind::String
    }

    pub fn is_name(&self) -> bool {
        self.kind == TokenKind::Name
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    pub fn has_subtype(&self, subtype: Subtype) -> bool {
        self.subtypes.intersects(subtype)
    }

    pub fn add_subtype(&mut self, subtype: Subtype) {
        self.subtypes |= subtype;
    }

    /// True for tokens that can syntactically begin an operand, which is what
    /// unary/binary disambiguation keys on.
    pub fn is_operand_end(&self) -> bool {
        match self.kind {
            TokenKind::Name | TokenKind::Number | TokenKind::String | TokenKind::CloseBracket => {
                true
            }
            // `True`, `False`, `None`, and `...` terminate operands even
            // though they lex as keywords/operators.
            TokenKind::Keyword => matches!(self.text.as_str(), "True" | "False" | "None"),
            TokenKind::Operator => self.text == "...",
            _ => false,
        }
    }
}
