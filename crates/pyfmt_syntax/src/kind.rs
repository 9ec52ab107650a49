/// The lexical class of a token. Brackets, separators, and layout tokens get
/// dedicated kinds because the annotator and the reflow engine branch on them
/// constantly; everything else is folded into the broad classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Name,
    Number,
    String,
    Keyword,
    Operator,
    Comment,
    OpenBracket,
    CloseBracket,
    Comma,
    Colon,
    Semicolon,
    Arrow,
    At,
    /// An explicit backslash line continuation. The tokenizer folds these
    /// away while building logical lines, so the variant only survives in
    /// the data model for callers that inspect raw streams.
    Continuation,
    Newline,
    Indent,
    Dedent,
    EndOfFile,
}

impl TokenKind {
    /// Layout tokens describe structure and never carry source text that the
    /// emitter has to reproduce.
    pub fn is_layout(self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::EndOfFile
        )
    }

    pub fn is_bracket(self) -> bool {
        matches!(self, TokenKind::OpenBracket | TokenKind::CloseBracket)
    }
}
