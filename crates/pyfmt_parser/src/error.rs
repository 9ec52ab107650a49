use thiserror::Error;

/// Errors produced while tokenizing a source file. All variants carry the
/// 1-based line and 0-based column of the offending position.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}:{column}: unexpected character {found:?}")]
    UnexpectedCharacter { found: char, line: u32, column: u32 },
    #[error("line {line}:{column}: unterminated string literal")]
    UnterminatedString { line: u32, column: u32 },
    #[error("line {line}:{column}: closing {found:?} does not match any open bracket")]
    UnexpectedClosingBracket { found: char, line: u32, column: u32 },
    #[error("line {line}:{column}: {found:?} was never closed")]
    UnclosedBracket { found: char, line: u32, column: u32 },
    #[error("line {line}: dedent does not match any outer indentation level")]
    BadIndentation { line: u32 },
}

pub type ParseResult<T> = Result<T, ParseError>;
