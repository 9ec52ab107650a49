use pyfmt_parser::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The reflow frontier drained without reaching the end of a logical
    /// line. This is a bug in the engine; failing loudly beats emitting
    /// corrupted source.
    #[error("line {line}: reflow search space exhausted without completing the line")]
    InternalInvariant { line: u32 },
    #[error("formatting was cancelled")]
    Cancelled,
}

pub type FormatResult<T> = Result<T, FormatError>;
