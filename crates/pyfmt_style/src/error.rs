use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("unknown style option {0:?}")]
    UnknownKnob(String),
    #[error("invalid value {value:?} for {knob}: expected {expected}")]
    InvalidValue {
        knob: String,
        value: String,
        expected: &'static str,
    },
    #[error("unknown predefined style {0:?}")]
    UnknownStyle(String),
}

pub type StyleResult<T> = Result<T, StyleError>;
