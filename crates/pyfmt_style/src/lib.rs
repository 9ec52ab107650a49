mod error;
mod style;

pub use error::{StyleError, StyleResult};
pub use style::{ContinuationAlignStyle, SpacesBeforeComment, Style};
