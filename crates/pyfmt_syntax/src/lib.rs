mod kind;
mod line;
mod subtype;
mod token;

pub use kind::TokenKind;
pub use line::LogicalLine;
pub use subtype::Subtype;
pub use token::Token;

/// Penalty assigned to a break position that must never be taken. The reflow
/// engine treats any penalty at or above this value as a hard wall.
pub const UNBREAKABLE_PENALTY: u32 = 1_000_000;
