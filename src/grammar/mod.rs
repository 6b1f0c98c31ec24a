pub mod grammar;
pub mod nullable_first_follow;
pub mod parse;
pub mod pretty_print;
pub use grammar::{Grammar, Production, Symbol};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";

/// Every glyph accepted as the empty string on a right side.
pub const EPSILON_GLYPHS: &[&str] = &[EPSILON, "ɛ", "ϵ"];
/// A token starting with this prefix is always a terminal, e.g. `\+` or `\A`.
pub const ESCAPE_PREFIX: char = '\\';
pub const SEPARATOR: &str = "->";
pub const ALTERNATIVE: &str = "|";
