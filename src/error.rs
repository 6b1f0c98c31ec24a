use thiserror::Error;

/// Everything that can go wrong while turning raw productions into a [`Grammar`](crate::Grammar).
///
/// The FIRST/FOLLOW engines are total over a well-formed grammar, so these are
/// all raised during classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("Line {line}: cannot classify token \"{token}\"")]
    Classification { line: usize, token: String },

    #[error("The variable '{0}' is used but never defined")]
    UndefinedVariable(String),
}

impl GrammarError {
    pub(crate) fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::Parse {
            line,
            msg: msg.into(),
        }
    }
}
