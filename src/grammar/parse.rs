use std::collections::HashSet;

use tracing::debug;

use super::{
    grammar::Symbol, Grammar, ALTERNATIVE, END_MARK, EPSILON_GLYPHS, ESCAPE_PREFIX, SEPARATOR,
};
use crate::GrammarError;

/// Classifies a single token. Rules are tried in order:
/// epsilon glyphs, escaped terminals, lowercase terminals, uppercase variables,
/// and finally tokens without any cased letter (`+`, `(`, `1`), which are terminals.
/// `$` is reserved for the end marker and must be written `\$`.
pub fn classify_token(token: &str, line: usize) -> Result<Symbol, GrammarError> {
    if EPSILON_GLYPHS.contains(&token) {
        return Ok(Symbol::Epsilon);
    }
    if let Some(rest) = token.strip_prefix(ESCAPE_PREFIX) {
        if !rest.is_empty() {
            return Ok(Symbol::Terminal(token.to_string()));
        }
    }

    let has_lower = token.chars().any(char::is_lowercase);
    let has_upper = token.chars().any(char::is_uppercase);
    match (has_lower, has_upper) {
        (true, false) => Ok(Symbol::Terminal(token.to_string())),
        (false, true) => Ok(Symbol::Variable(token.to_string())),
        (false, false)
            if !token.is_empty()
                && token != END_MARK
                && !token.starts_with(ESCAPE_PREFIX) =>
        {
            Ok(Symbol::Terminal(token.to_string()))
        }
        _ => Err(GrammarError::Classification {
            line,
            token: token.to_string(),
        }),
    }
}

impl Grammar {
    /// Builds a grammar from one production per entry, e.g. `"E -> E + n"`.
    ///
    /// An entry may hold alternatives (`S -> a | b`). Every entry needs its own `->`.
    pub fn classify<S: AsRef<str>>(productions: &[S]) -> Result<Self, GrammarError> {
        let mut g = Self::new();
        for (i, line) in productions.iter().enumerate() {
            g.add_line(line.as_ref(), i + 1, None)?;
        }
        g.finish()
    }

    /// Same as [`Grammar::classify`] over the lines of `grammar`, skipping blank lines.
    /// A line starting with `|` continues the left side of the line before it.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut g = Self::new();
        let mut previous_left: Option<String> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            g.add_line(line, i + 1, Some(&mut previous_left))?;
        }
        g.finish()
    }

    /// `previous_left` is only given when continuation lines are allowed.
    fn add_line(
        &mut self,
        line: &str,
        line_no: usize,
        mut previous_left: Option<&mut Option<String>>,
    ) -> Result<(), GrammarError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let continuation = previous_left.is_some() && tokens.first() == Some(&ALTERNATIVE);
        let (left, rights): (String, &[&str]) = if continuation {
            if tokens.contains(&SEPARATOR) {
                return Err(GrammarError::parse(line_no, "\"->\" after \"|\""));
            }
            match previous_left.as_deref() {
                Some(Some(left)) => (left.clone(), &tokens[1..]),
                _ => return Err(GrammarError::parse(line_no, "cannot find left side")),
            }
        } else {
            let separators = tokens.iter().filter(|t| **t == SEPARATOR).count();
            if separators == 0 {
                return Err(GrammarError::parse(line_no, "missing \"->\""));
            } else if separators > 1 {
                return Err(GrammarError::parse(line_no, "too many \"->\""));
            }
            match tokens.iter().position(|t| *t == SEPARATOR) {
                Some(0) => return Err(GrammarError::parse(line_no, "empty left side")),
                Some(1) => {}
                _ => {
                    return Err(GrammarError::parse(
                        line_no,
                        "left side contains whitespace",
                    ))
                }
            }
            match classify_token(tokens[0], line_no)? {
                Symbol::Variable(name) => (name, &tokens[2..]),
                _ => {
                    return Err(GrammarError::parse(
                        line_no,
                        format!("left side \"{}\" is not a variable", tokens[0]),
                    ))
                }
            }
        };

        for right in rights.split(|t| *t == ALTERNATIVE) {
            if right.is_empty() {
                return Err(GrammarError::parse(line_no, "empty right side"));
            }
            let symbols = right
                .iter()
                .map(|t| classify_token(t, line_no))
                .collect::<Result<Vec<_>, _>>()?;
            if symbols.len() > 1 && symbols.contains(&Symbol::Epsilon) {
                return Err(GrammarError::parse(
                    line_no,
                    "ε must be the only symbol of its production",
                ));
            }
            self.add_production(left.clone(), symbols);
        }

        if let Some(previous) = previous_left.as_deref_mut() {
            *previous = Some(left);
        }
        Ok(())
    }

    /// Checks that every variable used on a right side has a production.
    fn finish(self) -> Result<Self, GrammarError> {
        let defined: HashSet<&str> = self.productions().iter().map(|p| p.left()).collect();
        for production in self.productions() {
            if let Some(undefined) = production
                .right()
                .iter()
                .filter_map(|s| s.variable())
                .find(|v| !defined.contains(v))
            {
                return Err(GrammarError::UndefinedVariable(undefined.to_string()));
            }
        }

        debug!(
            productions = self.productions().len(),
            variables = self.variables().count(),
            terminals = self.terminals().count(),
            "classified grammar"
        );
        Ok(self)
    }
}
