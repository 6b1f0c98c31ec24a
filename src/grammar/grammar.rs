use std::fmt;

use indexmap::IndexSet;
use serde::{Serialize, Serializer};

use super::{END_MARK, EPSILON};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(String),
    Variable(String),
    Epsilon,
    EndMarker,
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::Variable(name) => name.as_str(),
            Symbol::Epsilon => EPSILON,
            Symbol::EndMarker => END_MARK,
        }
    }

    pub fn variable(&self) -> Option<&str> {
        match self {
            Symbol::Variable(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A rewrite rule `left -> right`. The right side is never empty; an
/// empty-string production is a lone [`Symbol::Epsilon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    left: String,
    right: Vec<Symbol>,
}

impl Production {
    pub(crate) fn new(left: String, right: Vec<Symbol>) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &[Symbol] {
        &self.right
    }

    pub fn is_epsilon(&self) -> bool {
        self.right == [Symbol::Epsilon]
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.left)?;
        for symbol in &self.right {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// A classified grammar. Built once by [`Grammar::classify`] or
/// [`Grammar::parse`] and never mutated afterwards.
///
/// Variables and terminals keep the order in which they were first seen.
/// Equality compares productions in order and the symbol sets by membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    productions: Vec<Production>,
    variables: IndexSet<String>,
    terminals: IndexSet<String>,
}

impl Grammar {
    pub(crate) fn new() -> Self {
        Self {
            productions: Vec::new(),
            variables: IndexSet::new(),
            terminals: IndexSet::new(),
        }
    }

    pub(crate) fn add_production(&mut self, left: String, right: Vec<Symbol>) {
        self.variables.insert(left.clone());
        for symbol in &right {
            match symbol {
                Symbol::Variable(name) => {
                    self.variables.insert(name.clone());
                }
                Symbol::Terminal(name) => {
                    self.terminals.insert(name.clone());
                }
                Symbol::Epsilon | Symbol::EndMarker => {}
            }
        }
        self.productions.push(Production::new(left, right));
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn productions_of<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a Production> {
        self.productions.iter().filter(move |p| p.left == variable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.as_str())
    }

    pub fn terminals(&self) -> impl Iterator<Item = &str> {
        self.terminals.iter().map(|t| t.as_str())
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains(name)
    }

    /// The left side of the first production.
    pub fn start_symbol(&self) -> Option<&str> {
        self.productions.first().map(|p| p.left())
    }

    /// One `L -> X1 ... Xk` line per production, accepted back by [`Grammar::classify`].
    pub fn to_production_strings(&self) -> Vec<String> {
        self.productions.iter().map(|p| p.to_string()).collect()
    }
}
