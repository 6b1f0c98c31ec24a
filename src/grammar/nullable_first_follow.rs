use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use super::{grammar::Symbol, Grammar};

pub type SymbolSet = IndexSet<Symbol>;

/// Unions `candidates` into `set` and reports whether it grew.
pub fn grow<I>(mut set: SymbolSet, candidates: I) -> (SymbolSet, bool)
where
    I: IntoIterator<Item = Symbol>,
{
    let before = set.len();
    set.extend(candidates);
    let grew = set.len() > before;
    (set, grew)
}

/// A set of symbols per variable, in the grammar's variable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SetTable(IndexMap<String, SymbolSet>);

/// `Variable -> {Terminal, Epsilon}`
pub type FirstSetTable = SetTable;
/// `Variable -> {Terminal, EndMarker}`
pub type FollowSetTable = SetTable;

impl SetTable {
    fn for_variables(grammar: &Grammar) -> Self {
        Self(
            grammar
                .variables()
                .map(|v| (v.to_string(), SymbolSet::new()))
                .collect(),
        )
    }

    fn update(&mut self, variable: &str, candidates: SymbolSet) -> bool {
        match self.0.get_mut(variable) {
            Some(entry) => {
                let (grown, grew) = grow(std::mem::take(entry), candidates);
                *entry = grown;
                grew
            }
            None => false,
        }
    }

    pub fn get(&self, variable: &str) -> Option<&SymbolSet> {
        self.0.get(variable)
    }

    pub fn contains(&self, variable: &str, symbol: &Symbol) -> bool {
        self.get(variable).map_or(false, |set| set.contains(symbol))
    }

    /// Whether `variable` derives the empty string. Only meaningful on a FIRST table.
    pub fn is_nullable(&self, variable: &str) -> bool {
        self.contains(variable, &Symbol::Epsilon)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolSet)> {
        self.0.iter().map(|(v, set)| (v.as_str(), set))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every entry of `self` is contained in the same entry of `other`.
    pub fn is_subset(&self, other: &SetTable) -> bool {
        self.iter().all(|(v, set)| {
            other
                .get(v)
                .map_or(set.is_empty(), |theirs| set.is_subset(theirs))
        })
    }

    /// One entry sorted by symbol name, for stable output.
    pub fn sorted(&self, variable: &str) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self
            .get(variable)
            .map(|set| set.iter().collect())
            .unwrap_or_default();
        symbols.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        symbols
    }

    pub fn sorted_names(&self, variable: &str) -> Vec<&str> {
        self.sorted(variable).into_iter().map(|s| s.name()).collect()
    }
}

/// FIRST of a symbol sequence: scan the nullable prefix, and add ε when the
/// whole sequence is nullable. The empty sequence yields `{ε}`.
pub fn first_of_sequence(symbols: &[Symbol], first: &FirstSetTable) -> SymbolSet {
    let mut result = SymbolSet::new();
    for symbol in symbols {
        match symbol {
            Symbol::Terminal(_) | Symbol::EndMarker => {
                result.insert(symbol.clone());
                return result;
            }
            Symbol::Variable(name) => {
                let Some(set) = first.get(name) else {
                    return result;
                };
                result.extend(set.iter().filter(|s| **s != Symbol::Epsilon).cloned());
                if !set.contains(&Symbol::Epsilon) {
                    return result;
                }
            }
            Symbol::Epsilon => {}
        }
    }
    result.insert(Symbol::Epsilon);
    result
}

/// Computes FIRST one pass over the productions at a time.
pub struct FirstSetEngine<'g> {
    grammar: &'g Grammar,
    table: FirstSetTable,
    passes: usize,
}

impl<'g> FirstSetEngine<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            table: SetTable::for_variables(grammar),
            passes: 0,
        }
    }

    /// Runs one full pass; returns whether any set grew.
    pub fn pass(&mut self) -> bool {
        let mut changed = false;
        for production in self.grammar.productions() {
            let candidates = first_of_sequence(production.right(), &self.table);
            changed |= self.table.update(production.left(), candidates);
        }
        self.passes += 1;
        trace!(pass = self.passes, changed, "FIRST pass");
        changed
    }

    pub fn table(&self) -> &FirstSetTable {
        &self.table
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn finish(self) -> FirstSetTable {
        self.table
    }
}

/// Computes FOLLOW against a finished FIRST table, one pass at a time.
pub struct FollowSetEngine<'g> {
    grammar: &'g Grammar,
    first: &'g FirstSetTable,
    table: FollowSetTable,
    passes: usize,
}

impl<'g> FollowSetEngine<'g> {
    pub fn new(grammar: &'g Grammar, first: &'g FirstSetTable) -> Self {
        let mut table = SetTable::for_variables(grammar);
        if let Some(start) = grammar.start_symbol() {
            table.update(start, SymbolSet::from([Symbol::EndMarker]));
        }
        Self {
            grammar,
            first,
            table,
            passes: 0,
        }
    }

    /// Runs one full pass; returns whether any set grew.
    pub fn pass(&mut self) -> bool {
        let mut changed = false;
        for production in self.grammar.productions() {
            let right = production.right();
            for (i, symbol) in right.iter().enumerate() {
                let Some(variable) = symbol.variable() else {
                    continue;
                };
                let beta = first_of_sequence(&right[i + 1..], self.first);
                let inherits = beta.contains(&Symbol::Epsilon);

                let mut candidates: SymbolSet =
                    beta.into_iter().filter(|s| *s != Symbol::Epsilon).collect();
                if inherits {
                    if let Some(left_follow) = self.table.get(production.left()) {
                        candidates.extend(left_follow.iter().cloned());
                    }
                }
                changed |= self.table.update(variable, candidates);
            }
        }
        self.passes += 1;
        trace!(pass = self.passes, changed, "FOLLOW pass");
        changed
    }

    pub fn table(&self) -> &FollowSetTable {
        &self.table
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn finish(self) -> FollowSetTable {
        self.table
    }
}

#[instrument(skip_all)]
pub fn compute_first(grammar: &Grammar) -> FirstSetTable {
    let mut engine = FirstSetEngine::new(grammar);
    while engine.pass() {}
    debug!(passes = engine.passes(), "FIRST reached a fixed point");
    engine.finish()
}

#[instrument(skip_all)]
pub fn compute_follow(grammar: &Grammar, first: &FirstSetTable) -> FollowSetTable {
    let mut engine = FollowSetEngine::new(grammar, first);
    while engine.pass() {}
    debug!(passes = engine.passes(), "FOLLOW reached a fixed point");
    engine.finish()
}

impl Grammar {
    pub fn calculate_nullable_first_follow(&self) -> (FirstSetTable, FollowSetTable) {
        let first = compute_first(self);
        let follow = compute_follow(self, &first);
        (first, follow)
    }
}
