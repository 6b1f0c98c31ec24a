extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

mod error;
pub mod grammar;

pub use error::GrammarError;
pub use grammar::nullable_first_follow::{
    compute_first, compute_follow, first_of_sequence, grow, FirstSetEngine, FirstSetTable,
    FollowSetEngine, FollowSetTable, SetTable, SymbolSet,
};
pub use grammar::pretty_print::{AnalysisRequest, AnalysisResponse};
pub use grammar::{Grammar, Production, Symbol};

/// A grammar together with its finished FIRST and FOLLOW tables.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub grammar: Grammar,
    pub first: FirstSetTable,
    pub follow: FollowSetTable,
}

/// classify, then FIRST, then FOLLOW.
pub fn analyze<S: AsRef<str>>(productions: &[S]) -> Result<Analysis, GrammarError> {
    let grammar = Grammar::classify(productions)?;
    Ok(Analysis::of(grammar))
}

impl Analysis {
    pub fn of(grammar: Grammar) -> Self {
        let (first, follow) = grammar.calculate_nullable_first_follow();
        Self {
            grammar,
            first,
            follow,
        }
    }
}

fn error_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

/// Takes `{"productions": [...]}` and answers with the grammar lists and the
/// FIRST/FOLLOW tables, or `{"error": ...}`.
#[wasm_bindgen]
pub fn analyze_to_json(request: &str) -> String {
    let request: AnalysisRequest = match serde_json::from_str(request) {
        Ok(r) => r,
        Err(e) => return error_json(e),
    };
    match analyze(&request.productions) {
        Ok(a) => serde_json::to_string(&a.to_response(true)).unwrap_or_else(error_json),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn nullable_first_follow_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => {
            let (first, follow) = g.calculate_nullable_first_follow();
            g.to_non_terminal_output_vec(&first, &follow)
                .to_json()
                .unwrap_or_else(error_json)
        }
        Err(e) => error_json(e),
    }
}


#[cfg(test)]
mod nullable_first_follow_test {
    use std::collections::BTreeSet;

    use crate::{
        analyze, compute_first, compute_follow, first_of_sequence, grow, FirstSetEngine,
        FirstSetTable, FollowSetEngine, Grammar, Symbol, SymbolSet,
    };

    fn set(table: &FirstSetTable, variable: &str) -> BTreeSet<String> {
        table
            .get(variable)
            .unwrap()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn names(symbols: &[&str]) -> BTreeSet<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    const SCENARIO_3: &[&str] = &[
        "S -> A",
        "S -> B C",
        "A -> a A S",
        "A -> D",
        "B -> b B",
        "B -> f A C",
        "B -> ε",
        "C -> c C",
        "C -> c",
        "D -> g D",
        "D -> C",
        "D -> ε",
    ];

    const EXPRESSIONS: &[&str] = &[
        "E -> T E'",
        "E' -> + T E'",
        "E' -> ε",
        "T -> F T'",
        "T' -> * F T'",
        "T' -> ε",
        "F -> ( E )",
        "F -> id",
    ];

    #[test]
    fn grow_reports_change() {
        let (s, grew) = grow(SymbolSet::new(), [Symbol::Epsilon]);
        assert!(grew);
        let (s, grew) = grow(s, [Symbol::Epsilon]);
        assert!(!grew);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn first_of_sequence_scans_nullable_prefix() {
        let g = Grammar::classify(SCENARIO_3).unwrap();
        let first = compute_first(&g);

        let b = Symbol::Variable("B".to_string());
        let d = Symbol::Variable("D".to_string());
        let c = Symbol::Variable("C".to_string());

        let seq = first_of_sequence(&[b.clone(), d.clone()], &first);
        assert!(seq.contains(&Symbol::Epsilon));
        let seq = first_of_sequence(&[b, c], &first);
        assert!(!seq.contains(&Symbol::Epsilon));
        assert!(first_of_sequence(&[], &first).contains(&Symbol::Epsilon));
    }

    #[test]
    fn scenario_1() {
        let a = analyze(&["E' -> E", "E -> E + n", "E -> n"]).unwrap();
        assert_eq!(set(&a.first, "E'"), names(&["n"]));
        assert_eq!(set(&a.first, "E"), names(&["n"]));
        assert_eq!(a.first.len(), 2);
    }

    #[test]
    fn scenario_2() {
        let a = analyze(&["S -> A B", "A -> a A", "A -> a", "B -> b B", "B -> b"]).unwrap();
        assert_eq!(set(&a.first, "S"), names(&["a"]));
        assert_eq!(set(&a.first, "A"), names(&["a"]));
        assert_eq!(set(&a.first, "B"), names(&["b"]));

        assert_eq!(set(&a.follow, "S"), names(&["$"]));
        assert_eq!(set(&a.follow, "A"), names(&["b"]));
        assert_eq!(set(&a.follow, "B"), names(&["$"]));
    }

    #[test]
    fn scenario_3() {
        let a = analyze(SCENARIO_3).unwrap();
        assert_eq!(set(&a.first, "D"), names(&["c", "g", "ε"]));
        assert!(set(&a.first, "S").is_superset(&names(&["a", "b", "c", "f", "g", "ε"])));
        assert_eq!(set(&a.first, "A"), names(&["a", "c", "g", "ε"]));
        assert_eq!(set(&a.first, "B"), names(&["b", "f", "ε"]));
        assert_eq!(set(&a.first, "C"), names(&["c"]));
    }

    #[test]
    fn escaped_terminals() {
        let a = analyze(&[
            "E -> T E'",
            "E' -> v T E'",
            "E' -> ε",
            "T -> F T'",
            "T' -> \\^ F T'",
            "T' -> ε",
            "F -> \\¬ F",
            "F -> id",
        ])
        .unwrap();
        assert_eq!(set(&a.first, "E"), names(&["\\¬", "id"]));
        assert_eq!(set(&a.first, "T"), names(&["\\¬", "id"]));
        assert_eq!(set(&a.first, "T'"), names(&["\\^", "ε"]));
        assert_eq!(set(&a.first, "E'"), names(&["v", "ε"]));

        assert_eq!(set(&a.follow, "E"), names(&["$"]));
        assert_eq!(set(&a.follow, "T"), names(&["v", "$"]));
        assert_eq!(set(&a.follow, "F"), names(&["\\^", "v", "$"]));
    }

    #[test]
    fn expression_grammar_follow() {
        let a = analyze(EXPRESSIONS).unwrap();
        assert_eq!(set(&a.first, "E"), names(&["(", "id"]));
        assert_eq!(set(&a.first, "E'"), names(&["+", "ε"]));
        assert_eq!(set(&a.first, "T'"), names(&["*", "ε"]));

        assert_eq!(set(&a.follow, "E"), names(&[")", "$"]));
        assert_eq!(set(&a.follow, "E'"), names(&[")", "$"]));
        assert_eq!(set(&a.follow, "T"), names(&["+", ")", "$"]));
        assert_eq!(set(&a.follow, "T'"), names(&["+", ")", "$"]));
        assert_eq!(set(&a.follow, "F"), names(&["*", "+", ")", "$"]));
    }

    #[test]
    fn follow_through_nullable_suffix() {
        let a = analyze(&[
            "S -> X Y Z",
            "X -> a X b",
            "X -> ɛ",
            "Y -> c Y Z c X",
            "Y -> d",
            "Z -> e Z Y e",
            "Z -> f",
        ])
        .unwrap();
        assert_eq!(set(&a.first, "S"), names(&["a", "c", "d"]));
        assert_eq!(set(&a.follow, "X"), names(&["b", "c", "d", "e", "f"]));
        assert_eq!(set(&a.follow, "Y"), names(&["e", "f"]));
        assert_eq!(set(&a.follow, "Z"), names(&["c", "d", "$"]));
    }

    #[test]
    fn passes_are_monotone() {
        let g = Grammar::classify(SCENARIO_3).unwrap();

        let mut engine = FirstSetEngine::new(&g);
        let mut previous = engine.table().clone();
        while engine.pass() {
            assert!(previous.is_subset(engine.table()));
            previous = engine.table().clone();
        }
        let first = engine.finish();
        assert_eq!(first, compute_first(&g));

        let mut engine = FollowSetEngine::new(&g, &first);
        let mut previous = engine.table().clone();
        while engine.pass() {
            assert!(previous.is_subset(engine.table()));
            previous = engine.table().clone();
        }
        assert_eq!(engine.finish(), compute_follow(&g, &first));
    }

    #[test]
    fn idempotent() {
        let g = Grammar::classify(EXPRESSIONS).unwrap();
        let first = compute_first(&g);
        assert_eq!(first, compute_first(&g));
        let follow = compute_follow(&g, &first);
        assert_eq!(follow, compute_follow(&g, &first));
    }

    #[test]
    fn independent_of_production_order() {
        let mut reversed = SCENARIO_3.to_vec();
        reversed.reverse();
        let a = analyze(SCENARIO_3).unwrap();
        let b = analyze(&reversed).unwrap();
        assert_eq!(a.first, b.first);
        // The start symbol changes with the order, so only FIRST is compared.
    }

    #[test]
    fn nullability_through_cycles() {
        let a = analyze(&["S -> A B", "A -> B", "A -> ε", "B -> A", "B -> b", "C -> C c"]).unwrap();
        assert!(a.first.is_nullable("S"));
        assert!(a.first.is_nullable("A"));
        assert!(a.first.is_nullable("B"));
        assert!(!a.first.is_nullable("C"));
        // C derives no terminal string at all.
        assert_eq!(set(&a.first, "C"), names(&[]));
    }

    #[test]
    fn follow_invariants() {
        for grammar in [SCENARIO_3, EXPRESSIONS] {
            let a = analyze(grammar).unwrap();
            let start = a.grammar.start_symbol().unwrap();
            assert!(a.follow.contains(start, &Symbol::EndMarker));
            for (_, follow) in a.follow.iter() {
                assert!(!follow.contains(&Symbol::Epsilon));
            }
        }
    }

    #[test]
    fn json_entry_points() {
        let out = crate::analyze_to_json(r#"{"productions": ["S -> a S", "S -> ε"]}"#);
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["FIRST"]["S"], serde_json::json!(["a", "ε"]));
        assert_eq!(json["FOLLOW"]["S"], serde_json::json!(["$"]));

        let out = crate::analyze_to_json(r#"{"productions": ["S -> X"]}"#);
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["error"], "The variable 'X' is used but never defined");

        let out = crate::nullable_first_follow_to_json("S -> a\n | ε");
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["data"][0]["nullable"], true);
    }
}
