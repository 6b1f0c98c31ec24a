use crowbook_text_processing::escape;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    nullable_first_follow::{FirstSetTable, FollowSetTable},
    Grammar, Symbol, ESCAPE_PREFIX,
};
use crate::Analysis;

/// LaTeX for one symbol. Escaped terminals lose their `\` and are set in typewriter
/// font; ε works in both text and math mode.
fn symbol_tex(symbol: &Symbol) -> String {
    match symbol {
        Symbol::Epsilon => r"\ensuremath{\epsilon}".to_string(),
        Symbol::Terminal(name) => match name.strip_prefix(ESCAPE_PREFIX) {
            Some(raw) => format!(r"\texttt{{{}}}", escape::tex(raw)),
            None => escape::tex(name.as_str()).into_owned(),
        },
        _ => escape::tex(symbol.name()).into_owned(),
    }
}

/// Every alternative of one left side.
#[derive(Debug, Clone)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<&'a [Symbol]>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize) -> String {
        let mut lines = Vec::with_capacity(self.rights.len());
        for (i, right) in self.rights.iter().enumerate() {
            let right = right.iter().map(|s| s.name()).collect::<Vec<_>>().join(" ");
            lines.push(if i == 0 {
                format!("{:>width$} -> {}", self.left, right, width = left_width)
            } else {
                format!("{:>width$}  | {}", "", right, width = left_width)
            });
        }
        lines.join("\n")
    }

    /// One `array` row: `L & \rightarrow & X1 \ X2 \mid ...`.
    pub fn to_latex(&self) -> String {
        let rights = self
            .rights
            .iter()
            .map(|right| right.iter().map(symbol_tex).collect::<Vec<_>>().join(" \\ "))
            .collect::<Vec<_>>()
            .join(" \\mid ");
        format!("{} & \\rightarrow & {}", escape::tex(self.left), rights)
    }
}

pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex()))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    /// Productions grouped by left side, in order of first definition.
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let mut productions: Vec<ProductionOutput> = Vec::new();
        for production in self.productions() {
            let right = production.right();
            match productions.iter_mut().find(|p| p.left == production.left()) {
                Some(output) => output.rights.push(right),
                None => productions.push(ProductionOutput {
                    left: production.left(),
                    rights: vec![right],
                }),
            }
        }
        ProductionOutputVec { productions }
    }

    pub fn to_grammar_output(&self) -> GrammarOutput {
        GrammarOutput {
            productions: self.to_production_strings(),
            terminals: self.terminals().collect(),
            variables: self.variables().collect(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a Symbol>,
    follow: Vec<&'a Symbol>,
}

fn join_names(symbols: &[&Symbol]) -> String {
    symbols.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self, with_follow: bool) -> String {
        let mut row = format!(
            "{} | {} | {}",
            self.name,
            self.nullable,
            join_names(&self.first)
        );
        if with_follow {
            row += &format!(" | {}", join_names(&self.follow));
        }
        row
    }

    fn to_latex(&self, with_follow: bool) -> String {
        fn f(a: &[&Symbol]) -> String {
            a.iter().map(|s| symbol_tex(s)).collect::<Vec<_>>().join(r"\ ")
        }

        let mut row = format!(
            "{} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first)
        );
        if with_follow {
            row += &format!(" & {}", f(&self.follow));
        }
        row
    }
}

/// The nullable/FIRST/FOLLOW table, one row per variable.
#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
    #[serde(skip)]
    with_follow: bool,
}

impl NonTerminalOutputVec<'_> {
    /// Drops the FOLLOW column from the plaintext and LaTeX renderings.
    pub fn without_follow(mut self) -> Self {
        self.with_follow = false;
        self
    }

    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext(self.with_follow))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex(self.with_follow))
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        let (columns, header) = if self.with_follow {
            ("c|c|c|c", "Symbol & Nullable & First & Follow")
        } else {
            ("c|c|c", "Symbol & Nullable & First")
        };
        format!("\\begin{{tabular}}{{{columns}}}\n{header}\\\\\\hline\n{content}\\\\\n\\end{{tabular}}")
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec<'a>(
        &'a self,
        first: &'a FirstSetTable,
        follow: &'a FollowSetTable,
    ) -> NonTerminalOutputVec<'a> {
        let data = self
            .variables()
            .map(|name| NonTerminalOutput {
                name,
                nullable: first.is_nullable(name),
                first: first.sorted(name),
                follow: follow.sorted(name),
            })
            .collect();
        NonTerminalOutputVec {
            data,
            with_follow: true,
        }
    }
}

/// The classified grammar as plain lists.
#[derive(Debug, Serialize)]
pub struct GrammarOutput<'a> {
    pub productions: Vec<String>,
    pub terminals: Vec<&'a str>,
    pub variables: Vec<&'a str>,
}

/// `{"productions": ["S -> a", ...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub productions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse<'a> {
    #[serde(flatten)]
    pub grammar: GrammarOutput<'a>,
    #[serde(rename = "FIRST")]
    pub first: IndexMap<&'a str, Vec<&'a str>>,
    #[serde(rename = "FOLLOW", skip_serializing_if = "Option::is_none")]
    pub follow: Option<IndexMap<&'a str, Vec<&'a str>>>,
}

fn table_output<'a>(grammar: &'a Grammar, table: &'a FirstSetTable) -> IndexMap<&'a str, Vec<&'a str>> {
    grammar
        .variables()
        .map(|v| (v, table.sorted_names(v)))
        .collect()
}

impl Analysis {
    pub fn to_response(&self, with_follow: bool) -> AnalysisResponse<'_> {
        AnalysisResponse {
            grammar: self.grammar.to_grammar_output(),
            first: table_output(&self.grammar, &self.first),
            follow: with_follow.then(|| table_output(&self.grammar, &self.follow)),
        }
    }
}
