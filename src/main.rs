use std::{error::Error, io::Read, path::PathBuf};

use clap::{Parser, ValueEnum};
use first_follow::{Analysis, AnalysisRequest, Grammar};
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Output {
    /// Productions
    Prod,
    /// FIRST sets
    First,
    /// FIRST and FOLLOW sets
    Follow,
    /// Nullable, first and follow table
    Nff,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// What to print.
    #[arg(required = true, value_enum)]
    outputs: Vec<Output>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// Read a JSON request `{"productions": [...]}` instead of one production per line.
    #[arg(short, long, default_value_t = false)]
    request: bool,

    /// The grammar file. Reads stdin when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,
}

fn read_input(file: Option<&PathBuf>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().lock().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn sets_plaintext(analysis: &Analysis, with_follow: bool) -> String {
    analysis
        .grammar
        .variables()
        .map(|v| {
            let mut line = format!("FIRST({}) = {{{}}}", v, analysis.first.sorted_names(v).join(", "));
            if with_follow {
                line += &format!(
                    "  FOLLOW({}) = {{{}}}",
                    v,
                    analysis.follow.sorted_names(v).join(", ")
                );
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let input = read_input(args.input.as_ref())?;
    tracing::debug!("input:\n{}", input);

    let grammar = if args.request {
        let request: AnalysisRequest = serde_json::from_str(&input)?;
        Grammar::classify(&request.productions)?
    } else {
        Grammar::parse(&input)?
    };
    let analysis = Analysis::of(grammar);

    for output in args.outputs {
        let text = match output {
            Output::Prod => {
                let t = analysis.grammar.to_production_output_vec();
                match args.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => serde_json::to_string(&analysis.grammar.to_grammar_output())?,
                }
            }
            Output::First | Output::Follow => {
                let with_follow = output == Output::Follow;
                match args.format {
                    OutputFormat::Plain => sets_plaintext(&analysis, with_follow),
                    OutputFormat::Latex => {
                        let t = analysis
                            .grammar
                            .to_non_terminal_output_vec(&analysis.first, &analysis.follow);
                        let t = if with_follow { t } else { t.without_follow() };
                        t.to_latex()
                    }
                    OutputFormat::Json => serde_json::to_string(&analysis.to_response(with_follow))?,
                }
            }
            Output::Nff => {
                let t = analysis
                    .grammar
                    .to_non_terminal_output_vec(&analysis.first, &analysis.follow);
                match args.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => t.to_json()?,
                }
            }
        };
        println!("{}", text);
    }

    Ok(())
}
