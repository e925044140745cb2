use clap::{Args, Parser, Subcommand};
use cfg_engine::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_STEPS, Generator, Grammar, Membership, derivation, fixtures,
    loader, recognizer, report,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate strings from context-free grammars and decide membership by derivation search
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GrammarSource {
    /// Grammar file: JSON definition (`.json`) or `<S> ::= [...]` rule statements
    #[arg(short, long)]
    grammar: Option<PathBuf>,

    /// Built-in grammar to use when no file is given (anbn, parens, arithmetic)
    #[arg(long, default_value = "anbn")]
    fixture: String,

    /// Override the start symbol
    #[arg(short, long)]
    start: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the walkthrough report for S -> aSb | ε and the a^n b^n c^n recognizer
    Demo {
        /// Seed for reproducible generation
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print a grammar
    Show {
        #[command(flatten)]
        source: GrammarSource,

        /// Print the JSON definition instead
        #[arg(long)]
        json: bool,
    },
    /// Generate distinct random strings from a grammar
    Generate {
        #[command(flatten)]
        source: GrammarSource,

        /// Number of strings to generate
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Maximum length of each string
        #[arg(long, default_value_t = 10)]
        max_length: usize,

        /// Maximum expansion depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Seed for reproducible generation
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Decide membership of strings and print a derivation
    Derive {
        #[command(flatten)]
        source: GrammarSource,

        /// Strings to test
        #[arg(required = true)]
        targets: Vec<String>,

        /// Derivation step budget
        #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
        max_steps: usize,

        /// Search breadth-first for a derivation with the fewest steps
        #[arg(long)]
        shortest: bool,

        /// Fail on characters no terminal can produce
        #[arg(long)]
        strict: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check strings against a^n b^n c^n (n >= 1)
    Recognize {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
}

#[derive(Serialize)]
struct DeriveOutput<'a> {
    input: &'a str,
    #[serde(flatten)]
    membership: Membership,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { seed } => {
            print!("{}", report::demo_report(seed)?);
        }
        Commands::Show { source, json } => {
            let grammar = load_grammar(&source)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&grammar.definition())?);
            } else {
                println!("{}", grammar);
            }
        }
        Commands::Generate {
            source,
            count,
            max_length,
            max_depth,
            seed,
        } => {
            let grammar = load_grammar(&source)?;
            let generated = match seed {
                Some(seed) => Generator::seeded(&grammar, seed).generate(count, max_length, max_depth),
                None => grammar.generate(count, max_length, max_depth),
            };

            if generated.len() < count {
                eprintln!(
                    "Found {} of {} requested strings within the attempt budget.",
                    generated.len(),
                    count
                );
            }
            for (i, text) in generated.iter().enumerate() {
                println!("{}. {:?}", i + 1, text);
            }
        }
        Commands::Derive {
            source,
            targets,
            max_steps,
            shortest,
            strict,
            json,
        } => {
            let grammar = load_grammar(&source)?;
            let mut outputs = Vec::with_capacity(targets.len());

            for target in &targets {
                if strict {
                    derivation::check_alphabet(&grammar, target)?;
                }
                outputs.push(DeriveOutput {
                    input: target,
                    membership: search(&grammar, target, max_steps, shortest),
                });
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
            } else {
                for output in &outputs {
                    println!("{:?}: {}", output.input, output.membership.is_member);
                    if output.membership.is_member {
                        println!("  {}", output.membership);
                    }
                }
            }
        }
        Commands::Recognize { inputs } => {
            for input in &inputs {
                println!("{:?}: {}", input, recognizer::recognize(input));
            }
        }
    }

    Ok(())
}

fn search(grammar: &Grammar, target: &str, max_steps: usize, shortest: bool) -> Membership {
    if shortest {
        grammar.derive_shortest(target, max_steps)
    } else {
        grammar.derive_membership(target, max_steps)
    }
}

fn load_grammar(source: &GrammarSource) -> Result<Grammar, Box<dyn std::error::Error>> {
    let start = source.start.as_deref();

    if let Some(path) = &source.grammar {
        return Ok(loader::from_file(path, start)?);
    }

    let grammar = fixtures::by_name(&source.fixture).ok_or_else(|| {
        format!(
            "Unknown fixture: {} (expected one of {})",
            source.fixture,
            fixtures::NAMES.join(", ")
        )
    })??;

    match start {
        Some(start) => {
            let mut definition = grammar.definition();
            definition.start_symbol = start.to_string();
            Ok(Grammar::from_definition(definition)?)
        }
        None => Ok(grammar),
    }
}
