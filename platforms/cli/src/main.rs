mod logging;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tablefsm::{
    Automaton, FsmError, Machine, Rejection, SampleManager, Symbol, TableKind, TableLoader, Verdict,
    DEFAULT_NFA_TABLE,
};
use tracing::debug;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  tablefsm-cli dfa dfsm.txt 0110
  tablefsm-cli nfa --table nfsm.txt 1101
  echo 0101 | tablefsm-cli sample ends-with-01")]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// How to print the verdict
    #[clap(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Log table construction (-v) or every transition (-vv) to stderr
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Check a string against a deterministic transition table
    Dfa {
        /// The transition table file
        table: PathBuf,

        /// The string to check
        input: String,
    },

    /// Check a string against a nondeterministic transition table
    Nfa {
        /// The transition table file
        #[clap(short, long, default_value = DEFAULT_NFA_TABLE)]
        table: PathBuf,

        /// The string to check. Read from stdin when omitted
        input: Option<String>,
    },

    /// Check a string against one of the built-in tables
    Sample {
        /// The name of the built-in table
        name: String,

        /// The string to check. Read from stdin when omitted
        input: Option<String>,
    },

    /// List the built-in tables, or print one of them
    Samples {
        /// Print the text of this table instead of the list
        name: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// The JSON form of a single check.
#[derive(Serialize)]
struct Report<'a> {
    kind: TableKind,
    input: &'a str,
    accepted: bool,
    verdict: &'a Verdict,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Dfa { table, input } => {
            let machine = load_or_exit(&table, TableKind::Deterministic);
            check(&machine, &input, cli.format);
        }
        Command::Nfa { table, input } => {
            let machine = load_or_exit(&table, TableKind::Nondeterministic);
            let input = input.unwrap_or_else(prompt_or_exit);
            check(&machine, &input, cli.format);
        }
        Command::Sample { name, input } => {
            let machine = SampleManager::get_machine_by_name(&name).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            let input = input.unwrap_or_else(prompt_or_exit);
            check(&machine, &input, cli.format);
        }
        Command::Samples { name: Some(name) } => match SampleManager::get_sample_by_name(&name) {
            Ok(sample) => print!("{}", sample.text),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Command::Samples { name: None } => list_samples(),
    }
}

/// Loads and builds a machine, or reports the cause and exits without a verdict.
fn load_or_exit(path: &Path, kind: TableKind) -> Machine {
    match TableLoader::load_machine(path, kind) {
        Ok(machine) => {
            debug!(path = %path.display(), states = machine.state_count(), "loaded table");
            machine
        }
        Err(e) => {
            eprintln!("Error reading the file: {}", e);
            std::process::exit(1);
        }
    }
}

/// Asks for one line of input on stdin.
fn prompt() -> Result<String, FsmError> {
    let io_error = |e: io::Error| FsmError::FileError(format!("Failed to read input: {}", e));

    // Only prompt a person; piped input is read silently.
    if atty::is(atty::Stream::Stdin) {
        print!("Enter the string to check: ");
        io::stdout().flush().map_err(io_error)?;
    }

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).map_err(io_error)?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_or_exit() -> String {
    prompt().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}

fn check(machine: &Machine, input: &str, format: Format) {
    let verdict = machine.run(&Symbol::word(input));

    match format {
        Format::Text => print_text(machine.kind(), input, &verdict),
        Format::Json => {
            let report = Report {
                kind: machine.kind(),
                input,
                accepted: verdict.is_accepted(),
                verdict: &verdict,
            };
            match serde_json::to_string(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
    }
}

fn print_text(kind: TableKind, input: &str, verdict: &Verdict) {
    if let Verdict::Rejected(Rejection::InvalidSymbol { symbol, .. }) = verdict {
        println!("Invalid input symbol: {}", symbol);
    }

    match (kind, verdict.is_accepted()) {
        (TableKind::Deterministic, true) => println!("The string is accepted by the FSM."),
        (TableKind::Deterministic, false) => println!("The string is not accepted by the FSM."),
        (TableKind::Nondeterministic, true) => println!("The string \"{}\" is accepted.", input),
        (TableKind::Nondeterministic, false) => {
            println!("The string \"{}\" is not accepted.", input)
        }
    }
}

fn list_samples() {
    for index in 0..SampleManager::get_sample_count() {
        if let Ok(info) = SampleManager::get_sample_info(index) {
            println!(
                "{:<20} {}  {} states over {}",
                info.name,
                info.kind.extension(),
                info.state_count,
                info.alphabet
            );
        }
    }
}
