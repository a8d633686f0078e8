//! This crate provides table-driven finite state machines.
//! It includes modules for parsing plain-text transition tables, validating them, and
//! simulating deterministic and nondeterministic automata to decide whether an input is accepted.

pub mod analyzer;
pub mod dfa;
pub mod loader;
pub mod machine;
pub mod nfa;
pub mod parser;
pub mod samples;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the table analysis entry points and `AnalysisError`.
pub use analyzer::{analyze_dfa, analyze_nfa, AnalysisError};
/// Re-exports the deterministic engine.
pub use dfa::{DeterministicAutomaton, Target};
/// Re-exports the `TableLoader` struct from the loader module.
pub use loader::TableLoader;
/// Re-exports the `Automaton` trait and the `Machine` wrapper.
pub use machine::{Automaton, Machine};
/// Re-exports the nondeterministic engine.
pub use nfa::NondeterministicAutomaton;
/// Re-exports the parse functions from the parser module.
pub use parser::{parse_dfa, parse_nfa};
/// Re-exports `Sample`, `SampleInfo`, `SampleManager`, and `SAMPLES` from the samples module.
pub use samples::{Sample, SampleInfo, SampleManager, SAMPLES};
/// Re-exports the table, symbol, verdict, and error types from the types module.
pub use types::{
    Acceptance, Alphabet, DfaCell, DfaTable, FsmError, NfaRow, NfaTable, Rejection, StateId,
    StateSet, Symbol, Table, TableKind, Verdict, DEFAULT_NFA_TABLE, MAX_TABLE_SIZE, START_STATE,
};
