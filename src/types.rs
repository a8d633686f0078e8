//! This module defines the core data structures shared by both automaton engines, including
//! symbols and alphabets, the parsed table representations, acceptance verdicts, and error types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The table file loaded by the interactive NFA prompt when none is given.
pub const DEFAULT_NFA_TABLE: &str = "nfsm.txt";
/// The maximum allowed size for a table file in bytes.
pub const MAX_TABLE_SIZE: usize = 65536; // 64KB

/// A state identifier. States are numbered densely by the order their rows appear in the table,
/// and state `0` is always the start state.
pub type StateId = usize;

/// The start state of every automaton.
pub const START_STATE: StateId = 0;

/// An ordered set of states, used for NFA transition targets and the walk's current states.
pub type StateSet = BTreeSet<StateId>;

/// A single input token drawn from an automaton's alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub char);

impl Symbol {
    /// Splits an input string into one symbol per character.
    pub fn word(input: &str) -> Vec<Symbol> {
        input.chars().map(Symbol).collect()
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol(c)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ordered list of symbols declared on the first line of a table.
///
/// A symbol's position selects the table column holding its transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet(Vec<Symbol>);

impl Alphabet {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    /// Returns the column index of `symbol`, or `None` if it was never declared.
    pub fn index_of(&self, symbol: Symbol) -> Option<usize> {
        self.0.iter().position(|&s| s == symbol)
    }

    /// Returns the symbol that owns column `index`.
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.0.get(index).copied()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Symbol> for Alphabet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self
            .0
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{symbols}}}")
    }
}

/// A single cell of a deterministic table, as written in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfaCell {
    /// The explicit final marker. The row's state is final and this cell loops back to it.
    Final,
    /// An integer target. Negative values are sentinel-final targets.
    Target(i64),
}

/// A parsed deterministic transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaTable {
    pub alphabet: Alphabet,
    /// Row `i` holds the cells of state `i`, in alphabet order.
    pub rows: Vec<Vec<DfaCell>>,
}

/// A single row of a nondeterministic table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfaRow {
    /// Whether the row carried the final marker.
    pub is_final: bool,
    /// One target set per alphabet column. Columns past the end of a short row have no moves.
    pub cells: Vec<StateSet>,
}

/// A parsed nondeterministic transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfaTable {
    pub alphabet: Alphabet,
    pub rows: Vec<NfaRow>,
}

/// Which of the two engines a table is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    Deterministic,
    Nondeterministic,
}

impl TableKind {
    /// The file extension used for tables of this kind.
    pub fn extension(self) -> &'static str {
        match self {
            TableKind::Deterministic => "dfa",
            TableKind::Nondeterministic => "nfa",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "dfa" => Some(TableKind::Deterministic),
            "nfa" => Some(TableKind::Nondeterministic),
            _ => None,
        }
    }
}

/// A loaded table of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Table {
    Deterministic(DfaTable),
    Nondeterministic(NfaTable),
}

impl Table {
    pub fn kind(&self) -> TableKind {
        match self {
            Table::Deterministic(_) => TableKind::Deterministic,
            Table::Nondeterministic(_) => TableKind::Nondeterministic,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        match self {
            Table::Deterministic(table) => &table.alphabet,
            Table::Nondeterministic(table) => &table.alphabet,
        }
    }

    /// Returns the number of declared states.
    pub fn state_count(&self) -> usize {
        match self {
            Table::Deterministic(table) => table.rows.len(),
            Table::Nondeterministic(table) => table.rows.len(),
        }
    }
}

/// The outcome of a single acceptance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted(Acceptance),
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted(acceptance) => write!(f, "accepted: {acceptance}"),
            Verdict::Rejected(rejection) => write!(f, "rejected: {rejection}"),
        }
    }
}

/// Why an input was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acceptance {
    /// The input was exhausted in this final state.
    FinalState(StateId),
    /// A final state was current before the symbol at `position` was consumed.
    ReachedFinal { state: StateId, position: usize },
    /// The symbol at `position` led to a negative sentinel target.
    Sentinel { value: i64, position: usize },
}

impl fmt::Display for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acceptance::FinalState(state) => write!(f, "ended in final state {state}"),
            Acceptance::ReachedFinal { state, position } => {
                write!(f, "reached final state {state} before symbol {position}")
            }
            Acceptance::Sentinel { value, position } => {
                write!(f, "symbol {position} led to sentinel {value}")
            }
        }
    }
}

/// Why an input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The input was exhausted and none of these states is final.
    NotFinal { states: Vec<StateId> },
    /// The symbol at `position` is not part of the alphabet.
    InvalidSymbol { symbol: Symbol, position: usize },
    /// No state was left after consuming the symbol at `position`.
    DeadEnd { position: usize },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotFinal { states } => write!(f, "no final state in {states:?}"),
            Rejection::InvalidSymbol { symbol, position } => {
                write!(f, "invalid input symbol '{symbol}' at position {position}")
            }
            Rejection::DeadEnd { position } => {
                write!(f, "no reachable state after symbol {position}")
            }
        }
    }
}

/// Represents the errors that can occur while loading a transition table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FsmError {
    /// Indicates a syntax error in the table text.
    #[error("Table parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a table that parsed but cannot be executed.
    #[error("Table validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to reading table files.
    #[error("File error: {0}")]
    FileError(String),
}
