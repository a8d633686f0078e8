//! This module defines the `Automaton` trait shared by both engines, and `Machine`, which wraps
//! whichever engine a loaded `Table` calls for so callers can drive either one uniformly.

use crate::dfa::DeterministicAutomaton;
use crate::nfa::NondeterministicAutomaton;
use crate::types::{Alphabet, FsmError, Symbol, Table, TableKind, Verdict};

/// A finite automaton that decides whether an input word is accepted.
///
/// Implementations are immutable: `run` keeps all of its working state local, so a single
/// automaton can be checked against any number of inputs.
pub trait Automaton {
    /// Returns the declared alphabet.
    fn alphabet(&self) -> &Alphabet;

    /// Runs the automaton over `input` and explains the outcome.
    fn run(&self, input: &[Symbol]) -> Verdict;

    /// Returns whether `input` is accepted.
    fn is_accepted(&self, input: &[Symbol]) -> bool {
        self.run(input).is_accepted()
    }

    /// Returns whether `input`, read one symbol per character, is accepted.
    fn accepts_str(&self, input: &str) -> bool {
        self.is_accepted(&Symbol::word(input))
    }
}

/// An automaton of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Machine {
    Deterministic(DeterministicAutomaton),
    Nondeterministic(NondeterministicAutomaton),
}

impl Machine {
    /// Builds the engine matching the kind of `table`.
    pub fn new(table: Table) -> Result<Self, FsmError> {
        Ok(match table {
            Table::Deterministic(table) => {
                Machine::Deterministic(DeterministicAutomaton::new(table)?)
            }
            Table::Nondeterministic(table) => {
                Machine::Nondeterministic(NondeterministicAutomaton::new(table)?)
            }
        })
    }

    pub fn kind(&self) -> TableKind {
        match self {
            Machine::Deterministic(_) => TableKind::Deterministic,
            Machine::Nondeterministic(_) => TableKind::Nondeterministic,
        }
    }

    pub fn state_count(&self) -> usize {
        match self {
            Machine::Deterministic(automaton) => automaton.state_count(),
            Machine::Nondeterministic(automaton) => automaton.state_count(),
        }
    }
}

impl TryFrom<Table> for Machine {
    type Error = FsmError;

    fn try_from(table: Table) -> Result<Self, Self::Error> {
        Self::new(table)
    }
}

impl Automaton for Machine {
    fn alphabet(&self) -> &Alphabet {
        match self {
            Machine::Deterministic(automaton) => automaton.alphabet(),
            Machine::Nondeterministic(automaton) => automaton.alphabet(),
        }
    }

    fn run(&self, input: &[Symbol]) -> Verdict {
        match self {
            Machine::Deterministic(automaton) => automaton.run(input),
            Machine::Nondeterministic(automaton) => automaton.run(input),
        }
    }
}
