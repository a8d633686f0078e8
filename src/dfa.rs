//! This module defines the `DeterministicAutomaton`, which walks a single current state across
//! the input using a transition table with exactly one target per state and symbol.
//!
//! Finality comes in two flavours. A state is final when its row carried the `-` marker; this is
//! resolved once, at construction, into the `finals` set. Independently, a transition may target
//! a negative sentinel value, and taking such a transition accepts immediately regardless of the
//! remaining input.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::analyzer::analyze_dfa;
use crate::machine::Automaton;
use crate::types::{
    Acceptance, Alphabet, DfaCell, DfaTable, FsmError, Rejection, StateId, Symbol, Verdict,
    START_STATE,
};

/// The target of a deterministic transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Move to an ordinary state.
    State(StateId),
    /// A negative target. Taking this transition accepts the input.
    Sentinel(i64),
}

/// A deterministic finite automaton built from a `DfaTable`.
///
/// The automaton is immutable once built. Every check keeps its current state on its own stack,
/// so one automaton can serve any number of checks, including concurrent ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterministicAutomaton {
    alphabet: Alphabet,
    rows: Vec<Vec<Target>>,
    finals: BTreeSet<StateId>,
    sentinels: BTreeSet<i64>,
}

impl DeterministicAutomaton {
    /// Builds an automaton from a parsed table.
    ///
    /// A `-` cell marks its row's state final and becomes a loopback to that state. Negative
    /// targets are recorded as sentinels.
    ///
    /// # Returns
    ///
    /// * `Ok(DeterministicAutomaton)` if the table can be executed.
    /// * `Err(FsmError::ValidationError)` if it has no states, ragged rows, or undefined targets.
    pub fn new(table: DfaTable) -> Result<Self, FsmError> {
        analyze_dfa(&table)?;

        let mut finals = BTreeSet::new();
        let mut sentinels = BTreeSet::new();
        let mut rows = Vec::with_capacity(table.rows.len());

        for (state, cells) in table.rows.into_iter().enumerate() {
            let mut row = Vec::with_capacity(cells.len());
            for cell in cells {
                row.push(match cell {
                    DfaCell::Final => {
                        finals.insert(state);
                        Target::State(state)
                    }
                    DfaCell::Target(value) if value < 0 => {
                        sentinels.insert(value);
                        Target::Sentinel(value)
                    }
                    // In range, checked by the analyzer.
                    DfaCell::Target(value) => Target::State(value as StateId),
                });
            }
            rows.push(row);
        }

        debug!(
            states = rows.len(),
            finals = ?finals,
            sentinels = ?sentinels,
            "built deterministic automaton"
        );

        Ok(Self {
            alphabet: table.alphabet,
            rows,
            finals,
            sentinels,
        })
    }

    /// The one-symbol transition function.
    ///
    /// Returns `None` if `state` does not exist or `symbol` is not in the alphabet.
    pub fn delta(&self, state: StateId, symbol: Symbol) -> Option<Target> {
        let column = self.alphabet.index_of(symbol)?;
        self.rows.get(state)?.get(column).copied()
    }

    /// Returns whether `state` was marked final.
    ///
    /// Sentinels are not states and are never reported here.
    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    pub fn finals(&self) -> &BTreeSet<StateId> {
        &self.finals
    }

    /// Returns every negative target that appears in the table.
    pub fn sentinels(&self) -> &BTreeSet<i64> {
        &self.sentinels
    }

    pub fn state_count(&self) -> usize {
        self.rows.len()
    }

    /// Decides acceptance with the recursive formulation of the extended transition function.
    ///
    /// It agrees with [`Automaton::is_accepted`] on every input. The recursion is one frame deep
    /// per symbol, so prefer the iterative walk for long inputs.
    pub fn accepts_recursive(&self, input: &[Symbol]) -> bool {
        self.accepts_from(START_STATE, input)
    }

    fn accepts_from(&self, state: StateId, input: &[Symbol]) -> bool {
        let Some((&symbol, rest)) = input.split_first() else {
            return self.is_final(state);
        };

        match self.alphabet.index_of(symbol) {
            None => false,
            Some(_) if self.is_final(state) => true,
            Some(column) => match self.rows[state][column] {
                Target::Sentinel(_) => true,
                Target::State(next) => self.accepts_from(next, rest),
            },
        }
    }

    fn walk(&self, input: &[Symbol]) -> Verdict {
        let mut current = START_STATE;

        for (position, &symbol) in input.iter().enumerate() {
            let Some(column) = self.alphabet.index_of(symbol) else {
                return Verdict::Rejected(Rejection::InvalidSymbol { symbol, position });
            };

            // A final state accepts before the next symbol is consumed.
            if self.is_final(current) {
                return Verdict::Accepted(Acceptance::ReachedFinal {
                    state: current,
                    position,
                });
            }

            match self.rows[current][column] {
                Target::State(next) => {
                    trace!(state = current, %symbol, next, "deterministic step");
                    current = next;
                }
                Target::Sentinel(value) => {
                    trace!(state = current, %symbol, sentinel = value, "deterministic step");
                    return Verdict::Accepted(Acceptance::Sentinel { value, position });
                }
            }
        }

        if self.is_final(current) {
            Verdict::Accepted(Acceptance::FinalState(current))
        } else {
            Verdict::Rejected(Rejection::NotFinal {
                states: vec![current],
            })
        }
    }
}

impl TryFrom<DfaTable> for DeterministicAutomaton {
    type Error = FsmError;

    fn try_from(table: DfaTable) -> Result<Self, Self::Error> {
        Self::new(table)
    }
}

impl Automaton for DeterministicAutomaton {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn run(&self, input: &[Symbol]) -> Verdict {
        let verdict = self.walk(input);
        debug!(symbols = input.len(), %verdict, "deterministic run finished");
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_dfa;

    fn dfa(text: &str) -> DeterministicAutomaton {
        DeterministicAutomaton::new(parse_dfa(text).unwrap()).unwrap()
    }

    fn word(input: &str) -> Vec<Symbol> {
        Symbol::word(input)
    }

    /// State 0 moves to 1 on '0' and stays on '1'; state 1 is final.
    const EARLY_FINAL: &str = "0, 1\n1, 0\n-, -\n";

    #[test]
    fn test_construction() {
        let automaton = dfa("0, 1\n1, -5\n-, 0\n");

        assert_eq!(automaton.state_count(), 2);
        assert_eq!(automaton.finals(), &BTreeSet::from([1]));
        assert_eq!(automaton.sentinels(), &BTreeSet::from([-5]));
        assert_eq!(automaton.delta(0, Symbol('0')), Some(Target::State(1)));
        assert_eq!(automaton.delta(0, Symbol('1')), Some(Target::Sentinel(-5)));
        // The marker cell loops back to its own row.
        assert_eq!(automaton.delta(1, Symbol('0')), Some(Target::State(1)));
        assert_eq!(automaton.delta(1, Symbol('1')), Some(Target::State(0)));
        assert_eq!(automaton.delta(2, Symbol('0')), None);
        assert_eq!(automaton.delta(0, Symbol('2')), None);
    }

    #[test_log::test]
    fn test_final_reached_before_last_symbol() {
        let automaton = dfa(EARLY_FINAL);

        assert_eq!(
            automaton.run(&word("01")),
            Verdict::Accepted(Acceptance::ReachedFinal {
                state: 1,
                position: 1
            })
        );
    }

    #[test_log::test]
    fn test_final_reached_at_end() {
        let automaton = dfa(EARLY_FINAL);

        assert_eq!(
            automaton.run(&word("10")),
            Verdict::Accepted(Acceptance::FinalState(1))
        );
    }

    #[test]
    fn test_not_final_at_end() {
        let automaton = dfa(EARLY_FINAL);

        assert_eq!(
            automaton.run(&word("111")),
            Verdict::Rejected(Rejection::NotFinal { states: vec![0] })
        );
    }

    #[test_log::test]
    fn test_sentinel_accepts_immediately() {
        let automaton = dfa("0, 1\n-5, 2\n0, 0\n0, -7\n");

        assert!(automaton.finals().is_empty());
        assert_eq!(
            automaton.run(&word("0")),
            Verdict::Accepted(Acceptance::Sentinel {
                value: -5,
                position: 0
            })
        );
        // The suffix after the sentinel is never looked at, not even for validity.
        assert!(automaton.accepts_str("0111x"));
        assert!(automaton.accepts_str("11"));
        assert!(!automaton.accepts_str("10"));
    }

    #[test]
    fn test_invalid_symbol() {
        let automaton = dfa(EARLY_FINAL);

        assert_eq!(
            automaton.run(&word("2")),
            Verdict::Rejected(Rejection::InvalidSymbol {
                symbol: Symbol('2'),
                position: 0
            })
        );
    }

    #[test]
    fn test_invalid_symbol_wins_over_final_state() {
        let automaton = dfa(EARLY_FINAL);

        // State 1 is current when 'x' is read, but the symbol is checked first.
        assert_eq!(
            automaton.run(&word("0x")),
            Verdict::Rejected(Rejection::InvalidSymbol {
                symbol: Symbol('x'),
                position: 1
            })
        );
        assert!(!automaton.accepts_recursive(&word("0x")));
    }

    #[test]
    fn test_empty_input() {
        assert!(!dfa(EARLY_FINAL).is_accepted(&[]));
        assert!(dfa("0\n-\n").is_accepted(&[]));
        assert_eq!(
            dfa("0\n-\n").run(&[]),
            Verdict::Accepted(Acceptance::FinalState(0))
        );
    }

    #[test]
    fn test_recursive_agrees_with_iterative() {
        let tables = [
            EARLY_FINAL,
            "0, 1\n-5, 2\n0, 0\n1, 1\n",
            "0, 1\n0, 1\n0, 2\n-, -\n",
            "a, b\n1, 2\n2, -1\n-, 0\n",
        ];

        for text in tables {
            let automaton = dfa(text);
            let symbols = automaton.alphabet().symbols().to_vec();

            // Every word over the alphabet up to length 5.
            let mut words: Vec<Vec<Symbol>> = vec![vec![]];
            for _ in 0..5 {
                let longer: Vec<Vec<Symbol>> = words
                    .iter()
                    .filter(|w| w.len() == words.last().map_or(0, |l| l.len()))
                    .flat_map(|w| {
                        symbols.iter().map(move |&s| {
                            let mut next = w.clone();
                            next.push(s);
                            next
                        })
                    })
                    .collect();
                words.extend(longer);
            }

            for w in &words {
                assert_eq!(
                    automaton.is_accepted(w),
                    automaton.accepts_recursive(w),
                    "table {text:?} disagrees on {w:?}"
                );
            }
        }
    }

    #[test]
    fn test_new_rejects_undefined_target() {
        let table = DfaTable {
            alphabet: Alphabet::new(vec![Symbol('0')]),
            rows: vec![vec![DfaCell::Target(4)]],
        };

        assert!(matches!(
            DeterministicAutomaton::try_from(table),
            Err(FsmError::ValidationError(_))
        ));
    }
}
