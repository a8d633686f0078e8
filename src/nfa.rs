//! This module defines the `NondeterministicAutomaton`, which simulates an NFA by tracking the
//! full set of currently possible states and replacing it, symbol by symbol, with the union of
//! every member's transition set.
//!
//! Only the per-row `-` marker makes a state final here. Unlike the deterministic engine there
//! is no sentinel rule, and a symbol outside the alphabet is simply a step with no moves.

use tracing::{debug, trace};

use crate::analyzer::analyze_nfa;
use crate::machine::Automaton;
use crate::types::{
    Acceptance, Alphabet, FsmError, NfaTable, Rejection, StateId, StateSet, Symbol, Verdict,
    START_STATE,
};

/// A nondeterministic finite automaton built from an `NfaTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NondeterministicAutomaton {
    alphabet: Alphabet,
    /// Indexed by state, then by alphabet column. Every row spans the full alphabet.
    relation: Vec<Vec<StateSet>>,
    finals: StateSet,
}

impl NondeterministicAutomaton {
    /// Builds an automaton from a parsed table.
    ///
    /// Rows shorter than the alphabet are padded with empty sets, so every declared state has
    /// an entry for every symbol.
    ///
    /// # Returns
    ///
    /// * `Ok(NondeterministicAutomaton)` if the table can be executed.
    /// * `Err(FsmError::ValidationError)` if it has no states or a row wider than the alphabet.
    pub fn new(table: NfaTable) -> Result<Self, FsmError> {
        analyze_nfa(&table)?;

        let width = table.alphabet.len();
        let mut finals = StateSet::new();
        let mut relation = Vec::with_capacity(table.rows.len());

        for (state, row) in table.rows.into_iter().enumerate() {
            if row.is_final {
                finals.insert(state);
            }

            let mut cells = row.cells;
            cells.resize(width, StateSet::new());
            relation.push(cells);
        }

        debug!(
            states = relation.len(),
            finals = ?finals,
            "built nondeterministic automaton"
        );

        Ok(Self {
            alphabet: table.alphabet,
            relation,
            finals,
        })
    }

    /// Returns the transition set of `state` on `symbol`.
    ///
    /// `None` means there is no entry at all, either because the state was never declared or
    /// because the symbol is not in the alphabet. Both behave as the empty set.
    pub fn moves(&self, state: StateId, symbol: Symbol) -> Option<&StateSet> {
        let column = self.alphabet.index_of(symbol)?;
        self.relation.get(state)?.get(column)
    }

    /// Computes the states reachable from any member of `states` on one `symbol`.
    pub fn step(&self, states: &StateSet, symbol: Symbol) -> StateSet {
        let mut next = StateSet::new();

        for &state in states {
            match self.moves(state, symbol) {
                Some(targets) => {
                    trace!(state, %symbol, ?targets, "nondeterministic step");
                    next.extend(targets);
                }
                None => trace!(state, %symbol, "no transition"),
            }
        }

        next
    }

    /// The extended transition function: the set of states reachable from the start state
    /// after consuming all of `input`.
    ///
    /// Once the set is empty it stays empty, so the remaining symbols are skipped.
    pub fn extended_transition(&self, input: &[Symbol]) -> StateSet {
        input
            .iter()
            .fold(StateSet::from([START_STATE]), |current, &symbol| {
                if current.is_empty() {
                    current
                } else {
                    self.step(&current, symbol)
                }
            })
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    pub fn finals(&self) -> &StateSet {
        &self.finals
    }

    pub fn state_count(&self) -> usize {
        self.relation.len()
    }

    fn walk(&self, input: &[Symbol]) -> Verdict {
        let mut current = StateSet::from([START_STATE]);

        for (position, &symbol) in input.iter().enumerate() {
            current = self.step(&current, symbol);

            if current.is_empty() {
                return Verdict::Rejected(Rejection::DeadEnd { position });
            }
        }

        match current.iter().find(|&&state| self.is_final(state)) {
            Some(&state) => Verdict::Accepted(Acceptance::FinalState(state)),
            None => Verdict::Rejected(Rejection::NotFinal {
                states: current.into_iter().collect(),
            }),
        }
    }
}

impl TryFrom<NfaTable> for NondeterministicAutomaton {
    type Error = FsmError;

    fn try_from(table: NfaTable) -> Result<Self, Self::Error> {
        Self::new(table)
    }
}

impl Automaton for NondeterministicAutomaton {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn run(&self, input: &[Symbol]) -> Verdict {
        let verdict = self.walk(input);
        debug!(symbols = input.len(), %verdict, "nondeterministic run finished");
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_nfa;
    use crate::types::NfaRow;

    fn nfa(text: &str) -> NondeterministicAutomaton {
        NondeterministicAutomaton::new(parse_nfa(text).unwrap()).unwrap()
    }

    fn set(states: &[StateId]) -> StateSet {
        states.iter().copied().collect()
    }

    /// State 0 loops or guesses on '0' and dies on '1'; state 1 is final with no moves.
    const GUESS: &str = "0, 1\n{0 1}, {}\n- {}, {}\n";

    /// Accepts words ending in "01".
    const ENDS_WITH_01: &str = "0, 1\n{0 1}, {0}\n{}, {2}\n- {}, {}\n";

    #[test]
    fn test_construction_pads_short_rows() {
        let automaton = nfa("0, 1\n{1}\n-\n");

        assert_eq!(automaton.state_count(), 2);
        assert_eq!(automaton.finals(), &set(&[1]));
        assert_eq!(automaton.moves(0, Symbol('0')), Some(&set(&[1])));
        assert_eq!(automaton.moves(0, Symbol('1')), Some(&set(&[])));
        assert_eq!(automaton.moves(1, Symbol('1')), Some(&set(&[])));
        assert_eq!(automaton.moves(5, Symbol('0')), None);
        assert_eq!(automaton.moves(0, Symbol('x')), None);
    }

    #[test_log::test]
    fn test_guess_accepts() {
        let automaton = nfa(GUESS);

        assert_eq!(automaton.extended_transition(&Symbol::word("0")), set(&[0, 1]));
        assert_eq!(
            automaton.run(&Symbol::word("0")),
            Verdict::Accepted(Acceptance::FinalState(1))
        );
    }

    #[test_log::test]
    fn test_empty_set_rejects() {
        let automaton = nfa(GUESS);

        assert!(automaton.extended_transition(&Symbol::word("1")).is_empty());
        assert_eq!(
            automaton.run(&Symbol::word("1")),
            Verdict::Rejected(Rejection::DeadEnd { position: 0 })
        );
    }

    #[test]
    fn test_dead_prefix_rejects_every_extension() {
        let automaton = nfa(GUESS);

        for suffix in ["", "0", "1", "00", "0101", "111"] {
            let input = format!("1{suffix}");
            assert!(!automaton.accepts_str(&input), "accepted {input:?}");
        }
    }

    #[test]
    fn test_not_final_at_end() {
        let automaton = nfa(ENDS_WITH_01);

        assert_eq!(
            automaton.run(&Symbol::word("010")),
            Verdict::Rejected(Rejection::NotFinal {
                states: vec![0, 1]
            })
        );
    }

    #[test]
    fn test_ends_with_01() {
        let automaton = nfa(ENDS_WITH_01);

        for accepted in ["01", "001", "1101", "0101"] {
            assert!(automaton.accepts_str(accepted), "rejected {accepted:?}");
        }
        for rejected in ["", "0", "1", "10", "011", "0110"] {
            assert!(!automaton.accepts_str(rejected), "accepted {rejected:?}");
        }
    }

    #[test]
    fn test_symbol_outside_alphabet_has_no_moves() {
        let automaton = nfa(GUESS);

        assert!(automaton.step(&set(&[0, 1]), Symbol('7')).is_empty());
        assert_eq!(
            automaton.run(&Symbol::word("07")),
            Verdict::Rejected(Rejection::DeadEnd { position: 1 })
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(!nfa(GUESS).is_accepted(&[]));
        assert!(nfa("0\n- {0}\n").is_accepted(&[]));
    }

    #[test]
    fn test_undeclared_target_contributes_no_moves() {
        let automaton = nfa("0\n{0 9}\n");

        assert_eq!(
            automaton.extended_transition(&Symbol::word("0")),
            set(&[0, 9])
        );
        assert_eq!(
            automaton.extended_transition(&Symbol::word("00")),
            set(&[0, 9])
        );
        assert!(!automaton.accepts_str("00"));
    }

    #[test]
    fn test_step_is_union_of_single_moves() {
        let automaton = nfa(ENDS_WITH_01);
        let input = Symbol::word("0010110");

        let mut previous = StateSet::from([START_STATE]);
        for k in 1..=input.len() {
            let current = automaton.extended_transition(&input[..k]);
            let expected: StateSet = previous
                .iter()
                .flat_map(|&q| automaton.step(&StateSet::from([q]), input[k - 1]))
                .collect();
            assert_eq!(current, expected, "prefix of length {k}");
            previous = current;
        }
    }

    #[test]
    fn test_new_rejects_wide_row() {
        let table = NfaTable {
            alphabet: Alphabet::new(vec![Symbol('0')]),
            rows: vec![NfaRow {
                is_final: false,
                cells: vec![set(&[0]), set(&[0])],
            }],
        };

        assert!(matches!(
            NondeterministicAutomaton::try_from(table),
            Err(FsmError::ValidationError(_))
        ));
    }
}
