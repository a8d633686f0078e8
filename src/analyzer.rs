//! This module provides functions for analyzing parsed transition tables before they are
//! handed to an automaton engine. Only the properties the engines rely on are checked:
//! a usable alphabet, at least one state, consistent row widths, and in-range targets.

use crate::types::{Alphabet, DfaCell, DfaTable, FsmError, NfaTable, StateId, Symbol};
use std::collections::HashSet;
use tracing::warn;

/// Represents the problems that can be found while analyzing a transition table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The alphabet line declares no symbols.
    EmptyAlphabet,
    /// The alphabet declares the same symbol more than once.
    DuplicateSymbol(Symbol),
    /// The table has no state rows, so there is no start state.
    NoStates,
    /// A row has a number of cells its table kind does not allow.
    RowWidth {
        state: StateId,
        expected: usize,
        found: usize,
    },
    /// A deterministic cell names a state that has no row.
    UndefinedTarget {
        state: StateId,
        symbol: Symbol,
        target: i64,
    },
}

impl From<AnalysisError> for FsmError {
    /// Converts an `AnalysisError` into a `FsmError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::EmptyAlphabet => {
                FsmError::ValidationError("Alphabet declares no symbols".to_string())
            }
            AnalysisError::DuplicateSymbol(symbol) => {
                FsmError::ValidationError(format!("Duplicate alphabet symbol: {}", symbol))
            }
            AnalysisError::NoStates => {
                FsmError::ValidationError("Table has no states".to_string())
            }
            AnalysisError::RowWidth {
                state,
                expected,
                found,
            } => FsmError::ValidationError(format!(
                "State {} has {} transitions, expected {}",
                state, found, expected
            )),
            AnalysisError::UndefinedTarget {
                state,
                symbol,
                target,
            } => FsmError::ValidationError(format!(
                "State {} on '{}' targets undefined state {}",
                state, symbol, target
            )),
        }
    }
}

/// Analyzes a deterministic table.
///
/// Every row must have exactly one cell per alphabet symbol, and every non-negative target
/// must name an existing row. Negative targets are sentinels and are always allowed.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(FsmError::ValidationError)` describing the first violated check.
pub fn analyze_dfa(table: &DfaTable) -> Result<(), FsmError> {
    let checks: [fn(&DfaTable) -> Result<(), AnalysisError>; 4] = [
        |t| check_alphabet(&t.alphabet),
        |t| check_has_states(t.rows.len()),
        check_dfa_row_width,
        check_dfa_targets,
    ];

    checks
        .iter()
        .find_map(|f| f(table).err())
        .map_or(Ok(()), |error| Err(error.into()))
}

/// Analyzes a nondeterministic table.
///
/// A row may have fewer cells than the alphabet (the missing columns have no moves) but
/// never more. Targets naming undeclared states are reported as warnings only, since such
/// states contribute no moves during a walk.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(FsmError::ValidationError)` describing the first violated check.
pub fn analyze_nfa(table: &NfaTable) -> Result<(), FsmError> {
    let checks: [fn(&NfaTable) -> Result<(), AnalysisError>; 3] = [
        |t| check_alphabet(&t.alphabet),
        |t| check_has_states(t.rows.len()),
        check_nfa_row_width,
    ];

    if let Some(error) = checks.iter().find_map(|f| f(table).err()) {
        return Err(error.into());
    }

    warn_undeclared_targets(table);

    Ok(())
}

/// Checks that the alphabet is non-empty and free of duplicates.
fn check_alphabet(alphabet: &Alphabet) -> Result<(), AnalysisError> {
    if alphabet.is_empty() {
        return Err(AnalysisError::EmptyAlphabet);
    }

    let mut seen = HashSet::new();
    alphabet
        .symbols()
        .iter()
        .find(|&&symbol| !seen.insert(symbol))
        .map_or(Ok(()), |&symbol| Err(AnalysisError::DuplicateSymbol(symbol)))
}

/// Checks that the table declares at least the start state.
fn check_has_states(count: usize) -> Result<(), AnalysisError> {
    if count == 0 {
        return Err(AnalysisError::NoStates);
    }

    Ok(())
}

fn check_dfa_row_width(table: &DfaTable) -> Result<(), AnalysisError> {
    let expected = table.alphabet.len();

    table
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != expected)
        .map_or(Ok(()), |(state, row)| {
            Err(AnalysisError::RowWidth {
                state,
                expected,
                found: row.len(),
            })
        })
}

/// Checks that every non-negative deterministic target has a row.
fn check_dfa_targets(table: &DfaTable) -> Result<(), AnalysisError> {
    let states = table.rows.len();

    for (state, row) in table.rows.iter().enumerate() {
        for (column, cell) in row.iter().enumerate() {
            if let DfaCell::Target(target) = *cell {
                if target >= 0 && target as u64 >= states as u64 {
                    return Err(AnalysisError::UndefinedTarget {
                        state,
                        symbol: table.alphabet.get(column).unwrap_or(Symbol('?')),
                        target,
                    });
                }
            }
        }
    }

    Ok(())
}

fn check_nfa_row_width(table: &NfaTable) -> Result<(), AnalysisError> {
    let expected = table.alphabet.len();

    table
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.cells.len() > expected)
        .map_or(Ok(()), |(state, row)| {
            Err(AnalysisError::RowWidth {
                state,
                expected,
                found: row.cells.len(),
            })
        })
}

fn warn_undeclared_targets(table: &NfaTable) {
    let states = table.rows.len();

    for (state, row) in table.rows.iter().enumerate() {
        for target in row.cells.iter().flatten().filter(|&&t| t >= states) {
            warn!(state, target, "transition targets an undeclared state");
        }
    }
}
