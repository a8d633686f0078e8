//! This module provides the parser for transition tables, utilizing the `pest` crate.
//! It defines entry points for both table formats and turns the parse tree into the
//! `DfaTable` and `NfaTable` structures consumed by the automaton engines.

use crate::types::{
    Alphabet, DfaCell, DfaTable, FsmError, NfaRow, NfaTable, StateId, StateSet, Symbol,
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use tracing::debug;

/// Derives a `PestParser` for the table grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TableParser;

/// Parses the given text into a deterministic transition table.
///
/// The first line declares the alphabet, and each following line is the row of one state.
/// A cell is either an integer target (negative values are sentinel-final targets) or the
/// `-` marker, which declares the row's state final. Only the syntax is checked here;
/// row widths and targets are validated when the automaton is built.
///
/// # Arguments
///
/// * `input` - A string slice containing the table text.
///
/// # Returns
///
/// * `Ok(DfaTable)` if the input is successfully parsed.
/// * `Err(FsmError::ParseError)` if there are any syntax errors.
pub fn parse_dfa(input: &str) -> Result<DfaTable, FsmError> {
    let root = parse_root(Rule::dfa_table, input)?;

    let mut alphabet = Alphabet::default();
    let mut rows = Vec::new();

    for p in root.into_inner() {
        match p.as_rule() {
            Rule::alphabet => alphabet = parse_alphabet(p)?,
            Rule::dfa_row => rows.push(parse_dfa_row(p)?),
            _ => {} // EOI
        }
    }

    let table = DfaTable { alphabet, rows };
    debug!(
        symbols = table.alphabet.len(),
        states = table.rows.len(),
        "parsed deterministic table"
    );

    Ok(table)
}

/// Parses the given text into a nondeterministic transition table.
///
/// Cells are brace-delimited sets of states such as `{0 1}`, the empty set `{}`, bare
/// whitespace-separated states, or nothing at all. A `-` next to any cell declares the
/// row's state final. Every line after the alphabet is a state, so a blank line in the
/// middle of the table is a state without moves.
///
/// # Returns
///
/// * `Ok(NfaTable)` if the input is successfully parsed.
/// * `Err(FsmError::ParseError)` if there are any syntax errors.
pub fn parse_nfa(input: &str) -> Result<NfaTable, FsmError> {
    let root = parse_root(Rule::nfa_table, input)?;

    let mut alphabet = Alphabet::default();
    let mut rows = Vec::new();

    for p in root.into_inner() {
        match p.as_rule() {
            Rule::alphabet => alphabet = parse_alphabet(p)?,
            Rule::nfa_line => {
                // Rule: nfa_line > nfa_row?, empty for comment-only lines
                if let Some(row) = p.into_inner().next() {
                    rows.push(parse_nfa_row(row)?);
                }
            }
            _ => {} // EOI
        }
    }

    let table = NfaTable { alphabet, rows };
    debug!(
        symbols = table.alphabet.len(),
        states = table.rows.len(),
        "parsed nondeterministic table"
    );

    Ok(table)
}

/// Runs the grammar for `rule` and returns its single top-level pair.
fn parse_root(rule: Rule, input: &str) -> Result<Pair<'_, Rule>, FsmError> {
    TableParser::parse(rule, input)
        .map_err(|e| FsmError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| FsmError::ValidationError("Table is empty".to_string()))
}

/// Parses the alphabet line from a `Pair<Rule::alphabet>`.
fn parse_alphabet(pair: Pair<Rule>) -> Result<Alphabet, FsmError> {
    // Rule: alphabet > [symbol]
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::symbol)
        .map(parse_symbol)
        .collect()
}

/// Parses a single symbol from a `Pair<Rule::symbol>`.
fn parse_symbol(pair: Pair<Rule>) -> Result<Symbol, FsmError> {
    let span = pair.as_span();
    pair.as_str()
        .chars()
        .next()
        .map(Symbol)
        .ok_or_else(|| parse_error("Expected an alphabet symbol", span))
}

/// Parses the cells of one deterministic row from a `Pair<Rule::dfa_row>`.
fn parse_dfa_row(pair: Pair<Rule>) -> Result<Vec<DfaCell>, FsmError> {
    let mut cells = Vec::new();

    // Rule: dfa_row > [dfa_cell > (integer | final_marker)]
    for cell in pair.into_inner() {
        for inner in cell.into_inner() {
            match inner.as_rule() {
                Rule::final_marker => cells.push(DfaCell::Final),
                Rule::integer => cells.push(DfaCell::Target(parse_integer(inner)?)),
                _ => {}
            }
        }
    }

    Ok(cells)
}

/// Parses a possibly negative transition target from a `Pair<Rule::integer>`.
fn parse_integer(pair: Pair<Rule>) -> Result<i64, FsmError> {
    let span = pair.as_span();
    pair.as_str().parse::<i64>().map_err(|_| {
        parse_error(
            &format!("State number out of range: {}", pair.as_str()),
            span,
        )
    })
}

/// Parses one nondeterministic row from a `Pair<Rule::nfa_row>`.
///
/// The final marker may sit next to any cell; its position carries no meaning.
fn parse_nfa_row(pair: Pair<Rule>) -> Result<NfaRow, FsmError> {
    let mut row = NfaRow::default();

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::final_marker => row.is_final = true,
            Rule::nfa_cell => row.cells.push(parse_nfa_cell(p)?),
            _ => {}
        }
    }

    Ok(row)
}

/// Parses the target set of a single cell from a `Pair<Rule::nfa_cell>`.
///
/// Braced and bare forms are equivalent, and an empty cell is the empty set.
fn parse_nfa_cell(pair: Pair<Rule>) -> Result<StateSet, FsmError> {
    let mut targets = StateSet::new();

    // Rule: nfa_cell > (state_set > [state_id] | [state_id])
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::state_set => {
                for id in p.into_inner() {
                    targets.insert(parse_state_id(id)?);
                }
            }
            Rule::state_id => {
                targets.insert(parse_state_id(p)?);
            }
            _ => {}
        }
    }

    Ok(targets)
}

/// Parses a non-negative state identifier from a `Pair<Rule::state_id>`.
fn parse_state_id(pair: Pair<Rule>) -> Result<StateId, FsmError> {
    let span = pair.as_span();
    pair.as_str().parse::<StateId>().map_err(|_| {
        parse_error(
            &format!("State number out of range: {}", pair.as_str()),
            span,
        )
    })
}

/// Creates a `FsmError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> FsmError {
    FsmError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::DeterministicAutomaton;
    use crate::machine::Automaton;
    use crate::nfa::NondeterministicAutomaton;
    use std::collections::BTreeSet;

    fn set(states: &[StateId]) -> StateSet {
        states.iter().copied().collect::<BTreeSet<_>>()
    }

    #[test]
    fn test_parse_simple_dfa() {
        let input = "0, 1\n1, 0\n-, -\n";

        let table = parse_dfa(input).unwrap();
        assert_eq!(table.alphabet.symbols(), &[Symbol('0'), Symbol('1')]);
        assert_eq!(
            table.rows,
            vec![
                vec![DfaCell::Target(1), DfaCell::Target(0)],
                vec![DfaCell::Final, DfaCell::Final],
            ]
        );
    }

    #[test]
    fn test_parse_dfa_negative_target() {
        let table = parse_dfa("0,1\n-5, 1\n0, -6").unwrap();

        assert_eq!(table.rows[0], vec![DfaCell::Target(-5), DfaCell::Target(1)]);
        assert_eq!(table.rows[1], vec![DfaCell::Target(0), DfaCell::Target(-6)]);
    }

    #[test]
    fn test_parse_dfa_comments_and_blank_lines() {
        let input = r#"
0, 1   # input symbols
1, 0   # state 0

-, -   # state 1
"#;
        let table = parse_dfa(input).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec![DfaCell::Final, DfaCell::Final]);
    }

    #[test]
    fn test_parse_dfa_garbage_cell() {
        let result = parse_dfa("0,1\n1, x\n");

        let error = result.unwrap_err();
        assert!(matches!(error, FsmError::ParseError(_)));
    }

    #[test]
    fn test_parse_dfa_multi_character_symbol() {
        let result = parse_dfa("10, 1\n0, 0\n");

        assert!(matches!(result, Err(FsmError::ParseError(_))));
    }

    #[test]
    fn test_parse_dfa_out_of_range_target() {
        let result = parse_dfa("0\n99999999999999999999\n");

        let error = result.unwrap_err();
        assert!(matches!(error, FsmError::ParseError(_)));
        assert!(error.to_string().contains("State number out of range"));
    }

    #[test]
    fn test_parse_dfa_leaves_validation_to_the_automaton() {
        let table = parse_dfa("0, 1\n1\n").unwrap();
        assert_eq!(table.rows, vec![vec![DfaCell::Target(1)]]);

        let error = DeterministicAutomaton::new(table).unwrap_err();
        assert!(matches!(error, FsmError::ValidationError(_)));
    }

    #[test]
    fn test_parse_simple_nfa() {
        let input = "0, 1\n{0 1}, {}\n- {}, {}\n";

        let table = parse_nfa(input).unwrap();
        assert_eq!(table.alphabet.len(), 2);
        assert_eq!(
            table.rows,
            vec![
                NfaRow {
                    is_final: false,
                    cells: vec![set(&[0, 1]), set(&[])],
                },
                NfaRow {
                    is_final: true,
                    cells: vec![set(&[]), set(&[])],
                },
            ]
        );
    }

    #[test]
    fn test_parse_nfa_trailing_marker_and_bare_cells() {
        let table = parse_nfa("a, b\n1 2, \n{}, {0} -\n").unwrap();

        assert!(!table.rows[0].is_final);
        assert_eq!(table.rows[0].cells, vec![set(&[1, 2]), set(&[])]);
        assert!(table.rows[1].is_final);
        assert_eq!(table.rows[1].cells, vec![set(&[]), set(&[0])]);
    }

    #[test]
    fn test_parse_nfa_marker_only_row() {
        let table = parse_nfa("0, 1\n{1}, {}\n-\n").unwrap();

        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[1].is_final);
        assert_eq!(table.rows[1].cells, vec![set(&[])]);
    }

    #[test]
    fn test_parse_nfa_blank_line_is_a_state() {
        let table = parse_nfa("0, 1\n{1}, {}\n\n-\n").unwrap();

        assert_eq!(table.rows.len(), 3);
        assert!(!table.rows[1].is_final);
        assert_eq!(table.rows[1].cells, vec![set(&[])]);
        assert!(table.rows[2].is_final);

        let automaton = NondeterministicAutomaton::new(table).unwrap();
        assert!(!automaton.accepts_str("0"));

        let table = parse_nfa("0\n{1}\n   \n{1}\n").unwrap();
        assert_eq!(table.rows.len(), 3);
    }

    #[test]
    fn test_parse_nfa_skips_comment_lines() {
        let input = r#"
# ends in 0
0, 1
{0 1}, {0}   # state 0
  # nothing for state 1 on a 1
{2},
- {}, {}
"#;
        let table = parse_nfa(input).unwrap();

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].cells, vec![set(&[2]), set(&[])]);
        assert!(table.rows[2].is_final);
    }

    #[test]
    fn test_parse_nfa_marker_between_cells() {
        let table = parse_nfa("0, 1\n{1}, - {}\n{0} -, {}\n").unwrap();

        assert!(table.rows[0].is_final);
        assert_eq!(table.rows[0].cells, vec![set(&[1]), set(&[])]);
        assert!(table.rows[1].is_final);
        assert_eq!(table.rows[1].cells, vec![set(&[0]), set(&[])]);
    }

    #[test]
    fn test_parse_nfa_ignores_trailing_newlines() {
        let table = parse_nfa("0\n{0}\n\n\n").unwrap();

        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_parse_nfa_negative_state() {
        let result = parse_nfa("0\n{-1}\n");

        assert!(matches!(result, Err(FsmError::ParseError(_))));
    }

    #[test]
    fn test_parse_missing_alphabet() {
        assert!(parse_dfa("").is_err());
        assert!(parse_nfa("\n\n").is_err());
    }
}
