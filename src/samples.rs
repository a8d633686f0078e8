use crate::machine::Machine;
use crate::parser::{parse_dfa, parse_nfa};
use crate::types::{FsmError, Table, TableKind};
use tracing::warn;

// Default embedded tables
const SAMPLE_TEXTS: [(&str, TableKind, &str); 5] = [
    (
        "early-final",
        TableKind::Deterministic,
        include_str!("../tables/early-final.dfa"),
    ),
    (
        "contains-11",
        TableKind::Deterministic,
        include_str!("../tables/contains-11.dfa"),
    ),
    (
        "contains-00",
        TableKind::Deterministic,
        include_str!("../tables/contains-00.dfa"),
    ),
    (
        "ends-with-01",
        TableKind::Nondeterministic,
        include_str!("../tables/ends-with-01.nfa"),
    ),
    (
        "third-from-last-a",
        TableKind::Nondeterministic,
        include_str!("../tables/third-from-last-a.nfa"),
    ),
];

/// A table embedded in the library.
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: &'static str,
    pub text: &'static str,
    pub table: Table,
}

lazy_static::lazy_static! {
    pub static ref SAMPLES: Vec<Sample> = load_samples();
}

fn load_samples() -> Vec<Sample> {
    SAMPLE_TEXTS
        .iter()
        .filter_map(|&(name, kind, text)| {
            let table = match kind {
                TableKind::Deterministic => parse_dfa(text).map(Table::Deterministic),
                TableKind::Nondeterministic => parse_nfa(text).map(Table::Nondeterministic),
            };

            match table {
                Ok(table) => Some(Sample { name, text, table }),
                Err(e) => {
                    warn!(name, error = %e, "failed to parse sample table");
                    None
                }
            }
        })
        .collect()
}

pub struct SampleManager;

impl SampleManager {
    /// Get the number of available samples
    pub fn get_sample_count() -> usize {
        SAMPLES.len()
    }

    /// Get a sample by its index
    pub fn get_sample_by_index(index: usize) -> Result<&'static Sample, FsmError> {
        SAMPLES.get(index).ok_or_else(|| {
            FsmError::ValidationError(format!("Sample index {} out of range", index))
        })
    }

    /// Get a sample by its name
    pub fn get_sample_by_name(name: &str) -> Result<&'static Sample, FsmError> {
        SAMPLES
            .iter()
            .find(|sample| sample.name == name)
            .ok_or_else(|| FsmError::ValidationError(format!("Sample '{}' not found", name)))
    }

    /// Build a ready-to-run machine from a sample
    pub fn get_machine_by_name(name: &str) -> Result<Machine, FsmError> {
        Machine::new(Self::get_sample_by_name(name)?.table.clone())
    }

    /// List all sample names
    pub fn list_sample_names() -> Vec<&'static str> {
        SAMPLES.iter().map(|sample| sample.name).collect()
    }

    /// Get information about a sample by its index
    pub fn get_sample_info(index: usize) -> Result<SampleInfo, FsmError> {
        let sample = Self::get_sample_by_index(index)?;

        Ok(SampleInfo {
            index,
            name: sample.name,
            kind: sample.table.kind(),
            alphabet: sample.table.alphabet().to_string(),
            state_count: sample.table.state_count(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SampleInfo {
    pub index: usize,
    pub name: &'static str,
    pub kind: TableKind,
    pub alphabet: String,
    pub state_count: usize,
}
