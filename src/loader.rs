//! This module provides the `TableLoader` struct, responsible for loading transition tables
//! from files, strings, and directories.

use crate::machine::Machine;
use crate::parser::{parse_dfa, parse_nfa};
use crate::types::{DfaTable, FsmError, NfaTable, Table, TableKind, MAX_TABLE_SIZE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `TableLoader` is a utility struct for loading transition tables.
/// It provides methods to load a table of a known kind from a file or from string content,
/// and to discover and load all `.dfa` and `.nfa` files within a directory.
pub struct TableLoader;

impl TableLoader {
    /// Loads a deterministic table from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(DfaTable)` if the file is successfully read and parsed.
    /// * `Err(FsmError::FileError)` if the file cannot be read or is too large.
    /// * `Err(FsmError::ParseError)` if the content is not a table.
    pub fn load_dfa(path: &Path) -> Result<DfaTable, FsmError> {
        parse_dfa(&Self::read(path)?)
    }

    /// Loads a nondeterministic table from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(NfaTable)` if the file is successfully read and parsed.
    /// * `Err(FsmError::FileError)` if the file cannot be read or is too large.
    /// * `Err(FsmError::ParseError)` if the content is not a table.
    pub fn load_nfa(path: &Path) -> Result<NfaTable, FsmError> {
        parse_nfa(&Self::read(path)?)
    }

    /// Loads a table of the given kind from a file path.
    pub fn load_table(path: &Path, kind: TableKind) -> Result<Table, FsmError> {
        Ok(match kind {
            TableKind::Deterministic => Table::Deterministic(Self::load_dfa(path)?),
            TableKind::Nondeterministic => Table::Nondeterministic(Self::load_nfa(path)?),
        })
    }

    /// Loads a deterministic table from the provided string content.
    pub fn load_dfa_from_string(content: &str) -> Result<DfaTable, FsmError> {
        parse_dfa(content)
    }

    /// Loads a nondeterministic table from the provided string content.
    pub fn load_nfa_from_string(content: &str) -> Result<NfaTable, FsmError> {
        parse_nfa(content)
    }

    /// Loads a table of the given kind from a file path and builds its automaton.
    pub fn load_machine(path: &Path, kind: TableKind) -> Result<Machine, FsmError> {
        Machine::new(Self::load_table(path, kind)?)
    }

    /// Loads every table file (`.dfa` or `.nfa` extension) from a given directory and builds
    /// its automaton.
    ///
    /// The extension selects the table kind. Directories and files with any other extension
    /// are skipped.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, Machine), FsmError>>` - one element per table file, holding
    ///   either its path and the built `Machine`, or the error that occurred while loading it.
    pub fn load_tables(directory: &Path) -> Vec<Result<(PathBuf, Machine), FsmError>> {
        if !directory.exists() {
            return vec![Err(FsmError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(FsmError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(FsmError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();
                if path.is_dir() {
                    return None;
                }

                let kind = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(TableKind::from_extension)?;

                match Self::load_machine(&path, kind) {
                    Ok(machine) => Some(Ok((path, machine))),
                    Err(e) => Some(Err(FsmError::FileError(format!(
                        "Failed to load table from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }

    fn read(path: &Path) -> Result<String, FsmError> {
        let content = fs::read_to_string(path).map_err(|e| {
            FsmError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if content.len() > MAX_TABLE_SIZE {
            return Err(FsmError::FileError(format!(
                "File {} is {} bytes, the limit is {}",
                path.display(),
                content.len(),
                MAX_TABLE_SIZE
            )));
        }

        debug!(path = %path.display(), bytes = content.len(), "read table file");

        Ok(content)
    }
}
