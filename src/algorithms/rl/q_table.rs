//! Action-value table and its on-disk snapshot.
//!
//! The table holds one [`ActionValues`] vector per reachable [`StateKey`].
//! Rows are stored densely by raw key, so every lookup for a key is
//! infallible.
//!
//! # Persisted format
//!
//! ```text
//! {"version": 1, "entries": {"0": [q0, .., q5], "1": [...], ...}}
//! ```
//! Exactly the 729 reachable keys must be present, each with six values.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{Action, ActionValues, StateKey, ACTION_COUNT, STATE_COUNT};
use crate::error::DecisionError;

const FORMAT_VERSION: u32 = 1;

/// Number of addressable 12-bit keys.
const ADDRESSABLE: usize = 1 << 12;

#[derive(Debug, Serialize, Deserialize)]
struct TableSnapshot {
    version: u32,
    entries: BTreeMap<u16, Vec<f64>>,
}

/// Mapping from discretized state to learned per-action values.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValueTable {
    rows: Vec<ActionValues>,
}

impl ActionValueTable {
    /// Creates a table with a zero vector for every reachable state.
    pub fn zeroed() -> Self {
        Self {
            rows: vec![[0.0; ACTION_COUNT]; ADDRESSABLE],
        }
    }

    /// Returns the value vector for a state.
    pub fn values(&self, key: StateKey) -> &ActionValues {
        &self.rows[usize::from(key.raw())]
    }

    /// Returns the value of one action in a state.
    pub fn value(&self, key: StateKey, action: Action) -> f64 {
        self.values(key)[action.index()]
    }

    /// Overwrites the value of one action in a state.
    pub fn set(&mut self, key: StateKey, action: Action, value: f64) {
        self.rows[usize::from(key.raw())][action.index()] = value;
    }

    /// Largest value in a state's vector.
    pub fn max_value(&self, key: StateKey) -> f64 {
        self.values(key)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// First action (lowest index) achieving the state's maximum value.
    pub fn best_action(&self, key: StateKey) -> Action {
        let mut best = Action::Heavy;
        let mut best_value = f64::NEG_INFINITY;
        for action in Action::all() {
            let v = self.value(key, action);
            if v > best_value {
                best_value = v;
                best = action;
            }
        }
        best
    }

    /// Iterates the reachable states and their value vectors in key order.
    pub fn iter(&self) -> impl Iterator<Item = (StateKey, &ActionValues)> + '_ {
        StateKey::all().map(move |key| (key, self.values(key)))
    }

    /// Serializes the table into its persisted JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let snapshot = TableSnapshot {
            version: FORMAT_VERSION,
            entries: self
                .iter()
                .map(|(key, values)| (key.raw(), values.to_vec()))
                .collect(),
        };
        serde_json::to_string(&snapshot)
    }

    /// Parses and validates a persisted table.
    ///
    /// Returns the reason on failure; callers attach the source path.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let snapshot: TableSnapshot = serde_json::from_str(text).map_err(|e| e.to_string())?;
        if snapshot.version != FORMAT_VERSION {
            return Err(format!(
                "unsupported format version {} (expected {})",
                snapshot.version, FORMAT_VERSION
            ));
        }
        if snapshot.entries.len() != STATE_COUNT {
            return Err(format!(
                "expected {} states, found {}",
                STATE_COUNT,
                snapshot.entries.len()
            ));
        }

        let mut table = Self::zeroed();
        for (raw, values) in snapshot.entries {
            let key = StateKey::from_raw(raw).ok_or_else(|| format!("unreachable state {raw}"))?;
            let row: ActionValues = values.as_slice().try_into().map_err(|_| {
                format!(
                    "state {raw} has {} values (expected {ACTION_COUNT})",
                    values.len()
                )
            })?;
            table.rows[usize::from(key.raw())] = row;
        }
        Ok(table)
    }

    /// Writes the table to `path`, replacing any previous snapshot atomically.
    pub fn save(&self, path: &Path) -> Result<(), DecisionError> {
        let text = self.to_json().map_err(|e| DecisionError::PersistenceDecode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        atomic_write(path, text.as_bytes())?;
        debug!(path = %path.display(), bytes = text.len(), "action-value table saved");
        Ok(())
    }

    /// Reads a table previously written by [`ActionValueTable::save`].
    pub fn load(path: &Path) -> Result<Self, DecisionError> {
        let text = fs::read_to_string(path).map_err(|source| DecisionError::PersistenceIo {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&text).map_err(|reason| DecisionError::PersistenceDecode {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!(path = %path.display(), "action-value table loaded");
        Ok(table)
    }
}

impl Default for ActionValueTable {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Writes to a uniquely named sibling temp file and renames it over `path`.
///
/// Readers see either the previous snapshot or the new one, never a mix. The
/// temp file is removed on every failure path when it is dropped.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), DecisionError> {
    let io_err = |target: &Path| {
        let target = target.to_path_buf();
        move |source: std::io::Error| DecisionError::PersistenceIo {
            path: target,
            source,
        }
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = format!(
        ".{}.",
        path.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    );

    let mut file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err(dir))?;
    file.write_all(data).map_err(io_err(file.path()))?;
    file.as_file().sync_all().map_err(io_err(file.path()))?;
    file.persist(path).map_err(|e| DecisionError::PersistenceIo {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
