//! Tabular state-action value storage

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Value of any (state, action) pair that was never observed.
pub const DEFAULT_VALUE: f64 = 0.0;

/// Maps (state, action) pairs to value estimates.
///
/// States and actions are opaque keys. Reading an absent pair inserts
/// [`DEFAULT_VALUE`], so the table only grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueTable {
    /// state -> action -> value
    values: HashMap<String, HashMap<String, f64>>,
}

#[derive(Serialize)]
struct SavedTableRef<'a> {
    version: u32,
    table: &'a ValueTable,
}

#[derive(Deserialize)]
struct SavedTable {
    version: u32,
    table: ValueTable,
}

impl ValueTable {
    pub const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a pair, initializing it to the default if absent.
    pub fn get(&mut self, state: &str, action: &str) -> f64 {
        if let Some(value) = self.peek(state, action) {
            return value;
        }
        self.set(state, action, DEFAULT_VALUE);
        DEFAULT_VALUE
    }

    /// Get the value of a pair without initializing it.
    pub fn peek(&self, state: &str, action: &str) -> Option<f64> {
        self.values
            .get(state)
            .and_then(|actions| actions.get(action))
            .copied()
    }

    pub fn set(&mut self, state: &str, action: &str, value: f64) {
        match self.values.get_mut(state) {
            Some(actions) => {
                actions.insert(action.to_string(), value);
            }
            None => {
                let actions = HashMap::from([(action.to_string(), value)]);
                self.values.insert(state.to_string(), actions);
            }
        }
    }

    /// Number of stored (state, action) entries.
    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn state_count(&self) -> usize {
        self.values.len()
    }

    /// All stored entries as (state, action, value), in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.values.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(action, value)| (state.as_str(), action.as_str(), *value))
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let saved = SavedTableRef {
            version: Self::VERSION,
            table: self,
        };
        Ok(rmp_serde::to_vec(&saved)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let saved: SavedTable =
            rmp_serde::from_slice(bytes).map_err(|e| deserialization_error("bytes", e))?;
        Self::from_saved(saved, "bytes")
    }

    pub fn write_to<W: Write>(&self, mut sink: W) -> Result<()> {
        let saved = SavedTableRef {
            version: Self::VERSION,
            table: self,
        };
        rmp_serde::encode::write(&mut sink, &saved)?;
        sink.flush().map_err(|source| Error::Io {
            operation: "flush value table".to_string(),
            source,
        })
    }

    pub fn read_from<R: Read>(source: R) -> Result<Self> {
        let saved: SavedTable = rmp_serde::decode::from_read(source)
            .map_err(|e| deserialization_error("reader", e))?;
        Self::from_saved(saved, "reader")
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {}", path.display()),
            source,
        })?;
        self.write_to(BufWriter::new(file))
    }

    /// Load a table from disk. A missing file is an error, never an empty table.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|e| deserialization_error(&origin, e))?;
        let saved: SavedTable = rmp_serde::decode::from_read(BufReader::new(file))
            .map_err(|e| deserialization_error(&origin, e))?;
        Self::from_saved(saved, &origin)
    }

    fn from_saved(saved: SavedTable, origin: &str) -> Result<Self> {
        if saved.version != Self::VERSION {
            return Err(Error::Deserialization {
                origin: origin.to_string(),
                message: format!(
                    "unsupported format version {}, expected {}",
                    saved.version,
                    Self::VERSION
                ),
            });
        }
        Ok(saved.table)
    }
}

fn deserialization_error(origin: &str, e: impl std::fmt::Display) -> Error {
    Error::Deserialization {
        origin: origin.to_string(),
        message: e.to_string(),
    }
}
