//! Station name lookup.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::StationCode;

use super::error::StationError;

/// Immutable station code → canonical name mapping.
///
/// Canonical names are lowercase and trimmed, which is the form the anomaly
/// filter compares stop names against. Title-casing for display happens at
/// render time.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    names: HashMap<StationCode, String>,
}

impl StationDirectory {
    /// Load the directory from a `name,code` CSV file.
    ///
    /// Fails if the file can't be read or yields no valid rows.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| StationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let directory = Self::from_csv(&contents)?;
        debug!(path = %path.display(), stations = directory.len(), "loaded station table");
        Ok(directory)
    }

    /// Parse a `name,code` table.
    ///
    /// Standard CSV quoting applies. The code is taken from the last column,
    /// so unquoted names containing commas survive. Blank lines are ignored;
    /// rows with an invalid code (such as a header row) are skipped.
    pub fn from_csv(contents: &str) -> Result<Self, StationError> {
        let names = build_map(contents);
        if names.is_empty() {
            return Err(StationError::Empty);
        }
        Ok(Self { names })
    }

    /// Build a directory from `(code, name)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let names = pairs
            .into_iter()
            .filter_map(|(code, name)| {
                StationCode::parse(code)
                    .ok()
                    .map(|code| (code, canonical(name)))
            })
            .collect();
        Self { names }
    }

    /// Look up the canonical (lowercase) name for a code.
    pub fn get(&self, code: &StationCode) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// Number of stations in the directory.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn canonical(name: &str) -> String {
    name.trim().to_lowercase()
}

fn build_map(contents: &str) -> HashMap<StationCode, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());
    let mut names = HashMap::new();

    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(row, error = %e, "skipping unreadable station row");
                continue;
            }
        };

        // The code is the last column; unquoted commas stay in the name
        let fields: Vec<&str> = record.iter().collect();
        let Some((code, name)) = fields.split_last() else {
            continue;
        };
        if name.is_empty() {
            warn!(row, "station row has no code column");
            continue;
        }
        let name = name.join(",");

        let Ok(code) = StationCode::parse(code) else {
            debug!(row, "skipping station row with invalid code");
            continue;
        };

        if name.trim().is_empty() {
            warn!(row, %code, "station row has an empty name");
            continue;
        }

        names.insert(code, canonical(&name));
    }

    names
}
