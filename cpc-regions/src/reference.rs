//! User station lists ("reference files").
//!
//! A reference file holds one `ID|Name` line per region. Blank lines and
//! `#` comments are skipped. IDs must be unique.

use csv::{ReaderBuilder, Trim};
use log::info;
use std::path::Path;
use std::sync::Arc;

use crate::error::{RegionError, Result};
use crate::region_set::RegionSet;
use crate::scheme::Scheme;

/// Parse the text of a reference file into ordered `(id, name)` pairs.
pub fn parse_reference(text: &str) -> Result<Vec<(String, String)>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    for row in rdr.records() {
        let record = row?;
        let id = record.get(0).unwrap_or("");
        if id.is_empty() && record.len() <= 1 {
            continue;
        }
        let name = record.get(1).unwrap_or("");
        if id.is_empty() {
            return Err(RegionError::MissingArgument(format!("region ID on line with name {:?}", name)));
        }
        if name.is_empty() {
            return Err(RegionError::MissingArgument(format!("name for region ID {:?}", id)));
        }
        entries.push((id.to_string(), name.to_string()));
    }
    Ok(entries)
}

impl Scheme {
    /// Load a station scheme from a reference file on disk. The scheme's
    /// identity is the file's canonical path.
    pub fn from_reference_file(path: impl AsRef<Path>) -> Result<Arc<Scheme>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let origin = std::fs::canonicalize(path)?;
        let entries = parse_reference(&text)?;
        info!("Loaded {} regions from reference file {}", entries.len(), origin.display());
        Scheme::from_reference(origin.display().to_string(), entries)
    }
}

/// A set of the station scheme in `path` with every region absent.
pub fn new_ids_from_reference_file(path: impl AsRef<Path>) -> Result<RegionSet> {
    Ok(RegionSet::new(Scheme::from_reference_file(path)?))
}
