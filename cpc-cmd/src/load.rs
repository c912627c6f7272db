//! Loading region values from headerless `id,value` CSV files.

use cpc_regions::{RegionSet, Scheme, Value};
use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use std::io::Read;
use std::sync::Arc;

/// Read `id,value` rows into a new set of `scheme`.
///
/// The missing sentinel, when given, is declared before any value is
/// written, so rows carrying it load as absent. Empty values are skipped.
/// Rows for IDs outside the scheme are logged and dropped.
pub fn read_region_csv<R: Read>(reader: R, scheme: Arc<Scheme>, missing: Option<&str>) -> anyhow::Result<RegionSet> {
    let mut set = RegionSet::new(scheme);
    if let Some(sentinel) = missing {
        set.set_missing_sentinel(Value::parse(sentinel));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows: Vec<(String, Value)> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let id = record.get(0).unwrap_or("");
        let value = record.get(1).unwrap_or("");
        if id.is_empty() || value.is_empty() {
            continue;
        }
        rows.push((id.to_string(), Value::parse(value)));
    }

    let total = rows.len();
    let rejected = set.set_values(rows);
    if !rejected.is_empty() {
        warn!(
            "{} of {} rows did not match a {} region",
            rejected.len(),
            total,
            set.scheme_id()
        );
    }
    Ok(set)
}

/// Read a region CSV file from disk.
pub fn load_region_csv(path: &str, scheme: Arc<Scheme>, missing: Option<&str>) -> anyhow::Result<RegionSet> {
    let file = std::fs::File::open(path).map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path, e))?;
    let set = read_region_csv(file, scheme, missing)?;
    info!("Loaded {} ({} regions, complete: {})", path, set.len(), set.is_complete());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpc_regions::CatalogScheme;

    #[test]
    fn test_read_region_csv() {
        let csv_data = "\
CA, 12.5
TX,-9999
NY,
ZZ,4
";
        let set = read_region_csv(csv_data.as_bytes(), CatalogScheme::States.scheme(), Some("-9999")).unwrap();
        assert_eq!(set.number("CA"), Some(12.5));
        assert_eq!(set.is_missing("TX"), Some(true));
        assert_eq!(set.is_missing("NY"), Some(true));
        assert_eq!(set.get_value("TX"), Some(Value::Number(-9999.0)));
        assert!(!set.exists("ZZ"));
    }

    #[test]
    fn test_read_text_values() {
        let set = read_region_csv("1,NEW ENGLAND\n".as_bytes(), CatalogScheme::CensusDivisions.scheme(), None).unwrap();
        assert_eq!(set.get_value("1"), Some(Value::from("NEW ENGLAND")));
        assert!(!set.is_numeric());
    }
}
