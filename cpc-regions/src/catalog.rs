//! Built-in partition schemes and their containment tables.
//!
//! The tables are embedded CSV fixtures, parsed once on first use and
//! shared read-only for the life of the process.
//!
//! Hierarchy: climate divisions (344, ID = state code * 100 + division)
//! roll up to states (50, postal code) and to forecast divisions (102);
//! states roll up to census divisions (9). `StatesConus` is the 48-state
//! variant without Alaska and Hawaii.
//!
//! The forecast-division table is a placeholder: each state's climate
//! divisions are grouped into consecutively numbered divisions named after
//! the state ("TEXAS 3"). It is not the operational forecast-division
//! partition, and `ClimateDivisions -> ForecastDivisions` containment is
//! only as good as that fixture. Replacing `forecast_divisions.csv` and the
//! `FORECAST_DIVISION` column of `climate_divisions.csv` needs no code change.

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use crate::cross_reference::CrossReference;
use crate::error::{RegionError, Result};
use crate::region_set::RegionSet;
use crate::scheme::{Scheme, SchemeId};
use crate::value::Value;

/// Embedded table: `ID,NAME`
pub static CENSUS_DIVISIONS_CSV: &str = include_str!("../../fixtures/census_divisions.csv");

/// Embedded table: `ID,NAME,STATE,FORECAST_DIVISION`
pub static CLIMATE_DIVISIONS_CSV: &str = include_str!("../../fixtures/climate_divisions.csv");

/// Embedded table: `ID,NAME`. Placeholder grouping, see the module docs.
pub static FORECAST_DIVISIONS_CSV: &str = include_str!("../../fixtures/forecast_divisions.csv");

/// Embedded table: `ID,NAME,CENSUS_DIVISION,CONUS`
pub static STATES_CSV: &str = include_str!("../../fixtures/states.csv");

/// States outside the contiguous U.S.
pub const NON_CONUS_STATES: [&str; 2] = ["AK", "HI"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatalogScheme {
    CensusDivisions,
    ClimateDivisions,
    /// 102 divisions built from a placeholder table, not the operational
    /// forecast-division partition. See the module docs.
    ForecastDivisions,
    States,
    StatesConus,
}

impl CatalogScheme {
    pub const ALL: [CatalogScheme; 5] = [
        CatalogScheme::CensusDivisions,
        CatalogScheme::ClimateDivisions,
        CatalogScheme::ForecastDivisions,
        CatalogScheme::States,
        CatalogScheme::StatesConus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CatalogScheme::CensusDivisions => "census-divisions",
            CatalogScheme::ClimateDivisions => "climate-divisions",
            CatalogScheme::ForecastDivisions => "forecast-divisions",
            CatalogScheme::States => "states",
            CatalogScheme::StatesConus => "states-conus",
        }
    }

    /// The shared scheme descriptor.
    pub fn scheme(self) -> Arc<Scheme> {
        let tables = tables();
        match self {
            CatalogScheme::CensusDivisions => tables.census_divisions.clone(),
            CatalogScheme::ClimateDivisions => tables.climate_divisions.clone(),
            CatalogScheme::ForecastDivisions => tables.forecast_divisions.clone(),
            CatalogScheme::States => tables.states.clone(),
            CatalogScheme::StatesConus => tables.states_conus.clone(),
        }
    }
}

impl fmt::Display for CatalogScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogScheme {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        CatalogScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == wanted)
            .ok_or_else(|| RegionError::UnknownScheme(s.to_string()))
    }
}

struct CatalogTables {
    census_divisions: Arc<Scheme>,
    climate_divisions: Arc<Scheme>,
    forecast_divisions: Arc<Scheme>,
    states: Arc<Scheme>,
    states_conus: Arc<Scheme>,
    /// climate division -> state postal code
    division_state: HashMap<String, String>,
    /// climate division -> forecast division
    division_forecast: HashMap<String, String>,
    /// state postal code -> census division
    state_census: HashMap<String, String>,
}

static TABLES: OnceLock<CatalogTables> = OnceLock::new();

fn tables() -> &'static CatalogTables {
    TABLES.get_or_init(|| match CatalogTables::load() {
        Ok(t) => t,
        Err(e) => panic!("failed to parse embedded catalog tables: {}", e),
    })
}

fn field(record: &StringRecord, index: usize, what: &str) -> Result<String> {
    match record.get(index).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(RegionError::MissingArgument(format!(
            "{} in catalog row {:?}",
            what,
            record.iter().collect::<Vec<_>>()
        ))),
    }
}

fn read_rows(csv_object: &str) -> Result<Vec<StringRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_reader(csv_object.as_bytes());
    let mut rows = Vec::new();
    for row in rdr.records() {
        rows.push(row?);
    }
    Ok(rows)
}

fn id_name_pairs(rows: &[StringRecord]) -> Result<Vec<(String, String)>> {
    rows.iter()
        .map(|r| Ok((field(r, 0, "ID")?, field(r, 1, "NAME")?)))
        .collect()
}

fn catalog_scheme(which: CatalogScheme, entries: Vec<(String, String)>, numeric: bool) -> Result<Arc<Scheme>> {
    Ok(Arc::new(Scheme::new(SchemeId::Catalog(which), entries, numeric)?))
}

impl CatalogTables {
    fn load() -> Result<CatalogTables> {
        let census_rows = read_rows(CENSUS_DIVISIONS_CSV)?;
        let census_divisions = catalog_scheme(CatalogScheme::CensusDivisions, id_name_pairs(&census_rows)?, true)?;

        let forecast_rows = read_rows(FORECAST_DIVISIONS_CSV)?;
        let forecast_divisions =
            catalog_scheme(CatalogScheme::ForecastDivisions, id_name_pairs(&forecast_rows)?, true)?;

        let division_rows = read_rows(CLIMATE_DIVISIONS_CSV)?;
        let climate_divisions =
            catalog_scheme(CatalogScheme::ClimateDivisions, id_name_pairs(&division_rows)?, true)?;
        let mut division_state = HashMap::new();
        let mut division_forecast = HashMap::new();
        for r in &division_rows {
            let id = field(r, 0, "ID")?;
            division_state.insert(id.clone(), field(r, 2, "STATE")?);
            division_forecast.insert(id, field(r, 3, "FORECAST_DIVISION")?);
        }

        let state_rows = read_rows(STATES_CSV)?;
        let states = catalog_scheme(CatalogScheme::States, id_name_pairs(&state_rows)?, false)?;
        let mut state_census = HashMap::new();
        let mut conus_entries = Vec::new();
        for r in &state_rows {
            let id = field(r, 0, "ID")?;
            state_census.insert(id.clone(), field(r, 2, "CENSUS_DIVISION")?);
            if field(r, 3, "CONUS")? == "Y" {
                conus_entries.push((id, field(r, 1, "NAME")?));
            }
        }
        let states_conus = catalog_scheme(CatalogScheme::StatesConus, conus_entries, false)?;

        Ok(CatalogTables {
            census_divisions,
            climate_divisions,
            forecast_divisions,
            states,
            states_conus,
            division_state,
            division_forecast,
            state_census,
        })
    }
}

/// A set of the scheme with every region absent.
pub fn new_ids(scheme: CatalogScheme) -> RegionSet {
    RegionSet::new(scheme.scheme())
}

/// A set of the scheme holding each region's display name.
pub fn new_names(scheme: CatalogScheme) -> RegionSet {
    RegionSet::with_names(scheme.scheme())
}

/// A set of the `fine` scheme whose values are the IDs of the `coarse`
/// regions containing each fine region.
///
/// Supported pairs: climate divisions to states (or CONUS states) and to
/// forecast divisions; states (or CONUS states) to census divisions.
pub fn new_with_container_ids(fine: CatalogScheme, coarse: CatalogScheme) -> Result<RegionSet> {
    let tables = tables();
    let lookup = match (fine, coarse) {
        (CatalogScheme::ClimateDivisions, CatalogScheme::States)
        | (CatalogScheme::ClimateDivisions, CatalogScheme::StatesConus) => &tables.division_state,
        (CatalogScheme::ClimateDivisions, CatalogScheme::ForecastDivisions) => &tables.division_forecast,
        (CatalogScheme::States, CatalogScheme::CensusDivisions)
        | (CatalogScheme::StatesConus, CatalogScheme::CensusDivisions) => &tables.state_census,
        _ => {
            return Err(RegionError::UnsupportedCrossReference {
                fine: SchemeId::Catalog(fine),
                coarse: SchemeId::Catalog(coarse),
            })
        }
    };

    let mut set = new_ids(fine);
    for id in fine.scheme().ids() {
        if let Some(container) = lookup.get(id) {
            set.set_value(id, Value::parse(container))?;
        }
    }
    Ok(set)
}

/// Validated fine-to-coarse table for a supported catalog pair.
pub fn cross_reference(fine: CatalogScheme, coarse: CatalogScheme) -> Result<CrossReference> {
    let containers = new_with_container_ids(fine, coarse)?;
    CrossReference::from_container_ids(&containers, coarse.scheme())
}

/// True for the 48 contiguous states.
pub fn is_contiguous_state(id: &str) -> bool {
    CatalogScheme::States.scheme().contains(id) && !NON_CONUS_STATES.contains(&id)
}
