//! Scheme descriptors: the fixed, ordered set of region IDs (and their
//! display names) that a `RegionSet` is keyed by.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::catalog::CatalogScheme;
use crate::error::{RegionError, Result};
use crate::value::looks_like_number;

/// Identity tag of a scheme. Region sets combine only when these are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemeId {
    /// One of the built-in partition schemes
    Catalog(CatalogScheme),
    /// A user station list, identified by the reference source it was built from
    Reference(String),
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeId::Catalog(c) => write!(f, "{}", c),
            SchemeId::Reference(origin) => write!(f, "reference:{}", origin),
        }
    }
}

/// An immutable partition scheme.
///
/// IDs are held in their display order (numeric ascending when the scheme's
/// IDs are numeric, lexical otherwise); a region's slot is its index in that
/// order, and every `RegionSet` of the scheme stores its values by slot.
#[derive(Debug)]
pub struct Scheme {
    id: SchemeId,
    ids: Vec<String>,
    names: Vec<String>,
    slots: HashMap<String, usize>,
    ids_are_numeric: bool,
}

fn compare_ids(a: &str, b: &str, numeric: bool) -> Ordering {
    if numeric {
        if let (Some(x), Some(y)) = (looks_like_number(a), looks_like_number(b)) {
            return x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b));
        }
    }
    a.cmp(b)
}

impl Scheme {
    /// Build a scheme from `(id, name)` pairs. Fails with `DuplicateId` if an
    /// ID repeats.
    pub fn new(id: SchemeId, entries: Vec<(String, String)>, ids_are_numeric: bool) -> Result<Scheme> {
        let mut entries = entries;
        entries.sort_by(|a, b| compare_ids(&a.0, &b.0, ids_are_numeric));
        let mut slots = HashMap::with_capacity(entries.len());
        let mut ids = Vec::with_capacity(entries.len());
        let mut names = Vec::with_capacity(entries.len());
        for (region_id, name) in entries {
            if region_id.is_empty() {
                return Err(RegionError::MissingArgument(format!("region ID in {}", id)));
            }
            if slots.contains_key(&region_id) {
                return Err(RegionError::DuplicateId {
                    id: region_id,
                    origin: id.to_string(),
                });
            }
            slots.insert(region_id.clone(), ids.len());
            ids.push(region_id);
            names.push(name);
        }
        Ok(Scheme {
            id,
            ids,
            names,
            slots,
            ids_are_numeric,
        })
    }

    /// Build a station-style scheme from an already parsed reference list.
    ///
    /// `origin` is the identity of the reference source; two sets are
    /// arithmetic-compatible only if built from the same origin. IDs sort
    /// numerically when every ID looks like a number.
    pub fn from_reference(origin: impl Into<String>, entries: Vec<(String, String)>) -> Result<Arc<Scheme>> {
        let numeric = !entries.is_empty() && entries.iter().all(|(id, _)| looks_like_number(id).is_some());
        let scheme = Scheme::new(SchemeId::Reference(origin.into()), entries, numeric)?;
        Ok(Arc::new(scheme))
    }

    pub fn id(&self) -> &SchemeId {
        &self.id
    }

    /// Region IDs in display order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Display names, aligned with `ids()`.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.slot(id).map(|slot| self.names[slot].as_str())
    }

    pub fn slot(&self, id: &str) -> Option<usize> {
        self.slots.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids_are_numeric(&self) -> bool {
        self.ids_are_numeric
    }
}
