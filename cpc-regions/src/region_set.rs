use log::{error, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{RegionError, Result};
use crate::scheme::{Scheme, SchemeId};
use crate::table::render_two_columns;
use crate::value::Value;

/// A scheme-keyed set of optional region values.
///
/// The key set is the scheme's ID list and never changes after construction.
/// A region with no value is *absent*. The missing sentinel is only the
/// external spelling of "absent": writing it stores absent, and reads of an
/// absent region hand it back.
#[derive(Debug, Clone)]
pub struct RegionSet {
    scheme: Arc<Scheme>,
    values: Vec<Option<Value>>,
    sentinel: Option<Value>,
    sentinel_is_numeric: bool,
}

impl RegionSet {
    /// A set with every region absent and no sentinel.
    pub fn new(scheme: Arc<Scheme>) -> RegionSet {
        let values = vec![None; scheme.len()];
        RegionSet {
            scheme,
            values,
            sentinel: None,
            sentinel_is_numeric: false,
        }
    }

    /// A set whose values are the scheme's display names.
    pub fn with_names(scheme: Arc<Scheme>) -> RegionSet {
        let values = scheme.names().iter().map(|name| Some(Value::Text(name.clone()))).collect();
        RegionSet {
            scheme,
            values,
            sentinel: None,
            sentinel_is_numeric: false,
        }
    }

    pub fn scheme(&self) -> &Arc<Scheme> {
        &self.scheme
    }

    pub fn scheme_id(&self) -> &SchemeId {
        self.scheme.id()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.scheme.contains(id)
    }

    /// Region IDs, numeric ascending when the scheme's IDs are numeric, else lexical.
    pub fn ids(&self) -> &[String] {
        self.scheme.ids()
    }

    /// Display name of a region, if the ID exists.
    pub fn name(&self, id: &str) -> Option<&str> {
        self.scheme.name(id)
    }

    /// The scheme's ID to name table.
    pub fn names(&self) -> BTreeMap<String, String> {
        self.scheme
            .ids()
            .iter()
            .cloned()
            .zip(self.scheme.names().iter().cloned())
            .collect()
    }

    pub fn sentinel(&self) -> Option<&Value> {
        self.sentinel.as_ref()
    }

    /// Stored values in ID order, `None` where absent (no sentinel substitution).
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> + '_ {
        self.scheme
            .ids()
            .iter()
            .zip(self.values.iter())
            .map(|(id, value)| (id.as_str(), value.as_ref()))
    }

    /// Stored value of a region read as a number; `None` when absent,
    /// non-numeric or not a region of this scheme.
    pub fn number(&self, id: &str) -> Option<f64> {
        self.scheme
            .slot(id)
            .and_then(|slot| self.values[slot].as_ref())
            .and_then(Value::as_number)
    }

    fn invalid_id(&self, id: &str) -> RegionError {
        RegionError::InvalidRegionId {
            id: id.to_string(),
            scheme: self.scheme_id().clone(),
        }
    }

    fn slot_or_report(&self, id: &str) -> Option<usize> {
        let slot = self.scheme.slot(id);
        if slot.is_none() {
            error!("{}", self.invalid_id(id));
        }
        slot
    }

    fn normalize(&self, value: Value) -> Option<Value> {
        if self.is_missing_value(Some(&value)) {
            None
        } else {
            Some(value)
        }
    }

    /// Set every region to `value`, or to absent if `value` is the sentinel.
    pub fn initialize(&mut self, value: impl Into<Value>) {
        let stored = self.normalize(value.into());
        for slot in self.values.iter_mut() {
            *slot = stored.clone();
        }
    }

    /// Mark every region absent.
    pub fn clear(&mut self) {
        for slot in self.values.iter_mut() {
            *slot = None;
        }
    }

    /// Declare which external value means "missing".
    ///
    /// Stored values equal to the new sentinel become absent. Regions that
    /// were already absent stay absent.
    pub fn set_missing_sentinel(&mut self, value: impl Into<Value>) {
        let sentinel = value.into();
        self.sentinel_is_numeric = sentinel.is_numeric();
        self.sentinel = Some(sentinel);
        let mut masked = 0usize;
        for slot in 0..self.values.len() {
            let matches = self.values[slot]
                .as_ref()
                .map(|v| self.is_missing_value(Some(v)))
                .unwrap_or(false);
            if matches {
                self.values[slot] = None;
                masked += 1;
            }
        }
        if masked > 0 {
            warn!(
                "{} stored values in {} matched the new missing sentinel and are now absent",
                masked,
                self.scheme_id()
            );
        }
    }

    /// Write one region. Writing the sentinel stores absent.
    pub fn set_value(&mut self, id: &str, value: impl Into<Value>) -> Result<()> {
        let slot = self.scheme.slot(id).ok_or_else(|| self.invalid_id(id))?;
        self.values[slot] = self.normalize(value.into());
        Ok(())
    }

    /// Write many regions. Unknown IDs are reported and skipped; the rest
    /// of the batch is still applied. Returns the rejected writes.
    pub fn set_values<I, K, V>(&mut self, values: I) -> Vec<RegionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut rejected = Vec::new();
        for (id, value) in values {
            if let Err(e) = self.set_value(id.as_ref(), value) {
                error!("{}", e);
                rejected.push(e);
            }
        }
        rejected
    }

    /// Value of a region, the sentinel if it is absent, or `None` when
    /// absent without a sentinel. Unknown IDs are reported and read as `None`.
    pub fn get_value(&self, id: &str) -> Option<Value> {
        let slot = self.slot_or_report(id)?;
        self.values[slot].clone().or_else(|| self.sentinel.clone())
    }

    /// Every region in ID order with the sentinel standing in for absent values.
    pub fn values(&self) -> Vec<(String, Option<Value>)> {
        self.iter()
            .map(|(id, value)| (id.to_string(), value.cloned().or_else(|| self.sentinel.clone())))
            .collect()
    }

    /// `values()` keyed by ID, for serializing.
    pub fn snapshot(&self) -> BTreeMap<String, Option<Value>> {
        self.values().into_iter().collect()
    }

    /// True iff no region is absent.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// True iff every stored value (absent included) is identical.
    pub fn all_equal(&self) -> bool {
        match self.values.split_first() {
            Some((first, rest)) => rest.iter().all(|v| v == first),
            None => true,
        }
    }

    /// Whether a region is absent; `None` (and a reported error) for unknown IDs.
    pub fn is_missing(&self, id: &str) -> Option<bool> {
        let slot = self.slot_or_report(id)?;
        Some(self.values[slot].is_none())
    }

    pub fn is_not_missing(&self, id: &str) -> Option<bool> {
        self.is_missing(id).map(|missing| !missing)
    }

    /// Compare a candidate against the sentinel: numerically when the
    /// sentinel looks like a number, as text otherwise. Both absent counts
    /// as equal.
    pub fn is_missing_value(&self, candidate: Option<&Value>) -> bool {
        match (&self.sentinel, candidate) {
            (None, None) => true,
            (None, Some(_)) | (Some(_), None) => false,
            (Some(sentinel), Some(candidate)) => {
                if self.sentinel_is_numeric {
                    match (sentinel.as_number(), candidate.as_number()) {
                        (Some(s), Some(c)) => s == c,
                        _ => false,
                    }
                } else {
                    sentinel.to_string() == candidate.to_string()
                }
            }
        }
    }

    fn slot_is_numeric(&self, slot: usize) -> bool {
        match &self.values[slot] {
            Some(value) => value.is_numeric(),
            None => self.sentinel.is_none() || self.sentinel_is_numeric,
        }
    }

    /// True iff every region reads as a number; absent regions count as
    /// whatever the sentinel is.
    pub fn is_numeric(&self) -> bool {
        (0..self.values.len()).all(|slot| self.slot_is_numeric(slot))
    }

    /// Numeric-ness of one region. Unknown IDs are an error.
    pub fn is_numeric_id(&self, id: &str) -> Result<bool> {
        let slot = self.scheme.slot(id).ok_or_else(|| self.invalid_id(id))?;
        Ok(self.slot_is_numeric(slot))
    }

    /// Truncate every present numeric value toward zero. Non-numeric values are left alone.
    pub fn truncate_to_int(&mut self) {
        for value in self.values.iter_mut().flatten() {
            if let Some(n) = value.as_number() {
                *value = Value::Number(n.trunc());
            }
        }
    }

    /// Mark every present non-numeric value absent.
    pub fn numericize(&mut self) {
        for slot in self.values.iter_mut() {
            if slot.as_ref().is_some_and(|v| !v.is_numeric()) {
                *slot = None;
            }
        }
    }

    /// Two-column text table of IDs and values, for debugging.
    pub fn render_table(&self, header: Option<(&str, &str)>) -> String {
        let rows: Vec<(String, String)> = self
            .iter()
            .map(|(id, value)| {
                let shown = match value.or(self.sentinel.as_ref()) {
                    Some(v) => v.to_string(),
                    None => "(absent)".to_string(),
                };
                (id.to_string(), shown)
            })
            .collect();
        render_two_columns(header, &rows)
    }

    pub(crate) fn stored(&self, slot: usize) -> Option<&Value> {
        self.values[slot].as_ref()
    }

    pub(crate) fn from_parts(
        scheme: Arc<Scheme>,
        values: Vec<Option<Value>>,
        sentinel: Option<Value>,
    ) -> RegionSet {
        let sentinel_is_numeric = sentinel.as_ref().map(Value::is_numeric).unwrap_or(false);
        RegionSet {
            scheme,
            values,
            sentinel,
            sentinel_is_numeric,
        }
    }
}
