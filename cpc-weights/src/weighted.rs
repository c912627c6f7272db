//! Weighted averages of fine-grained region data.
//!
//! Weights are normalized within each coarse region: a fine region's factor
//! is its weight over the sum of weights sharing its container. A coarse
//! region whose weights sum to zero gets factor 0 for every member, and
//! members with factor 0 are skipped, so such a region averages to 0.
//! A coarse result is absent when any member with a nonzero factor has
//! absent data.

use cpc_regions::catalog::{CatalogScheme, NON_CONUS_STATES};
use cpc_regions::{CrossReference, RegionError, RegionSet, Result, SchemeId, Value};
use log::{debug, warn};

fn check_pair(data: &RegionSet, weights: &RegionSet) -> Result<()> {
    if data.scheme_id() != weights.scheme_id() || data.ids() != weights.ids() {
        return Err(RegionError::SchemeMismatch {
            left: data.scheme_id().clone(),
            right: weights.scheme_id().clone(),
        });
    }
    if !data.is_numeric() {
        return Err(RegionError::NonNumericOperand(format!(
            "data for {} holds non-numeric values",
            data.scheme_id()
        )));
    }
    if !weights.is_numeric() {
        return Err(RegionError::NonNumericOperand(format!(
            "weights for {} hold non-numeric values",
            weights.scheme_id()
        )));
    }
    Ok(())
}

/// Fail with `IncompleteWeights` if any counted region has no weight.
fn check_weights(weights: &RegionSet, counted: &[Option<usize>]) -> Result<()> {
    let missing: Vec<String> = weights
        .iter()
        .zip(counted)
        .filter(|((_, value), bucket)| bucket.is_some() && value.is_none())
        .map(|((id, _), _)| id.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RegionError::IncompleteWeights(missing))
    }
}

/// Reduce fine regions into `buckets` coarse totals. `bucket_of[slot]` is
/// the coarse bucket of each fine slot, `None` to leave the region out.
fn reduce(data: &RegionSet, weights: &RegionSet, bucket_of: &[Option<usize>], buckets: usize) -> Vec<Option<f64>> {
    let weight_at: Vec<f64> = weights
        .iter()
        .map(|(_, value)| value.and_then(Value::as_number).unwrap_or(0.0))
        .collect();

    let mut sum_of_weights = vec![0.0; buckets];
    for (slot, bucket) in bucket_of.iter().enumerate() {
        if let Some(b) = bucket {
            sum_of_weights[*b] += weight_at[slot];
        }
    }

    let mut totals = vec![Some(0.0); buckets];
    for ((slot, bucket), (_, value)) in bucket_of.iter().enumerate().zip(data.iter()) {
        let Some(b) = *bucket else { continue };
        let factor = if sum_of_weights[b] == 0.0 {
            0.0
        } else {
            weight_at[slot] / sum_of_weights[b]
        };
        if factor == 0.0 {
            continue;
        }
        match value.and_then(Value::as_number) {
            Some(x) => {
                if let Some(total) = totals[b].as_mut() {
                    *total += x * factor;
                }
            }
            None => totals[b] = None,
        }
    }
    totals
}

/// Weighted average of `data` into the coarse scheme of `cross_reference`.
///
/// `data` and `weights` must share the cross-reference's fine scheme and be
/// numeric; every weight must be present. The result carries `data`'s
/// sentinel. Coarse regions left absent by absent data are logged as a
/// warning, not an error; check `is_complete()` on the result.
pub fn weighted_average(data: &RegionSet, weights: &RegionSet, cross_reference: &CrossReference) -> Result<RegionSet> {
    aggregate(data, weights, cross_reference, &[])
}

/// Weighted average over the 50-state scheme when only the contiguous
/// states are weighted. Alaska and Hawaii are left out of their coarse
/// regions, data and weights alike, whatever they hold; the caller's sets
/// are not modified. Fails with `IncompleteWeights` if any contiguous state
/// lacks a weight.
///
/// Sets already in the 48-state scheme go straight to `weighted_average`.
pub fn weighted_average_conus(
    data: &RegionSet,
    weights: &RegionSet,
    cross_reference: &CrossReference,
) -> Result<RegionSet> {
    let scheme = data.scheme_id();
    if *scheme == SchemeId::Catalog(CatalogScheme::StatesConus) {
        return weighted_average(data, weights, cross_reference);
    }
    let states = SchemeId::Catalog(CatalogScheme::States);
    if *scheme != states {
        return Err(RegionError::SchemeMismatch {
            left: scheme.clone(),
            right: states,
        });
    }
    aggregate(data, weights, cross_reference, &NON_CONUS_STATES)
}

/// Shared body of the coarse averages. Fine regions named in `excluded`
/// carry no weight and their data is never read.
fn aggregate(
    data: &RegionSet,
    weights: &RegionSet,
    cross_reference: &CrossReference,
    excluded: &[&str],
) -> Result<RegionSet> {
    check_pair(data, weights)?;
    if data.scheme_id() != cross_reference.fine_id() || data.ids() != cross_reference.fine().ids() {
        return Err(RegionError::SchemeMismatch {
            left: data.scheme_id().clone(),
            right: cross_reference.fine_id().clone(),
        });
    }
    let bucket_of: Vec<Option<usize>> = data
        .ids()
        .iter()
        .enumerate()
        .map(|(slot, id)| {
            if excluded.contains(&id.as_str()) {
                None
            } else {
                Some(cross_reference.container_slot(slot))
            }
        })
        .collect();
    check_weights(weights, &bucket_of)?;

    let coarse = cross_reference.coarse();
    debug!(
        "Aggregating {} {} regions into {} {} regions",
        data.len(),
        data.scheme_id(),
        coarse.len(),
        coarse.id()
    );
    let totals = reduce(data, weights, &bucket_of, coarse.len());

    // sentinel first, so a total equal to it is stored as absent
    let mut result = RegionSet::new(coarse.clone());
    if let Some(sentinel) = data.sentinel() {
        result.set_missing_sentinel(sentinel);
    }
    for (id, total) in coarse.ids().iter().zip(totals) {
        if let Some(total) = total {
            result.set_value(id, total)?;
        }
    }
    if !result.is_complete() {
        let absent: Vec<&str> = result
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(id, _)| id)
            .collect();
        warn!(
            "Weighted average into {} is incomplete; absent data left {} regions missing: {}",
            coarse.id(),
            absent.len(),
            absent.join(", ")
        );
    }
    Ok(result)
}

/// Weighted average of every region of `data` into one number.
///
/// Returns `data`'s sentinel (as a number, `None` if it has none) when a
/// region with nonzero weight has absent data.
pub fn weighted_average_scalar(data: &RegionSet, weights: &RegionSet) -> Result<Option<f64>> {
    check_pair(data, weights)?;
    let bucket_of = vec![Some(0); data.len()];
    check_weights(weights, &bucket_of)?;
    Ok(scalar_total(data, weights, &bucket_of))
}

/// Weighted average over the contiguous states only. Accepts the 50-state
/// or the 48-state scheme; Alaska and Hawaii are ignored, weights included.
pub fn weighted_average_scalar_conus(data: &RegionSet, weights: &RegionSet) -> Result<Option<f64>> {
    let scheme = data.scheme_id();
    if *scheme != SchemeId::Catalog(CatalogScheme::States) && *scheme != SchemeId::Catalog(CatalogScheme::StatesConus) {
        return Err(RegionError::SchemeMismatch {
            left: scheme.clone(),
            right: SchemeId::Catalog(CatalogScheme::StatesConus),
        });
    }
    check_pair(data, weights)?;
    let bucket_of: Vec<Option<usize>> = data
        .ids()
        .iter()
        .map(|id| if NON_CONUS_STATES.contains(&id.as_str()) { None } else { Some(0) })
        .collect();
    check_weights(weights, &bucket_of)?;
    Ok(scalar_total(data, weights, &bucket_of))
}

fn scalar_total(data: &RegionSet, weights: &RegionSet, bucket_of: &[Option<usize>]) -> Option<f64> {
    match reduce(data, weights, bucket_of, 1)[0] {
        Some(total) => Some(total),
        None => {
            warn!(
                "Weighted average of {} hit absent data; returning the missing sentinel",
                data.scheme_id()
            );
            data.sentinel().and_then(Value::as_number)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpc_regions::catalog::{self, new_ids};
    use cpc_regions::Scheme;
    use std::sync::Arc;

    fn flat() -> Arc<Scheme> {
        Scheme::from_reference(
            "flat.txt",
            vec![
                ("A".to_string(), "ALPHA".to_string()),
                ("B".to_string(), "BRAVO".to_string()),
                ("C".to_string(), "CHARLIE".to_string()),
            ],
        )
        .unwrap()
    }

    fn set_of(scheme: &Arc<Scheme>, values: &[(&str, f64)]) -> RegionSet {
        let mut set = RegionSet::new(scheme.clone());
        set.set_values(values.iter().copied());
        set
    }

    fn abc_to_xy(fine: &Arc<Scheme>) -> CrossReference {
        let coarse = Scheme::from_reference(
            "coarse.txt",
            vec![("X".to_string(), "EX".to_string()), ("Y".to_string(), "WHY".to_string())],
        )
        .unwrap();
        let mut containers = RegionSet::new(fine.clone());
        containers.set_values([("A", "X"), ("B", "X"), ("C", "Y")]);
        CrossReference::from_container_ids(&containers, coarse).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_equal_weights_give_mean() {
        let s = flat();
        let data = set_of(&s, &[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        let weights = set_of(&s, &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
        let avg = weighted_average_scalar(&data, &weights).unwrap().unwrap();
        assert!(close(avg, 2.0));
    }

    #[test]
    fn test_single_nonzero_weight() {
        let s = flat();
        let data = set_of(&s, &[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        let weights = set_of(&s, &[("A", 1.0), ("B", 0.0), ("C", 0.0)]);
        let avg = weighted_average_scalar(&data, &weights).unwrap().unwrap();
        assert!(close(avg, 1.0));
    }

    #[test]
    fn test_equal_weights_mean_over_nonzero_regions() {
        let s = flat();
        let data = set_of(&s, &[("A", 4.0), ("B", 8.0), ("C", 100.0)]);
        let weights = set_of(&s, &[("A", 2.5), ("B", 2.5), ("C", 0.0)]);
        let avg = weighted_average_scalar(&data, &weights).unwrap().unwrap();
        assert!(close(avg, 6.0));
    }

    #[test]
    fn test_absent_data_returns_sentinel() {
        let s = flat();
        let mut data = set_of(&s, &[("B", 2.0), ("C", 3.0)]);
        data.set_missing_sentinel(-9999);
        let weights = set_of(&s, &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
        assert_eq!(weighted_average_scalar(&data, &weights).unwrap(), Some(-9999.0));

        let mut no_sentinel = set_of(&s, &[("B", 2.0), ("C", 3.0)]);
        assert_eq!(weighted_average_scalar(&no_sentinel, &weights).unwrap(), None);

        // absent data under a zero weight is skipped
        no_sentinel.set_missing_sentinel(-9999);
        let weights = set_of(&s, &[("A", 0.0), ("B", 1.0), ("C", 1.0)]);
        let avg = weighted_average_scalar(&no_sentinel, &weights).unwrap().unwrap();
        assert!(close(avg, 2.5));
    }

    #[test]
    fn test_cross_reference_average() {
        let s = flat();
        let data = set_of(&s, &[("A", 1.0), ("B", 3.0), ("C", 5.0)]);
        let weights = set_of(&s, &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
        let result = weighted_average(&data, &weights, &abc_to_xy(&s)).unwrap();
        assert!(close(result.number("X").unwrap(), 2.0));
        assert!(close(result.number("Y").unwrap(), 5.0));
        assert!(result.is_complete());
    }

    #[test]
    fn test_zero_sum_bucket_defaults_to_zero() {
        let s = flat();
        let data = set_of(&s, &[("A", 1.0), ("B", 3.0), ("C", 5.0)]);
        let weights = set_of(&s, &[("A", 0.0), ("B", 0.0), ("C", 2.0)]);
        let result = weighted_average(&data, &weights, &abc_to_xy(&s)).unwrap();
        assert_eq!(result.number("X"), Some(0.0));
        assert!(close(result.number("Y").unwrap(), 5.0));

        let mut partial = set_of(&s, &[("C", 5.0)]);
        partial.set_missing_sentinel(-9999);
        let result = weighted_average(&partial, &weights, &abc_to_xy(&s)).unwrap();
        assert_eq!(result.number("X"), Some(0.0));
    }

    #[test]
    fn test_absent_member_makes_coarse_absent() {
        let s = flat();
        let mut data = set_of(&s, &[("A", 1.0), ("C", 5.0)]);
        data.set_missing_sentinel(-9999);
        let weights = set_of(&s, &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
        let result = weighted_average(&data, &weights, &abc_to_xy(&s)).unwrap();
        assert_eq!(result.is_missing("X"), Some(true));
        assert_eq!(result.get_value("X"), Some(Value::Number(-9999.0)));
        assert!(close(result.number("Y").unwrap(), 5.0));
        assert_eq!(result.sentinel(), Some(&Value::Number(-9999.0)));
    }

    #[test]
    fn test_incomplete_weights() {
        let s = flat();
        let data = set_of(&s, &[("A", 1.0), ("B", 3.0), ("C", 5.0)]);
        let weights = set_of(&s, &[("A", 1.0), ("C", 1.0)]);
        match weighted_average(&data, &weights, &abc_to_xy(&s)) {
            Err(RegionError::IncompleteWeights(missing)) => assert_eq!(missing, vec!["B".to_string()]),
            other => panic!("expected IncompleteWeights, got {:?}", other),
        }
        assert!(matches!(
            weighted_average_scalar(&data, &weights),
            Err(RegionError::IncompleteWeights(_))
        ));
    }

    #[test]
    fn test_validation_failures() {
        let s = flat();
        let other = Scheme::from_reference("other.txt", vec![("A".to_string(), "A".to_string())]).unwrap();
        let data = set_of(&s, &[("A", 1.0), ("B", 3.0), ("C", 5.0)]);
        let foreign = set_of(&other, &[("A", 1.0)]);
        assert!(matches!(
            weighted_average_scalar(&data, &foreign),
            Err(RegionError::SchemeMismatch { .. })
        ));

        let mut text = data.clone();
        text.set_value("B", "HEAVY").unwrap();
        let weights = set_of(&s, &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
        assert!(matches!(
            weighted_average_scalar(&text, &weights),
            Err(RegionError::NonNumericOperand(_))
        ));

        let states_xref = catalog::cross_reference(CatalogScheme::States, CatalogScheme::CensusDivisions).unwrap();
        assert!(matches!(
            weighted_average(&data, &weights, &states_xref),
            Err(RegionError::SchemeMismatch { .. })
        ));
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let s = flat();
        let data = set_of(&s, &[("A", 1.0), ("B", 3.0), ("C", 5.0)]);
        let weights = set_of(&s, &[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        let before = (data.values(), weights.values());
        weighted_average(&data, &weights, &abc_to_xy(&s)).unwrap();
        weighted_average_scalar(&data, &weights).unwrap();
        assert_eq!(before, (data.values(), weights.values()));
    }

    fn states_with(value: f64) -> RegionSet {
        let mut set = new_ids(CatalogScheme::States);
        set.initialize(value);
        set
    }

    #[test]
    fn test_conus_path_ignores_alaska_and_hawaii() {
        let mut data = states_with(10.0);
        data.set_missing_sentinel(-9999);
        data.set_value("AK", -9999.0).unwrap();
        data.set_value("HI", -9999.0).unwrap();
        let mut weights = states_with(1.0);
        weights.set_missing_sentinel(-9999);
        weights.set_value("AK", -9999.0).unwrap();
        weights.set_value("HI", -9999.0).unwrap();

        let xref = catalog::cross_reference(CatalogScheme::States, CatalogScheme::CensusDivisions).unwrap();
        assert!(matches!(
            weighted_average(&data, &weights, &xref),
            Err(RegionError::IncompleteWeights(_))
        ));

        let result = weighted_average_conus(&data, &weights, &xref).unwrap();
        assert!(result.is_complete());
        assert!(close(result.number("9").unwrap(), 10.0));
        // caller's sets untouched
        assert_eq!(weights.is_missing("AK"), Some(true));
        assert_eq!(data.is_missing("HI"), Some(true));

        let avg = weighted_average_scalar_conus(&data, &weights).unwrap().unwrap();
        assert!(close(avg, 10.0));
    }

    #[test]
    fn test_conus_path_with_zero_as_missing_weight() {
        let data = states_with(10.0);
        let mut weights = states_with(1.0);
        weights.set_missing_sentinel(0);
        weights.set_value("AK", 0.0).unwrap();
        weights.set_value("HI", 0.0).unwrap();
        assert_eq!(weights.is_missing("AK"), Some(true));

        let xref = catalog::cross_reference(CatalogScheme::States, CatalogScheme::CensusDivisions).unwrap();
        let result = weighted_average_conus(&data, &weights, &xref).unwrap();
        assert!(result.is_complete());
        assert!(close(result.number("9").unwrap(), 10.0));
        assert!(close(result.number("7").unwrap(), 10.0));
    }

    #[test]
    fn test_total_equal_to_sentinel_is_absent() {
        let s = flat();
        let mut data = set_of(&s, &[("A", 1.0), ("B", 3.0), ("C", 5.0)]);
        data.set_missing_sentinel(2);
        let weights = set_of(&s, &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
        let result = weighted_average(&data, &weights, &abc_to_xy(&s)).unwrap();
        assert_eq!(result.is_missing("X"), Some(true));
        assert_eq!(result.get_value("X"), Some(Value::Number(2.0)));
        assert!(close(result.number("Y").unwrap(), 5.0));
        assert_eq!(result.sentinel(), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_conus_path_requires_contiguous_weights() {
        let data = states_with(10.0);
        let mut weights = states_with(1.0);
        weights.set_missing_sentinel(-9999);
        weights.set_value("TX", -9999.0).unwrap();
        let xref = catalog::cross_reference(CatalogScheme::States, CatalogScheme::CensusDivisions).unwrap();
        match weighted_average_conus(&data, &weights, &xref) {
            Err(RegionError::IncompleteWeights(missing)) => assert_eq!(missing, vec!["TX".to_string()]),
            other => panic!("expected IncompleteWeights, got {:?}", other),
        }
        assert!(matches!(
            weighted_average_scalar_conus(&data, &weights),
            Err(RegionError::IncompleteWeights(_))
        ));
    }

    #[test]
    fn test_scalar_conus_excludes_non_contiguous_values() {
        let mut data = states_with(2.0);
        data.set_value("AK", 1000.0).unwrap();
        let weights = states_with(1.0);
        let avg = weighted_average_scalar_conus(&data, &weights).unwrap().unwrap();
        assert!(close(avg, 2.0));
        let all = weighted_average_scalar(&data, &weights).unwrap().unwrap();
        assert!(all > 2.0);
    }

    #[test]
    fn test_conus_rejects_other_schemes() {
        let s = flat();
        let data = set_of(&s, &[("A", 1.0), ("B", 3.0), ("C", 5.0)]);
        assert!(matches!(
            weighted_average_scalar_conus(&data, &data),
            Err(RegionError::SchemeMismatch { .. })
        ));
    }

    #[test]
    fn test_climate_divisions_to_states() {
        let mut data = new_ids(CatalogScheme::ClimateDivisions);
        data.initialize(0.0);
        // Texas divisions 4101..4110 hold 1..10
        for d in 1..=10 {
            data.set_value(&format!("41{:02}", d), f64::from(d)).unwrap();
        }
        let mut weights = new_ids(CatalogScheme::ClimateDivisions);
        weights.initialize(1.0);
        let xref = catalog::cross_reference(CatalogScheme::ClimateDivisions, CatalogScheme::States).unwrap();
        let result = weighted_average(&data, &weights, &xref).unwrap();
        assert!(close(result.number("TX").unwrap(), 5.5));
        assert_eq!(result.number("CA"), Some(0.0));
        // no climate divisions in Alaska or Hawaii: empty buckets average to 0
        assert_eq!(result.number("AK"), Some(0.0));
        assert_eq!(result.len(), 50);
    }
}
