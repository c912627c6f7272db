//! Weighted aggregation of region data across partition hierarchies.
//!
//! This crate reduces fine-grained region sets (climate divisions, states,
//! stations) to coarser ones (states, census divisions, the nation) using a
//! second region set of weights over the same fine scheme.

pub mod weighted;

pub use weighted::{
    weighted_average, weighted_average_conus, weighted_average_scalar, weighted_average_scalar_conus,
};

/// Weight sets
pub mod weights {
    use cpc_regions::{RegionSet, Scheme};
    use std::sync::Arc;

    /// Every region weighted 1, for plain (unweighted) means.
    pub fn uniform_weights(scheme: Arc<Scheme>) -> RegionSet {
        let mut weights = RegionSet::new(scheme);
        weights.initialize(1.0);
        weights
    }

}
