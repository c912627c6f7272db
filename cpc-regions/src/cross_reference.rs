use std::sync::Arc;

use crate::error::{RegionError, Result};
use crate::region_set::RegionSet;
use crate::scheme::{Scheme, SchemeId};

/// Fine-to-coarse containment between two schemes, resolved to slots.
#[derive(Debug, Clone)]
pub struct CrossReference {
    fine: Arc<Scheme>,
    coarse: Arc<Scheme>,
    /// coarse slot for each fine slot
    containers: Vec<usize>,
}

impl CrossReference {
    /// Build from a set of the fine scheme whose values name the containing
    /// coarse region. Every fine region must have a container, and every
    /// container must be a coarse ID.
    pub fn from_container_ids(container_ids: &RegionSet, coarse: Arc<Scheme>) -> Result<CrossReference> {
        let mut containers = Vec::with_capacity(container_ids.len());
        for (id, value) in container_ids.iter() {
            let value = value.ok_or_else(|| {
                RegionError::MissingArgument(format!("container of region {:?} in {}", id, container_ids.scheme_id()))
            })?;
            let coarse_id = value.to_string();
            let slot = coarse.slot(&coarse_id).ok_or_else(|| RegionError::InvalidRegionId {
                id: coarse_id.clone(),
                scheme: coarse.id().clone(),
            })?;
            containers.push(slot);
        }
        Ok(CrossReference {
            fine: container_ids.scheme().clone(),
            coarse,
            containers,
        })
    }

    pub fn fine(&self) -> &Arc<Scheme> {
        &self.fine
    }

    pub fn coarse(&self) -> &Arc<Scheme> {
        &self.coarse
    }

    pub fn fine_id(&self) -> &SchemeId {
        self.fine.id()
    }

    /// Coarse slot containing the fine region at `fine_slot`.
    pub fn container_slot(&self, fine_slot: usize) -> usize {
        self.containers[fine_slot]
    }

    /// Coarse ID containing a fine region.
    pub fn container_of(&self, fine_id: &str) -> Option<&str> {
        let slot = self.fine.slot(fine_id)?;
        Some(self.coarse.ids()[self.containers[slot]].as_str())
    }

    /// Fine IDs contained by a coarse region, in fine ID order.
    pub fn members(&self, coarse_id: &str) -> Vec<&str> {
        match self.coarse.slot(coarse_id) {
            Some(coarse_slot) => self
                .fine
                .ids()
                .iter()
                .zip(self.containers.iter())
                .filter(|(_, c)| **c == coarse_slot)
                .map(|(id, _)| id.as_str())
                .collect(),
            None => Vec::new(),
        }
    }
}
