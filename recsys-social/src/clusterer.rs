//! Canopy clustering of user profiles
//!
//! **Algorithm:**
//! 1. The candidate pool starts as every profile, in input order
//! 2. The first pool profile becomes the center of a new canopy and leaves the pool
//! 3. Every remaining pool profile closer than `loose` to the center joins the canopy;
//!    closer than `tight` it also leaves the pool for good
//! 4. Repeat until the pool is empty
//!
//! Loose membership may overlap across canopies. Worst case is O(n²) distance
//! evaluations.

use crate::canopy::Canopy;
use crate::distance::DistanceMeasure;
use recsys_common::config::{validate_thresholds, ClusteringConfig};
use recsys_common::{CanopyId, Dimension, Result, UserProfile};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Canopy clusterer over a pluggable distance measure
pub struct CanopyClusterer<M> {
    measure: M,
    loose: f64,
    tight: f64,
    id_base: CanopyId,
}

impl<M: DistanceMeasure> CanopyClusterer<M> {
    /// Create a clusterer; fails with `Error::Config` unless `loose > tight >= 0`
    pub fn new(measure: M, loose: f64, tight: f64) -> Result<Self> {
        validate_thresholds(loose, tight)?;
        Ok(Self {
            measure,
            loose,
            tight,
            id_base: 1,
        })
    }

    /// Thresholds and id base from configuration
    pub fn from_config(measure: M, config: &ClusteringConfig) -> Result<Self> {
        Ok(Self::new(measure, config.loose, config.tight)?.with_id_base(config.canopy_id_base))
    }

    /// Id assigned to the first canopy (default 1)
    pub fn with_id_base(mut self, id_base: CanopyId) -> Self {
        self.id_base = id_base;
        self
    }

    pub fn loose(&self) -> f64 {
        self.loose
    }

    pub fn tight(&self) -> f64 {
        self.tight
    }

    /// Build the canopies for `profiles`, comparing over `dimensions`
    ///
    /// Canopies are returned in creation order. An empty population yields no
    /// canopies. A distance failure aborts the run without a partial result.
    pub fn create_canopies(
        &self,
        profiles: &[UserProfile],
        dimensions: &[Dimension],
    ) -> Result<Vec<Canopy>> {
        let mut pool: VecDeque<&UserProfile> = profiles.iter().collect();
        let mut canopies = Vec::new();
        let mut next_id = self.id_base;

        while let Some(center) = pool.pop_front() {
            let mut canopy = Canopy::new(next_id, center.clone());
            next_id += 1;

            let mut remaining = VecDeque::with_capacity(pool.len());
            for candidate in pool.drain(..) {
                let distance = self.measure.distance(center, candidate, dimensions)?;

                if distance < self.loose {
                    canopy.add_member(candidate.clone());
                }
                if distance < self.tight {
                    continue;
                }
                remaining.push_back(candidate);
            }
            pool = remaining;

            debug!(
                canopy_id = canopy.id,
                center_id = center.id,
                member_count = canopy.len(),
                pool_remaining = pool.len(),
                "Canopy created"
            );
            canopies.push(canopy);
        }

        info!(
            profile_count = profiles.len(),
            canopy_count = canopies.len(),
            "Canopy clustering complete"
        );

        Ok(canopies)
    }
}
