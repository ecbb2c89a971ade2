//! Cluster discovery for users outside the last clustering run

use crate::distance::DistanceMeasure;
use crate::store::{ClusterStore, ProfileSource};
use recsys_common::{CanopyId, Dimension, Result, StorageContext, UserId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a cluster lookup
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterLookup {
    /// The user is already a member of this cluster
    AlreadyBound(CanopyId),
    /// Closest cluster by center distance
    Nearest { canopy_id: CanopyId, distance: f64 },
    /// No clusters exist, or the user is unknown to the source platform
    NoClusterFound,
}

impl ClusterLookup {
    pub fn cluster_id(&self) -> Option<CanopyId> {
        match self {
            ClusterLookup::AlreadyBound(id) => Some(*id),
            ClusterLookup::Nearest { canopy_id, .. } => Some(*canopy_id),
            ClusterLookup::NoClusterFound => None,
        }
    }
}

/// Finds the closest stored cluster to a user
pub struct NearestClusterFinder<M> {
    measure: M,
    source: Arc<dyn ProfileSource>,
    store: Arc<dyn ClusterStore>,
    dimensions: Vec<Dimension>,
}

impl<M: DistanceMeasure> NearestClusterFinder<M> {
    pub fn new(measure: M, source: Arc<dyn ProfileSource>, store: Arc<dyn ClusterStore>) -> Self {
        Self {
            measure,
            source,
            store,
            dimensions: Vec::new(),
        }
    }

    /// Restrict distances to these dimensions (default: all subjects)
    pub fn with_dimensions(mut self, dimensions: Vec<Dimension>) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Existing membership wins; otherwise the cluster whose center is strictly
    /// closest, the first one on ties
    pub async fn find(&self, user_id: UserId) -> Result<ClusterLookup> {
        info!(user_id, "Discovering closest cluster");

        let existing = self
            .store
            .fetch_existing_cluster_id_for_user(user_id)
            .await
            .storage_context(|| format!("looking up cluster membership of user {}", user_id))?;
        if let Some(canopy_id) = existing {
            debug!(user_id, canopy_id, "User already bound to a cluster");
            return Ok(ClusterLookup::AlreadyBound(canopy_id));
        }

        let target = self
            .source
            .fetch_profile(user_id)
            .await
            .storage_context(|| format!("fetching profile of user {}", user_id))?;
        let Some(target) = target else {
            warn!(user_id, "User profile not found, no cluster assigned");
            return Ok(ClusterLookup::NoClusterFound);
        };

        let canopies = self
            .store
            .fetch_all_canopies()
            .await
            .storage_context(|| format!("fetching clusters for user {}", user_id))?;

        let mut closest: Option<(CanopyId, f64)> = None;
        for canopy in &canopies {
            let distance = self.measure.distance(&canopy.center, &target, &self.dimensions)?;
            if closest.map_or(true, |(_, best)| distance < best) {
                closest = Some((canopy.id, distance));
            }
        }

        match closest {
            Some((canopy_id, distance)) => {
                info!(user_id, canopy_id, distance, "Closest cluster found");
                Ok(ClusterLookup::Nearest {
                    canopy_id,
                    distance,
                })
            }
            None => {
                warn!(user_id, "No clusters exist");
                Ok(ClusterLookup::NoClusterFound)
            }
        }
    }
}
