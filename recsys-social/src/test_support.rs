//! Distance measures and stores for unit tests

use crate::canopy::Canopy;
use crate::distance::DistanceMeasure;
use crate::ranker::RankedAssignment;
use crate::store::{ClusterStore, MemoryClusterStore};
use async_trait::async_trait;
use recsys_common::{CanopyId, Dimension, Error, Result, UserId, UserProfile};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Distances looked up from an explicit symmetric table
pub struct PairwiseDistance {
    table: HashMap<(UserId, UserId), f64>,
    fallback: f64,
    failing_user: Option<UserId>,
    calls: Mutex<Vec<(UserId, UserId)>>,
}

impl PairwiseDistance {
    pub fn new(fallback: f64) -> Self {
        Self {
            table: HashMap::new(),
            fallback,
            failing_user: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set(mut self, a: UserId, b: UserId, distance: f64) -> Self {
        self.table.insert((a, b), distance);
        self.table.insert((b, a), distance);
        self
    }

    /// Any comparison involving `user_id` fails as a malformed profile
    pub fn failing_for(mut self, user_id: UserId) -> Self {
        self.failing_user = Some(user_id);
        self
    }

    /// (center, candidate) pairs in call order
    pub fn calls(&self) -> Vec<(UserId, UserId)> {
        self.calls.lock().unwrap().clone()
    }
}

impl DistanceMeasure for PairwiseDistance {
    fn distance(
        &self,
        center: &UserProfile,
        candidate: &UserProfile,
        _dimensions: &[Dimension],
    ) -> Result<f64> {
        self.calls.lock().unwrap().push((center.id, candidate.id));

        if let Some(user_id) = self.failing_user {
            if center.id == user_id || candidate.id == user_id {
                return Err(Error::MalformedProfile {
                    user_id,
                    reason: "test failure".to_string(),
                });
            }
        }

        if center.id == candidate.id {
            return Ok(0.0);
        }
        Ok(*self
            .table
            .get(&(center.id, candidate.id))
            .unwrap_or(&self.fallback))
    }
}

/// Counts invocations and always answers `value`
pub struct CountingDistance {
    pub value: f64,
    pub calls: AtomicUsize,
}

impl CountingDistance {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DistanceMeasure for CountingDistance {
    fn distance(&self, _: &UserProfile, _: &UserProfile, _: &[Dimension]) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value)
    }
}

/// Operation made to fail by [`FailingClusterStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Membership,
    Canopies,
    RankedAssignment,
}

/// In-memory store where one operation always fails with a closed pool
pub struct FailingClusterStore {
    inner: MemoryClusterStore,
    failing: StoreOperation,
}

impl FailingClusterStore {
    pub fn new(failing: StoreOperation) -> Self {
        Self {
            inner: MemoryClusterStore::new(),
            failing,
        }
    }

    pub fn inner(&self) -> &MemoryClusterStore {
        &self.inner
    }

    fn check(&self, operation: StoreOperation) -> Result<()> {
        if operation == self.failing {
            return Err(Error::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterStore for FailingClusterStore {
    async fn reset(&self) -> Result<()> {
        self.inner.reset().await
    }

    async fn persist_canopy(&self, canopy: &Canopy) -> Result<()> {
        self.inner.persist_canopy(canopy).await
    }

    async fn fetch_members_of_canopy(&self, canopy_id: CanopyId) -> Result<Vec<UserProfile>> {
        self.inner.fetch_members_of_canopy(canopy_id).await
    }

    async fn persist_ranked_assignment(&self, assignment: &RankedAssignment) -> Result<()> {
        self.check(StoreOperation::RankedAssignment)?;
        self.inner.persist_ranked_assignment(assignment).await
    }

    async fn fetch_all_canopies(&self) -> Result<Vec<Canopy>> {
        self.check(StoreOperation::Canopies)?;
        self.inner.fetch_all_canopies().await
    }

    async fn fetch_existing_cluster_id_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<CanopyId>> {
        self.check(StoreOperation::Membership)?;
        self.inner.fetch_existing_cluster_id_for_user(user_id).await
    }

    async fn fetch_ranking(&self, canopy_id: CanopyId) -> Result<Vec<RankedAssignment>> {
        self.inner.fetch_ranking(canopy_id).await
    }

    async fn persist_dimensions(&self, dimensions: &[Dimension]) -> Result<()> {
        self.inner.persist_dimensions(dimensions).await
    }

    async fn fetch_dimensions(&self) -> Result<Vec<Dimension>> {
        self.inner.fetch_dimensions().await
    }
}
