//! Storage collaborators
//!
//! The clustering core reads profiles and learning objects from the source
//! platform through [`ProfileSource`] and keeps its results in a
//! [`ClusterStore`]. SQLite implementations live in [`crate::db`]; the
//! in-memory ones here back dry runs and tests.

use crate::canopy::Canopy;
use crate::ranker::RankedAssignment;
use async_trait::async_trait;
use recsys_common::{CanopyId, ContentItem, Dimension, Result, UserId, UserProfile};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Read access to the source platform
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Every user profile, in a stable order
    async fn fetch_all_profiles(&self) -> Result<Vec<UserProfile>>;

    /// The `k` most common subjects across the population
    async fn fetch_top_feature_dimensions(&self, k: usize) -> Result<Vec<Dimension>>;

    /// One user's profile; `None` if the user does not exist
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<UserProfile>>;

    /// Learning objects associated with a user, in stored order
    async fn fetch_content_items_for_user(&self, user_id: UserId) -> Result<Vec<ContentItem>>;
}

/// Durable home of clusters, memberships and rankings
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Drop the previous run's clusters, memberships and rankings
    async fn reset(&self) -> Result<()>;

    async fn persist_canopy(&self, canopy: &Canopy) -> Result<()>;

    /// Members of a cluster in stored order (center first)
    async fn fetch_members_of_canopy(&self, canopy_id: CanopyId) -> Result<Vec<UserProfile>>;

    async fn persist_ranked_assignment(&self, assignment: &RankedAssignment) -> Result<()>;

    /// All clusters in id order
    async fn fetch_all_canopies(&self) -> Result<Vec<Canopy>>;

    /// Lowest cluster id the user is a member of, if any
    async fn fetch_existing_cluster_id_for_user(&self, user_id: UserId)
        -> Result<Option<CanopyId>>;

    /// Stored ranking of a cluster by position
    async fn fetch_ranking(&self, canopy_id: CanopyId) -> Result<Vec<RankedAssignment>>;

    /// Record the dimensions the stored clusters were built on
    async fn persist_dimensions(&self, dimensions: &[Dimension]) -> Result<()>;

    /// Dimensions of the stored run in rank order; empty before any run
    async fn fetch_dimensions(&self) -> Result<Vec<Dimension>>;
}

/// Most frequent subjects first, ties by name
pub fn top_subjects<'a>(
    profiles: impl IntoIterator<Item = &'a UserProfile>,
    k: usize,
) -> Vec<Dimension> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for profile in profiles {
        for subject in profile.subjects.keys() {
            *counts.entry(subject.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(k)
        .map(|(subject, _)| subject.to_string())
        .collect()
}

/// Source platform held in memory
#[derive(Debug, Default)]
pub struct MemoryProfileSource {
    profiles: Vec<UserProfile>,
    content: HashMap<UserId, Vec<ContentItem>>,
}

impl MemoryProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    /// Associate a learning object with a user (appended to their list)
    pub fn with_content(mut self, user_id: UserId, item: ContentItem) -> Self {
        self.content.entry(user_id).or_default().push(item);
        self
    }
}

#[async_trait]
impl ProfileSource for MemoryProfileSource {
    async fn fetch_all_profiles(&self) -> Result<Vec<UserProfile>> {
        Ok(self.profiles.clone())
    }

    async fn fetch_top_feature_dimensions(&self, k: usize) -> Result<Vec<Dimension>> {
        Ok(top_subjects(&self.profiles, k))
    }

    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        Ok(self.profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn fetch_content_items_for_user(&self, user_id: UserId) -> Result<Vec<ContentItem>> {
        Ok(self.content.get(&user_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Default)]
struct MemoryClusterState {
    canopies: BTreeMap<CanopyId, Canopy>,
    /// Keyed by position; an assignment replaces the one at its position
    rankings: BTreeMap<CanopyId, BTreeMap<u32, RankedAssignment>>,
    dimensions: Vec<Dimension>,
}

/// Cluster store held in memory
#[derive(Debug, Default)]
pub struct MemoryClusterStore {
    state: RwLock<MemoryClusterState>,
}

impl MemoryClusterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClusterStore for MemoryClusterStore {
    async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.canopies.clear();
        state.rankings.clear();
        state.dimensions.clear();
        Ok(())
    }

    async fn persist_canopy(&self, canopy: &Canopy) -> Result<()> {
        self.state
            .write()
            .await
            .canopies
            .insert(canopy.id, canopy.clone());
        Ok(())
    }

    async fn fetch_members_of_canopy(&self, canopy_id: CanopyId) -> Result<Vec<UserProfile>> {
        Ok(self
            .state
            .read()
            .await
            .canopies
            .get(&canopy_id)
            .map(|c| c.members.clone())
            .unwrap_or_default())
    }

    async fn persist_ranked_assignment(&self, assignment: &RankedAssignment) -> Result<()> {
        self.state
            .write()
            .await
            .rankings
            .entry(assignment.canopy_id)
            .or_default()
            .insert(assignment.position, assignment.clone());
        Ok(())
    }

    async fn fetch_all_canopies(&self) -> Result<Vec<Canopy>> {
        Ok(self.state.read().await.canopies.values().cloned().collect())
    }

    async fn fetch_existing_cluster_id_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<CanopyId>> {
        Ok(self
            .state
            .read()
            .await
            .canopies
            .values()
            .find(|c| c.contains(user_id))
            .map(|c| c.id))
    }

    async fn fetch_ranking(&self, canopy_id: CanopyId) -> Result<Vec<RankedAssignment>> {
        Ok(self
            .state
            .read()
            .await
            .rankings
            .get(&canopy_id)
            .map(|ranking| ranking.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn persist_dimensions(&self, dimensions: &[Dimension]) -> Result<()> {
        self.state.write().await.dimensions = dimensions.to_vec();
        Ok(())
    }

    async fn fetch_dimensions(&self) -> Result<Vec<Dimension>> {
        Ok(self.state.read().await.dimensions.clone())
    }
}
