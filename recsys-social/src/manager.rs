//! Social context generation
//!
//! # Phases
//! 1. **Clustering**: fetch profiles and top subjects, build canopies, replace
//!    the stored clusters and the subjects they were measured on
//! 2. **Learning object assignment**: for every cluster, re-read its members
//!    from the store, rank their learning objects, persist the ranking
//!
//! The canopies produced by phase 1 are handed straight to phase 2. Clusters
//! are ranked concurrently (`ranking.concurrency`); rankings are persisted in
//! cluster order.

use crate::canopy::Canopy;
use crate::clusterer::CanopyClusterer;
use crate::distance::{DistanceMeasure, SubjectDistance};
use crate::nearest::{ClusterLookup, NearestClusterFinder};
use crate::ranker::ClusterContentRanker;
use crate::store::{ClusterStore, ProfileSource};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use recsys_common::config::{ClusteringConfig, RankingConfig};
use recsys_common::{CanopyId, Result, StorageContext, UserId};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one social context generation run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub profile_count: usize,
    pub cluster_count: usize,
    pub assignment_count: usize,
}

/// Stored clusters and their sizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClustersReport {
    pub clusters: Vec<ClusterSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    pub canopy_id: CanopyId,
    pub center_user_id: UserId,
    pub member_count: usize,
}

impl fmt::Display for ClustersReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "*****************************************";
        writeln!(f, "{}", rule)?;
        writeln!(f, "Number of social clusters created: {}", self.clusters.len())?;
        writeln!(f, "{}", rule)?;
        for cluster in &self.clusters {
            writeln!(
                f,
                "Cluster {} : {} users",
                cluster.canopy_id, cluster.member_count
            )?;
        }
        Ok(())
    }
}

/// Generates and queries the social clusters
pub struct SocialContextManager {
    source: Arc<dyn ProfileSource>,
    store: Arc<dyn ClusterStore>,
    measure: Arc<dyn DistanceMeasure>,
    clustering: ClusteringConfig,
    ranking: RankingConfig,
}

impl SocialContextManager {
    /// Manager using [`SubjectDistance`]; fails on invalid configuration
    pub fn new(
        source: Arc<dyn ProfileSource>,
        store: Arc<dyn ClusterStore>,
        clustering: ClusteringConfig,
        ranking: RankingConfig,
    ) -> Result<Self> {
        clustering.validate()?;
        ranking.validate()?;
        Ok(Self {
            source,
            store,
            measure: Arc::new(SubjectDistance),
            clustering,
            ranking,
        })
    }

    pub fn with_measure(mut self, measure: Arc<dyn DistanceMeasure>) -> Self {
        self.measure = measure;
        self
    }

    /// Cluster every user and rank learning objects for every cluster
    pub async fn generate_social_context(&self) -> Result<RunSummary> {
        let started_at = Utc::now();

        let (canopies, profile_count) = self.do_user_profile_clustering().await?;
        let assignment_count = self.do_learning_object_assignment(&canopies).await?;

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            profile_count,
            cluster_count: canopies.len(),
            assignment_count,
        };
        info!(
            profile_count,
            cluster_count = summary.cluster_count,
            assignment_count,
            elapsed_ms = (summary.finished_at - started_at).num_milliseconds(),
            "Social context generated"
        );
        Ok(summary)
    }

    async fn do_user_profile_clustering(&self) -> Result<(Vec<Canopy>, usize)> {
        info!("User profile clustering started");

        let clusterer = CanopyClusterer::from_config(self.measure.clone(), &self.clustering)?;

        let profiles = self
            .source
            .fetch_all_profiles()
            .await
            .storage_context(|| "fetching user profiles")?;
        let dimensions = self
            .source
            .fetch_top_feature_dimensions(self.clustering.top_subjects)
            .await
            .storage_context(|| "fetching top subjects")?;
        debug!(?dimensions, "Top subjects");

        let canopies = clusterer.create_canopies(&profiles, &dimensions)?;

        self.store
            .reset()
            .await
            .storage_context(|| "clearing previous clusters")?;
        for canopy in &canopies {
            self.store
                .persist_canopy(canopy)
                .await
                .storage_context(|| format!("persisting cluster {}", canopy.id))?;
        }
        self.store
            .persist_dimensions(&dimensions)
            .await
            .storage_context(|| "persisting clustering subjects")?;

        info!(
            cluster_count = canopies.len(),
            "User profile clustering finished"
        );
        Ok((canopies, profiles.len()))
    }

    async fn do_learning_object_assignment(&self, canopies: &[Canopy]) -> Result<usize> {
        info!("Learning object assignment started");

        let ranker = ClusterContentRanker::new(self.source.clone());
        let ranker = &ranker;

        let mut rankings = std::pin::pin!(stream::iter(canopies)
            .map(|canopy| async move {
                let members = self
                    .store
                    .fetch_members_of_canopy(canopy.id)
                    .await
                    .storage_context(|| format!("fetching members of cluster {}", canopy.id))?;
                ranker.rank(canopy.id, &members).await
            })
            .buffered(self.ranking.concurrency));

        let mut assignment_count = 0;
        while let Some(ranking) = rankings.try_next().await? {
            for assignment in &ranking {
                self.store
                    .persist_ranked_assignment(assignment)
                    .await
                    .storage_context(|| {
                        format!(
                            "persisting learning object {} for cluster {}",
                            assignment.content.id, assignment.canopy_id
                        )
                    })?;
            }
            assignment_count += ranking.len();
        }

        info!(assignment_count, "Learning object assignment finished");
        Ok(assignment_count)
    }

    /// Cluster of `user_id`, or the closest one for users outside every cluster
    ///
    /// Distances use the subjects the stored clusters were built on, not the
    /// current top subjects of the source platform.
    pub async fn discover_user_cluster(&self, user_id: UserId) -> Result<ClusterLookup> {
        let dimensions = self
            .store
            .fetch_dimensions()
            .await
            .storage_context(|| "fetching clustering subjects")?;

        NearestClusterFinder::new(self.measure.clone(), self.source.clone(), self.store.clone())
            .with_dimensions(dimensions)
            .find(user_id)
            .await
    }

    /// Number of stored clusters and users per cluster
    pub async fn clusters_information(&self) -> Result<ClustersReport> {
        let canopies = self
            .store
            .fetch_all_canopies()
            .await
            .storage_context(|| "fetching clusters")?;

        Ok(ClustersReport {
            clusters: canopies
                .iter()
                .map(|c| ClusterSummary {
                    canopy_id: c.id,
                    center_user_id: c.center.id,
                    member_count: c.len(),
                })
                .collect(),
        })
    }
}
