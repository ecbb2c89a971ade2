//! recsys-social library - social clustering for the recommender
//!
//! Groups users into overlapping social clusters with canopy clustering over
//! their subject interests, ranks the learning objects of every cluster, and
//! places new users in the closest existing cluster.

pub mod canopy;
pub mod clusterer;
pub mod db;
pub mod distance;
pub mod manager;
pub mod nearest;
pub mod ranker;
pub mod store;

#[cfg(test)]
mod test_support;

pub use canopy::Canopy;
pub use clusterer::CanopyClusterer;
pub use distance::{DistanceMeasure, SubjectDistance};
pub use manager::{ClusterSummary, ClustersReport, RunSummary, SocialContextManager};
pub use nearest::{ClusterLookup, NearestClusterFinder};
pub use ranker::{rank_items, ClusterContentRanker, RankedAssignment};
pub use store::{ClusterStore, MemoryClusterStore, MemoryProfileSource, ProfileSource};
