//! Learning object ranking per social cluster
//!
//! **Algorithm:**
//! 1. Concatenate the learning objects of every member (member order outer,
//!    per-member order inner)
//! 2. Drop repeated learning objects, keeping the first occurrence
//! 3. Stable ascending sort by visit count, then reverse the whole list
//! 4. Number the result 1..=n
//!
//! Step 3 is not a descending sort: learning objects with equal visit counts end
//! up in the reverse of their concatenation order, so the one seen last ranks
//! highest.

use crate::store::ProfileSource;
use recsys_common::{CanopyId, ContentItem, Result, StorageContext, UserProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// One learning object's position within one cluster's ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedAssignment {
    pub content: ContentItem,
    pub canopy_id: CanopyId,
    /// Dense, 1-based
    pub position: u32,
}

/// Rank an already concatenated list of learning objects (steps 2-4)
pub fn rank_items(canopy_id: CanopyId, items: Vec<ContentItem>) -> Vec<RankedAssignment> {
    let mut seen = HashSet::new();
    let mut unique: Vec<ContentItem> = items.into_iter().filter(|i| seen.insert(i.id)).collect();

    unique.sort_by_key(|i| i.visit_count);
    unique.reverse();

    unique
        .into_iter()
        .zip(1u32..)
        .map(|(content, position)| RankedAssignment {
            content,
            canopy_id,
            position,
        })
        .collect()
}

/// Gathers and ranks the learning objects of a cluster's members
pub struct ClusterContentRanker {
    source: Arc<dyn ProfileSource>,
}

impl ClusterContentRanker {
    pub fn new(source: Arc<dyn ProfileSource>) -> Self {
        Self { source }
    }

    /// Full replacement ranking for `canopy_id` given its stored members
    pub async fn rank(
        &self,
        canopy_id: CanopyId,
        members: &[UserProfile],
    ) -> Result<Vec<RankedAssignment>> {
        let mut items = Vec::new();
        for member in members {
            let member_items = self
                .source
                .fetch_content_items_for_user(member.id)
                .await
                .storage_context(|| {
                    format!(
                        "fetching learning objects of user {} for cluster {}",
                        member.id, canopy_id
                    )
                })?;
            items.extend(member_items);
        }

        let gathered = items.len();
        let ranking = rank_items(canopy_id, items);

        debug!(
            canopy_id,
            member_count = members.len(),
            gathered,
            item_count = ranking.len(),
            "Cluster ranking computed"
        );

        Ok(ranking)
    }
}
