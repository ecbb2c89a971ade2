//! Recommender database: clusters, members and ranked learning objects

use crate::canopy::Canopy;
use crate::ranker::RankedAssignment;
use crate::store::ClusterStore;
use async_trait::async_trait;
use recsys_common::db::{create_recsys_schema, open_database};
use recsys_common::{CanopyId, ContentItem, Dimension, Error, Result, UserId, UserProfile};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info};

/// [`ClusterStore`] over the recommender SQLite database
///
/// Profiles are stored as JSON so cluster centers can be measured without
/// going back to the source platform.
#[derive(Clone)]
pub struct SqliteClusterStore {
    pool: SqlitePool,
}

impl SqliteClusterStore {
    /// Wrap a pool whose schema is already in place
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the recommender database and its tables
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = open_database(db_path).await?;
        create_recsys_schema(&pool).await?;
        info!("Recommender database: {}", db_path.display());
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ClusterStore for SqliteClusterStore {
    async fn reset(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM cluster_learning_objects")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM cluster_users")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM clusters").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM cluster_dimensions")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Cluster tables cleared");
        Ok(())
    }

    async fn persist_canopy(&self, canopy: &Canopy) -> Result<()> {
        let center_json = serde_json::to_string(&canopy.center)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO clusters (id, center_user_id, center_profile) VALUES (?, ?, ?)")
            .bind(canopy.id)
            .bind(canopy.center.id)
            .bind(&center_json)
            .execute(&mut *tx)
            .await?;

        for (order, member) in canopy.members.iter().enumerate() {
            let profile_json = serde_json::to_string(member)?;
            sqlx::query(
                r#"
                INSERT INTO cluster_users (cluster_id, user_id, member_order, profile)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(canopy.id)
            .bind(member.id)
            .bind(order as i64)
            .bind(&profile_json)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(
            canopy_id = canopy.id,
            member_count = canopy.len(),
            "Cluster persisted"
        );
        Ok(())
    }

    async fn fetch_members_of_canopy(&self, canopy_id: CanopyId) -> Result<Vec<UserProfile>> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT profile FROM cluster_users WHERE cluster_id = ? ORDER BY member_order",
        )
        .bind(canopy_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|json| serde_json::from_str::<UserProfile>(json).map_err(Error::from))
            .collect()
    }

    async fn persist_ranked_assignment(&self, assignment: &RankedAssignment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO cluster_learning_objects (
                cluster_id, learning_object_id, owner_id, title, visit_count, position
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(assignment.canopy_id)
        .bind(assignment.content.id)
        .bind(assignment.content.owner_id)
        .bind(&assignment.content.title)
        .bind(assignment.content.visit_count)
        .bind(assignment.position as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_all_canopies(&self) -> Result<Vec<Canopy>> {
        let clusters = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, center_profile FROM clusters ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut canopies = Vec::with_capacity(clusters.len());
        for (id, center_json) in clusters {
            let center: UserProfile = serde_json::from_str(&center_json)?;
            let members = self.fetch_members_of_canopy(id).await?;
            canopies.push(Canopy::from_parts(id, center, members));
        }

        Ok(canopies)
    }

    async fn fetch_existing_cluster_id_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<CanopyId>> {
        let cluster_id = sqlx::query_scalar::<_, i64>(
            "SELECT cluster_id FROM cluster_users WHERE user_id = ? ORDER BY cluster_id LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cluster_id)
    }

    async fn fetch_ranking(&self, canopy_id: CanopyId) -> Result<Vec<RankedAssignment>> {
        let rows = sqlx::query_as::<_, (i64, i64, Option<String>, i64, i64)>(
            r#"
            SELECT learning_object_id, owner_id, title, visit_count, position
            FROM cluster_learning_objects
            WHERE cluster_id = ?
            ORDER BY position
            "#,
        )
        .bind(canopy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, owner_id, title, visit_count, position)| RankedAssignment {
                content: ContentItem {
                    id,
                    owner_id,
                    title,
                    visit_count,
                },
                canopy_id,
                position: position as u32,
            })
            .collect())
    }

    async fn persist_dimensions(&self, dimensions: &[Dimension]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM cluster_dimensions")
            .execute(&mut *tx)
            .await?;
        for (order, subject) in dimensions.iter().enumerate() {
            sqlx::query("INSERT INTO cluster_dimensions (dimension_order, subject) VALUES (?, ?)")
                .bind(order as i64)
                .bind(subject)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        debug!(?dimensions, "Clustering dimensions persisted");
        Ok(())
    }

    async fn fetch_dimensions(&self) -> Result<Vec<Dimension>> {
        let subjects = sqlx::query_scalar::<_, String>(
            "SELECT subject FROM cluster_dimensions ORDER BY dimension_order",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }
}
