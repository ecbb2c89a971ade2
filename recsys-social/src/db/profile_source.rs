//! Source platform reads: users, subject interests, learning objects

use crate::store::ProfileSource;
use async_trait::async_trait;
use recsys_common::db::open_database;
use recsys_common::{ContentItem, Dimension, Error, Result, UserId, UserProfile};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// [`ProfileSource`] over the source platform's SQLite database
#[derive(Clone)]
pub struct SqliteProfileSource {
    pool: SqlitePool,
}

impl SqliteProfileSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open an existing source database
    ///
    /// The source database belongs to the platform; a missing file is reported
    /// instead of created empty.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(Error::NotFound(format!(
                "Source database not found: {}",
                db_path.display()
            )));
        }
        let pool = open_database(db_path).await?;
        info!("Source database: {}", db_path.display());
        Ok(Self::new(pool))
    }

    async fn load_subjects(&self, user_id: UserId) -> Result<BTreeMap<String, f64>> {
        let rows = sqlx::query_as::<_, (String, f64)>(
            "SELECT subject, weight FROM user_subjects WHERE user_id = ? ORDER BY subject",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl ProfileSource for SqliteProfileSource {
    async fn fetch_all_profiles(&self) -> Result<Vec<UserProfile>> {
        let users = sqlx::query_as::<_, (i64, Option<String>)>(
            "SELECT id, name FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let subject_rows = sqlx::query_as::<_, (i64, String, f64)>(
            "SELECT user_id, subject, weight FROM user_subjects ORDER BY user_id, subject",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut subjects: BTreeMap<i64, BTreeMap<String, f64>> = BTreeMap::new();
        for (user_id, subject, weight) in subject_rows {
            subjects.entry(user_id).or_default().insert(subject, weight);
        }

        Ok(users
            .into_iter()
            .map(|(id, name)| UserProfile {
                id,
                name,
                subjects: subjects.remove(&id).unwrap_or_default(),
            })
            .collect())
    }

    async fn fetch_top_feature_dimensions(&self, k: usize) -> Result<Vec<Dimension>> {
        let subjects = sqlx::query_scalar::<_, String>(
            r#"
            SELECT subject
            FROM user_subjects
            GROUP BY subject
            ORDER BY COUNT(*) DESC, subject ASC
            LIMIT ?
            "#,
        )
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }

    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, (i64, Option<String>)>(
            "SELECT id, name FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some((id, name)) => Ok(Some(UserProfile {
                id,
                name,
                subjects: self.load_subjects(id).await?,
            })),
            None => Ok(None),
        }
    }

    async fn fetch_content_items_for_user(&self, user_id: UserId) -> Result<Vec<ContentItem>> {
        let rows = sqlx::query_as::<_, (i64, i64, Option<String>, i64)>(
            r#"
            SELECT lo.id, lo.owner_id, lo.title, lo.visit_count
            FROM user_learning_objects ulo
            JOIN learning_objects lo ON lo.id = ulo.learning_object_id
            WHERE ulo.user_id = ?
            ORDER BY ulo.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, owner_id, title, visit_count)| ContentItem {
                id,
                owner_id,
                title,
                visit_count,
            })
            .collect())
    }
}
