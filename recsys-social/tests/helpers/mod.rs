//! Source database fixtures

#![allow(dead_code)]

use recsys_common::db::{create_source_schema, open_database};
use recsys_common::{ContentItem, UserProfile};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Temporary source and recommender database files
pub struct TestDatabases {
    pub dir: TempDir,
    pub source: SqlitePool,
}

impl TestDatabases {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source = open_database(&dir.path().join("vish.db")).await.unwrap();
        create_source_schema(&source).await.unwrap();
        Self { dir, source }
    }

    pub fn recsys_path(&self) -> std::path::PathBuf {
        self.dir.path().join("recsys.db")
    }

    pub async fn add_user(&self, profile: &UserProfile) {
        sqlx::query("INSERT INTO users (id, name) VALUES (?, ?)")
            .bind(profile.id)
            .bind(&profile.name)
            .execute(&self.source)
            .await
            .unwrap();

        for (subject, weight) in &profile.subjects {
            sqlx::query("INSERT INTO user_subjects (user_id, subject, weight) VALUES (?, ?, ?)")
                .bind(profile.id)
                .bind(subject)
                .bind(weight)
                .execute(&self.source)
                .await
                .unwrap();
        }
    }

    pub async fn add_learning_object(&self, item: &ContentItem) {
        sqlx::query(
            "INSERT INTO learning_objects (id, owner_id, title, visit_count) VALUES (?, ?, ?, ?)",
        )
        .bind(item.id)
        .bind(item.owner_id)
        .bind(&item.title)
        .bind(item.visit_count)
        .execute(&self.source)
        .await
        .unwrap();
    }

    /// Associate a learning object with a user (appended to their list)
    pub async fn link(&self, user_id: i64, learning_object_id: i64) {
        sqlx::query(
            "INSERT INTO user_learning_objects (user_id, learning_object_id) VALUES (?, ?)",
        )
        .bind(user_id)
        .bind(learning_object_id)
        .execute(&self.source)
        .await
        .unwrap();
    }
}

/// Single-subject profile; distances between such users are weight differences
pub fn user_at(id: i64, position: f64) -> UserProfile {
    UserProfile::new(id)
        .with_name(format!("user{}", id))
        .with_subject("maths", position)
}
