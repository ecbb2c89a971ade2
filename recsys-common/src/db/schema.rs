//! Table definitions
//!
//! Two databases are involved in a run:
//! - **source**: the platform's users, their subject interests and learning objects
//! - **recsys**: the social clusters, their members and ranked learning objects
//!
//! All statements are `CREATE TABLE IF NOT EXISTS` and safe to re-run.

use crate::Result;
use sqlx::SqlitePool;

/// Create the source platform tables
pub async fn create_source_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_subjects (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            subject TEXT NOT NULL,
            weight REAL NOT NULL DEFAULT 1.0,
            PRIMARY KEY (user_id, subject)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS learning_objects (
            id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL REFERENCES users(id),
            title TEXT,
            visit_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Learning objects a user authored or collected; rowid keeps insertion order
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_learning_objects (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            learning_object_id INTEGER NOT NULL REFERENCES learning_objects(id) ON DELETE CASCADE,
            UNIQUE (user_id, learning_object_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the recommender tables
pub async fn create_recsys_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clusters (
            id INTEGER PRIMARY KEY,
            center_user_id INTEGER NOT NULL,
            center_profile TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cluster_users (
            cluster_id INTEGER NOT NULL REFERENCES clusters(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL,
            member_order INTEGER NOT NULL,
            profile TEXT NOT NULL,
            PRIMARY KEY (cluster_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cluster_users_user ON cluster_users(user_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cluster_learning_objects (
            cluster_id INTEGER NOT NULL REFERENCES clusters(id) ON DELETE CASCADE,
            learning_object_id INTEGER NOT NULL,
            owner_id INTEGER NOT NULL,
            title TEXT,
            visit_count INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (cluster_id, learning_object_id),
            UNIQUE (cluster_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Subjects the stored clusters were measured on, reused by discovery
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cluster_dimensions (
            dimension_order INTEGER PRIMARY KEY,
            subject TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
