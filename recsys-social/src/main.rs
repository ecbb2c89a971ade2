//! recsys-social - social context generation for the recommender
//!
//! Subcommands:
//! - `generate`: cluster every user and rank learning objects per cluster
//! - `discover --user <id>`: cluster of a user, or the closest one for new users
//! - `info`: number of clusters and users per cluster

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recsys_common::config::ConfigResolver;
use recsys_social::db::{SqliteClusterStore, SqliteProfileSource};
use recsys_social::{ClusterLookup, MemoryClusterStore, SocialContextManager};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recsys-social", version, about = "Social clustering for the recommender")]
struct Cli {
    /// Config file (overrides RECSYS_CONFIG and the default location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Cluster all users and rank learning objects per cluster
    Generate {
        /// Keep results in memory and print the cluster report instead of
        /// replacing the stored clusters
        #[arg(long)]
        dry_run: bool,
    },
    /// Find the cluster of a user
    Discover {
        #[arg(long)]
        user: i64,
    },
    /// Print the number of clusters and users per cluster
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigResolver::new(cli.config.clone())
        .load()
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting recsys-social v{} (loose = {}, tight = {}, top subjects = {})",
        env!("CARGO_PKG_VERSION"),
        config.clustering.loose,
        config.clustering.tight,
        config.clustering.top_subjects
    );

    let source = Arc::new(SqliteProfileSource::open(&config.source_database).await?);

    match cli.command {
        Command::Generate { dry_run: true } => {
            let manager = SocialContextManager::new(
                source,
                Arc::new(MemoryClusterStore::new()),
                config.clustering,
                config.ranking,
            )?;
            let summary = manager.generate_social_context().await?;
            info!(
                "Dry run: {} users, {} clusters, {} learning object assignments",
                summary.profile_count, summary.cluster_count, summary.assignment_count
            );
            print!("{}", manager.clusters_information().await?);
        }
        Command::Generate { dry_run: false } => {
            let store = Arc::new(SqliteClusterStore::open(&config.recsys_database).await?);
            let manager =
                SocialContextManager::new(source, store, config.clustering, config.ranking)?;
            let summary = manager.generate_social_context().await?;
            println!(
                "Generated {} clusters from {} users ({} learning object assignments)",
                summary.cluster_count, summary.profile_count, summary.assignment_count
            );
        }
        Command::Discover { user } => {
            let store = Arc::new(SqliteClusterStore::open(&config.recsys_database).await?);
            let manager =
                SocialContextManager::new(source, store, config.clustering, config.ranking)?;
            match manager.discover_user_cluster(user).await? {
                ClusterLookup::AlreadyBound(id) => {
                    println!("User {} belongs to cluster {}", user, id)
                }
                ClusterLookup::Nearest { canopy_id, distance } => println!(
                    "Closest cluster to user {}: {} (distance {:.3})",
                    user, canopy_id, distance
                ),
                ClusterLookup::NoClusterFound => {
                    println!("No cluster found for user {}", user)
                }
            }
        }
        Command::Info => {
            let store = Arc::new(SqliteClusterStore::open(&config.recsys_database).await?);
            let manager =
                SocialContextManager::new(source, store, config.clustering, config.ranking)?;
            print!("{}", manager.clusters_information().await?);
        }
    }

    Ok(())
}
