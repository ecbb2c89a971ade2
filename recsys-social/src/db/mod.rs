//! SQLite storage collaborators
//!
//! - [`SqliteProfileSource`]: reads the source platform database
//! - [`SqliteClusterStore`]: owns the recommender database

mod cluster_store;
mod profile_source;

pub use cluster_store::SqliteClusterStore;
pub use profile_source::SqliteProfileSource;
