//! # Recommender Common Library
//!
//! Shared code for the social-context recommender:
//! - Error taxonomy (`Error`, `Result`)
//! - Profile and learning object models read from the source platform
//! - Configuration loading
//! - SQLite connection and schema setup

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result, StorageContext};
pub use models::{CanopyId, ContentId, ContentItem, Dimension, UserId, UserProfile};
