//! Database connection and schema setup

pub mod init;
pub mod schema;

pub use init::*;
pub use schema::*;
