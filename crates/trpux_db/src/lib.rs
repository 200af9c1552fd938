//! TRPUX Database Layer
//!
//! SQLite-based catalog for the card aggregation service.
//!
//! # Architecture
//!
//! - **Servers** own their arguments; deleting a server cascades to its
//!   arguments and sources
//! - **Sources** are unique per (address, server) and point at an optional
//!   source type
//! - **Compatibility** links one card type to the source types it can be
//!   rendered from
//!
//! # Usage
//!
//! ```rust,ignore
//! use trpux_db::CatalogDb;
//!
//! let db = CatalogDb::open("path/to/catalog.db").await?;
//! let servers = trpux_db::queries::list_servers(db.pool()).await?;
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod queries;

pub use connection::{CatalogDb, DbStats};
pub use error::{DbError, DbResult};

pub use models::{
    CardType, Compatibility, NewServer, NewServerArgument, NewSource, Server, ServerArgument,
    Source, SourceType,
};
