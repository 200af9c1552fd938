//! Source models.
//!
//! A source is one data-producing endpoint on a server: a Jenkins job, a
//! TeamCity build configuration, a dashboard page. Its address is either a URL
//! or an identifier meaningful to the parser, unique within its server.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Server, SourceType};

/// A persisted source with its type and owning server loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub is_reachable: bool,
    /// Cleared when the source type is deleted
    pub source_type: Option<SourceType>,
    pub server: Server,
}

impl Source {
    /// Name of the source type, if the source still has one.
    pub fn type_name(&self) -> Option<&str> {
        self.source_type.as_ref().map(|t| t.name.as_str())
    }

    /// Deduplication key: no two sources share an address on the same server.
    pub fn key(&self) -> (&str, i64) {
        (self.address.as_str(), self.server.id)
    }
}

/// Values for inserting a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSource {
    pub name: String,
    pub address: String,
    pub source_type_id: Option<i64>,
    pub server_id: i64,
}

/// Flat row of a source joined with its type and server.
#[derive(Debug, FromRow)]
pub(crate) struct SourceRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub is_reachable: bool,
    pub type_id: Option<i64>,
    pub type_name: Option<String>,
    pub server_id: i64,
    pub server_name: String,
    pub server_url: String,
    pub server_type: String,
    pub server_is_reachable: bool,
    pub server_disabled: bool,
}

impl From<SourceRow> for Source {
    fn from(row: SourceRow) -> Self {
        let source_type = match (row.type_id, row.type_name) {
            (Some(id), Some(name)) => Some(SourceType { id, name }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            is_reachable: row.is_reachable,
            source_type,
            server: Server {
                id: row.server_id,
                name: row.server_name,
                url: row.server_url,
                server_type: row.server_type,
                is_reachable: row.server_is_reachable,
                disabled: row.server_disabled,
            },
        }
    }
}
