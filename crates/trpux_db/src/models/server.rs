//! Server models.
//!
//! A server is one reachable build/CI system (Jenkins, TeamCity, ...). The
//! `server_type` tag is matched against the server kinds parsers declare.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered server.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Server {
    /// Unique identifier
    pub id: i64,

    /// Human-readable name
    pub name: String,

    /// Normalized base URL, unique across servers
    pub url: String,

    /// Server kind used to pick a parser
    pub server_type: String,

    /// Whether the last source discovery reached the server
    pub is_reachable: bool,

    /// Stored admin flag; discovery still enumerates the server
    pub disabled: bool,
}

/// Additional server argument used by parsers.
///
/// For example an access token for TeamCity.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ServerArgument {
    pub id: i64,
    pub server_id: i64,
    pub key: String,
    pub value: String,
}

/// Values for creating or updating a server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewServer {
    pub name: String,
    pub url: String,
    pub server_type: String,
    pub disabled: bool,
    /// `None` keeps existing arguments on update; on create it means no arguments.
    pub arguments: Option<Vec<NewServerArgument>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServerArgument {
    pub key: String,
    pub value: String,
}

impl NewServerArgument {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
