//! Card and source type models, and the compatibility between them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named category of data source, e.g. `jenkins-matrix`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow, Serialize, Deserialize)]
pub struct SourceType {
    pub id: i64,
    pub name: String,
}

/// A named kind of card, e.g. `Line Graph`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow, Serialize, Deserialize)]
pub struct CardType {
    pub id: i64,
    pub name: String,
    /// Whether one card may combine data from several sources
    pub can_be_aggregated: bool,
}

/// Source types a card type can be rendered from.
///
/// There is at most one compatibility record per card type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    pub id: i64,
    pub card_type: CardType,
    /// Ordered by source type id, no duplicates
    pub source_types: Vec<SourceType>,
}

impl Compatibility {
    /// Whether the given source type name is listed for this card type.
    pub fn allows(&self, source_type: &str) -> bool {
        self.source_types.iter().any(|t| t.name == source_type)
    }
}
