//! Persistent catalog of servers, sources and card compatibility.
//!
//! The service talks to the catalog through [`CatalogStore`] so that it can
//! run over any backend; [`trpux_db::CatalogDb`] is the SQLite one.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::Result;
use trpux_db::{
    CardType, Compatibility, NewServer, NewSource, Server, ServerArgument, Source, SourceType,
};

mod db;
pub mod server;

pub use server::{ServerDraft, create_server, delete_server, update_server};

/// Entity store backing the aggregation service.
///
/// Each call is atomic on its own; no cross-call transactions are offered.
#[async_trait]
pub trait CatalogStore: Send + Sync + Debug {
    // === Servers ===

    async fn list_servers(&self) -> Result<Vec<Server>>;

    async fn find_server(&self, id: i64) -> Result<Option<Server>>;

    async fn server_arguments(&self, server_id: i64) -> Result<Vec<ServerArgument>>;

    async fn save_server(&self, server: &NewServer) -> Result<Server>;

    /// Returns false when no server has this id.
    async fn update_server(&self, id: i64, server: &NewServer) -> Result<bool>;

    async fn remove_server(&self, id: i64) -> Result<bool>;

    async fn mark_server_reachable(&self, id: i64, reachable: bool) -> Result<()>;

    // === Sources ===

    async fn list_sources(&self) -> Result<Vec<Source>>;

    async fn find_source(&self, id: i64) -> Result<Option<Source>>;

    /// Insert-if-absent on (address, server). `None` means it already existed.
    async fn save_source(&self, source: &NewSource) -> Result<Option<Source>>;

    async fn remove_source(&self, id: i64) -> Result<bool>;

    // === Card and source types ===

    async fn list_source_types(&self) -> Result<Vec<SourceType>>;

    async fn ensure_source_type(&self, name: &str) -> Result<SourceType>;

    async fn list_card_types(&self) -> Result<Vec<CardType>>;

    async fn ensure_card_type(&self, name: &str, can_be_aggregated: bool) -> Result<CardType>;

    async fn list_compatibilities(&self) -> Result<Vec<Compatibility>>;

    /// Union `source_type_ids` into the card type's compatibility record.
    async fn link_compatibility(
        &self,
        card_type_id: i64,
        source_type_ids: &[i64],
    ) -> Result<Compatibility>;
}
