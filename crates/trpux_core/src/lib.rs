//! TRPUX Core - parser registry, card compatibility and source aggregation
//!
//! This crate matches data sources on build and CI servers to the parsers
//! able to read them, keeps the card/source compatibility catalog in sync
//! with those parsers, and assembles card payloads across many sources.

pub mod cards;
pub mod catalog;
pub mod compat;
pub mod config;
pub mod error;
pub mod parser;
pub mod service;

#[cfg(test)]
pub mod test_helpers;

pub use cards::{CardData, CardKind, Options};
pub use catalog::{CatalogStore, ServerDraft};
pub use compat::{SyncReport, seed_default_card_types, sync_compatibility};
pub use config::TrpuxConfig;
pub use error::{ConfigError, CoreError, Result};
pub use parser::{
    AdapterError, Capabilities, CompatibilityIndex, DiscoveredSource, Parser, ParserRegistry,
    RegistrationError,
};
pub use service::{Overview, RefreshOutcome, RefreshReport, SourceService};

// Catalog entities
pub use trpux_db::{
    CardType, CatalogDb, Compatibility, NewServerArgument, Server, ServerArgument, Source,
    SourceType,
};
