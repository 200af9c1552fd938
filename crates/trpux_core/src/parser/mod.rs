//! Parsers: pluggable adapters translating one external system into sources
//! and card payloads.
//!
//! A host assembles its parsers into a [`ParserRegistry`] at startup. Each
//! parser carries a static [`Capabilities`] declaration that the registry
//! validates before admission and that the [`CompatibilityIndex`] folds into
//! the card/source compatibility records.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cards::{CardData, Options};
use trpux_db::{Server, ServerArgument, Source};

mod capability;
mod error;
mod index;
mod registry;

pub use capability::{Capabilities, CardSupport, CompatibilityPair};
pub use error::{AdapterError, RegistrationError};
pub use index::CompatibilityIndex;
pub use registry::ParserRegistry;

/// A source found on a server during discovery, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredSource {
    pub name: String,
    /// URL or parser-specific identifier, unique within the server
    pub address: String,
    /// Source type name; blank when the parser cannot tell
    pub source_type: String,
}

impl DiscoveredSource {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        source_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            source_type: source_type.into(),
        }
    }
}

/// Adapter contract for one family of external servers.
#[async_trait]
pub trait Parser: Send + Sync + Debug {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Declared server, source and card support.
    fn capabilities(&self) -> &Capabilities;

    /// Enumerate every source available on `server`.
    ///
    /// `arguments` carry access details such as tokens or sub-paths.
    async fn list_sources(
        &self,
        server: &Server,
        arguments: &[ServerArgument],
    ) -> Result<Vec<DiscoveredSource>, AdapterError>;

    /// Load the data of `source` shaped as a `card_type` card.
    async fn fetch_card(&self, card_type: &str, source: &Source) -> Result<CardData, AdapterError>;

    /// Load the configuration options available for `source`.
    async fn fetch_options(&self, source: &Source) -> Result<Options, AdapterError>;
}
