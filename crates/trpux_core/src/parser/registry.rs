use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{CompatibilityIndex, Parser, RegistrationError};

/// Ordered set of admitted parsers.
///
/// Every lookup resolves ties the same way: the parser registered first wins.
/// The registry is built once and then shared read-only behind an `Arc`.
#[derive(Debug, Default)]
pub struct ParserRegistry {
    parsers: Vec<Arc<dyn Parser>>,
    /// card type -> source type -> position in `parsers`
    routes: HashMap<String, HashMap<String, usize>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the host's parser list.
    ///
    /// Parsers failing the capability check are logged and skipped.
    pub fn from_parsers(parsers: impl IntoIterator<Item = Arc<dyn Parser>>) -> Self {
        let mut registry = Self::new();
        for parser in parsers {
            if let Err(e) = registry.register(parser) {
                warn!(parser = %e.parser, reason = %e.reason, "Skipping incompatible parser");
            }
        }
        registry
    }

    /// Admit a parser if its declared capabilities are well formed.
    pub fn register(&mut self, parser: Arc<dyn Parser>) -> Result<(), RegistrationError> {
        let name = parser.name().to_string();
        if name.trim().is_empty() {
            return Err(RegistrationError {
                parser: format!("{parser:?}"),
                reason: "blank parser name".to_string(),
            });
        }

        parser
            .capabilities()
            .validate()
            .map_err(|reason| RegistrationError {
                parser: name.clone(),
                reason,
            })?;

        let position = self.parsers.len();
        for pair in &parser.capabilities().compatibility {
            let sources = self.routes.entry(pair.card_type.clone()).or_default();
            for source_type in &pair.source_types {
                sources.entry(source_type.clone()).or_insert(position);
            }
        }

        debug!(parser = %name, position, "Registered parser");
        self.parsers.push(parser);
        Ok(())
    }

    /// All admitted parsers in registration order.
    pub fn all(&self) -> &[Arc<dyn Parser>] {
        &self.parsers
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// First parser supporting the server kind.
    pub fn by_server_kind(&self, kind: &str) -> Option<&Arc<dyn Parser>> {
        self.parsers
            .iter()
            .find(|p| p.capabilities().supports_server(kind))
    }

    /// First parser supporting the source kind.
    pub fn by_source_kind(&self, kind: &str) -> Option<&Arc<dyn Parser>> {
        self.parsers
            .iter()
            .find(|p| p.capabilities().supports_source(kind))
    }

    /// First parser declaring `card_type` compatible with `source_type`.
    pub fn by_source_and_card(
        &self,
        source_type: &str,
        card_type: &str,
    ) -> Option<&Arc<dyn Parser>> {
        self.routes
            .get(card_type)
            .and_then(|sources| sources.get(source_type))
            .and_then(|&position| self.parsers.get(position))
    }

    /// Fold every admitted declaration into a compatibility index.
    pub fn index(&self) -> CompatibilityIndex {
        CompatibilityIndex::from_capabilities(self.parsers.iter().map(|p| p.capabilities()))
    }
}
