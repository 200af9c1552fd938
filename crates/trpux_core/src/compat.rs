//! Seeding the catalog's card types, source types and compatibility records
//! from the registered parsers.
//!
//! This runs once at startup, before the service handles any request. Every
//! write is an upsert: re-running only ever adds what new parsers declare.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::Result;
use crate::cards::CardKind;
use crate::catalog::CatalogStore;
use crate::parser::ParserRegistry;
use trpux_db::CardType;

/// What a compatibility sync added to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub card_types_created: Vec<String>,
    pub source_types_created: Vec<String>,
    /// New (card type, source type) links
    pub links_added: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.card_types_created.is_empty()
            && self.source_types_created.is_empty()
            && self.links_added == 0
    }
}

/// Make sure the built-in card types exist.
pub async fn seed_default_card_types(store: &dyn CatalogStore) -> Result<Vec<CardType>> {
    let mut card_types = Vec::with_capacity(CardKind::ALL.len());
    for kind in CardKind::ALL {
        card_types.push(store.ensure_card_type(kind.name(), kind.aggregated()).await?);
    }
    debug!(count = card_types.len(), "Seeded default card types");
    Ok(card_types)
}

/// Fold every admitted parser declaration into the catalog.
pub async fn sync_compatibility(
    store: &dyn CatalogStore,
    registry: &ParserRegistry,
) -> Result<SyncReport> {
    seed_default_card_types(store).await?;

    let index = registry.index();
    let mut report = SyncReport::default();

    let known_cards: HashSet<String> = store
        .list_card_types()
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    let known_sources: HashSet<String> = store
        .list_source_types()
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();
    let linked_before: HashMap<i64, usize> = store
        .list_compatibilities()
        .await?
        .into_iter()
        .map(|c| (c.card_type.id, c.source_types.len()))
        .collect();

    let mut source_ids = HashMap::new();
    for name in index.source_types() {
        let source_type = store.ensure_source_type(name).await?;
        if !known_sources.contains(name) {
            report.source_types_created.push(name.to_string());
        }
        source_ids.insert(name, source_type.id);
    }

    for (name, aggregated) in index.card_types() {
        let card_type = store.ensure_card_type(name, aggregated).await?;
        if !known_cards.contains(name) {
            report.card_types_created.push(name.to_string());
        }

        let ids: Vec<i64> = index
            .sources_for(name)
            .into_iter()
            .filter_map(|source| source_ids.get(source).copied())
            .collect();
        if ids.is_empty() {
            continue;
        }

        let compatibility = store.link_compatibility(card_type.id, &ids).await?;
        let before = linked_before.get(&card_type.id).copied().unwrap_or(0);
        report.links_added += compatibility.source_types.len().saturating_sub(before);
    }

    info!(
        parsers = registry.len(),
        card_types = report.card_types_created.len(),
        source_types = report.source_types_created.len(),
        links = report.links_added,
        "Compatibility sync complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::{Capabilities, Parser};
    use crate::test_helpers::{TestParser, test_db};

    fn source_names(store_compat: &trpux_db::Compatibility) -> Vec<&str> {
        store_compat
            .source_types
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_seeds_defaults_with_flags() {
        let db = test_db().await;
        seed_default_card_types(&db).await.unwrap();
        seed_default_card_types(&db).await.unwrap();

        let cards: Vec<(String, bool)> = db
            .list_card_types()
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.can_be_aggregated))
            .collect();
        assert_eq!(
            cards,
            vec![
                ("Line Graph".to_string(), true),
                ("Matrix".to_string(), false),
                ("Iframe".to_string(), false),
                ("Single Value".to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let db = test_db().await;
        let registry =
            ParserRegistry::from_parsers([Arc::new(TestParser::new("jenkins")) as Arc<dyn Parser>]);

        let first = sync_compatibility(&db, &registry).await.unwrap();
        assert_eq!(
            first.source_types_created,
            vec!["jenkins", "jenkins-makefile", "jenkins-matrix"]
        );
        // All four built-in kinds existed before the parser's declarations
        assert!(first.card_types_created.is_empty());
        assert_eq!(first.links_added, 3 + 1 + 2 + 1);

        let snapshot = db.list_compatibilities().await.unwrap();

        let second = sync_compatibility(&db, &registry).await.unwrap();
        assert!(second.is_noop());
        assert_eq!(db.list_compatibilities().await.unwrap(), snapshot);
        assert_eq!(db.list_source_types().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_sync_extends_with_new_parsers() {
        let db = test_db().await;
        let jenkins: Arc<dyn Parser> = Arc::new(TestParser::new("jenkins"));
        sync_compatibility(&db, &ParserRegistry::from_parsers([jenkins.clone()]))
            .await
            .unwrap();

        let teamcity = TestParser::new("teamcity").with_capabilities(
            Capabilities::new()
                .server("teamcity")
                .sources(["teamcity-build", "jenkins-matrix"])
                .card("Heatmap", true)
                .compatible("Matrix", ["teamcity-build", "jenkins-matrix"])
                .compatible("Heatmap", ["teamcity-build"]),
        );
        let registry =
            ParserRegistry::from_parsers([jenkins, Arc::new(teamcity) as Arc<dyn Parser>]);
        let report = sync_compatibility(&db, &registry).await.unwrap();

        assert_eq!(report.card_types_created, vec!["Heatmap"]);
        assert_eq!(report.source_types_created, vec!["teamcity-build"]);
        assert_eq!(report.links_added, 2);

        let compatibilities = db.list_compatibilities().await.unwrap();
        let matrix = compatibilities
            .iter()
            .find(|c| c.card_type.name == "Matrix")
            .unwrap();
        assert_eq!(
            source_names(matrix),
            vec!["jenkins-makefile", "jenkins-matrix", "teamcity-build"]
        );

        let heatmap = db
            .list_card_types()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Heatmap")
            .unwrap();
        assert!(heatmap.can_be_aggregated);
    }
}
