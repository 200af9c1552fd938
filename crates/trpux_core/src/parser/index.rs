use std::collections::{HashMap, HashSet};

use super::Capabilities;

/// Card type -> source type mapping folded from every admitted parser, used
/// to seed the catalog. Lookups at request time go through [`ParserRegistry`].
///
/// Names keep the order in which they were first declared so that seeding
/// the catalog is deterministic.
///
/// [`ParserRegistry`]: super::ParserRegistry
#[derive(Debug, Clone, Default)]
pub struct CompatibilityIndex {
    card_types: Vec<String>,
    source_types: Vec<String>,
    aggregated: HashMap<String, bool>,
    by_card: HashMap<String, HashSet<String>>,
}

impl CompatibilityIndex {
    pub fn from_capabilities<'a>(declarations: impl IntoIterator<Item = &'a Capabilities>) -> Self {
        let mut index = Self::default();
        for capabilities in declarations {
            index.fold(capabilities);
        }
        index
    }

    /// Merge one parser's declaration into the index.
    ///
    /// The first declaration of a card type fixes its aggregation flag. Card
    /// types only named in compatibility pairs are not aggregatable.
    pub fn fold(&mut self, capabilities: &Capabilities) {
        for card in &capabilities.cards {
            self.add_card_type(&card.name);
            self.aggregated
                .entry(card.name.clone())
                .or_insert(card.aggregated);
        }
        for source in &capabilities.sources {
            self.add_source_type(source);
        }
        for pair in &capabilities.compatibility {
            self.add_card_type(&pair.card_type);
            for source in &pair.source_types {
                self.add_source_type(source);
                self.by_card
                    .entry(pair.card_type.clone())
                    .or_default()
                    .insert(source.clone());
            }
        }
    }

    fn add_card_type(&mut self, name: &str) {
        if !self.card_types.iter().any(|c| c == name) {
            self.card_types.push(name.to_string());
        }
    }

    fn add_source_type(&mut self, name: &str) {
        if !self.source_types.iter().any(|s| s == name) {
            self.source_types.push(name.to_string());
        }
    }

    /// Card types in first-declared order, with their aggregation flag.
    pub fn card_types(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.card_types
            .iter()
            .map(|name| (name.as_str(), self.is_aggregated(name)))
    }

    /// Source types in first-declared order.
    pub fn source_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.source_types.iter().map(String::as_str)
    }

    pub fn is_aggregated(&self, card_type: &str) -> bool {
        self.aggregated.get(card_type).copied().unwrap_or(false)
    }

    /// Source types compatible with a card type, sorted by name.
    pub fn sources_for(&self, card_type: &str) -> Vec<&str> {
        let mut sources: Vec<&str> = self
            .by_card
            .get(card_type)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        sources.sort_unstable();
        sources
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_fold_unions_declarations() {
        let jenkins = Capabilities::new()
            .sources(["jenkins-matrix", "jenkins-makefile"])
            .card("Line Graph", true)
            .compatible("Line Graph", ["jenkins-matrix"])
            .compatible("Single Value", ["jenkins-makefile"]);
        let other = Capabilities::new()
            .sources(["jenkins-makefile", "teamcity"])
            .card("Line Graph", false)
            .card("Matrix", false)
            .compatible("Line Graph", ["jenkins-makefile", "teamcity"]);

        let index = CompatibilityIndex::from_capabilities([&jenkins, &other]);

        assert_eq!(
            index.sources_for("Line Graph"),
            vec!["jenkins-makefile", "jenkins-matrix", "teamcity"]
        );
        assert_eq!(index.sources_for("Single Value"), vec!["jenkins-makefile"]);
        assert!(index.sources_for("unknown-kind").is_empty());

        assert_eq!(
            index.card_types().collect::<Vec<_>>(),
            vec![("Line Graph", true), ("Single Value", false), ("Matrix", false)]
        );
        assert_eq!(
            index.source_types().collect::<Vec<_>>(),
            vec!["jenkins-matrix", "jenkins-makefile", "teamcity"]
        );
        assert!(index.sources_for("Matrix").is_empty());
    }
}
