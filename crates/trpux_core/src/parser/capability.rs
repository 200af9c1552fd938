//! Static capability declarations carried by every parser.

use serde::{Deserialize, Serialize};

use crate::cards::CardKind;

/// A card kind a parser can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSupport {
    pub name: String,
    /// Whether one card may combine several sources
    pub aggregated: bool,
}

/// Source kinds a card kind can be rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityPair {
    pub card_type: String,
    pub source_types: Vec<String>,
}

/// What a parser declares it can do.
///
/// Built with the chained methods:
///
/// ```rust,ignore
/// let caps = Capabilities::new()
///     .server("jenkins")
///     .sources(["jenkins-matrix", "jenkins-makefile"])
///     .card_kind(CardKind::LineGraph)
///     .compatible("Line Graph", ["jenkins-matrix", "jenkins-makefile"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub servers: Vec<String>,
    pub sources: Vec<String>,
    pub cards: Vec<CardSupport>,
    pub compatibility: Vec<CompatibilityPair>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(mut self, kind: impl Into<String>) -> Self {
        self.servers.push(kind.into());
        self
    }

    pub fn source(mut self, kind: impl Into<String>) -> Self {
        self.sources.push(kind.into());
        self
    }

    pub fn sources<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.extend(kinds.into_iter().map(Into::into));
        self
    }

    pub fn card(mut self, name: impl Into<String>, aggregated: bool) -> Self {
        self.cards.push(CardSupport {
            name: name.into(),
            aggregated,
        });
        self
    }

    /// Declare a built-in card kind with its default aggregation flag.
    pub fn card_kind(self, kind: CardKind) -> Self {
        self.card(kind.name(), kind.aggregated())
    }

    pub fn compatible<I, S>(mut self, card_type: impl Into<String>, source_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatibility.push(CompatibilityPair {
            card_type: card_type.into(),
            source_types: source_types.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn supports_server(&self, kind: &str) -> bool {
        self.servers.iter().any(|s| s == kind)
    }

    pub fn supports_source(&self, kind: &str) -> bool {
        self.sources.iter().any(|s| s == kind)
    }

    /// Whether a compatibility pair lists `source_type` for `card_type`.
    pub fn serves(&self, source_type: &str, card_type: &str) -> bool {
        self.compatibility
            .iter()
            .filter(|pair| pair.card_type == card_type)
            .any(|pair| pair.source_types.iter().any(|s| s == source_type))
    }

    /// Check the declaration is well formed: no kind name may be blank.
    ///
    /// Compatibility pairs may name source kinds the parser does not list as
    /// supported; the lists are independent.
    pub fn validate(&self) -> Result<(), String> {
        if has_blank(self.servers.iter()) {
            return Err("blank server type".to_string());
        }
        if has_blank(self.sources.iter()) {
            return Err("blank source type".to_string());
        }
        if has_blank(self.cards.iter().map(|c| &c.name)) {
            return Err("blank card type".to_string());
        }

        for pair in &self.compatibility {
            if pair.card_type.trim().is_empty() {
                return Err("blank card type in compatibility".to_string());
            }
            if has_blank(pair.source_types.iter()) {
                return Err(format!(
                    "blank source type in compatibility for \"{}\"",
                    pair.card_type
                ));
            }
        }

        Ok(())
    }
}

fn has_blank<'a>(mut names: impl Iterator<Item = &'a String>) -> bool {
    names.any(|n| n.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jenkins() -> Capabilities {
        Capabilities::new()
            .server("jenkins")
            .sources(["jenkins-matrix", "jenkins-makefile"])
            .card_kind(CardKind::LineGraph)
            .compatible("Line Graph", ["jenkins-matrix", "jenkins-makefile"])
    }

    #[test]
    fn test_lookups() {
        let caps = jenkins();
        assert!(caps.supports_server("jenkins"));
        assert!(!caps.supports_server("teamcity"));
        assert!(caps.supports_source("jenkins-matrix"));
        assert!(caps.serves("jenkins-makefile", "Line Graph"));
        assert!(!caps.serves("jenkins-makefile", "Matrix"));
        assert!(caps.cards[0].aggregated);
    }

    #[test]
    fn test_validate() {
        assert!(jenkins().validate().is_ok());
        assert!(Capabilities::new().validate().is_ok());

        // Pairs may reference source kinds outside `sources`
        assert!(jenkins().compatible("Matrix", ["teamcity"]).validate().is_ok());

        let err = jenkins().compatible("Matrix", ["  "]).validate().unwrap_err();
        assert!(err.contains("Matrix"));

        assert!(jenkins().server("  ").validate().is_err());
        assert!(jenkins().card("", false).validate().is_err());
        assert!(jenkins()
            .compatible(" ", ["jenkins-matrix"])
            .validate()
            .is_err());
    }
}
