//! Source discovery and card data aggregation.
//!
//! [`SourceService`] is constructed explicitly from a parser registry, a
//! catalog store and service limits; hosts share it behind an `Arc`.
//!
//! - `refresh_sources` degrades per server: one failing server never stops
//!   discovery on the others.
//! - `get_source_data` and `get_options` are all-or-nothing: any unresolved
//!   parser or parser failure fails the whole call.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashSet;
use futures::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cards::{CardData, Options};
use crate::catalog::CatalogStore;
use crate::config::ServiceConfig;
use crate::parser::{Parser, ParserRegistry};
use crate::{CoreError, Result};
use trpux_db::{Compatibility, NewSource, Server, Source};

/// Outcome of discovery on a single server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The parser listed `found` sources, `added` of them new.
    Discovered { found: usize, added: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerRefresh {
    pub server_id: i64,
    pub server: String,
    pub outcome: RefreshOutcome,
}

/// Per-server results of one refresh pass, ordered by server id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub servers: Vec<ServerRefresh>,
}

impl RefreshReport {
    pub fn added(&self) -> usize {
        self.servers
            .iter()
            .map(|s| match s.outcome {
                RefreshOutcome::Discovered { added, .. } => added,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ServerRefresh> {
        self.servers
            .iter()
            .filter(|s| matches!(s.outcome, RefreshOutcome::Failed { .. }))
    }

    pub fn outcome(&self, server_id: i64) -> Option<&RefreshOutcome> {
        self.servers
            .iter()
            .find(|s| s.server_id == server_id)
            .map(|s| &s.outcome)
    }
}

/// Everything a client needs to pick sources for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub servers: Vec<Server>,
    pub sources: Vec<Source>,
    pub compatibilities: Vec<Compatibility>,
}

type SourceKey = (String, i64);

#[derive(Debug, Clone)]
pub struct SourceService {
    registry: Arc<ParserRegistry>,
    store: Arc<dyn CatalogStore>,
    config: ServiceConfig,
}

impl SourceService {
    pub fn new(
        registry: Arc<ParserRegistry>,
        store: Arc<dyn CatalogStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            registry,
            store,
            config,
        }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    /// Discover new sources on every known server.
    ///
    /// Fails as a whole only when the servers or known sources cannot be read.
    pub async fn refresh_sources(&self) -> Result<RefreshReport> {
        let servers = self.store.list_servers().await?;
        let known: HashSet<SourceKey> = self
            .store
            .list_sources()
            .await?
            .iter()
            .map(|s| (s.address.clone(), s.server.id))
            .collect();
        let claimed: DashSet<SourceKey> = DashSet::new();

        info!(servers = servers.len(), known = known.len(), "Refreshing sources");

        let known = &known;
        let claimed = &claimed;
        let mut servers: Vec<ServerRefresh> = stream::iter(servers)
            .map(|server| async move {
                let outcome = match self.refresh_server(&server, known, claimed).await {
                    Ok((found, added)) => RefreshOutcome::Discovered { found, added },
                    Err(e) => {
                        error!(
                            server = %server.name,
                            error = %e,
                            "Could not load sources of server"
                        );
                        RefreshOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                ServerRefresh {
                    server_id: server.id,
                    server: server.name,
                    outcome,
                }
            })
            .buffer_unordered(self.config.refresh_concurrency.max(1))
            .collect()
            .await;

        servers.sort_by_key(|s| s.server_id);
        let report = RefreshReport { servers };
        info!(added = report.added(), failed = report.failures().count(), "Refresh complete");
        Ok(report)
    }

    async fn refresh_server(
        &self,
        server: &Server,
        known: &HashSet<SourceKey>,
        claimed: &DashSet<SourceKey>,
    ) -> Result<(usize, usize)> {
        let parser = self
            .registry
            .by_server_kind(&server.server_type)
            .ok_or_else(|| CoreError::NoParserForServer {
                server: server.name.clone(),
                server_type: server.server_type.clone(),
            })?;

        let arguments = self.store.server_arguments(server.id).await?;

        let discovered = match parser.list_sources(server, &arguments).await {
            Ok(discovered) => discovered,
            Err(cause) => {
                self.set_reachable(server, false).await;
                return Err(CoreError::adapter(parser.name(), "list_sources", cause));
            }
        };
        self.set_reachable(server, true).await;

        let found = discovered.len();
        let mut added = 0;
        for candidate in discovered {
            let key = (candidate.address.clone(), server.id);
            if known.contains(&key) || !claimed.insert(key) {
                continue;
            }

            let source_type = candidate.source_type.trim();
            let source_type_id = if source_type.is_empty() {
                None
            } else {
                Some(self.store.ensure_source_type(source_type).await?.id)
            };

            let saved = self
                .store
                .save_source(&NewSource {
                    name: candidate.name,
                    address: candidate.address,
                    source_type_id,
                    server_id: server.id,
                })
                .await?;
            if saved.is_some() {
                added += 1;
            }
        }

        debug!(server = %server.name, parser = parser.name(), found, added, "Loaded sources");
        Ok((found, added))
    }

    async fn set_reachable(&self, server: &Server, reachable: bool) {
        if server.is_reachable == reachable {
            return;
        }
        if let Err(e) = self.store.mark_server_reachable(server.id, reachable).await {
            warn!(server = %server.name, error = %e, "Could not update server reachability");
        }
    }

    /// Fetch `card_type` payloads for every source, in input order.
    ///
    /// Parsers are resolved for all sources before any fetch starts.
    pub async fn get_source_data(
        &self,
        sources: &[Source],
        card_type: &str,
    ) -> Result<Vec<CardData>> {
        let plan = sources
            .iter()
            .map(|source| -> Result<_> {
                let source_type = source_type_of(source)?;
                let parser = self
                    .registry
                    .by_source_and_card(source_type, card_type)
                    .ok_or_else(|| CoreError::unsupported_for_card(source_type, card_type))?;
                Ok((parser, source))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(sources = plan.len(), card_type, "Fetching card data");

        stream::iter(plan)
            .map(|(parser, source)| fetch_card(parser.as_ref(), card_type, source))
            .buffered(self.config.fetch_concurrency.max(1))
            .try_collect()
            .await
    }

    /// Options of the first parser supporting the source's type.
    pub async fn get_options(&self, source: &Source) -> Result<Options> {
        let source_type = source_type_of(source)?;
        let parser = self
            .registry
            .by_source_kind(source_type)
            .ok_or_else(|| CoreError::unsupported_source(source_type))?;

        parser
            .fetch_options(source)
            .await
            .map_err(|cause| CoreError::adapter(parser.name(), "fetch_options", cause))
    }

    /// Load a source by id and fetch its options.
    pub async fn get_options_by_id(&self, source_id: i64) -> Result<Options> {
        let source = self
            .store
            .find_source(source_id)
            .await?
            .ok_or(CoreError::SourceNotFound { id: source_id })?;
        self.get_options(&source).await
    }

    /// All servers, sources and compatibility records.
    pub async fn overview(&self) -> Result<Overview> {
        Ok(Overview {
            servers: self.store.list_servers().await?,
            sources: self.store.list_sources().await?,
            compatibilities: self.store.list_compatibilities().await?,
        })
    }
}

fn source_type_of(source: &Source) -> Result<&str> {
    source.type_name().ok_or_else(|| CoreError::UntypedSource {
        address: source.address.clone(),
    })
}

async fn fetch_card(parser: &dyn Parser, card_type: &str, source: &Source) -> Result<CardData> {
    let data = parser
        .fetch_card(card_type, source)
        .await
        .map_err(|cause| CoreError::adapter(parser.name(), "fetch_card", cause))?;

    if !data.fits(card_type) {
        return Err(CoreError::PayloadMismatch {
            parser: parser.name().to_string(),
            card_type: card_type.to_string(),
        });
    }
    Ok(data)
}
