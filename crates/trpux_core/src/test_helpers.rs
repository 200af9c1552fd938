#![cfg(test)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::cards::{
    CardData, IFrame, LineGraph, Matrix, MatrixCell, MatrixResult, MultiChoiceField, Options,
    SingleField, SingleValue, TimeSpanField, TimeUnit,
};
use crate::catalog::CatalogStore;
use crate::parser::{AdapterError, Capabilities, DiscoveredSource, Parser};
use trpux_db::{CatalogDb, NewServer, NewServerArgument, Server, ServerArgument, Source};

/// Jenkins-like capabilities shared by most tests.
pub fn jenkins_capabilities() -> Capabilities {
    Capabilities::new()
        .server("jenkins")
        .sources(["jenkins", "jenkins-makefile", "jenkins-matrix"])
        .card("Line Graph", true)
        .card("Iframe", false)
        .card("Matrix", false)
        .compatible("Line Graph", ["jenkins", "jenkins-matrix", "jenkins-makefile"])
        .compatible("Iframe", ["jenkins-makefile"])
        .compatible("Matrix", ["jenkins-matrix", "jenkins-makefile"])
        .compatible("Single Value", ["jenkins-makefile"])
}

/// Configurable in-memory parser.
///
/// Discovers a fixed list of sources (with a duplicate entry) and answers
/// every card request with a canned payload. Line graphs carry the source
/// address as their only label so tests can check ordering.
#[derive(Debug)]
pub struct TestParser {
    name: String,
    capabilities: Capabilities,
    discovered: Vec<DiscoveredSource>,
    fail_discovery: bool,
    fail_fetch: bool,
    payload: Option<CardData>,
    delays: HashMap<String, Duration>,
    pub discovery_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub seen_arguments: Mutex<Vec<(String, String)>>,
}

impl TestParser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: jenkins_capabilities(),
            discovered: vec![
                DiscoveredSource::new(
                    "Jenkins Makefile",
                    "https://jenkins.test/makefile/",
                    "jenkins-makefile",
                ),
                DiscoveredSource::new(
                    "Jenkins Matrix",
                    "https://jenkins.test/matrix/",
                    "jenkins-matrix",
                ),
                DiscoveredSource::new(
                    "Jenkins Makefile",
                    "https://jenkins.test/makefile/",
                    "jenkins-makefile",
                ),
                DiscoveredSource::new("Jenkins New", "https://jenkins.test/new/", "jenkins"),
            ],
            fail_discovery: false,
            fail_fetch: false,
            payload: None,
            delays: HashMap::new(),
            discovery_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            seen_arguments: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_sources(mut self, discovered: Vec<DiscoveredSource>) -> Self {
        self.discovered = discovered;
        self
    }

    pub fn failing_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Answer every card request with this payload.
    pub fn with_payload(mut self, payload: CardData) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Delay card fetches for the source at `address`.
    pub fn with_delay(mut self, address: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(address.into(), delay);
        self
    }

    fn matrix() -> Matrix {
        let mut matrix = Matrix {
            columns: vec!["foo".into(), "bar".into()],
            rows: vec!["boo".into(), "far".into()],
            values: Default::default(),
        };
        let foo = matrix.values.entry("foo".into()).or_default();
        foo.insert("boo".into(), MatrixCell::new(MatrixResult::Unknown));
        foo.insert(
            "far".into(),
            MatrixCell::new(MatrixResult::Success).with_url("https://test.url/0/success"),
        );
        let bar = matrix.values.entry("bar".into()).or_default();
        bar.insert(
            "boo".into(),
            MatrixCell::new(MatrixResult::Failure).with_url("https://test.url/0/failure"),
        );
        bar.insert("far".into(), MatrixCell::new(MatrixResult::Running));
        matrix
    }
}

#[async_trait]
impl Parser for TestParser {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn list_sources(
        &self,
        server: &Server,
        arguments: &[ServerArgument],
    ) -> Result<Vec<DiscoveredSource>, AdapterError> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen_arguments.lock() {
            seen.extend(arguments.iter().map(|a| (a.key.clone(), a.value.clone())));
        }
        if self.fail_discovery {
            return Err(AdapterError::request(&server.url, "connection refused"));
        }
        Ok(self.discovered.clone())
    }

    async fn fetch_card(&self, card_type: &str, source: &Source) -> Result<CardData, AdapterError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&source.address) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_fetch {
            return Err(AdapterError::invalid_response(&source.address, "status 502"));
        }
        if let Some(payload) = &self.payload {
            return Ok(payload.clone());
        }

        match card_type {
            "Line Graph" => Ok(CardData::LineGraph(LineGraph {
                labels: vec![source.address.clone()],
                data: vec![1.0, 2.0, 3.0, 4.0],
            })),
            "Iframe" => Ok(CardData::IFrame(IFrame {
                url: "https://test.url/source/api.json".into(),
            })),
            "Matrix" => Ok(CardData::Matrix(Self::matrix())),
            "Single Value" => Ok(CardData::SingleValue(SingleValue {
                name: "SingleValue".into(),
                value: json!("SUCCESS"),
            })),
            other => Err(AdapterError::UnsupportedCard {
                card_type: other.to_string(),
            }),
        }
    }

    async fn fetch_options(&self, source: &Source) -> Result<Options, AdapterError> {
        if self.fail_fetch {
            return Err(AdapterError::invalid_response(&source.address, "status 502"));
        }
        Ok(Options {
            singles: Some(vec![SingleField::new(
                "singleValue",
                "Test List",
                format!("Test List for {}", source.name),
            )]),
            timespans: Some(vec![TimeSpanField {
                name: "testSpan".into(),
                label: "Test Span".into(),
                description: format!("Test Span for {}", source.name),
                max_unit: TimeUnit::Days,
            }]),
            multichoices: Some(vec![MultiChoiceField {
                name: "testMulti".into(),
                label: "Test Multichoice".into(),
                description: format!("Test Multichoice for {}", source.name),
                options: vec!["boo".into(), "far".into()],
            }]),
        })
    }
}

/// Create a server directly through the store.
pub async fn create_test_server(
    store: &dyn CatalogStore,
    url: &str,
    server_type: &str,
) -> Server {
    store
        .save_server(&NewServer {
            name: format!("Server {url}"),
            url: url.to_string(),
            server_type: server_type.to_string(),
            disabled: false,
            arguments: Some(vec![NewServerArgument::new("token", "secret")]),
        })
        .await
        .unwrap()
}

pub async fn test_db() -> CatalogDb {
    CatalogDb::open_in_memory().await.unwrap()
}
