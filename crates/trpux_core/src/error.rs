use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::AdapterError;

/// Configuration-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("No parser supports server type \"{server_type}\" of server {server}!")]
    #[diagnostic(
        code(trpux_core::no_parser_for_server),
        help("Register a parser that lists \"{server_type}\" among its supported servers")
    )]
    NoParserForServer { server: String, server_type: String },

    #[error("Source type \"{source_type}\" is not supported for card \"{card_type}\"!")]
    #[diagnostic(
        code(trpux_core::unsupported_source_for_card),
        help("No registered parser declares \"{card_type}\" compatible with \"{source_type}\"")
    )]
    UnsupportedSourceForCard {
        source_type: String,
        card_type: String,
    },

    #[error("Source type \"{source_type}\" is not supported!")]
    #[diagnostic(
        code(trpux_core::unsupported_source_type),
        help("No registered parser lists \"{source_type}\" among its supported sources")
    )]
    UnsupportedSourceType { source_type: String },

    #[error("Source {address} has no source type")]
    #[diagnostic(
        code(trpux_core::untyped_source),
        help("The source type was deleted; rediscover the source to assign a new one")
    )]
    UntypedSource { address: String },

    #[error("Parser {parser} failed during {operation}: {cause}")]
    #[diagnostic(
        code(trpux_core::adapter_error),
        help("The external server answered with an error or could not be reached")
    )]
    Adapter {
        parser: String,
        operation: &'static str,
        #[source]
        cause: AdapterError,
    },

    #[error("Parser {parser} returned a payload that is not a \"{card_type}\" card")]
    #[diagnostic(
        code(trpux_core::payload_mismatch),
        help("Parsers must return the payload shape of the requested card type")
    )]
    PayloadMismatch { parser: String, card_type: String },

    #[error("Server with the ID {id} does not exist!")]
    #[diagnostic(code(trpux_core::server_not_found))]
    ServerNotFound { id: i64 },

    #[error("Source with the ID {id} does not exist!")]
    #[diagnostic(code(trpux_core::source_not_found))]
    SourceNotFound { id: i64 },

    #[error("Invalid server {field}: {reason}")]
    #[diagnostic(
        code(trpux_core::invalid_server),
        help("Servers need a non-empty name and type, and an absolute URL")
    )]
    InvalidServer { field: &'static str, reason: String },

    #[error("SQLite database error: {0}")]
    #[diagnostic(
        code(trpux_core::sqlite_error),
        help("Check database connection and query")
    )]
    Database(#[from] trpux_db::DbError),

    #[error("Configuration error for field '{field}'")]
    #[diagnostic(
        code(trpux_core::configuration_error),
        help("Check configuration file at {config_path}\nExpected: {expected}")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn unsupported_for_card(
        source_type: impl Into<String>,
        card_type: impl Into<String>,
    ) -> Self {
        Self::UnsupportedSourceForCard {
            source_type: source_type.into(),
            card_type: card_type.into(),
        }
    }

    pub fn unsupported_source(source_type: impl Into<String>) -> Self {
        Self::UnsupportedSourceType {
            source_type: source_type.into(),
        }
    }

    pub fn adapter(
        parser: impl Into<String>,
        operation: &'static str,
        cause: AdapterError,
    ) -> Self {
        Self::Adapter {
            parser: parser.into(),
            operation,
            cause,
        }
    }

    pub fn invalid_server(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidServer {
            field,
            reason: reason.into(),
        }
    }

    pub fn config(
        config_path: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        cause: ConfigError,
    ) -> Self {
        Self::ConfigurationError {
            config_path: config_path.into(),
            field: field.into(),
            expected: expected.into(),
            cause,
        }
    }
}
