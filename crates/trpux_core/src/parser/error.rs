use miette::Diagnostic;
use thiserror::Error;

/// Failure inside a parser while talking to its external system.
#[derive(Error, Diagnostic, Debug)]
pub enum AdapterError {
    #[error("Request to {url} failed: {reason}")]
    #[diagnostic(code(trpux_core::parser::request_failed))]
    Request { url: String, reason: String },

    #[error("Unexpected response from {url}: {reason}")]
    #[diagnostic(code(trpux_core::parser::invalid_response))]
    InvalidResponse { url: String, reason: String },

    #[error("Card type \"{card_type}\" cannot be loaded by this parser")]
    #[diagnostic(code(trpux_core::parser::unsupported_card))]
    UnsupportedCard { card_type: String },

    #[error("{0}")]
    #[diagnostic(code(trpux_core::parser::other))]
    Other(String),
}

impl AdapterError {
    pub fn request(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Request {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_response(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// A parser whose capability declaration is malformed.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("Parser {parser} did not pass the capability check: {reason}")]
#[diagnostic(
    code(trpux_core::parser::registration_failed),
    help("Fix the parser's declared capabilities; it was not registered")
)]
pub struct RegistrationError {
    pub parser: String,
    pub reason: String,
}
