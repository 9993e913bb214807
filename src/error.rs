//! Error types for feed extraction and board operation.
//!
//! Every failure the board can hit while fetching and parsing feeds maps to one
//! variant of [`BoardError`]. None of them are fatal to the polling loop: the
//! caller degrades the affected key (or the whole cycle) to a "no result" state
//! and carries on.
//!
//! ## Error Categories
//!
//! - **Transport Errors**: the HTTP collaborator failed or returned a non-success status
//! - **Link Errors**: the network link was down before any fetch was attempted
//! - **Parse Errors**: a malformed or truncated JSON fragment
//! - **Resource Exhaustion**: a buffer could not grow while accumulating bytes
//! - **No Data**: a well-formed stream held zero qualifying records
//! - **Config Errors**: an invalid [`BoardConfig`](crate::BoardConfig)
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use pitboard::BoardError;
//!
//! let error = BoardError::transport_failed("http://api/v1/laps", "connection reset");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type alias for board operations.
pub type Result<T, E = BoardError> = std::result::Result<T, E>;

/// Main error type for board operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BoardError {
    #[error("Fetch failed for {url}: {reason}")]
    Transport {
        url: String,
        reason: String,
        status: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Network link unavailable: {reason}")]
    Link { reason: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Out of memory while buffering {context}")]
    ResourceExhausted {
        context: String,
        #[source]
        source: TryReserveError,
    },

    #[error("No data: {context}")]
    NoData { context: String },

    #[error("Invalid configuration: {details}")]
    Config { details: String },
}

impl BoardError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            BoardError::Transport { .. } => true,
            BoardError::Link { .. } => true,
            BoardError::ResourceExhausted { .. } => true,
            BoardError::Parse { .. } => false,
            BoardError::NoData { .. } => false,
            BoardError::Config { .. } => false,
        }
    }

    /// Returns whether this is the user-visible "no data" condition rather than a failure.
    pub fn is_no_data(&self) -> bool {
        matches!(self, BoardError::NoData { .. })
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            BoardError::Transport { status: Some(_), .. } => vec![
                "Check the API base URL",
                "Verify the feed is published for the latest session",
            ],
            BoardError::Transport { .. } => vec![
                "Check the API server is reachable",
                "Wait for the next poll cycle",
            ],
            BoardError::Link { .. } => vec![
                "Check the access point is in range",
                "Verify network credentials",
                "Wait for the link to reassociate",
            ],
            BoardError::Parse { .. } => vec![
                "Verify the feed returns JSON",
                "Check the feed is not being truncated upstream",
            ],
            BoardError::ResourceExhausted { .. } => vec![
                "Lower http_tail_bytes or max_object_bytes",
                "Reduce standings_capacity",
            ],
            BoardError::NoData { .. } => vec![
                "Wait for the session to produce data",
                "Check the session key is live",
            ],
            BoardError::Config { .. } => vec![
                "Check the configuration file against the documented defaults",
            ],
        }
    }

    /// Helper constructor for transport failures.
    pub fn transport_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        BoardError::Transport { url: url.into(), reason: reason.into(), status: None, source: None }
    }

    /// Helper constructor for transport failures with a source error.
    pub fn transport_failed_with_source(
        url: impl Into<String>,
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        BoardError::Transport {
            url: url.into(),
            reason: reason.into(),
            status: None,
            source: Some(source),
        }
    }

    /// Helper constructor for non-success HTTP statuses.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        BoardError::Transport {
            url: url.into(),
            reason: format!("HTTP {}", status),
            status: Some(status),
            source: None,
        }
    }

    /// Helper constructor for link failures.
    pub fn link_down(reason: impl Into<String>) -> Self {
        BoardError::Link { reason: reason.into() }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        BoardError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for empty results.
    pub fn no_data(context: impl Into<String>) -> Self {
        BoardError::NoData { context: context.into() }
    }

    /// Helper constructor for allocation failures.
    pub fn out_of_memory(context: impl Into<String>, source: TryReserveError) -> Self {
        BoardError::ResourceExhausted { context: context.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        BoardError::Config { details: details.into() }
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Parse { context: "JSON decode".to_string(), details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserve_failure() -> TryReserveError {
        let mut buf: Vec<u8> = Vec::new();
        match buf.try_reserve(usize::MAX) {
            Err(err) => err,
            Ok(()) => unreachable!("reserving usize::MAX bytes cannot succeed"),
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_carry_their_context(
            url in "http://[a-z]{1,12}/[a-z/]{0,20}",
            reason in ".*",
            status in 100u16..600u16,
            context in "\\w+",
            details in ".*"
          ) {
            let transport = BoardError::transport_failed(url.clone(), reason.clone());
            let msg = transport.to_string();
            prop_assert!(msg.contains(&url));
            prop_assert!(msg.contains(&reason));

            let http = BoardError::http_status(url.clone(), status);
            prop_assert!(http.to_string().contains(&status.to_string()));

            let parse = BoardError::parse_error(context.clone(), details.clone());
            let parse_msg = parse.to_string();
            prop_assert!(parse_msg.contains(&context));
            prop_assert!(parse_msg.contains(&details));

            let empty = BoardError::no_data(context.clone());
            prop_assert!(empty.to_string().contains(&context));
            prop_assert!(empty.is_no_data());
          }

          #[test]
          fn source_chain_is_preserved(base in ".*", url in "[a-z]{1,8}") {
            let err = BoardError::transport_failed_with_source(
              url,
              "read failed",
              Box::new(std::io::Error::other(base.clone())),
            );
            let source = std::error::Error::source(&err);
            prop_assert!(source.is_some());
            prop_assert_eq!(source.map(|s| s.to_string()), Some(base));
          }
        }
    }

    #[test]
    fn retry_classification() {
        assert!(BoardError::transport_failed("u", "r").is_retryable());
        assert!(BoardError::link_down("no ip").is_retryable());
        assert!(BoardError::out_of_memory("tail", reserve_failure()).is_retryable());
        assert!(!BoardError::parse_error("c", "d").is_retryable());
        assert!(!BoardError::no_data("laps").is_retryable());
        assert!(!BoardError::config("bad").is_retryable());
    }

    #[test]
    fn every_variant_has_suggestions() {
        let errors = [
            BoardError::transport_failed("u", "r"),
            BoardError::http_status("u", 404),
            BoardError::link_down("down"),
            BoardError::parse_error("c", "d"),
            BoardError::out_of_memory("tail", reserve_failure()),
            BoardError::no_data("laps"),
            BoardError::config("bad"),
        ];
        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty(), "{error} has no suggestions");
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: BoardError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, BoardError::Parse { .. }));
    }

    #[test]
    fn error_is_send_sync_static() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<BoardError>();
    }
}
