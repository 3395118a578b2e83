//! Error types for the catalog fetch pipeline.
//!
//! # Design
//! Each stage keeps its own error kind and `FetchError` carries the parse
//! kind through `#[from]` instead of flattening it. The display layer only
//! ever needs two states, so `FetchError::display_state` does the collapsing
//! at the very edge rather than inside the pipeline.

use thiserror::Error;

/// Failures of one fetch cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The connectivity check failed; no request was issued.
    #[error("no network connection")]
    NoNetwork,

    /// The server answered with something other than 200. The body is dropped.
    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),

    /// DNS, connect, timeout or read failure. The message is for logs only.
    #[error("transport failure: {0}")]
    IoFailure(String),

    /// The body arrived but did not hold a catalog.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failures of `MovieParser::parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response body is empty")]
    Empty,

    #[error("response has no `results` array")]
    MissingResults,
}

/// Raised by a `Connector` or `Connection`; always surfaces as `FetchError::IoFailure`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Problems reading `ClientConfig` from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("TMDB_API_KEY is not set")]
    MissingApiKey,

    #[error("unknown sort order `{0}`")]
    InvalidSortOrder(String),

    #[error("invalid API root `{0}`")]
    InvalidApiRoot(String),
}

/// The only two failure states the display layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Actionable: the user can reconnect and retry.
    NoNetwork,
    /// Everything else: generic "no data" message.
    NoData,
}

impl FetchError {
    pub fn display_state(&self) -> DisplayState {
        match self {
            FetchError::NoNetwork => DisplayState::NoNetwork,
            FetchError::BadStatus(_) | FetchError::IoFailure(_) | FetchError::Parse(_) => {
                DisplayState::NoData
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_no_network_is_actionable() {
        assert_eq!(FetchError::NoNetwork.display_state(), DisplayState::NoNetwork);
        assert_eq!(FetchError::BadStatus(500).display_state(), DisplayState::NoData);
        assert_eq!(
            FetchError::IoFailure("timed out".into()).display_state(),
            DisplayState::NoData
        );
        assert_eq!(
            FetchError::from(ParseError::MissingResults).display_state(),
            DisplayState::NoData
        );
    }

    #[test]
    fn parse_error_kind_survives_conversion() {
        let err: FetchError = ParseError::Empty.into();
        assert_eq!(err, FetchError::Parse(ParseError::Empty));
        assert_eq!(err.to_string(), "response body is empty");
    }
}
