//! Movie catalog client core.
//!
//! # Overview
//! Fetches one page of the upstream "discover movies" listing for a sort
//! preference and normalizes it into `Movie` records for a list/detail UI.
//!
//! # Design
//! - One fetch cycle is `UrlBuilder` -> `HttpFetcher` -> `MovieParser`,
//!   strictly in sequence, composed by `MovieCatalogService`.
//! - The network sits behind the `Connector` trait; `UreqConnector` is the
//!   blocking production transport with fixed timeouts and no retry.
//! - Hosts that run HTTP themselves use `UrlBuilder::build_request` and
//!   `MovieCatalogService::read_response` instead (host-does-IO).
//! - `CatalogLoader` moves cycles onto worker threads; `CatalogScreen` turns
//!   results into the two user-visible failure states.

pub mod catalog;
pub mod config;
pub mod connectivity;
pub mod discover;
pub mod error;
pub mod http;
pub mod loader;
pub mod parser;
pub mod preferences;
pub mod service;
pub mod types;

pub use catalog::{Catalog, CatalogScreen, CatalogView, MovieDetail};
pub use config::ClientConfig;
pub use connectivity::{AlwaysConnected, ConnectivityCheck, HostConnectivity, TcpProbe};
pub use discover::UrlBuilder;
pub use error::{ConfigError, DisplayState, FetchError, ParseError, TransportError};
pub use http::{Connection, Connector, HttpFetcher, HttpRequest, HttpResponse, UreqConnector};
pub use loader::{CatalogLoader, LoadHandle, LoadOutcome};
pub use parser::MovieParser;
pub use preferences::{FixedSortPreference, SharedSortPreference, SortPreference};
pub use service::{FetchStage, MovieCatalogService};
pub use types::{Movie, SortOrder};
