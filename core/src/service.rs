//! The fetch cycle: build URL, fetch, parse.
//!
//! # Design
//! `MovieCatalogService` holds no per-call state. Each invocation walks
//! `Idle -> Building -> Fetching -> Parsing -> Succeeded | Failed` on its own
//! and the stages never overlap. Concurrent invocations are independent and
//! complete in no particular order; serializing or superseding them is the
//! caller's job (see `CatalogLoader`).

use tracing::{debug, info_span};

use crate::connectivity::{AlwaysConnected, ConnectivityCheck};
use crate::discover::UrlBuilder;
use crate::error::FetchError;
use crate::http::{Connector, HttpFetcher, HttpResponse, UreqConnector};
use crate::parser::MovieParser;
use crate::types::{Movie, SortOrder};

/// Where a fetch cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Idle,
    Building,
    Fetching,
    Parsing,
    Succeeded,
    Failed,
}

pub struct MovieCatalogService<C = UreqConnector, N = AlwaysConnected> {
    urls: UrlBuilder,
    fetcher: HttpFetcher<C>,
    connectivity: N,
}

impl MovieCatalogService {
    /// Production pipeline against the public API, no connectivity gate.
    pub fn new() -> Self {
        Self::with_parts(UrlBuilder::default(), HttpFetcher::new(), AlwaysConnected)
    }
}

impl Default for MovieCatalogService {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector, N: ConnectivityCheck> MovieCatalogService<C, N> {
    pub fn with_parts(urls: UrlBuilder, fetcher: HttpFetcher<C>, connectivity: N) -> Self {
        Self {
            urls,
            fetcher,
            connectivity,
        }
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    pub fn fetcher(&self) -> &HttpFetcher<C> {
        &self.fetcher
    }

    pub fn connectivity(&self) -> &N {
        &self.connectivity
    }

    pub fn fetch_catalog(
        &self,
        sort_order: SortOrder,
        api_key: &str,
    ) -> Result<Vec<Movie>, FetchError> {
        self.fetch_catalog_observed(sort_order, api_key, |_| {})
    }

    /// `fetch_catalog`, reporting every stage transition to `observe`.
    pub fn fetch_catalog_observed(
        &self,
        sort_order: SortOrder,
        api_key: &str,
        mut observe: impl FnMut(FetchStage),
    ) -> Result<Vec<Movie>, FetchError> {
        let span = info_span!("fetch_catalog", sort_by = sort_order.query_value());
        let _guard = span.enter();

        let mut advance = |stage: FetchStage| {
            debug!(?stage, "fetch stage");
            observe(stage);
        };

        advance(FetchStage::Idle);
        if !self.connectivity.is_connected() {
            advance(FetchStage::Failed);
            return Err(FetchError::NoNetwork);
        }

        advance(FetchStage::Building);
        let url = self.urls.build(sort_order, api_key);

        advance(FetchStage::Fetching);
        let outcome = self
            .fetcher
            .fetch(&url)
            .and_then(|body| {
                advance(FetchStage::Parsing);
                MovieParser::parse(&body).map_err(FetchError::from)
            });

        advance(match outcome {
            Ok(_) => FetchStage::Succeeded,
            Err(_) => FetchStage::Failed,
        });
        outcome
    }

    /// Status check and parse for a response the host fetched itself.
    pub fn read_response(&self, response: HttpResponse) -> Result<Vec<Movie>, FetchError> {
        let body = response.into_body()?;
        Ok(MovieParser::parse(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::HostConnectivity;
    use crate::error::ParseError;
    use crate::http::testing::{Scripted, TrackingConnector};

    const ONE_MOVIE: &str = r#"{"results":[{"original_title":"A","poster_path":"/p.jpg","vote_average":7.5,"release_date":"2020-01-01","overview":"o"}]}"#;

    fn service(
        connector: TrackingConnector,
        online: bool,
    ) -> MovieCatalogService<TrackingConnector, HostConnectivity> {
        MovieCatalogService::with_parts(
            UrlBuilder::from_api_root("http://localhost:3000/3").unwrap(),
            HttpFetcher::with_connector(connector),
            HostConnectivity::new(online),
        )
    }

    #[test]
    fn success_walks_every_stage() {
        let svc = service(TrackingConnector::ok(ONE_MOVIE), true);
        let mut stages = Vec::new();
        let movies = svc
            .fetch_catalog_observed(SortOrder::TopRated, "k", |s| stages.push(s))
            .unwrap();

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].user_rating, 7.5);
        assert_eq!(
            stages,
            [
                FetchStage::Idle,
                FetchStage::Building,
                FetchStage::Fetching,
                FetchStage::Parsing,
                FetchStage::Succeeded,
            ]
        );
    }

    #[test]
    fn requests_the_built_url() {
        let svc = service(TrackingConnector::ok(ONE_MOVIE), true);
        svc.fetch_catalog(SortOrder::TopRated, "abc").unwrap();
        let requested = svc.fetcher().connector().last_url.lock().unwrap().clone();
        assert_eq!(
            requested.as_deref(),
            Some("http://localhost:3000/3/discover/movie?api_key=abc&sort_by=vote_average.desc")
        );
    }

    #[test]
    fn offline_never_opens_a_connection() {
        let svc = service(TrackingConnector::ok(ONE_MOVIE), false);
        let mut stages = Vec::new();
        let err = svc
            .fetch_catalog_observed(SortOrder::MostPopular, "k", |s| stages.push(s))
            .unwrap_err();

        assert_eq!(err, FetchError::NoNetwork);
        assert_eq!(stages, [FetchStage::Idle, FetchStage::Failed]);
        assert_eq!(svc.fetcher().connector().counters.opened(), 0);
        assert!(svc.fetcher().connector().last_url.lock().unwrap().is_none());
    }

    #[test]
    fn bad_status_skips_parsing() {
        let svc = service(
            TrackingConnector::new(Scripted::Respond {
                status: 404,
                body: ONE_MOVIE.to_string(),
            }),
            true,
        );
        let mut stages = Vec::new();
        let err = svc
            .fetch_catalog_observed(SortOrder::MostPopular, "k", |s| stages.push(s))
            .unwrap_err();

        assert_eq!(err, FetchError::BadStatus(404));
        assert!(!stages.contains(&FetchStage::Parsing));
        assert_eq!(stages.last(), Some(&FetchStage::Failed));
        assert_eq!(svc.fetcher().connector().counters.released(), 1);
    }

    #[test]
    fn parse_errors_keep_their_kind() {
        let svc = service(TrackingConnector::ok(""), true);
        assert_eq!(
            svc.fetch_catalog(SortOrder::MostPopular, "k").unwrap_err(),
            FetchError::Parse(ParseError::Empty)
        );

        let svc = service(TrackingConnector::ok("{}"), true);
        assert_eq!(
            svc.fetch_catalog(SortOrder::MostPopular, "k").unwrap_err(),
            FetchError::Parse(ParseError::MissingResults)
        );
    }

    #[test]
    fn invocations_are_independent() {
        let svc = service(TrackingConnector::ok(ONE_MOVIE), true);
        let first = svc.fetch_catalog(SortOrder::MostPopular, "k").unwrap();
        svc.connectivity().set(false);
        assert_eq!(
            svc.fetch_catalog(SortOrder::MostPopular, "k").unwrap_err(),
            FetchError::NoNetwork
        );
        svc.connectivity().set(true);
        let third = svc.fetch_catalog(SortOrder::MostPopular, "k").unwrap();
        assert_eq!(first, third);
        assert_eq!(svc.fetcher().connector().counters.opened(), 2);
    }

    #[test]
    fn host_response_goes_through_same_checks() {
        let svc = service(TrackingConnector::ok(""), true);
        let ok = svc
            .read_response(HttpResponse {
                status: 200,
                body: ONE_MOVIE.to_string(),
            })
            .unwrap();
        assert_eq!(ok.len(), 1);

        let err = svc
            .read_response(HttpResponse {
                status: 401,
                body: ONE_MOVIE.to_string(),
            })
            .unwrap_err();
        assert_eq!(err, FetchError::BadStatus(401));

        let err = svc
            .read_response(HttpResponse {
                status: 200,
                body: "[]".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, FetchError::Parse(ParseError::MissingResults));
    }
}
