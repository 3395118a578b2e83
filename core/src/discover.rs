//! Request URL construction for the discover endpoint.

use url::Url;

use crate::http::HttpRequest;
use crate::types::SortOrder;

/// Root of the upstream REST API.
pub const API_ROOT: &str = "https://api.themoviedb.org/3";

const DISCOVER_PATH: &str = "discover/movie";
const API_KEY_PARAM: &str = "api_key";
const SORT_BY_PARAM: &str = "sort_by";

/// Builds `GET <root>/discover/movie?api_key=..&sort_by=..` URLs.
///
/// Stateless apart from the endpoint it was created with; cloning is cheap
/// enough to hand one to every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    endpoint: Url,
}

impl UrlBuilder {
    /// Use `endpoint` verbatim as the discover endpoint.
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    /// Derive the discover endpoint from an API root such as
    /// `http://127.0.0.1:3000/3`. A trailing slash on the root is ignored.
    pub fn from_api_root(root: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(&format!("{}/{DISCOVER_PATH}", root.trim_end_matches('/')))?;
        Ok(Self::new(endpoint))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full request URL for one fetch cycle.
    ///
    /// Any `api_key` or `sort_by` already present on the endpoint is replaced,
    /// so the result always carries exactly one of each.
    pub fn build(&self, sort_order: SortOrder, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != API_KEY_PARAM && k != SORT_BY_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair(API_KEY_PARAM, api_key)
            .append_pair(SORT_BY_PARAM, sort_order.query_value());
        url
    }

    /// Plain-data request for hosts that execute the HTTP call themselves.
    pub fn build_request(&self, sort_order: SortOrder, api_key: &str) -> HttpRequest {
        HttpRequest {
            url: self.build(sort_order, api_key).into(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self::from_api_root(API_ROOT).expect("API_ROOT is a valid absolute URL")
    }
}
