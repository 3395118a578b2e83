//! Blocking HTTP transport for the fetch pipeline.
//!
//! # Design
//! `HttpFetcher` does one GET per call and never retries. The actual socket
//! work sits behind the `Connector` / `Connection` traits: a connection is
//! released when it is dropped, and the fetcher only ever holds it in a local,
//! so the success path, the bad-status path and every `?` all release it.
//!
//! `HttpRequest` / `HttpResponse` describe a round-trip as plain data for
//! hosts that prefer to run the request on their own HTTP stack. Their status
//! handling goes through the same `HttpResponse::into_body` check.

use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, TransportError};

/// Time allowed to establish the TCP/TLS connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);
/// Time allowed for the response head and, separately, for the body.
pub const READ_TIMEOUT: Duration = Duration::from_millis(2000);

const HTTP_OK: u16 = 200;

/// An HTTP GET described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data, produced by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// The body of a 200 response; any other status is `BadStatus`.
    pub fn into_body(self) -> Result<String, FetchError> {
        check_status(self.status)?;
        Ok(self.body)
    }
}

/// One open request whose status line has been received.
pub trait Connection {
    fn status(&self) -> u16;

    /// Read the remaining body as UTF-8 text. Invalid sequences are replaced
    /// with U+FFFD rather than failing the read.
    fn read_body(&mut self) -> Result<String, TransportError>;
}

/// Opens connections. Implementations must not share a connection between calls.
pub trait Connector {
    type Conn: Connection;

    fn open(&self, url: &Url) -> Result<Self::Conn, TransportError>;
}

/// `ureq`-backed connector with the fixed pipeline timeouts.
///
/// A fresh agent is created per request so no pooled connection outlives the
/// call that opened it.
#[derive(Debug, Clone)]
pub struct UreqConnector {
    config: ureq::config::Config,
}

impl UreqConnector {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_recv_response(Some(READ_TIMEOUT))
            .timeout_recv_body(Some(READ_TIMEOUT))
            .http_status_as_error(false)
            .build();
        Self { config }
    }
}

impl Default for UreqConnector {
    fn default() -> Self {
        Self::new()
    }
}

pub struct UreqConnection {
    response: ureq::http::Response<ureq::Body>,
}

impl Connection for UreqConnection {
    fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    fn read_body(&mut self) -> Result<String, TransportError> {
        let bytes = self
            .response
            .body_mut()
            .read_to_vec()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Connector for UreqConnector {
    type Conn = UreqConnection;

    fn open(&self, url: &Url) -> Result<UreqConnection, TransportError> {
        let agent = self.config.new_agent();
        let response = agent
            .get(url.as_str())
            .header("accept", "application/json")
            .call()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(UreqConnection { response })
    }
}

/// Single-attempt GET returning the body of a 200 response.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher<C = UreqConnector> {
    connector: C,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Connector> HttpFetcher<C> {
    pub fn with_connector(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let target = redacted(url);
        let mut conn = self.connector.open(url).map_err(|e| {
            warn!(url = %target, error = %e, "request failed");
            FetchError::IoFailure(e.0)
        })?;

        let status = conn.status();
        if let Err(err) = check_status(status) {
            warn!(url = %target, status, "error response code");
            return Err(err);
        }

        let body = conn.read_body().map_err(|e| {
            warn!(url = %target, error = %e, "reading response body failed");
            FetchError::IoFailure(e.0)
        })?;
        debug!(url = %target, bytes = body.len(), "response received");
        Ok(body)
    }
}

fn check_status(status: u16) -> Result<(), FetchError> {
    if status == HTTP_OK {
        Ok(())
    } else {
        Err(FetchError::BadStatus(status))
    }
}

/// Scheme, host, port and path only: the query holds the API key.
fn redacted(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}{}", url.scheme(), url.path()),
        None => format!("{}://{host}{}", url.scheme(), url.path()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Connection-tracking test double shared by the unit tests of this crate.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone)]
    pub enum Scripted {
        Respond { status: u16, body: String },
        ReadFails { status: u16 },
        ConnectFails,
    }

    #[derive(Debug, Clone, Default)]
    pub struct Counters {
        pub opened: Arc<AtomicUsize>,
        pub released: Arc<AtomicUsize>,
    }

    impl Counters {
        pub fn opened(&self) -> usize {
            self.opened.load(Ordering::SeqCst)
        }

        pub fn released(&self) -> usize {
            self.released.load(Ordering::SeqCst)
        }
    }

    pub struct TrackingConnector {
        pub script: Scripted,
        pub counters: Counters,
        pub last_url: Mutex<Option<String>>,
    }

    impl TrackingConnector {
        pub fn new(script: Scripted) -> Self {
            Self {
                script,
                counters: Counters::default(),
                last_url: Mutex::new(None),
            }
        }

        pub fn ok(body: &str) -> Self {
            Self::new(Scripted::Respond {
                status: 200,
                body: body.to_string(),
            })
        }
    }

    pub struct TrackingConnection {
        status: u16,
        body: Option<String>,
        released: Arc<AtomicUsize>,
    }

    impl Drop for TrackingConnection {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Connection for TrackingConnection {
        fn status(&self) -> u16 {
            self.status
        }

        fn read_body(&mut self) -> Result<String, TransportError> {
            self.body
                .take()
                .ok_or_else(|| TransportError("connection reset".to_string()))
        }
    }

    impl Connector for TrackingConnector {
        type Conn = TrackingConnection;

        fn open(&self, url: &Url) -> Result<TrackingConnection, TransportError> {
            *self.last_url.lock().unwrap() = Some(url.to_string());
            let (status, body) = match &self.script {
                Scripted::ConnectFails => {
                    return Err(TransportError("connection refused".to_string()))
                }
                Scripted::Respond { status, body } => (*status, Some(body.clone())),
                Scripted::ReadFails { status } => (*status, None),
            };
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(TrackingConnection {
                status,
                body,
                released: Arc::clone(&self.counters.released),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Scripted, TrackingConnector};
    use super::*;

    fn url() -> Url {
        Url::parse("http://localhost:3000/3/discover/movie?api_key=k&sort_by=popularity.desc")
            .unwrap()
    }

    #[test]
    fn ok_returns_body_and_releases() {
        let fetcher = HttpFetcher::with_connector(TrackingConnector::ok(r#"{"results":[]}"#));
        let body = fetcher.fetch(&url()).unwrap();
        assert_eq!(body, r#"{"results":[]}"#);
        assert_eq!(fetcher.connector().counters.opened(), 1);
        assert_eq!(fetcher.connector().counters.released(), 1);
    }

    #[test]
    fn not_found_is_bad_status_and_releases() {
        let fetcher = HttpFetcher::with_connector(TrackingConnector::new(Scripted::Respond {
            status: 404,
            body: "not here".to_string(),
        }));
        let err = fetcher.fetch(&url()).unwrap_err();
        assert_eq!(err, FetchError::BadStatus(404));
        assert_eq!(fetcher.connector().counters.opened(), 1);
        assert_eq!(fetcher.connector().counters.released(), 1);
    }

    #[test]
    fn read_failure_is_io_failure_and_releases() {
        let fetcher =
            HttpFetcher::with_connector(TrackingConnector::new(Scripted::ReadFails { status: 200 }));
        let err = fetcher.fetch(&url()).unwrap_err();
        assert!(matches!(err, FetchError::IoFailure(ref m) if m == "connection reset"));
        assert_eq!(fetcher.connector().counters.released(), 1);
    }

    #[test]
    fn connect_failure_is_io_failure() {
        let fetcher = HttpFetcher::with_connector(TrackingConnector::new(Scripted::ConnectFails));
        let err = fetcher.fetch(&url()).unwrap_err();
        assert!(matches!(err, FetchError::IoFailure(_)));
        assert_eq!(fetcher.connector().counters.opened(), 0);
        assert_eq!(fetcher.connector().counters.released(), 0);
    }

    #[test]
    fn one_call_is_one_attempt() {
        let fetcher = HttpFetcher::with_connector(TrackingConnector::new(Scripted::Respond {
            status: 503,
            body: String::new(),
        }));
        let _ = fetcher.fetch(&url());
        assert_eq!(fetcher.connector().counters.opened(), 1);
    }

    #[test]
    fn host_response_status_check() {
        let ok = HttpResponse {
            status: 200,
            body: "{}".to_string(),
        };
        assert_eq!(ok.into_body().unwrap(), "{}");

        let created = HttpResponse {
            status: 201,
            body: "{}".to_string(),
        };
        assert_eq!(created.into_body().unwrap_err(), FetchError::BadStatus(201));
    }

    #[test]
    fn redacted_url_hides_api_key() {
        let shown = redacted(&url());
        assert_eq!(shown, "http://localhost:3000/3/discover/movie");
        assert!(!shown.contains("api_key"));
    }

    #[test]
    fn redacted_url_omits_default_port() {
        let url = Url::parse("https://api.themoviedb.org:443/3/discover/movie?api_key=k").unwrap();
        assert_eq!(redacted(&url), "https://api.themoviedb.org/3/discover/movie");
    }

    #[test]
    fn timeouts_are_fixed() {
        assert_eq!(CONNECT_TIMEOUT, Duration::from_millis(3000));
        assert_eq!(READ_TIMEOUT, Duration::from_millis(2000));
    }
}
