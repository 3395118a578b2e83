//! Runs fetch cycles off the calling thread.
//!
//! # Design
//! Every `load` spawns one worker and bumps a shared generation counter. The
//! worker always runs to completion (or to its transport timeout); there is no
//! cancellation. Instead a `LoadHandle` remembers its generation and, when
//! waited on after a newer load started, reports `Superseded` so the display
//! layer drops the stale result.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::connectivity::ConnectivityCheck;
use crate::error::FetchError;
use crate::http::Connector;
use crate::preferences::SortPreference;
use crate::service::MovieCatalogService;
use crate::types::{Movie, SortOrder};

pub type CatalogResult = Result<Vec<Movie>, FetchError>;

/// How a load ended, from the display layer's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Current(CatalogResult),
    /// A newer load was started; this result should not be shown.
    Superseded,
}

pub struct CatalogLoader<C, N> {
    service: Arc<MovieCatalogService<C, N>>,
    generation: Arc<AtomicU64>,
}

impl<C, N> Clone for CatalogLoader<C, N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<C, N> CatalogLoader<C, N>
where
    C: Connector + Send + Sync + 'static,
    N: ConnectivityCheck + Send + Sync + 'static,
{
    pub fn new(service: MovieCatalogService<C, N>) -> Self {
        Self {
            service: Arc::new(service),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn service(&self) -> &MovieCatalogService<C, N> {
        &self.service
    }

    /// Start a fetch cycle on a worker thread. Supersedes earlier handles.
    pub fn load(&self, sort_order: SortOrder, api_key: impl Into<String>) -> LoadHandle {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let api_key = api_key.into();
        let service = Arc::clone(&self.service);
        let (tx, rx) = mpsc::channel();

        debug!(generation, sort_by = sort_order.query_value(), "starting catalog load");
        thread::spawn(move || {
            let result = service.fetch_catalog(sort_order, &api_key);
            // The receiver may be gone if the caller dropped the handle.
            let _ = tx.send(result);
        });

        LoadHandle {
            generation,
            latest: Arc::clone(&self.generation),
            receiver: rx,
            delivered: Cell::new(false),
        }
    }

    /// Like `load`, reading the sort order from `prefs` exactly once.
    pub fn load_with_preference(
        &self,
        prefs: &impl SortPreference,
        api_key: impl Into<String>,
    ) -> LoadHandle {
        self.load(prefs.get(), api_key)
    }
}

/// Pending result of one `CatalogLoader::load`.
pub struct LoadHandle {
    generation: u64,
    latest: Arc<AtomicU64>,
    receiver: Receiver<CatalogResult>,
    delivered: Cell<bool>,
}

impl LoadHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once a newer load has been started on the same loader.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }

    /// Block until the worker finishes. Not meant to follow a `try_result`
    /// that already returned the outcome.
    pub fn wait(self) -> LoadOutcome {
        let result = self.receiver.recv().unwrap_or_else(|_| {
            Err(FetchError::IoFailure(
                "fetch worker exited without a result".to_string(),
            ))
        });
        self.settle(result)
    }

    /// Non-blocking poll; `None` while the worker is still running and on
    /// every poll after the outcome has been handed out once.
    pub fn try_result(&self) -> Option<LoadOutcome> {
        if self.delivered.get() {
            return None;
        }
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(FetchError::IoFailure(
                "fetch worker exited without a result".to_string(),
            )),
        };
        self.delivered.set(true);
        Some(self.settle(result))
    }

    fn settle(&self, result: CatalogResult) -> LoadOutcome {
        if self.is_current() {
            LoadOutcome::Current(result)
        } else {
            debug!(generation = self.generation, "discarding superseded catalog load");
            LoadOutcome::Superseded
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::connectivity::HostConnectivity;
    use crate::discover::UrlBuilder;
    use crate::http::testing::TrackingConnector;
    use crate::http::HttpFetcher;
    use crate::preferences::FixedSortPreference;

    const BODY: &str = r#"{"results":[{"original_title":"A"},{"original_title":"B"}]}"#;

    fn loader(online: bool) -> CatalogLoader<TrackingConnector, HostConnectivity> {
        CatalogLoader::new(MovieCatalogService::with_parts(
            UrlBuilder::default(),
            HttpFetcher::with_connector(TrackingConnector::ok(BODY)),
            HostConnectivity::new(online),
        ))
    }

    #[test]
    fn load_delivers_result() {
        let handle = loader(true).load(SortOrder::MostPopular, "k");
        match handle.wait() {
            LoadOutcome::Current(Ok(movies)) => assert_eq!(movies.len(), 2),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn offline_load_reports_no_network() {
        let outcome = loader(false).load(SortOrder::TopRated, "k").wait();
        assert_eq!(outcome, LoadOutcome::Current(Err(FetchError::NoNetwork)));
    }

    #[test]
    fn newer_load_supersedes_older() {
        let loader = loader(true);
        let first = loader.load(SortOrder::MostPopular, "k");
        let second = loader.load(SortOrder::TopRated, "k");

        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(first.wait(), LoadOutcome::Superseded);
        assert!(matches!(second.wait(), LoadOutcome::Current(Ok(_))));
        // The superseded worker still ran to completion.
        assert_eq!(loader.service().fetcher().connector().counters.opened(), 2);
    }

    #[test]
    fn try_result_eventually_yields() {
        let handle = loader(true).load(SortOrder::MostPopular, "k");
        assert!(matches!(
            poll_until_ready(&handle),
            LoadOutcome::Current(Ok(_))
        ));
    }

    fn poll_until_ready(handle: &LoadHandle) -> LoadOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = handle.try_result() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "worker never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn polling_after_delivery_yields_nothing() {
        let handle = loader(false).load(SortOrder::MostPopular, "k");
        assert_eq!(
            poll_until_ready(&handle),
            LoadOutcome::Current(Err(FetchError::NoNetwork))
        );
        // The worker has exited by now, so the channel is closed as well.
        thread::sleep(Duration::from_millis(20));
        assert_eq!(handle.try_result(), None);
        assert_eq!(handle.try_result(), None);
    }

    #[test]
    fn preference_selects_sort_order() {
        let loader = loader(true);
        loader
            .load_with_preference(&FixedSortPreference(SortOrder::TopRated), "k")
            .wait();
        let url = loader
            .service()
            .fetcher()
            .connector()
            .last_url
            .lock()
            .unwrap()
            .clone()
            .unwrap();
        assert!(url.ends_with("sort_by=vote_average.desc"));
    }

    #[test]
    fn clones_share_generation() {
        let loader = loader(true);
        let other = loader.clone();
        let first = loader.load(SortOrder::MostPopular, "k");
        let _second = other.load(SortOrder::MostPopular, "k");
        assert!(!first.is_current());
    }
}
