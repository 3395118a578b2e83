//! Catalog snapshot and the headless state of the list and detail screens.
//!
//! # Design
//! A `Catalog` is replaced wholesale by every successful fetch, never merged.
//! The detail screen receives an owned `MovieDetail` looked up against the
//! snapshot that was on screen, so nothing process-wide has to be shared
//! between the two screens.

use serde::Serialize;

use crate::error::{DisplayState, FetchError};
use crate::types::Movie;

pub const NO_INTERNET_MESSAGE: &str = "No internet connection.";
pub const NO_DATA_MESSAGE: &str = "No movies data found.";

/// Movies in upstream response order. Not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Movie> {
        self.movies.iter()
    }

    pub fn into_vec(self) -> Vec<Movie> {
        self.movies
    }
}

impl From<Vec<Movie>> for Catalog {
    fn from(movies: Vec<Movie>) -> Self {
        Self::new(movies)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Movie;
    type IntoIter = std::slice::Iter<'a, Movie>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// What the list screen shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CatalogView {
    #[default]
    Idle,
    Loading,
    Movies(Catalog),
    NoNetwork,
    NoData,
}

impl CatalogView {
    /// An empty but successful page is shown as "no data", like any failure
    /// other than a missing network.
    pub fn from_result(result: Result<Vec<Movie>, FetchError>) -> Self {
        match result {
            Ok(movies) if movies.is_empty() => CatalogView::NoData,
            Ok(movies) => CatalogView::Movies(Catalog::new(movies)),
            Err(err) => match err.display_state() {
                DisplayState::NoNetwork => CatalogView::NoNetwork,
                DisplayState::NoData => CatalogView::NoData,
            },
        }
    }

    /// Text for the empty-state label, if this view has one.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            CatalogView::NoNetwork => Some(NO_INTERNET_MESSAGE),
            CatalogView::NoData => Some(NO_DATA_MESSAGE),
            CatalogView::Idle | CatalogView::Loading | CatalogView::Movies(_) => None,
        }
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            CatalogView::Movies(catalog) => Some(catalog),
            _ => None,
        }
    }
}

/// Everything the detail screen renders for one movie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetail {
    pub title: String,
    pub overview: String,
    pub release_date: String,
    pub poster_url: String,
    /// One decimal place, e.g. `7.5`.
    pub rating_label: String,
}

impl From<&Movie> for MovieDetail {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            release_date: movie.release_date.clone(),
            poster_url: movie.poster_url.clone(),
            rating_label: format!("{:.1}", movie.user_rating),
        }
    }
}

/// State of the list screen across load, refresh and reset.
#[derive(Debug, Clone, Default)]
pub struct CatalogScreen {
    view: CatalogView,
}

impl CatalogScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    /// Drop the current snapshot and wait for the next result.
    pub fn refresh(&mut self) {
        self.view = CatalogView::Loading;
    }

    pub fn finish(&mut self, result: Result<Vec<Movie>, FetchError>) {
        self.view = CatalogView::from_result(result);
    }

    pub fn reset(&mut self) {
        self.view = CatalogView::Idle;
    }

    /// Detail for the movie at `index` of the snapshot on screen.
    pub fn select(&self, index: usize) -> Option<MovieDetail> {
        self.view.catalog()?.get(index).map(MovieDetail::from)
    }
}
