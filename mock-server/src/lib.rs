use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

pub const DEFAULT_API_KEY: &str = "test-key";

/// One catalog entry as the upstream API serializes it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MovieEntry {
    pub id: u64,
    pub original_title: String,
    pub poster_path: Option<String>,
    pub overview: String,
    pub vote_average: f64,
    pub release_date: String,
    pub popularity: f64,
}

#[derive(Serialize, Deserialize)]
pub struct DiscoverPage {
    pub page: u32,
    pub results: Vec<MovieEntry>,
    pub total_pages: u32,
    pub total_results: usize,
}

#[derive(Deserialize)]
pub struct DiscoverQuery {
    pub api_key: Option<String>,
    pub sort_by: Option<String>,
}

/// Raw reply returned for every request, bypassing key and sort handling.
#[derive(Clone, Debug)]
pub struct Scripted {
    pub status: u16,
    pub body: String,
}

pub struct MockState {
    api_key: String,
    movies: Vec<MovieEntry>,
    scripted: Option<Scripted>,
    hits: AtomicUsize,
}

pub type Db = Arc<MockState>;

impl MockState {
    pub fn new(api_key: impl Into<String>, movies: Vec<MovieEntry>) -> Self {
        Self {
            api_key: api_key.into(),
            movies,
            scripted: None,
            hits: AtomicUsize::new(0),
        }
    }

    pub fn scripted(status: u16, body: impl Into<String>) -> Self {
        let mut state = Self::new(DEFAULT_API_KEY, Vec::new());
        state.scripted = Some(Scripted {
            status,
            body: body.into(),
        });
        state
    }

    /// Requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY, sample_movies())
    }
}

pub fn sample_movies() -> Vec<MovieEntry> {
    vec![
        MovieEntry {
            id: 550,
            original_title: "Fight Club".to_string(),
            poster_path: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
            overview: "A ticking-time-bomb insomniac and a slippery soap salesman.".to_string(),
            vote_average: 8.4,
            release_date: "1999-10-15".to_string(),
            popularity: 61.4,
        },
        MovieEntry {
            id: 278,
            original_title: "The Shawshank Redemption".to_string(),
            poster_path: Some("/9cqNxx0GxF0bflZmeSMuL5tnGzr.jpg".to_string()),
            overview: "Imprisoned in the 1940s for the double murder of his wife.".to_string(),
            vote_average: 8.7,
            release_date: "1994-09-23".to_string(),
            popularity: 88.1,
        },
        MovieEntry {
            id: 19995,
            original_title: "Avatar".to_string(),
            poster_path: None,
            overview: "In the 22nd century, a paraplegic Marine is dispatched to Pandora.".to_string(),
            vote_average: 7.6,
            release_date: "2009-12-15".to_string(),
            popularity: 212.9,
        },
    ]
}

pub fn app() -> Router {
    app_with(Arc::new(MockState::default()))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/3/discover/movie", get(discover_movies))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

async fn discover_movies(State(db): State<Db>, Query(query): Query<DiscoverQuery>) -> Response {
    db.hits.fetch_add(1, Ordering::SeqCst);

    if let Some(scripted) = &db.scripted {
        let status =
            StatusCode::from_u16(scripted.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, scripted.body.clone()).into_response();
    }

    if query.api_key.as_deref() != Some(db.api_key.as_str()) {
        let body = json!({
            "status_code": 7,
            "status_message": "Invalid API key: You must be granted a valid key.",
            "success": false,
        });
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let mut results = db.movies.clone();
    match query.sort_by.as_deref().unwrap_or("popularity.desc") {
        "popularity.desc" => results.sort_by(|a, b| b.popularity.total_cmp(&a.popularity)),
        "vote_average.desc" => results.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average)),
        _ => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    }

    let page = DiscoverPage {
        page: 1,
        total_pages: 1,
        total_results: results.len(),
        results,
    };
    Json(page).into_response()
}
