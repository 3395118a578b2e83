//! Normalizes a discover response body into `Movie` records.
//!
//! # Design
//! The payload is read as an untyped `serde_json::Value` rather than through
//! derived structs: only the envelope (`{"results": [...]}`) is mandatory,
//! while every field of every entry is optional and falls back to its default
//! on its own. A derived struct would reject the whole page on the first
//! wrong-typed field.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ParseError;
use crate::types::Movie;

/// Image host plus size segment; the entry's `poster_path` is appended as-is.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const POSTER_SIZE: &str = "/w185";

const RESULTS_KEY: &str = "results";
const TITLE_KEY: &str = "original_title";
const POSTER_PATH_KEY: &str = "poster_path";
const OVERVIEW_KEY: &str = "overview";
const VOTE_AVERAGE_KEY: &str = "vote_average";
const RELEASE_DATE_KEY: &str = "release_date";

pub struct MovieParser;

impl MovieParser {
    /// Parse a discover response into movies, in response order.
    ///
    /// A well-formed but empty `results` array is `Ok(vec![])`. Entries that
    /// are not JSON objects are skipped.
    pub fn parse(json_text: &str) -> Result<Vec<Movie>, ParseError> {
        if json_text.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let root: Value = serde_json::from_str(json_text).map_err(|e| {
            debug!(error = %e, "response body is not valid JSON");
            ParseError::MissingResults
        })?;

        let results = root
            .as_object()
            .and_then(|obj| obj.get(RESULTS_KEY))
            .and_then(Value::as_array)
            .ok_or(ParseError::MissingResults)?;

        let movies: Vec<Movie> = results
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry.as_object() {
                Some(fields) => Some(movie_from_entry(fields)),
                None => {
                    debug!(index, "skipping catalog entry that is not an object");
                    None
                }
            })
            .collect();

        debug!(
            entries = results.len(),
            movies = movies.len(),
            "parsed catalog page"
        );
        Ok(movies)
    }
}

fn movie_from_entry(fields: &Map<String, Value>) -> Movie {
    let poster_path = text(fields, POSTER_PATH_KEY);
    let poster_url = if poster_path.is_empty() {
        String::new()
    } else {
        format!("{POSTER_BASE_URL}{POSTER_SIZE}{poster_path}")
    };

    Movie {
        title: text(fields, TITLE_KEY),
        overview: text(fields, OVERVIEW_KEY),
        user_rating: number(fields, VOTE_AVERAGE_KEY),
        release_date: text(fields, RELEASE_DATE_KEY),
        poster_url,
    }
}

/// String field, or empty when missing, null or not a string.
fn text(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Numeric field, also accepting a numeric string; 0.0 otherwise.
fn number(fields: &Map<String, Value>, key: &str) -> f64 {
    match fields.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or_default(),
        _ => 0.0,
    }
}
