//! Domain values for the movie catalog.
//!
//! # Design
//! `Movie` is a flat, owned record so it can be copied across the FFI
//! boundary and handed to a detail screen by value. Every field has a
//! type-appropriate default, which is what the parser falls back to when an
//! upstream catalog entry is only partially populated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single movie as shown by the list and detail screens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub overview: String,
    pub user_rating: f64,
    /// Upstream date text, kept verbatim (e.g. `2020-01-01`).
    pub release_date: String,
    /// Fully-qualified poster image URL, or empty when the entry had no poster.
    pub poster_url: String,
}

/// Ranking requested from the discover endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    MostPopular,
    TopRated,
}

impl SortOrder {
    pub const ALL: [SortOrder; 2] = [SortOrder::MostPopular, SortOrder::TopRated];

    /// Value of the `sort_by` query parameter.
    pub fn query_value(self) -> &'static str {
        match self {
            SortOrder::MostPopular => "popularity.desc",
            SortOrder::TopRated => "vote_average.desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value())
    }
}

impl FromStr for SortOrder {
    type Err = ConfigError;

    /// Accepts the query value itself plus the names used by the settings screen.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "popularity.desc" | "most_popular" | "popular" => Ok(SortOrder::MostPopular),
            "vote_average.desc" | "top_rated" => Ok(SortOrder::TopRated),
            other => Err(ConfigError::InvalidSortOrder(other.to_string())),
        }
    }
}
