//! Client configuration read from the environment.

use url::Url;

use crate::discover::{UrlBuilder, API_ROOT};
use crate::error::ConfigError;
use crate::types::SortOrder;

pub const API_KEY_VAR: &str = "TMDB_API_KEY";
pub const API_ROOT_VAR: &str = "TMDB_API_ROOT";
pub const SORT_ORDER_VAR: &str = "MOVIES_SORT_ORDER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub api_root: String,
    pub sort_order: SortOrder,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so callers and tests can avoid the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let api_root = match lookup(API_ROOT_VAR).filter(|v| !v.trim().is_empty()) {
            Some(root) => {
                let root = root.trim().trim_end_matches('/').to_string();
                Url::parse(&root).map_err(|_| ConfigError::InvalidApiRoot(root.clone()))?;
                root
            }
            None => API_ROOT.to_string(),
        };

        let sort_order = match lookup(SORT_ORDER_VAR).filter(|v| !v.trim().is_empty()) {
            Some(value) => value.parse()?,
            None => SortOrder::default(),
        };

        Ok(Self {
            api_key,
            api_root,
            sort_order,
        })
    }

    pub fn url_builder(&self) -> Result<UrlBuilder, ConfigError> {
        UrlBuilder::from_api_root(&self.api_root)
            .map_err(|_| ConfigError::InvalidApiRoot(self.api_root.clone()))
    }
}
