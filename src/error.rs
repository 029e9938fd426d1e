//! Error types for the store and the scraper.

use thiserror::Error;

/// Errors surfaced by [`Database`](crate::db::Database) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("could not encode note list: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("database lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn article_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Article",
            id: id.to_string(),
        }
    }

    pub fn note_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Note",
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code used in JSON error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidId(_) => "invalid_id",
            Self::Database(_) | Self::Encoding(_) | Self::Poisoned => "persistence",
        }
    }
}

/// Errors from fetching or parsing the source page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network failure or non-success status from the source page.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid heading selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
}
