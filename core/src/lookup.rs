use async_trait::async_trait;
use thiserror::Error;

use crate::models::Food;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Edamam API credentials are not configured (set EDAMAM_APP_ID and EDAMAM_APP_KEY)")]
    MissingCredentials,

    #[error("Edamam API credentials were rejected")]
    InvalidCredentials,

    #[error("Edamam API rate limit reached")]
    RateLimited,

    #[error("Food API returned HTTP {0}")]
    Status(u16),

    #[error("Failed to reach the food API: {0}")]
    Network(String),

    #[error("Failed to parse food API response: {0}")]
    Decode(String),
}

impl LookupError {
    /// Errors the user fixes by changing configuration, as opposed to ones
    /// that may go away on their own.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredentials | Self::InvalidCredentials)
    }
}

/// Remote food database.
///
/// The CLI implements this with reqwest; tests use in-process fakes.
#[async_trait]
pub trait FoodSearchProvider: Send + Sync {
    async fn search_by_text(&self, query: &str) -> Result<Vec<Food>, LookupError>;
    async fn search_by_barcode(&self, code: &str) -> Result<Option<Food>, LookupError>;
}
