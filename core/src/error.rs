use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open database {path}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Invalid timestamp '{raw}' on meal {meal_id}")]
    Timestamp {
        meal_id: String,
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
