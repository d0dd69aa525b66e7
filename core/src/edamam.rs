use serde::Deserialize;

use crate::lookup::LookupError;
use crate::models::{Food, Nutrients};

/// Hints beyond this many are dropped from text search results.
pub const HINT_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct ParserResponse {
    #[serde(default)]
    pub parsed: Vec<FoodEntry>,
    #[serde(default)]
    pub hints: Vec<FoodEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FoodEntry {
    pub food: EdamamFood,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdamamFood {
    pub food_id: Option<String>,
    pub label: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub nutrients: Nutrients,
}

#[must_use]
pub fn edamam_to_food(f: EdamamFood) -> Option<Food> {
    let food_id = f.food_id.filter(|id| !id.is_empty())?;
    let label = f.label.filter(|l| !l.is_empty())?;
    Some(Food {
        food_id,
        label,
        image: f.image.filter(|i| !i.is_empty()),
        nutrients: f.nutrients,
    })
}

/// Every parsed food, then up to [`HINT_LIMIT`] hints.
#[must_use]
pub fn foods_from_search(resp: ParserResponse) -> Vec<Food> {
    resp.parsed
        .into_iter()
        .chain(resp.hints.into_iter().take(HINT_LIMIT))
        .filter_map(|entry| edamam_to_food(entry.food))
        .collect()
}

#[must_use]
pub fn food_from_barcode(resp: ParserResponse) -> Option<Food> {
    resp.parsed
        .into_iter()
        .chain(resp.hints)
        .find_map(|entry| edamam_to_food(entry.food))
}

#[must_use]
pub fn status_error(status: u16) -> LookupError {
    match status {
        401 => LookupError::InvalidCredentials,
        403 => LookupError::RateLimited,
        other => LookupError::Status(other),
    }
}
