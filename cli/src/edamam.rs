use async_trait::async_trait;

use mealbook_core::edamam::{ParserResponse, food_from_barcode, foods_from_search, status_error};
use mealbook_core::lookup::{FoodSearchProvider, LookupError};
use mealbook_core::models::Food;

use crate::config::EdamamCredentials;

pub struct EdamamClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<EdamamCredentials>,
}

impl EdamamClient {
    pub fn new(base_url: &str, credentials: Option<EdamamCredentials>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "mealbook-cli/{} (meal logger)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(10))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn credentials(&self) -> Result<&EdamamCredentials, LookupError> {
        self.credentials
            .as_ref()
            .ok_or(LookupError::MissingCredentials)
    }

    async fn parser(&self, param: &str, value: &str) -> Result<reqwest::Response, LookupError> {
        let creds = self.credentials()?;
        self.client
            .get(format!("{}/parser", self.base_url))
            .query(&[
                ("app_id", creds.app_id.as_str()),
                ("app_key", creds.app_key.as_str()),
                (param, value),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))
    }

    async fn decode(resp: reqwest::Response) -> Result<ParserResponse, LookupError> {
        resp.json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FoodSearchProvider for EdamamClient {
    async fn search_by_text(&self, query: &str) -> Result<Vec<Food>, LookupError> {
        let resp = self.parser("ingr", query).await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, "Edamam search failed");
            return Err(status_error(status.as_u16()));
        }
        let foods = foods_from_search(Self::decode(resp).await?);
        tracing::debug!(query, results = foods.len(), "Edamam search");
        Ok(foods)
    }

    async fn search_by_barcode(&self, code: &str) -> Result<Option<Food>, LookupError> {
        let resp = self.parser("upc", code).await?;
        let status = resp.status();
        if !status.is_success() {
            let err = status_error(status.as_u16());
            if matches!(err, LookupError::Status(_)) {
                // Edamam answers unknown barcodes with a 404
                tracing::debug!(code, %status, "barcode not found");
                return Ok(None);
            }
            return Err(err);
        }
        Ok(food_from_barcode(Self::decode(resp).await?))
    }
}
