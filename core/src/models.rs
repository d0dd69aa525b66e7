use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-unit macro-nutrients as reported by the food database.
///
/// Any value may be missing upstream; a missing value counts as zero
/// everywhere it is used in arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    #[serde(rename = "ENERC_KCAL", default)]
    pub calories: Option<f64>,
    #[serde(rename = "PROCNT", default)]
    pub protein: Option<f64>,
    #[serde(rename = "FAT", default)]
    pub fat: Option<f64>,
    #[serde(rename = "CHOCDF", default)]
    pub carbs: Option<f64>,
}

impl Nutrients {
    #[must_use]
    pub fn new(calories: f64, protein: f64, fat: f64, carbs: f64) -> Self {
        Self {
            calories: Some(calories),
            protein: Some(protein),
            fat: Some(fat),
            carbs: Some(carbs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub food_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub nutrients: Nutrients,
}

/// One food with a multiplier, either in a cart or inside a saved meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub food: Food,
    pub quantity: i64,
}

impl LineItem {
    #[must_use]
    pub fn new(food: Food, quantity: i64) -> Self {
        Self { food, quantity }
    }

    #[allow(clippy::cast_precision_loss)]
    fn scaled(&self, value: Option<f64>) -> f64 {
        value.unwrap_or(0.0) * self.quantity as f64
    }

    #[must_use]
    pub fn calories(&self) -> f64 {
        self.scaled(self.food.nutrients.calories)
    }

    #[must_use]
    pub fn protein(&self) -> f64 {
        self.scaled(self.food.nutrients.protein)
    }

    #[must_use]
    pub fn fat(&self) -> f64 {
        self.scaled(self.food.nutrients.fat)
    }

    #[must_use]
    pub fn carbs(&self) -> f64 {
        self.scaled(self.food.nutrients.carbs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MealTotals {
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_fat: f64,
    pub total_carbs: f64,
}

impl MealTotals {
    /// Sum every item's contribution, in item order.
    #[must_use]
    pub fn from_items(items: &[LineItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            acc.total_calories += item.calories();
            acc.total_protein += item.protein();
            acc.total_fat += item.fat();
            acc.total_carbs += item.carbs();
            acc
        })
    }
}

/// A saved meal. Totals are the values computed when the meal was saved,
/// not recomputed from `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub date: DateTime<Utc>,
    pub items: Vec<LineItem>,
    #[serde(flatten)]
    pub totals: MealTotals,
}
