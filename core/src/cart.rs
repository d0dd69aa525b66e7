use serde::Serialize;

use crate::models::{Food, LineItem, MealTotals};

/// Line items collected before a meal is saved.
///
/// Adding a food that is already present bumps its quantity instead of
/// adding a second line.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, food: Food) {
        self.add_with_quantity(food, 1);
    }

    pub fn add_with_quantity(&mut self, food: Food, quantity: i64) {
        if let Some(item) = self.find_mut(&food.food_id) {
            item.quantity += quantity;
        } else {
            self.items.push(LineItem::new(food, quantity));
        }
    }

    /// Apply `delta` to a food's quantity, floored at zero. Items that end
    /// up at zero are dropped.
    pub fn update_quantity(&mut self, food_id: &str, delta: i64) {
        if let Some(item) = self.find_mut(food_id) {
            item.quantity = (item.quantity + delta).max(0);
        }
        self.items.retain(|item| item.quantity > 0);
    }

    pub fn remove(&mut self, food_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.food.food_id != food_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn find_mut(&mut self, food_id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.food.food_id == food_id)
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn totals(&self) -> MealTotals {
        MealTotals::from_items(&self.items)
    }
}
