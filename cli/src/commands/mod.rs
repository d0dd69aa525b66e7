mod helpers;
mod meal;
mod search;

use anyhow::{Result, bail};

use mealbook_core::cart::Cart;
use mealbook_core::lookup::FoodSearchProvider;
use mealbook_core::models::Food;

use helpers::{parse_item_arg, print_food_table, prompt_choice};

pub(crate) use meal::{cmd_delete, cmd_list, cmd_log, cmd_show};
pub(crate) use search::{cmd_barcode, cmd_search};

/// Resolve a query to one food. Several matches prompt for a choice unless
/// `first` is set.
pub(super) async fn resolve_food(
    provider: &dyn FoodSearchProvider,
    query: &str,
    first: bool,
) -> Result<Food> {
    let mut foods = provider.search_by_text(query).await?;

    if foods.is_empty() {
        bail!("No food found for '{query}'");
    }

    if foods.len() == 1 || first {
        return Ok(foods.swap_remove(0));
    }

    eprintln!("Matches for '{query}':");
    print_food_table(&foods);
    let idx = prompt_choice(foods.len())?;
    Ok(foods.swap_remove(idx))
}

/// Build a cart from `log` item arguments and scanned barcodes. Repeated foods
/// are merged into one line.
pub(super) async fn build_cart(
    provider: &dyn FoodSearchProvider,
    items: &[String],
    barcodes: &[String],
    first: bool,
) -> Result<Cart> {
    let mut cart = Cart::new();

    for arg in items {
        let (quantity, query) = parse_item_arg(arg)?;
        let food = resolve_food(provider, &query, first).await?;
        cart.add_with_quantity(food, quantity);
    }

    for code in barcodes {
        match provider.search_by_barcode(code).await? {
            Some(food) => cart.add(food),
            None => bail!("No food found for barcode '{code}'"),
        }
    }

    Ok(cart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mealbook_core::db::MealStore;
    use mealbook_core::lookup::LookupError;
    use mealbook_core::models::Nutrients;

    struct FakeProvider {
        foods: Vec<Food>,
        barcodes: Vec<(String, Food)>,
    }

    #[async_trait]
    impl FoodSearchProvider for FakeProvider {
        async fn search_by_text(&self, query: &str) -> Result<Vec<Food>, LookupError> {
            let q = query.to_lowercase();
            Ok(self
                .foods
                .iter()
                .filter(|f| f.label.to_lowercase().contains(&q))
                .cloned()
                .collect())
        }

        async fn search_by_barcode(&self, code: &str) -> Result<Option<Food>, LookupError> {
            Ok(self
                .barcodes
                .iter()
                .find(|(c, _)| c == code)
                .map(|(_, f)| f.clone()))
        }
    }

    struct UnconfiguredProvider;

    #[async_trait]
    impl FoodSearchProvider for UnconfiguredProvider {
        async fn search_by_text(&self, _query: &str) -> Result<Vec<Food>, LookupError> {
            Err(LookupError::MissingCredentials)
        }

        async fn search_by_barcode(&self, _code: &str) -> Result<Option<Food>, LookupError> {
            Err(LookupError::MissingCredentials)
        }
    }

    fn food(id: &str, label: &str, kcal: f64) -> Food {
        Food {
            food_id: id.to_string(),
            label: label.to_string(),
            image: None,
            nutrients: Nutrients::new(kcal, 1.0, 1.0, 1.0),
        }
    }

    fn provider() -> FakeProvider {
        FakeProvider {
            foods: vec![
                food("food_chicken", "Chicken Breast", 165.0),
                food("food_rice", "White Rice", 130.0),
                food("food_brown_rice", "Brown Rice", 112.0),
            ],
            barcodes: vec![("3017620422003".to_string(), food("food_nutella", "Nutella", 539.0))],
        }
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_resolve_single_match() {
        let food = resolve_food(&provider(), "chicken", false).await.unwrap();
        assert_eq!(food.food_id, "food_chicken");
    }

    #[tokio::test]
    async fn test_resolve_first_of_many() {
        let food = resolve_food(&provider(), "rice", true).await.unwrap();
        assert_eq!(food.food_id, "food_rice");
    }

    #[tokio::test]
    async fn test_resolve_no_match() {
        let err = resolve_food(&provider(), "pizza", true).await.unwrap_err();
        assert!(err.to_string().contains("No food found for 'pizza'"));
    }

    #[tokio::test]
    async fn test_build_cart_merges_repeats() {
        let cart = build_cart(
            &provider(),
            &args(&["2x chicken", "white rice", "chicken"]),
            &[],
            true,
        )
        .await
        .unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].food.food_id, "food_chicken");
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total_items(), 4);
        assert!((cart.totals().total_calories - (3.0 * 165.0 + 130.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_build_cart_with_barcodes() {
        let cart = build_cart(
            &provider(),
            &args(&["chicken"]),
            &args(&["3017620422003", "3017620422003"]),
            true,
        )
        .await
        .unwrap();
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[1].food.label, "Nutella");
        assert_eq!(cart.items()[1].quantity, 2);
    }

    #[tokio::test]
    async fn test_build_cart_unknown_barcode() {
        let err = build_cart(&provider(), &[], &args(&["0000000000000"]), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("0000000000000"));
    }

    #[tokio::test]
    async fn test_build_cart_empty() {
        let cart = build_cart(&provider(), &[], &[], true).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_errors_propagate() {
        let err = build_cart(&UnconfiguredProvider, &args(&["chicken"]), &[], true)
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<LookupError>(),
            Some(&LookupError::MissingCredentials)
        );
    }

    fn temp_store(dir: &tempfile::TempDir) -> MealStore {
        MealStore::open(&dir.path().join("nutrition.db")).unwrap()
    }

    #[tokio::test]
    async fn test_log_rejects_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = temp_store(&dir);

        let err = cmd_log(&mut store, &provider(), &[], &[], true, true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Select at least one food");
        assert!(store.get_meals().is_empty());
    }

    #[tokio::test]
    async fn test_log_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = temp_store(&dir);

        cmd_log(
            &mut store,
            &provider(),
            &args(&["2x chicken", "white rice"]),
            &[],
            true,
            true,
        )
        .await
        .unwrap();

        // Reopen to make sure the meal reached the file
        drop(store);
        let mut store = temp_store(&dir);
        let meals = store.get_meals();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].items.len(), 2);
        assert!((meals[0].totals.total_calories - (2.0 * 165.0 + 130.0)).abs() < 1e-9);

        let id = meals[0].id.clone();
        cmd_show(&store, &id, true).unwrap();
        cmd_delete(&mut store, &id, true).unwrap();
        assert!(store.get_meal_by_id(&id).is_none());
        assert!(store.get_meals().is_empty());
    }
}
