use anyhow::{Context, Result, bail};
use std::process;

use mealbook_core::db::MealStore;
use mealbook_core::lookup::FoodSearchProvider;
use mealbook_core::models::Meal;

use super::build_cart;
use super::helpers::{format_date, format_line_item, json_error, no_neg_zero, print_meal_table};

pub(crate) async fn cmd_log(
    store: &mut MealStore,
    provider: &dyn FoodSearchProvider,
    items: &[String],
    barcodes: &[String],
    first: bool,
    json: bool,
) -> Result<()> {
    let cart = build_cart(provider, items, barcodes, first).await?;
    if cart.is_empty() {
        bail!("Select at least one food");
    }

    let meal = store
        .save_meal(cart.items())
        .context("Failed to save meal")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meal)?);
    } else {
        let id = &meal.id;
        let count = cart.total_items();
        let cal = no_neg_zero(meal.totals.total_calories);
        println!("Saved meal {id}: {count} food(s) — {cal:.0} kcal");
    }

    Ok(())
}

pub(crate) fn cmd_list(store: &MealStore, json: bool) -> Result<()> {
    let meals = store.get_meals();

    if meals.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No meals logged yet");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&meals)?);
    } else {
        print_meal_table(&meals);
    }

    Ok(())
}

pub(crate) fn cmd_show(store: &MealStore, id: &str, json: bool) -> Result<()> {
    let Some(meal) = store.get_meal_by_id(id) else {
        not_found(id, json);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&meal)?);
    } else {
        print_meal_detail(&meal);
    }

    Ok(())
}

pub(crate) fn cmd_delete(store: &mut MealStore, id: &str, json: bool) -> Result<()> {
    if !store.delete_meal(id)? {
        not_found(id, json);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted meal {id}");
    }
    Ok(())
}

fn not_found(id: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(&format!("Meal {id} not found")));
    } else {
        eprintln!("Meal {id} not found");
    }
    process::exit(2);
}

fn print_meal_detail(meal: &Meal) {
    let id = &meal.id;
    let date = format_date(meal);
    println!("=== Meal {id} — {date} ===\n");

    for item in &meal.items {
        println!("  {}", format_line_item(item));
    }

    let t = &meal.totals;
    let cal = no_neg_zero(t.total_calories);
    let protein = no_neg_zero(t.total_protein);
    let fat = no_neg_zero(t.total_fat);
    let carbs = no_neg_zero(t.total_carbs);
    println!("\n  TOTAL: {cal:.0} kcal | P:{protein:.1}g F:{fat:.1}g C:{carbs:.1}g");
}
