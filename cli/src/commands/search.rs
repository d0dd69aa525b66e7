use anyhow::Result;
use std::process;

use mealbook_core::lookup::FoodSearchProvider;

use super::helpers::{json_error, print_food_table};

pub(crate) async fn cmd_search(
    provider: &dyn FoodSearchProvider,
    query: &str,
    json: bool,
) -> Result<()> {
    let foods = provider.search_by_text(query).await?;

    if foods.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No results found for '{query}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        print_food_table(&foods);
    }

    Ok(())
}

pub(crate) async fn cmd_barcode(
    provider: &dyn FoodSearchProvider,
    code: &str,
    json: bool,
) -> Result<()> {
    let Some(food) = provider.search_by_barcode(code).await? else {
        if json {
            println!("{}", json_error(&format!("No food found for barcode '{code}'")));
        } else {
            eprintln!("No food found for barcode '{code}'");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        print_food_table(std::slice::from_ref(&food));
    }

    Ok(())
}
