use anyhow::{Context, Result, bail};
use chrono::Local;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealbook_core::models::{Food, LineItem, Meal};

/// Parse a `log` item: "chicken", "2x chicken", "2 x chicken" or "2 chicken".
/// Returns `(quantity, query)`.
pub(crate) fn parse_item_arg(s: &str) -> Result<(i64, String)> {
    let s = s.trim();
    if s.is_empty() {
        bail!("Empty food item");
    }

    let digits = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digits == 0 || digits == s.len() {
        return Ok((1, s.to_string()));
    }

    let (num, rest) = s.split_at(digits);
    let query = if let Some(after) = rest
        .strip_prefix(['x', 'X'])
        .filter(|a| a.is_empty() || a.starts_with(char::is_whitespace))
    {
        after
    } else if rest.starts_with(char::is_whitespace) {
        let rest = rest.trim_start();
        rest.strip_prefix(['x', 'X'])
            .filter(|a| a.starts_with(char::is_whitespace))
            .unwrap_or(rest)
    } else {
        // "7up", "2xl shake": the number belongs to the name
        return Ok((1, s.to_string()));
    };
    let query = query.trim();
    if query.is_empty() {
        bail!("Missing food name in '{s}'. Use e.g. '2x chicken'");
    }

    let qty: i64 = num
        .parse()
        .with_context(|| format!("Invalid quantity in '{s}'"))?;
    if qty <= 0 {
        bail!("Quantity must be greater than 0");
    }
    Ok((qty, query.to_string()))
}

pub(crate) fn prompt_choice(count: usize) -> Result<usize> {
    eprint!("\nSelect a food (1-{count}): ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    let n: usize = line.trim().parse().context("Invalid number")?;
    if n < 1 || n > count {
        bail!("Selection out of range");
    }
    Ok(n - 1)
}

fn fmt_nutrient(v: Option<f64>) -> String {
    v.map_or("-".into(), |v| format!("{v:.1}"))
}

pub(crate) fn print_food_table(foods: &[Food]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Kcal")]
        calories: String,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "F")]
        fat: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "Food ID")]
        id: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .enumerate()
        .map(|(i, f)| FoodRow {
            idx: i + 1,
            name: truncate(&f.label, 35),
            calories: f
                .nutrients
                .calories
                .map_or("-".into(), |v| format!("{v:.0}")),
            protein: fmt_nutrient(f.nutrients.protein),
            fat: fmt_nutrient(f.nutrients.fat),
            carbs: fmt_nutrient(f.nutrients.carbs),
            id: f.food_id.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_meal_table(meals: &[Meal]) {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Foods")]
        foods: usize,
        #[tabled(rename = "Kcal")]
        calories: String,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "F")]
        fat: String,
        #[tabled(rename = "C")]
        carbs: String,
    }

    let rows: Vec<MealRow> = meals
        .iter()
        .map(|m| MealRow {
            id: m.id.clone(),
            date: format_date(m),
            foods: m.items.len(),
            calories: format!("{:.0}", no_neg_zero(m.totals.total_calories)),
            protein: format!("{:.1}", no_neg_zero(m.totals.total_protein)),
            fat: format!("{:.1}", no_neg_zero(m.totals.total_fat)),
            carbs: format!("{:.1}", no_neg_zero(m.totals.total_carbs)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn format_date(meal: &Meal) -> String {
    meal.date
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// "Chicken ×2 — 330 kcal | P:62.0g F:7.2g C:0.0g"
pub(crate) fn format_line_item(item: &LineItem) -> String {
    let label = &item.food.label;
    let qty = item.quantity;
    let cal = no_neg_zero(item.calories());
    let protein = no_neg_zero(item.protein());
    let fat = no_neg_zero(item.fat());
    let carbs = no_neg_zero(item.carbs());
    format!("{label} ×{qty} — {cal:.0} kcal | P:{protein:.1}g F:{fat:.1}g C:{carbs:.1}g")
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealbook_core::models::Nutrients;

    #[test]
    fn test_parse_item_arg_plain() {
        assert_eq!(parse_item_arg("chicken").unwrap(), (1, "chicken".to_string()));
        assert_eq!(
            parse_item_arg("  brown rice ").unwrap(),
            (1, "brown rice".to_string())
        );
    }

    #[test]
    fn test_parse_item_arg_with_quantity() {
        assert_eq!(parse_item_arg("2x chicken").unwrap(), (2, "chicken".to_string()));
        assert_eq!(parse_item_arg("3 x rice").unwrap(), (3, "rice".to_string()));
        assert_eq!(parse_item_arg("4X egg").unwrap(), (4, "egg".to_string()));
        assert_eq!(parse_item_arg("2 apples").unwrap(), (2, "apples".to_string()));
    }

    #[test]
    fn test_parse_item_arg_keeps_words_starting_with_x() {
        assert_eq!(parse_item_arg("2 xoconostle").unwrap(), (2, "xoconostle".to_string()));
        assert_eq!(parse_item_arg("7up").unwrap(), (1, "7up".to_string()));
        assert_eq!(parse_item_arg("2xl shake").unwrap(), (1, "2xl shake".to_string()));
    }

    #[test]
    fn test_parse_item_arg_invalid() {
        assert!(parse_item_arg("").is_err());
        assert!(parse_item_arg("2x").is_err());
        assert!(parse_item_arg("0x chicken").is_err());
        assert!(parse_item_arg("99999999999999999999x chicken").is_err());
    }

    #[test]
    fn test_format_line_item() {
        let item = LineItem::new(
            Food {
                food_id: "food_chicken".to_string(),
                label: "Chicken".to_string(),
                image: None,
                nutrients: Nutrients::new(165.0, 31.0, 3.6, 0.0),
            },
            2,
        );
        assert_eq!(
            format_line_item(&item),
            "Chicken ×2 — 330 kcal | P:62.0g F:7.2g C:0.0g"
        );
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("Meal 1 not found"), r#"{"error":"Meal 1 not found"}"#);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
    }
}
