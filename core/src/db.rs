use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::models::{Food, LineItem, Meal, MealTotals, Nutrients};

/// Local meal storage backed by a single SQLite file.
///
/// A `MealStore` only exists once its schema has been initialized, so every
/// method can assume both tables are present.
pub struct MealStore {
    conn: Connection,
}

/// A `meals` row before its date is parsed and its line items are attached.
struct MealRow {
    id: String,
    date: String,
    totals: MealTotals,
}

impl MealStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let store = MealStore { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Create the tables if needed and add the `quantity` column to `foods`
    /// tables created before it existed. Safe to run any number of times.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS meals (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                totalCalories REAL NOT NULL,
                totalProteins REAL NOT NULL,
                totalFats REAL NOT NULL,
                totalCarbs REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS foods (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mealId TEXT NOT NULL,
                foodId TEXT NOT NULL,
                label TEXT NOT NULL,
                image TEXT,
                calories REAL NOT NULL,
                proteins REAL NOT NULL,
                fats REAL NOT NULL,
                carbs REAL NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 1,
                FOREIGN KEY (mealId) REFERENCES meals (id) ON DELETE CASCADE
            );",
        )?;

        if !self.has_column("foods", "quantity")? {
            debug!("adding missing quantity column to foods");
            self.conn
                .execute_batch("ALTER TABLE foods ADD COLUMN quantity INTEGER NOT NULL DEFAULT 1;")?;
        }

        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        let mut found = false;
        self.conn.pragma(None, "table_info", table, |row| {
            let name: String = row.get("name")?;
            if name == column {
                found = true;
            }
            Ok(())
        })?;
        Ok(found)
    }

    // --- Row mapping helpers ---

    fn parse_date(meal_id: &str, raw: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|source| StoreError::Timestamp {
                meal_id: meal_id.to_string(),
                raw: raw.to_string(),
                source,
            })
    }

    // Expects columns:
    // 0: id, 1: date, 2: totalCalories, 3: totalProteins, 4: totalFats, 5: totalCarbs
    fn meal_from_row(row: &rusqlite::Row) -> rusqlite::Result<MealRow> {
        Ok(MealRow {
            id: row.get(0)?,
            date: row.get(1)?,
            totals: MealTotals {
                total_calories: row.get(2)?,
                total_protein: row.get(3)?,
                total_fat: row.get(4)?,
                total_carbs: row.get(5)?,
            },
        })
    }

    fn load_meal(conn: &Connection, row: MealRow) -> Result<Meal> {
        Ok(Meal {
            date: Self::parse_date(&row.id, &row.date)?,
            items: Self::line_items_for(conn, &row.id)?,
            id: row.id,
            totals: row.totals,
        })
    }

    fn line_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<LineItem> {
        Ok(LineItem {
            food: Food {
                food_id: row.get(0)?,
                label: row.get(1)?,
                image: row.get(2)?,
                nutrients: Nutrients {
                    calories: Some(row.get(3)?),
                    protein: Some(row.get(4)?),
                    fat: Some(row.get(5)?),
                    carbs: Some(row.get(6)?),
                },
            },
            quantity: row.get(7)?,
        })
    }

    fn line_items_for(conn: &Connection, meal_id: &str) -> Result<Vec<LineItem>> {
        let mut stmt = conn.prepare_cached(
            "SELECT foodId, label, image, calories, proteins, fats, carbs, quantity
             FROM foods WHERE mealId = ?1 ORDER BY id",
        )?;
        let items = stmt
            .query_map(params![meal_id], Self::line_item_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    // --- Meals ---

    /// Persist a meal built from `items` and return it.
    ///
    /// Neither emptiness nor quantity sign is checked here; callers validate
    /// their input before saving.
    pub fn save_meal(&mut self, items: &[LineItem]) -> Result<Meal> {
        self.save_meal_at(items, Utc::now())
    }

    pub(crate) fn save_meal_at(&mut self, items: &[LineItem], now: DateTime<Utc>) -> Result<Meal> {
        let totals = MealTotals::from_items(items);
        let date = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        let tx = self.conn.transaction()?;
        let id = Self::next_meal_id(&tx, now.timestamp_millis())?;

        tx.execute(
            "INSERT INTO meals (id, date, totalCalories, totalProteins, totalFats, totalCarbs)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                date,
                totals.total_calories,
                totals.total_protein,
                totals.total_fat,
                totals.total_carbs,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO foods (mealId, foodId, label, image, calories, proteins, fats, carbs, quantity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for item in items {
                let food = &item.food;
                let n = &food.nutrients;
                stmt.execute(params![
                    id,
                    food.food_id,
                    food.label,
                    food.image.as_deref().filter(|s| !s.is_empty()),
                    n.calories.unwrap_or(0.0),
                    n.protein.unwrap_or(0.0),
                    n.fat.unwrap_or(0.0),
                    n.carbs.unwrap_or(0.0),
                    item.quantity,
                ])?;
            }
        }

        // Read back inside the transaction so the returned meal matches later
        // reads, and a failure here rolls the save back.
        let meal = Self::load_meal(
            &tx,
            MealRow {
                id: id.clone(),
                date,
                totals,
            },
        )?;

        tx.commit()?;
        debug!(meal_id = %id, items = items.len(), "saved meal");
        Ok(meal)
    }

    /// Milliseconds since the epoch, bumped past the largest stored id so two
    /// saves within the same millisecond still get distinct ids.
    fn next_meal_id(tx: &Transaction, now_millis: i64) -> Result<String> {
        let last: Option<i64> =
            tx.query_row("SELECT MAX(CAST(id AS INTEGER)) FROM meals", [], |row| {
                row.get(0)
            })?;
        let id = match last {
            Some(last) if last >= now_millis => last + 1,
            _ => now_millis,
        };
        Ok(id.to_string())
    }

    pub fn try_get_meals(&self) -> Result<Vec<Meal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, totalCalories, totalProteins, totalFats, totalCarbs
             FROM meals ORDER BY date DESC, CAST(id AS INTEGER) DESC",
        )?;
        let rows = stmt
            .query_map([], Self::meal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|row| Self::load_meal(&self.conn, row))
            .collect()
    }

    /// All meals, newest first. A storage failure is logged and reported as
    /// an empty list; use [`MealStore::try_get_meals`] to see the error.
    pub fn get_meals(&self) -> Vec<Meal> {
        self.try_get_meals().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load meals");
            Vec::new()
        })
    }

    pub fn try_get_meal_by_id(&self, id: &str) -> Result<Option<Meal>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, date, totalCalories, totalProteins, totalFats, totalCarbs
                 FROM meals WHERE id = ?1",
                params![id],
                Self::meal_from_row,
            )
            .optional()?;
        row.map(|row| Self::load_meal(&self.conn, row)).transpose()
    }

    /// A storage failure is logged and reported as `None`, same as a
    /// missing meal.
    pub fn get_meal_by_id(&self, id: &str) -> Option<Meal> {
        self.try_get_meal_by_id(id).unwrap_or_else(|e| {
            warn!(meal_id = %id, error = %e, "failed to load meal");
            None
        })
    }

    /// Delete a meal and its line items. Returns whether the meal existed.
    pub fn delete_meal(&mut self, id: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        // The cascade covers this when foreign keys are enforced, but line
        // items must go even on connections where they are not.
        tx.execute("DELETE FROM foods WHERE mealId = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM meals WHERE id = ?1", params![id])?;
        tx.commit()?;
        debug!(meal_id = %id, deleted = rows > 0, "deleted meal");
        Ok(rows > 0)
    }
}
