//! Meal model
//!
//! Represents a single logged food entry with nutritional values.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Label used for grouping meals that have no meal type
pub const MEAL_TYPE_OTHER: &str = "Other";

/// The known meal types
///
/// Stored meal types are free text; this enum covers the fixed set used for
/// filter validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }

    /// Parse from string, None for anything outside the known set
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// A logged meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// ISO date "2025-01-09", truncated to day start when stored
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub notes: Option<String>,
    #[serde(skip_serializing)]
    pub image: Option<Vec<u8>>,
    pub category_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub notes: Option<String>,
    pub image: Option<Vec<u8>>,
    pub category_id: Option<i64>,
}

/// Data for updating a meal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealUpdate {
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<i64>,
}

/// Predicate filter for listing meals
#[derive(Debug, Clone, Default)]
pub struct MealFilter {
    /// Inclusive lower date bound (ISO date)
    pub start_date: Option<String>,
    /// Inclusive upper date bound (ISO date)
    pub end_date: Option<String>,
    pub meal_type: Option<String>,
    pub category_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Meal {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            calories: row.get("calories")?,
            protein: row.get("protein")?,
            carbs: row.get("carbs")?,
            fat: row.get("fat")?,
            date: row.get("date")?,
            meal_type: row.get("meal_type")?,
            notes: row.get("notes")?,
            image: row.get("image")?,
            category_id: row.get("category_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The calendar day this meal belongs to, None when undated or unparseable
    pub fn day(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    /// The meal type used for grouping, "Other" when absent
    pub fn type_label(&self) -> &str {
        self.meal_type.as_deref().unwrap_or(MEAL_TYPE_OTHER)
    }

    /// Insert a new meal into the database
    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO meals (
                name, calories, protein, carbs, fat,
                date, meal_type, notes, image, category_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                data.name,
                data.calories,
                data.protein,
                data.carbs,
                data.fat,
                data.date,
                data.meal_type,
                data.notes,
                data.image,
                data.category_id,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a meal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List meals matching a predicate filter, newest date first
    pub fn list(conn: &Connection, filter: &MealFilter) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM meals WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref start) = filter.start_date {
            params_vec.push(Box::new(start.clone()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(ref end) = filter.end_date {
            params_vec.push(Box::new(end.clone()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        if let Some(ref meal_type) = filter.meal_type {
            params_vec.push(Box::new(meal_type.clone()));
            sql.push_str(&format!(" AND meal_type = ?{} COLLATE NOCASE", params_vec.len()));
        }

        if let Some(category_id) = filter.category_id {
            params_vec.push(Box::new(category_id));
            sql.push_str(&format!(" AND category_id = ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        if let Some(limit) = filter.limit {
            params_vec.push(Box::new(limit));
            sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));

            params_vec.push(Box::new(filter.offset.unwrap_or(0)));
            sql.push_str(&format!(" OFFSET ?{}", params_vec.len()));
        }

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let meals = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    /// Count meals matching a predicate filter
    pub fn count(conn: &Connection, filter: &MealFilter) -> DbResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM meals WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref start) = filter.start_date {
            params_vec.push(Box::new(start.clone()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(ref end) = filter.end_date {
            params_vec.push(Box::new(end.clone()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        if let Some(ref meal_type) = filter.meal_type {
            params_vec.push(Box::new(meal_type.clone()));
            sql.push_str(&format!(" AND meal_type = ?{} COLLATE NOCASE", params_vec.len()));
        }

        if let Some(category_id) = filter.category_id {
            params_vec.push(Box::new(category_id));
            sql.push_str(&format!(" AND category_id = ?{}", params_vec.len()));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let count: i64 = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Update a meal in place
    pub fn update(conn: &Connection, id: i64, data: &MealUpdate) -> DbResult<Option<Self>> {
        let existing = Self::get_by_id(conn, id)?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(calories) = data.calories {
            updates.push(format!("calories = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(calories));
        }
        if let Some(protein) = data.protein {
            updates.push(format!("protein = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(protein));
        }
        if let Some(carbs) = data.carbs {
            updates.push(format!("carbs = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(carbs));
        }
        if let Some(fat) = data.fat {
            updates.push(format!("fat = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(fat));
        }
        if let Some(ref date) = data.date {
            updates.push(format!("date = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(date.clone()));
        }
        if let Some(ref meal_type) = data.meal_type {
            updates.push(format!("meal_type = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(meal_type.clone()));
        }
        if let Some(ref notes) = data.notes {
            updates.push(format!("notes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(notes.clone()));
        }
        if let Some(category_id) = data.category_id {
            updates.push(format!("category_id = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(category_id));
        }

        if updates.is_empty() {
            return Ok(existing);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE meals SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a meal
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        crate::db::migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn create_data(name: &str, calories: f64, date: Option<&str>, meal_type: Option<&str>) -> MealCreate {
        MealCreate {
            name: name.to_string(),
            calories,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            date: date.map(|s| s.to_string()),
            meal_type: meal_type.map(|s| s.to_string()),
            notes: None,
            image: None,
            category_id: None,
        }
    }

    #[test]
    fn test_create_and_get_roundtrip() {
        let conn = test_conn();
        let created = Meal::create(&conn, &create_data("Oatmeal", 300.0, Some("2025-03-15"), Some("Breakfast"))).unwrap();

        let fetched = Meal::get_by_id(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Oatmeal");
        assert_eq!(fetched.calories, 300.0);
        assert_eq!(fetched.date.as_deref(), Some("2025-03-15"));
        assert_eq!(fetched.meal_type.as_deref(), Some("Breakfast"));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let conn = test_conn();
        assert!(Meal::get_by_id(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn test_list_filters_by_date_range() {
        let conn = test_conn();
        Meal::create(&conn, &create_data("early", 100.0, Some("2025-03-01"), None)).unwrap();
        Meal::create(&conn, &create_data("mid", 200.0, Some("2025-03-10"), None)).unwrap();
        Meal::create(&conn, &create_data("late", 300.0, Some("2025-03-20"), None)).unwrap();
        Meal::create(&conn, &create_data("undated", 400.0, None, None)).unwrap();

        let filter = MealFilter {
            start_date: Some("2025-03-05".to_string()),
            end_date: Some("2025-03-15".to_string()),
            ..Default::default()
        };
        let meals = Meal::list(&conn, &filter).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name, "mid");

        assert_eq!(Meal::count(&conn, &filter).unwrap(), 1);
    }

    #[test]
    fn test_list_filters_by_meal_type_case_insensitive() {
        let conn = test_conn();
        Meal::create(&conn, &create_data("eggs", 200.0, Some("2025-03-10"), Some("Breakfast"))).unwrap();
        Meal::create(&conn, &create_data("stew", 600.0, Some("2025-03-10"), Some("dinner"))).unwrap();

        let filter = MealFilter {
            meal_type: Some("Dinner".to_string()),
            ..Default::default()
        };
        let meals = Meal::list(&conn, &filter).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name, "stew");
    }

    #[test]
    fn test_list_orders_newest_first_and_paginates() {
        let conn = test_conn();
        Meal::create(&conn, &create_data("a", 100.0, Some("2025-03-01"), None)).unwrap();
        Meal::create(&conn, &create_data("b", 200.0, Some("2025-03-02"), None)).unwrap();
        Meal::create(&conn, &create_data("c", 300.0, Some("2025-03-03"), None)).unwrap();

        let filter = MealFilter {
            limit: Some(2),
            offset: Some(0),
            ..Default::default()
        };
        let meals = Meal::list(&conn, &filter).unwrap();
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].name, "c");
        assert_eq!(meals[1].name, "b");
    }

    #[test]
    fn test_update_changes_only_provided_fields() {
        let conn = test_conn();
        let created = Meal::create(&conn, &create_data("Toast", 150.0, Some("2025-03-10"), Some("Breakfast"))).unwrap();

        let updated = Meal::update(&conn, created.id, &MealUpdate {
            calories: Some(180.0),
            notes: Some("with butter".to_string()),
            ..Default::default()
        }).unwrap().unwrap();

        assert_eq!(updated.calories, 180.0);
        assert_eq!(updated.notes.as_deref(), Some("with butter"));
        assert_eq!(updated.name, "Toast");
        assert_eq!(updated.meal_type.as_deref(), Some("Breakfast"));
    }

    #[test]
    fn test_update_missing_returns_none() {
        let conn = test_conn();
        let result = Meal::update(&conn, 42, &MealUpdate::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete() {
        let conn = test_conn();
        let created = Meal::create(&conn, &create_data("gone", 100.0, None, None)).unwrap();

        assert!(Meal::delete(&conn, created.id).unwrap());
        assert!(Meal::get_by_id(&conn, created.id).unwrap().is_none());
        assert!(!Meal::delete(&conn, created.id).unwrap());
    }

    #[test]
    fn test_image_blob_roundtrip() {
        let conn = test_conn();
        let mut data = create_data("with photo", 100.0, None, None);
        data.image = Some(vec![0xFF, 0xD8, 0xFF, 0xE0]);

        let created = Meal::create(&conn, &data).unwrap();
        let fetched = Meal::get_by_id(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched.image.as_deref(), Some(&[0xFF, 0xD8, 0xFF, 0xE0][..]));
    }

    #[test]
    fn test_meal_type_from_str() {
        assert_eq!(MealType::from_str("breakfast"), Some(MealType::Breakfast));
        assert_eq!(MealType::from_str("Dinner"), Some(MealType::Dinner));
        assert_eq!(MealType::from_str("SNACK"), Some(MealType::Snack));
        assert_eq!(MealType::from_str("brunch"), None);
        assert_eq!(MealType::from_str(""), None);
    }

    #[test]
    fn test_day_parses_iso_date() {
        let mut meal = Meal {
            id: 1,
            name: "Oatmeal".to_string(),
            calories: 300.0,
            protein: 10.0,
            carbs: 50.0,
            fat: 6.0,
            date: Some("2025-03-15".to_string()),
            meal_type: Some("Breakfast".to_string()),
            notes: None,
            image: None,
            category_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(meal.day(), NaiveDate::from_ymd_opt(2025, 3, 15));

        meal.date = None;
        assert_eq!(meal.day(), None);

        meal.date = Some("not-a-date".to_string());
        assert_eq!(meal.day(), None);
    }

    #[test]
    fn test_type_label_defaults_to_other() {
        let mut meal = Meal {
            id: 1,
            name: "Leftovers".to_string(),
            calories: 400.0,
            protein: 20.0,
            carbs: 30.0,
            fat: 15.0,
            date: None,
            meal_type: None,
            notes: None,
            image: None,
            category_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(meal.type_label(), MEAL_TYPE_OTHER);

        meal.meal_type = Some("Lunch".to_string());
        assert_eq!(meal.type_label(), "Lunch");
    }
}
