//! Meal tools
//!
//! Logging, listing, updating, and deleting meals.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Category, Meal, MealCreate, MealFilter, MealUpdate};

/// Category reference resolved for display
#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    pub icon_name: String,
}

/// Full meal details
#[derive(Debug, Serialize)]
pub struct MealDetail {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub notes: Option<String>,
    pub has_image: bool,
    pub category: Option<CategoryRef>,
    pub created_at: String,
}

/// Meal summary for listing
#[derive(Debug, Serialize)]
pub struct MealSummary {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub category_id: Option<i64>,
}

/// Response for list_meals
#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub meals: Vec<MealSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Normalize a date input to an ISO day, truncating any time portion.
///
/// Accepts "YYYY-MM-DD", "YYYY-MM-DDTHH:MM:SS", or "YYYY-MM-DD HH:MM:SS";
/// only the day survives storage.
pub fn normalize_date(input: &str) -> Result<String, String> {
    let day_part = input
        .split('T')
        .next()
        .unwrap_or(input)
        .split_whitespace()
        .next()
        .unwrap_or(input);

    NaiveDate::parse_from_str(day_part, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("Invalid date: {} (expected YYYY-MM-DD)", input))
}

/// Reject negative or non-finite nutritional values
fn validate_value(label: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} must be a finite number", label));
    }
    if value < 0.0 {
        return Err(format!("{} must not be negative", label));
    }
    Ok(())
}

fn validate_values(calories: f64, protein: f64, carbs: f64, fat: f64) -> Result<(), String> {
    validate_value("calories", calories)?;
    validate_value("protein", protein)?;
    validate_value("carbs", carbs)?;
    validate_value("fat", fat)?;
    Ok(())
}

fn detail_for(conn: &rusqlite::Connection, meal: Meal) -> Result<MealDetail, String> {
    let category = match meal.category_id {
        Some(category_id) => Category::get_by_id(conn, category_id)
            .map_err(|e| format!("Failed to resolve category: {}", e))?
            .map(|c| CategoryRef {
                id: c.id,
                name: c.name,
                icon_name: c.icon_name,
            }),
        None => None,
    };

    Ok(MealDetail {
        id: meal.id,
        name: meal.name,
        calories: meal.calories,
        protein: meal.protein,
        carbs: meal.carbs,
        fat: meal.fat,
        date: meal.date,
        meal_type: meal.meal_type,
        notes: meal.notes,
        has_image: meal.image.is_some(),
        category,
        created_at: meal.created_at,
    })
}

/// Log a new meal
pub fn log_meal(db: &Database, mut data: MealCreate) -> Result<MealDetail, String> {
    if data.name.trim().is_empty() {
        return Err("Meal name must not be empty".to_string());
    }

    validate_values(data.calories, data.protein, data.carbs, data.fat)?;

    // Truncate any time portion to day start before storing
    if let Some(ref date) = data.date {
        data.date = Some(normalize_date(date)?);
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    // Validate the category reference if provided
    if let Some(category_id) = data.category_id {
        let category = Category::get_by_id(&conn, category_id)
            .map_err(|e| format!("Database error checking category: {}", e))?;
        if category.is_none() {
            return Err(format!("Category not found with id: {}", category_id));
        }
    }

    let meal = Meal::create(&conn, &data)
        .map_err(|e| format!("Failed to log meal: {}", e))?;

    detail_for(&conn, meal)
}

/// Get a meal by ID
pub fn get_meal(db: &Database, id: i64) -> Result<Option<MealDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meal = Meal::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get meal: {}", e))?;

    match meal {
        Some(meal) => Ok(Some(detail_for(&conn, meal)?)),
        None => Ok(None),
    }
}

/// List meals with optional date range, meal type, and category predicates
pub fn list_meals(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
    meal_type: Option<&str>,
    category_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<ListMealsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let filter = MealFilter {
        start_date: start_date.map(normalize_date).transpose()?,
        end_date: end_date.map(normalize_date).transpose()?,
        meal_type: meal_type.map(|t| t.to_string()),
        category_id,
        limit: Some(limit),
        offset: Some(offset),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meals = Meal::list(&conn, &filter)
        .map_err(|e| format!("Failed to list meals: {}", e))?;

    let total = Meal::count(&conn, &filter)
        .map_err(|e| format!("Failed to count meals: {}", e))?;

    let summaries = meals
        .into_iter()
        .map(|meal| MealSummary {
            id: meal.id,
            name: meal.name,
            calories: meal.calories,
            date: meal.date,
            meal_type: meal.meal_type,
            category_id: meal.category_id,
        })
        .collect();

    Ok(ListMealsResponse {
        meals: summaries,
        total,
        limit,
        offset,
    })
}

/// Update a meal
pub fn update_meal(db: &Database, id: i64, mut data: MealUpdate) -> Result<Option<MealDetail>, String> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err("Meal name must not be empty".to_string());
        }
    }

    if let Some(calories) = data.calories {
        validate_value("calories", calories)?;
    }
    if let Some(protein) = data.protein {
        validate_value("protein", protein)?;
    }
    if let Some(carbs) = data.carbs {
        validate_value("carbs", carbs)?;
    }
    if let Some(fat) = data.fat {
        validate_value("fat", fat)?;
    }

    if let Some(ref date) = data.date {
        data.date = Some(normalize_date(date)?);
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if let Some(category_id) = data.category_id {
        let category = Category::get_by_id(&conn, category_id)
            .map_err(|e| format!("Database error checking category: {}", e))?;
        if category.is_none() {
            return Err(format!("Category not found with id: {}", category_id));
        }
    }

    let updated = Meal::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update meal: {}", e))?;

    match updated {
        Some(meal) => Ok(Some(detail_for(&conn, meal)?)),
        None => Ok(None),
    }
}

/// Delete a meal
pub fn delete_meal(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Meal::delete(&conn, id)
        .map_err(|e| format!("Failed to delete meal: {}", e))
}
