//! Nutrition statistics tool
//!
//! Fetches meals from the store and runs the pure aggregator over them. The
//! current date is read here, at the boundary, and injected so the
//! aggregation itself stays deterministic.

use chrono::NaiveDate;

use crate::db::Database;
use crate::models::{Meal, MealFilter, MealType};
use crate::stats::{aggregate, StatsResult};

/// Compute nutrition statistics for the last `days` days
pub fn get_nutrition_stats(
    db: &Database,
    days: i64,
    meal_type: Option<&str>,
) -> Result<StatsResult, String> {
    let today = chrono::Local::now().date_naive();
    get_nutrition_stats_at(db, days, meal_type, today)
}

/// Compute nutrition statistics against an explicit `today`
pub fn get_nutrition_stats_at(
    db: &Database,
    days: i64,
    meal_type: Option<&str>,
    today: NaiveDate,
) -> Result<StatsResult, String> {
    if days <= 0 {
        return Err("days must be greater than 0".to_string());
    }

    // The filter parameter must name a known meal type; stored free-text
    // types are still counted in the distribution, just not filterable.
    if let Some(filter) = meal_type {
        if MealType::from_str(filter).is_none() {
            return Err(format!(
                "Unknown meal type filter: {} (expected breakfast, lunch, dinner, or snack)",
                filter
            ));
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    // Fetch everything; the aggregator owns the range and type predicates
    let meals = Meal::list(&conn, &MealFilter::default())
        .map_err(|e| format!("Failed to list meals: {}", e))?;

    tracing::debug!(meal_count = meals.len(), days, "aggregating nutrition stats");

    Ok(aggregate(&meals, days, meal_type, today))
}
