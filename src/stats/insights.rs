//! Insight text generation
//!
//! Deterministic sentences derived from the aggregates, for display under
//! the stats view. Thresholds are fixed constants.

use serde::Serialize;

use super::aggregator::TypeCount;

/// Daily calorie average below this reads as under the recommended range
pub const LOW_DAILY_CALORIES: f64 = 1500.0;
/// Daily calorie average above this reads as over the recommended range
pub const HIGH_DAILY_CALORIES: f64 = 2500.0;
/// Fewer meals per day than this is a light logging pattern
pub const LIGHT_MEALS_PER_DAY: f64 = 2.5;
/// More meals per day than this is a frequent logging pattern
pub const FREQUENT_MEALS_PER_DAY: f64 = 4.5;

/// Insight sentences for the stats view
#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub pattern: String,
    pub trend: String,
    pub frequency: String,
}

/// Describe how meals spread across meal types.
///
/// "Balanced" when the most common type covers at most half of all meals,
/// otherwise the dominant type is named.
pub fn pattern_insight(distribution: &[TypeCount], meal_count: usize) -> String {
    let top = match distribution.first() {
        Some(top) if meal_count > 0 => top,
        _ => return "No meals logged in this period.".to_string(),
    };

    if top.count * 2 <= meal_count {
        "Your meals are spread evenly across meal types.".to_string()
    } else {
        format!(
            "{} makes up most of your logged meals ({} of {}).",
            top.meal_type, top.count, meal_count
        )
    }
}

/// Place the calorie average against the recommended daily range.
pub fn trend_insight(average_daily_calories: f64) -> String {
    if average_daily_calories <= 0.0 {
        "No calorie data to compare against the recommended range.".to_string()
    } else if average_daily_calories < LOW_DAILY_CALORIES {
        format!(
            "Your average of {:.0} kcal/day is below the recommended range.",
            average_daily_calories
        )
    } else if average_daily_calories > HIGH_DAILY_CALORIES {
        format!(
            "Your average of {:.0} kcal/day is above the recommended range.",
            average_daily_calories
        )
    } else {
        format!(
            "Your average of {:.0} kcal/day is within the recommended range.",
            average_daily_calories
        )
    }
}

/// Describe how often meals are logged on days that have any.
pub fn frequency_insight(meal_count: usize, day_count: usize) -> String {
    if day_count == 0 {
        return "No dated meals to measure logging frequency.".to_string();
    }

    let per_day = meal_count as f64 / day_count as f64;
    if per_day < LIGHT_MEALS_PER_DAY {
        format!("You log about {:.1} meals per day. Consider logging snacks too.", per_day)
    } else if per_day > FREQUENT_MEALS_PER_DAY {
        format!("You log about {:.1} meals per day, tracking nearly everything you eat.", per_day)
    } else {
        format!("You log about {:.1} meals per day, a steady tracking habit.", per_day)
    }
}

/// Generate all insight sentences from the aggregates
pub fn generate(
    distribution: &[TypeCount],
    meal_count: usize,
    average_daily_calories: f64,
    day_count: usize,
) -> Insights {
    Insights {
        pattern: pattern_insight(distribution, meal_count),
        trend: trend_insight(average_daily_calories),
        frequency: frequency_insight(meal_count, day_count),
    }
}
