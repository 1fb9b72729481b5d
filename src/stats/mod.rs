//! Nutrition statistics module
//!
//! Pure aggregation over logged meals: range filtering, day grouping,
//! totals, series, distributions, and derived insight text.

pub mod aggregator;
pub mod insights;

pub use aggregator::{
    aggregate, average_daily_calories, daily_series, filter_by_range, group_by_day,
    macro_percentage, meal_type_distribution, totals, DailyCalories, MacroSplit, StatsResult,
    TypeCount,
};
pub use insights::Insights;
