//! Nutrition aggregation
//!
//! Every operation here is a pure function of the meal records and an
//! injected `today` date. Nothing reads the clock, nothing fails: abnormal
//! input (missing dates, NaN numerics, empty sets) degrades to zero or empty
//! results.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::{MacroTotals, Meal};
use super::insights::{self, Insights};

/// One point of the per-day calorie series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCalories {
    pub date: NaiveDate,
    pub calories: f64,
}

/// Meal count for one meal type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    pub meal_type: String,
    pub count: usize,
}

/// Macro percentage breakdown of total intake
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MacroSplit {
    pub protein_pct: u32,
    pub carbs_pct: u32,
    pub fat_pct: u32,
}

/// Everything the presentation layer needs for a stats view
#[derive(Debug, Serialize)]
pub struct StatsResult {
    pub range_days: i64,
    pub meal_type_filter: Option<String>,
    pub meal_count: usize,
    pub totals: MacroTotals,
    pub average_daily_calories: f64,
    pub daily_series: Vec<DailyCalories>,
    pub meal_type_distribution: Vec<TypeCount>,
    pub macro_split: MacroSplit,
    pub insights: Insights,
}

/// Keep meals dated on or after `today - days`, optionally restricted to one
/// meal type (case-insensitive).
///
/// Undated meals cannot be excluded by the date bound; they pass through so
/// they still count toward overall totals, and the day-keyed operations skip
/// them instead.
pub fn filter_by_range<'a>(
    meals: &'a [Meal],
    days: i64,
    meal_type: Option<&str>,
    today: NaiveDate,
) -> Vec<&'a Meal> {
    let cutoff = today - Duration::days(days);

    meals
        .iter()
        .filter(|meal| match meal.day() {
            Some(day) => day >= cutoff,
            None => true,
        })
        .filter(|meal| match meal_type {
            Some(wanted) => meal.type_label().eq_ignore_ascii_case(wanted),
            None => true,
        })
        .collect()
}

/// Partition meals into calendar-day buckets. Undated meals are excluded.
pub fn group_by_day<'a>(meals: &[&'a Meal]) -> BTreeMap<NaiveDate, Vec<&'a Meal>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&Meal>> = BTreeMap::new();

    for meal in meals {
        if let Some(day) = meal.day() {
            by_day.entry(day).or_default().push(meal);
        }
    }

    by_day
}

/// Per-day calorie totals over the inclusive range `[today - days + 1, today]`,
/// oldest first.
///
/// The series always has exactly `days` entries; days without meals carry
/// zero. Charting depends on the series being gap-free.
pub fn daily_series(meals: &[&Meal], days: i64, today: NaiveDate) -> Vec<DailyCalories> {
    if days <= 0 {
        return Vec::new();
    }

    let by_day = group_by_day(meals);

    let mut series = Vec::with_capacity(days as usize);
    for offset in (0..days).rev() {
        let date = today - Duration::days(offset);
        let calories = by_day
            .get(&date)
            .map(|day_meals| {
                day_meals
                    .iter()
                    .map(|m| MacroTotals::from_meal(m))
                    .sum::<MacroTotals>()
                    .calories
            })
            .unwrap_or(0.0);
        series.push(DailyCalories { date, calories });
    }

    series
}

/// Sum calories and macros across meals. NaN field values count as zero.
pub fn totals(meals: &[&Meal]) -> MacroTotals {
    meals.iter().map(|m| MacroTotals::from_meal(m)).sum()
}

/// Total calories divided by the number of distinct days that have meals,
/// not the requested range length. Zero when no dated meals exist.
pub fn average_daily_calories(meals: &[&Meal]) -> f64 {
    let day_count = group_by_day(meals).len();
    if day_count == 0 {
        return 0.0;
    }
    totals(meals).calories / day_count as f64
}

/// Meal counts per type, sorted descending by count. Ties keep the order the
/// types were first encountered in, so the output is deterministic.
pub fn meal_type_distribution(meals: &[&Meal]) -> Vec<TypeCount> {
    let mut counts: Vec<TypeCount> = Vec::new();

    for meal in meals {
        let label = meal.type_label();
        match counts
            .iter_mut()
            .find(|c| c.meal_type.eq_ignore_ascii_case(label))
        {
            Some(entry) => entry.count += 1,
            None => counts.push(TypeCount {
                meal_type: label.to_string(),
                count: 1,
            }),
        }
    }

    // sort_by is stable: equal counts stay in first-encountered order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Percentage of one macro against the protein+carbs+fat sum, truncated
/// toward zero. Zero when the sum is zero or not finite.
pub fn macro_percentage(value: f64, protein: f64, carbs: f64, fat: f64) -> u32 {
    let total = protein + carbs + fat;
    if total <= 0.0 || !total.is_finite() {
        return 0;
    }
    (value / total * 100.0) as u32
}

/// Compute all derived statistics for a range query in one pass.
///
/// This is the single boundary contract with the presentation layer: filter
/// by range and type, then reduce to totals, the gap-free daily series, the
/// type distribution, macro percentages, and insight text.
pub fn aggregate(
    meals: &[Meal],
    range_days: i64,
    meal_type: Option<&str>,
    today: NaiveDate,
) -> StatsResult {
    let filtered = filter_by_range(meals, range_days, meal_type, today);

    let totals = totals(&filtered);
    let day_count = group_by_day(&filtered).len();
    let average = average_daily_calories(&filtered);
    let distribution = meal_type_distribution(&filtered);
    let series = daily_series(&filtered, range_days, today);

    let macro_split = MacroSplit {
        protein_pct: macro_percentage(totals.protein, totals.protein, totals.carbs, totals.fat),
        carbs_pct: macro_percentage(totals.carbs, totals.protein, totals.carbs, totals.fat),
        fat_pct: macro_percentage(totals.fat, totals.protein, totals.carbs, totals.fat),
    };

    let insights = insights::generate(&distribution, filtered.len(), average, day_count);

    StatsResult {
        range_days,
        meal_type_filter: meal_type.map(|t| t.to_string()),
        meal_count: filtered.len(),
        totals,
        average_daily_calories: average,
        daily_series: series,
        meal_type_distribution: distribution,
        macro_split,
        insights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn meal(name: &str, calories: f64, date: Option<&str>, meal_type: Option<&str>) -> Meal {
        Meal {
            id: 0,
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
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn meal_with_macros(calories: f64, protein: f64, carbs: f64, fat: f64) -> Meal {
        let mut m = meal("macros", calories, Some("2025-06-01"), None);
        m.protein = protein;
        m.carbs = carbs;
        m.fat = fat;
        m
    }

    #[test]
    fn test_filter_by_range_keeps_recent_meal() {
        let today = day(2025, 6, 7);
        let meals = vec![meal("dinner", 2000.0, Some("2025-06-07"), None)];

        let filtered = filter_by_range(&meals, 7, None, today);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_filter_by_range_type_mismatch_returns_empty() {
        let today = day(2025, 6, 7);
        let meals = vec![meal("salad", 2000.0, Some("2025-06-07"), Some("Lunch"))];

        let filtered = filter_by_range(&meals, 7, Some("Dinner"), today);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_by_range_drops_old_meals() {
        let today = day(2025, 6, 30);
        let meals = vec![
            meal("old", 500.0, Some("2025-06-01"), None),
            meal("recent", 600.0, Some("2025-06-28"), None),
        ];

        let filtered = filter_by_range(&meals, 7, None, today);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "recent");
    }

    #[test]
    fn test_filter_by_range_type_match_is_case_insensitive() {
        let today = day(2025, 6, 7);
        let meals = vec![meal("stew", 700.0, Some("2025-06-06"), Some("dinner"))];

        let filtered = filter_by_range(&meals, 7, Some("Dinner"), today);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_filter_by_range_keeps_undated_meals() {
        let today = day(2025, 6, 7);
        let meals = vec![meal("undated", 250.0, None, None)];

        let filtered = filter_by_range(&meals, 7, None, today);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_group_by_day_buckets_and_skips_undated() {
        let meals = vec![
            meal("a", 100.0, Some("2025-06-01"), None),
            meal("b", 200.0, Some("2025-06-01"), None),
            meal("c", 300.0, Some("2025-06-02"), None),
            meal("d", 400.0, None, None),
        ];
        let refs: Vec<&Meal> = meals.iter().collect();

        let by_day = group_by_day(&refs);
        assert_eq!(by_day.len(), 2);
        assert_eq!(by_day[&day(2025, 6, 1)].len(), 2);
        assert_eq!(by_day[&day(2025, 6, 2)].len(), 1);
    }

    #[test]
    fn test_daily_series_is_gap_free_and_ordered() {
        let today = day(2025, 6, 7);
        let meals = vec![
            meal("a", 500.0, Some("2025-06-03"), None),
            meal("b", 700.0, Some("2025-06-07"), None),
        ];
        let refs: Vec<&Meal> = meals.iter().collect();

        let series = daily_series(&refs, 7, today);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, day(2025, 6, 1));
        assert_eq!(series[6].date, day(2025, 6, 7));

        // populated days
        assert_eq!(series[2].calories, 500.0);
        assert_eq!(series[6].calories, 700.0);

        // zero-filled gaps
        assert_eq!(series[0].calories, 0.0);
        assert_eq!(series[3].calories, 0.0);
    }

    #[test]
    fn test_daily_series_sums_same_day_meals() {
        let today = day(2025, 6, 2);
        let meals = vec![
            meal("a", 100.0, Some("2025-06-02"), None),
            meal("b", 250.0, Some("2025-06-02"), None),
        ];
        let refs: Vec<&Meal> = meals.iter().collect();

        let series = daily_series(&refs, 1, today);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].calories, 350.0);
    }

    #[test]
    fn test_daily_series_sparse_data_still_exact_length() {
        let today = day(2025, 6, 30);
        let meals = vec![meal("only", 800.0, Some("2025-06-25"), None)];
        let refs: Vec<&Meal> = meals.iter().collect();

        let series = daily_series(&refs, 30, today);
        assert_eq!(series.len(), 30);
        assert_eq!(series.iter().filter(|p| p.calories > 0.0).count(), 1);
    }

    #[test]
    fn test_totals_excludes_nan() {
        let meals = vec![
            meal("a", 100.0, Some("2025-06-01"), None),
            meal("b", 200.0, Some("2025-06-01"), None),
            meal("c", f64::NAN, Some("2025-06-01"), None),
        ];
        let refs: Vec<&Meal> = meals.iter().collect();

        let totals = totals(&refs);
        assert_eq!(totals.calories, 300.0);
        assert!(!totals.calories.is_nan());
    }

    #[test]
    fn test_totals_never_negative_for_valid_input() {
        let meals = vec![meal_with_macros(420.0, 30.0, 40.0, 12.0)];
        let refs: Vec<&Meal> = meals.iter().collect();

        let totals = totals(&refs);
        assert!(totals.calories >= 0.0);
        assert!(totals.protein >= 0.0);
        assert!(totals.carbs >= 0.0);
        assert!(totals.fat >= 0.0);
    }

    #[test]
    fn test_average_daily_calories_uses_distinct_days() {
        // 1500 calories spread over exactly 3 distinct days -> 500
        let meals = vec![
            meal("a", 500.0, Some("2025-06-01"), None),
            meal("b", 250.0, Some("2025-06-02"), None),
            meal("c", 250.0, Some("2025-06-02"), None),
            meal("d", 500.0, Some("2025-06-03"), None),
        ];
        let refs: Vec<&Meal> = meals.iter().collect();

        assert_eq!(average_daily_calories(&refs), 500.0);
    }

    #[test]
    fn test_average_daily_calories_empty_is_zero() {
        let refs: Vec<&Meal> = Vec::new();
        assert_eq!(average_daily_calories(&refs), 0.0);
    }

    #[test]
    fn test_meal_type_distribution_sorted_descending() {
        let meals = vec![
            meal("a", 0.0, None, Some("Breakfast")),
            meal("b", 0.0, None, Some("Dinner")),
            meal("c", 0.0, None, Some("Dinner")),
            meal("d", 0.0, None, Some("Snack")),
            meal("e", 0.0, None, Some("Dinner")),
        ];
        let refs: Vec<&Meal> = meals.iter().collect();

        let distribution = meal_type_distribution(&refs);
        assert_eq!(distribution[0].meal_type, "Dinner");
        assert_eq!(distribution[0].count, 3);

        let total: usize = distribution.iter().map(|c| c.count).sum();
        assert_eq!(total, refs.len());
    }

    #[test]
    fn test_meal_type_distribution_ties_keep_first_encountered_order() {
        let meals = vec![
            meal("a", 0.0, None, Some("Snack")),
            meal("b", 0.0, None, Some("Breakfast")),
            meal("c", 0.0, None, Some("Breakfast")),
            meal("d", 0.0, None, Some("Snack")),
        ];
        let refs: Vec<&Meal> = meals.iter().collect();

        let distribution = meal_type_distribution(&refs);
        assert_eq!(distribution[0].meal_type, "Snack");
        assert_eq!(distribution[1].meal_type, "Breakfast");
    }

    #[test]
    fn test_meal_type_distribution_untyped_counts_as_other() {
        let meals = vec![
            meal("a", 0.0, None, None),
            meal("b", 0.0, None, Some("Lunch")),
        ];
        let refs: Vec<&Meal> = meals.iter().collect();

        let distribution = meal_type_distribution(&refs);
        assert!(distribution.iter().any(|c| c.meal_type == "Other" && c.count == 1));
    }

    #[test]
    fn test_meal_type_distribution_empty() {
        let refs: Vec<&Meal> = Vec::new();
        assert!(meal_type_distribution(&refs).is_empty());
    }

    #[test]
    fn test_macro_percentage_truncates_toward_zero() {
        // 50 / 150 * 100 = 33.33... -> 33
        assert_eq!(macro_percentage(50.0, 50.0, 50.0, 50.0), 33);
    }

    #[test]
    fn test_macro_percentage_zero_total() {
        assert_eq!(macro_percentage(10.0, 0.0, 0.0, 0.0), 0);
        assert_eq!(macro_percentage(0.0, 0.0, 0.0, 0.0), 0);
    }

    #[test]
    fn test_macro_percentages_sum_to_about_100() {
        let (p, c, f) = (33.0, 41.0, 19.0);
        let sum = macro_percentage(p, p, c, f)
            + macro_percentage(c, p, c, f)
            + macro_percentage(f, p, c, f);
        assert!((99..=100).contains(&sum), "sum was {}", sum);
    }

    #[test]
    fn test_aggregate_bundles_everything() {
        let today = day(2025, 6, 7);
        let meals = vec![
            meal_with_macros(400.0, 30.0, 40.0, 10.0),
            meal("late snack", 150.0, Some("2025-06-07"), Some("Snack")),
        ];

        let result = aggregate(&meals, 7, None, today);
        assert_eq!(result.meal_count, 2);
        assert_eq!(result.daily_series.len(), 7);
        assert_eq!(result.totals.calories, 550.0);
        assert_eq!(result.range_days, 7);
        assert!(result.meal_type_filter.is_none());
    }

    #[test]
    fn test_aggregate_empty_input_degrades_to_zeroes() {
        let today = day(2025, 6, 7);
        let result = aggregate(&[], 7, None, today);

        assert_eq!(result.meal_count, 0);
        assert_eq!(result.totals, MacroTotals::zero());
        assert_eq!(result.average_daily_calories, 0.0);
        assert_eq!(result.daily_series.len(), 7);
        assert!(result.daily_series.iter().all(|p| p.calories == 0.0));
        assert!(result.meal_type_distribution.is_empty());
        assert_eq!(result.macro_split.protein_pct, 0);
    }

    #[test]
    fn test_aggregate_respects_type_filter() {
        let today = day(2025, 6, 7);
        let meals = vec![
            meal("eggs", 300.0, Some("2025-06-07"), Some("Breakfast")),
            meal("steak", 700.0, Some("2025-06-07"), Some("Dinner")),
        ];

        let result = aggregate(&meals, 7, Some("Dinner"), today);
        assert_eq!(result.meal_count, 1);
        assert_eq!(result.totals.calories, 700.0);
        assert_eq!(result.meal_type_filter.as_deref(), Some("Dinner"));
    }
}
