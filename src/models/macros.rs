//! Shared macronutrient totals structure
//!
//! Used for per-meal values, per-day sums, and range-wide aggregates.

use serde::{Deserialize, Serialize};

use super::Meal;

/// Summed nutritional values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,      // grams
    pub carbs: f64,        // grams
    pub fat: f64,          // grams
}

impl MacroTotals {
    /// Create a new MacroTotals with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Read a meal's values, coercing NaN fields to zero so one corrupt
    /// record cannot poison an aggregate
    pub fn from_meal(meal: &Meal) -> Self {
        Self {
            calories: nan_to_zero(meal.calories),
            protein: nan_to_zero(meal.protein),
            carbs: nan_to_zero(meal.carbs),
            fat: nan_to_zero(meal.fat),
        }
    }

    /// Add another set of totals to this one
    pub fn add(&self, other: &MacroTotals) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
        }
    }
}

fn nan_to_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

impl std::ops::Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, other: MacroTotals) -> MacroTotals {
        MacroTotals::add(&self, &other)
    }
}

impl std::iter::Sum for MacroTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroTotals::zero(), |acc, t| acc + t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal_with(calories: f64, protein: f64, carbs: f64, fat: f64) -> Meal {
        Meal {
            id: 0,
            name: "test".to_string(),
            calories,
            protein,
            carbs,
            fat,
            date: None,
            meal_type: None,
            notes: None,
            image: None,
            category_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_from_meal_coerces_nan_to_zero() {
        let totals = MacroTotals::from_meal(&meal_with(f64::NAN, 10.0, f64::NAN, 5.0));
        assert_eq!(totals.calories, 0.0);
        assert_eq!(totals.protein, 10.0);
        assert_eq!(totals.carbs, 0.0);
        assert_eq!(totals.fat, 5.0);
    }

    #[test]
    fn test_sum_over_meals() {
        let meals = vec![
            meal_with(100.0, 10.0, 20.0, 5.0),
            meal_with(200.0, 5.0, 10.0, 2.0),
        ];
        let totals: MacroTotals = meals.iter().map(MacroTotals::from_meal).sum();
        assert_eq!(totals.calories, 300.0);
        assert_eq!(totals.protein, 15.0);
        assert_eq!(totals.carbs, 30.0);
        assert_eq!(totals.fat, 7.0);
    }

    #[test]
    fn test_sum_never_nan() {
        let meals = vec![
            meal_with(100.0, 0.0, 0.0, 0.0),
            meal_with(200.0, 0.0, 0.0, 0.0),
            meal_with(f64::NAN, f64::NAN, f64::NAN, f64::NAN),
        ];
        let totals: MacroTotals = meals.iter().map(MacroTotals::from_meal).sum();
        assert_eq!(totals.calories, 300.0);
        assert!(!totals.protein.is_nan());
    }
}
