//! Data models
//!
//! Rust structs representing database entities.

mod category;
mod macros;
mod meal;

pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use macros::MacroTotals;
pub use meal::{Meal, MealCreate, MealFilter, MealType, MealUpdate, MEAL_TYPE_OTHER};
