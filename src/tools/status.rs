//! MealTrack status tool
//!
//! Provides runtime status information about the MealTrack service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Meal logging instructions for AI assistants
pub const MEAL_INSTRUCTIONS: &str = r#"
# MealTrack Logging Instructions

MealTrack logs meals directly with their nutritional values. There is no
ingredient database: each meal carries its own calories and macros.

## Logging a meal

1. (Optional) `list_categories` to find a category id for tagging.
2. `log_meal` with:
   - name: what was eaten (e.g., "Chicken salad")
   - calories, protein, carbs, fat: non-negative numbers; grams for macros
   - date: YYYY-MM-DD (any time portion is dropped; the meal is grouped by
     calendar day). Omit for an undated entry.
   - meal_type: breakfast, lunch, dinner, snack, or your own label
   - category_id, notes: optional

## Reviewing

- `list_meals` filters by date range, meal type, or category.
- `get_nutrition_stats` computes totals, a gap-free per-day calorie series,
  the meal type distribution, macro percentages, and insight text for the
  last N days. Pass meal_type to restrict to one of the known types.

## Editing

- `update_meal` changes any field; nutritional values are re-validated.
- `delete_meal` removes an entry permanently.
- Deleting a category keeps its meals and clears their category reference.

Dates use ISO format: YYYY-MM-DD.
"#;

/// Runtime status of the MealTrack service
#[derive(Debug, Clone, Serialize)]
pub struct MealtrackStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> MealtrackStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        MealtrackStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
