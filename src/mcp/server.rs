//! MealTrack MCP Server Implementation
//!
//! Implements the MCP server with all MealTrack tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{CategoryCreate, CategoryUpdate, MealCreate, MealUpdate};
use crate::tools::categories;
use crate::tools::meals;
use crate::tools::stats;
use crate::tools::status::StatusTracker;

/// MealTrack MCP Service
#[derive(Clone)]
pub struct MealtrackService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<MealtrackService>,
}

impl MealtrackService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    /// Name of the meal (e.g., "Chicken salad")
    pub name: String,
    /// Calories consumed
    pub calories: f64,
    /// Protein in grams
    #[serde(default)]
    pub protein: f64,
    /// Carbohydrates in grams
    #[serde(default)]
    pub carbs: f64,
    /// Fat in grams
    #[serde(default)]
    pub fat: f64,
    /// Date (YYYY-MM-DD; a time portion is accepted and truncated to the day)
    pub date: Option<String>,
    /// Meal type: breakfast, lunch, dinner, snack, or a custom label
    pub meal_type: Option<String>,
    /// Category ID to tag the meal with
    pub category_id: Option<i64>,
    /// Optional notes
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetMealParams {
    /// Meal ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealsParams {
    /// Inclusive start date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// Filter by meal type
    pub meal_type: Option<String>,
    /// Filter by category ID
    pub category_id: Option<i64>,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealParams {
    /// Meal ID
    pub id: i64,
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    /// New date (YYYY-MM-DD)
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteMealParams {
    /// Meal ID to delete
    pub id: i64,
}

// ============================================================================
// Category Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddCategoryParams {
    /// Name of the category (e.g., "Home cooked")
    pub name: String,
    /// Symbolic icon identifier (defaults to "fork.knife")
    pub icon_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateCategoryParams {
    /// Category ID
    pub id: i64,
    pub name: Option<String>,
    pub icon_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteCategoryParams {
    /// Category ID (meals keep their data; their category reference is cleared)
    pub id: i64,
}

// ============================================================================
// Stats Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetNutritionStatsParams {
    /// Number of days to analyze, ending today (must be > 0)
    #[serde(default = "default_stats_days")]
    pub days: i64,
    /// Restrict to one meal type: breakfast, lunch, dinner, or snack
    pub meal_type: Option<String>,
}

fn default_stats_days() -> i64 { 7 }

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MealtrackService {
    // --- Status ---

    #[tool(description = "Get the current status of the MealTrack service including build info, database status, and process information")]
    async fn mealtrack_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for logging meals. Call this when starting a new food logging session or when unsure how to use the meal tracking tools.")]
    fn meal_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::MEAL_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(MEAL_INSTRUCTIONS)]))
    }

    // --- Meals ---

    #[tool(description = "Log a meal with its nutritional values. Date accepts YYYY-MM-DD and is truncated to the day for grouping.")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let data = MealCreate {
            name: p.name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            date: p.date,
            meal_type: p.meal_type,
            notes: p.notes,
            image: None,
            category_id: p.category_id,
        };
        let result = meals::log_meal(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get full details for a meal including its resolved category")]
    fn get_meal(&self, Parameters(p): Parameters<GetMealParams>) -> Result<CallToolResult, McpError> {
        let result = meals::get_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(meal) => serde_json::to_string_pretty(&meal),
            None => Ok(format!(r#"{{"error": "Meal not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List meals with optional date range, meal type, and category filters, newest first, with pagination")]
    fn list_meals(&self, Parameters(p): Parameters<ListMealsParams>) -> Result<CallToolResult, McpError> {
        let result = meals::list_meals(
            &self.database,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            p.meal_type.as_deref(),
            p.category_id,
            p.limit,
            p.offset,
        ).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a meal's name, nutritional values, date, type, notes, or category")]
    fn update_meal(&self, Parameters(p): Parameters<UpdateMealParams>) -> Result<CallToolResult, McpError> {
        let data = MealUpdate {
            name: p.name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            date: p.date,
            meal_type: p.meal_type,
            notes: p.notes,
            category_id: p.category_id,
        };
        let result = meals::update_meal(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(meal) => serde_json::to_string_pretty(&meal),
            None => Ok(format!(r#"{{"error": "Meal not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a meal")]
    fn delete_meal(&self, Parameters(p): Parameters<DeleteMealParams>) -> Result<CallToolResult, McpError> {
        let deleted = meals::delete_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::json!({"success": deleted, "id": p.id}).to_string();
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Categories ---

    #[tool(description = "Create a new meal category")]
    fn add_category(&self, Parameters(p): Parameters<AddCategoryParams>) -> Result<CallToolResult, McpError> {
        let data = CategoryCreate {
            name: p.name,
            icon_name: p.icon_name,
        };
        let result = categories::add_category(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List all categories with the number of meals tagged by each")]
    fn list_categories(&self) -> Result<CallToolResult, McpError> {
        let result = categories::list_categories(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a category's name or icon")]
    fn update_category(&self, Parameters(p): Parameters<UpdateCategoryParams>) -> Result<CallToolResult, McpError> {
        let data = CategoryUpdate {
            name: p.name,
            icon_name: p.icon_name,
        };
        let result = categories::update_category(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(category) => serde_json::to_string_pretty(&category),
            None => Ok(format!(r#"{{"error": "Category not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a category. Meals tagged with it are kept and their category reference is cleared.")]
    fn delete_category(&self, Parameters(p): Parameters<DeleteCategoryParams>) -> Result<CallToolResult, McpError> {
        let result = categories::delete_category(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Stats ---

    #[tool(description = "Compute nutrition statistics for the last N days: totals, average daily calories, a gap-free per-day calorie series, meal type distribution, macro percentages, and insight text. Optionally restricted to one meal type.")]
    fn get_nutrition_stats(&self, Parameters(p): Parameters<GetNutritionStatsParams>) -> Result<CallToolResult, McpError> {
        let result = stats::get_nutrition_stats(&self.database, p.days, p.meal_type.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MealtrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mealtrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("MealTrack".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MealTrack - Meal logging and nutrition statistics. \
                 IMPORTANT: Call meal_instructions before a food logging session. \
                 Meals: log_meal/get_meal/list_meals/update_meal/delete_meal. \
                 Categories: add/list/update/delete_category (deleting a category detaches its meals). \
                 Stats: get_nutrition_stats for totals, per-day series, distribution, and insights over the last N days."
                    .into(),
            ),
        }
    }
}
