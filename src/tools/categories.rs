//! Category tools
//!
//! Managing the user-defined tags applied to meals.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Category, CategoryCreate, CategoryUpdate};

/// Category with usage count
#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    pub id: i64,
    pub name: String,
    pub icon_name: String,
    pub meal_count: i64,
    pub created_at: String,
}

/// Response for list_categories
#[derive(Debug, Serialize)]
pub struct ListCategoriesResponse {
    pub categories: Vec<CategoryDetail>,
    pub total: usize,
}

/// Response for delete_category
#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    pub success: bool,
    pub id: i64,
    /// Meals that referenced this category and were detached
    pub meals_detached: i64,
}

fn detail_for(conn: &rusqlite::Connection, category: Category) -> Result<CategoryDetail, String> {
    let meal_count = Category::meal_count(conn, category.id)
        .map_err(|e| format!("Failed to count meals: {}", e))?;

    Ok(CategoryDetail {
        id: category.id,
        name: category.name,
        icon_name: category.icon_name,
        meal_count,
        created_at: category.created_at,
    })
}

/// Create a new category
pub fn add_category(db: &Database, data: CategoryCreate) -> Result<CategoryDetail, String> {
    if data.name.trim().is_empty() {
        return Err("Category name must not be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let category = Category::create(&conn, &data)
        .map_err(|e| format!("Failed to create category: {}", e))?;

    detail_for(&conn, category)
}

/// List all categories with usage counts
pub fn list_categories(db: &Database) -> Result<ListCategoriesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let categories = Category::list(&conn)
        .map_err(|e| format!("Failed to list categories: {}", e))?;

    let mut details = Vec::with_capacity(categories.len());
    for category in categories {
        details.push(detail_for(&conn, category)?);
    }

    let total = details.len();
    Ok(ListCategoriesResponse {
        categories: details,
        total,
    })
}

/// Update a category's name or icon
pub fn update_category(db: &Database, id: i64, data: CategoryUpdate) -> Result<Option<CategoryDetail>, String> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err("Category name must not be empty".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Category::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update category: {}", e))?;

    match updated {
        Some(category) => Ok(Some(detail_for(&conn, category)?)),
        None => Ok(None),
    }
}

/// Delete a category, detaching any meals that reference it
pub fn delete_category(db: &Database, id: i64) -> Result<DeleteCategoryResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    // Count references before the delete clears them
    let meals_detached = Category::meal_count(&conn, id)
        .map_err(|e| format!("Failed to count meals: {}", e))?;

    let deleted = Category::delete(&conn, id)
        .map_err(|e| format!("Failed to delete category: {}", e))?;

    Ok(DeleteCategoryResponse {
        success: deleted,
        id,
        meals_detached: if deleted { meals_detached } else { 0 },
    })
}
