//! Category model
//!
//! A user-defined tag applied to meals. Meals reference a category through a
//! weak foreign key; deleting a category detaches its meals.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Default symbolic icon for new categories
const DEFAULT_ICON: &str = "fork.knife";

/// A meal category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub icon_name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub icon_name: Option<String>,
}

/// Data for updating a category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub icon_name: Option<String>,
}

impl Category {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            icon_name: row.get("icon_name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new category into the database
    pub fn create(conn: &Connection, data: &CategoryCreate) -> DbResult<Self> {
        let icon_name = data.icon_name.as_deref().unwrap_or(DEFAULT_ICON);

        conn.execute(
            "INSERT INTO categories (name, icon_name) VALUES (?1, ?2)",
            params![data.name, icon_name],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a category by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM categories WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all categories ordered by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM categories ORDER BY name, id")?;

        let categories = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Count meals referencing a category
    pub fn meal_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meals WHERE category_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Update a category
    pub fn update(conn: &Connection, id: i64, data: &CategoryUpdate) -> DbResult<Option<Self>> {
        let existing = Self::get_by_id(conn, id)?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(ref icon_name) = data.icon_name {
            updates.push(format!("icon_name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(icon_name.clone()));
        }

        if updates.is_empty() {
            return Ok(existing);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE categories SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a category. Referencing meals are detached by the schema's
    /// ON DELETE SET NULL, not removed.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
