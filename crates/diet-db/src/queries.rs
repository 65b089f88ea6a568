use crate::Database;
use crate::models::{MealRow, NewMeal, UserRow};
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "id, name, created_at, updated_at";
const MEAL_COLUMNS: &str = "id, title, description, is_on_the_diet, user_id, created_at, updated_at";

/// Fixed-width UTC timestamp, so string order matches time order.
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, name: &str) -> Result<UserRow> {
        let created_at = now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, name, created_at],
            )?;
            Ok(UserRow {
                id: id.to_string(),
                name: name.to_string(),
                created_at,
                updated_at: None,
            })
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn user_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Returns false when no user matched.
    pub fn update_user_name(&self, id: &str, name: &str) -> Result<bool> {
        let updated_at = now();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET name = ?2, updated_at = ?3 WHERE id = ?1",
                rusqlite::params![id, name, updated_at],
            )?;
            Ok(changed > 0)
        })
    }

    /// Deletes the user and, through the foreign key, all of their meals.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Meals --
    //
    // Every meal query carries the owner's id: a meal owned by someone else
    // behaves exactly like a missing one.

    pub fn create_meal(&self, meal: &NewMeal<'_>) -> Result<MealRow> {
        let created_at = now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO meals (id, title, description, is_on_the_diet, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    meal.id,
                    meal.title,
                    meal.description,
                    meal.is_on_the_diet,
                    meal.user_id,
                    created_at,
                ],
            )?;
            Ok(MealRow {
                id: meal.id.to_string(),
                title: meal.title.to_string(),
                description: meal.description.to_string(),
                is_on_the_diet: meal.is_on_the_diet,
                user_id: meal.user_id.to_string(),
                created_at,
                updated_at: None,
            })
        })
    }

    pub fn list_meals(&self, user_id: &str) -> Result<Vec<MealRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MEAL_COLUMNS} FROM meals WHERE user_id = ?1 ORDER BY created_at, rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], meal_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_meal(&self, user_id: &str, id: &str) -> Result<Option<MealRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = ?1 AND user_id = ?2");
            let row = conn
                .query_row(&sql, [id, user_id], meal_from_row)
                .optional()?;
            Ok(row)
        })
    }

    /// Merges the given fields into the stored meal in a single statement;
    /// `None` keeps the current value. Returns false when no meal matched.
    pub fn update_meal(
        &self,
        user_id: &str,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool> {
        let updated_at = now();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE meals
                 SET title = COALESCE(?3, title),
                     description = COALESCE(?4, description),
                     updated_at = ?5
                 WHERE id = ?1 AND user_id = ?2",
                rusqlite::params![id, user_id, title, description, updated_at],
            )?;
            Ok(changed > 0)
        })
    }

    /// Flips the diet flag in place. Returns false when no meal matched.
    pub fn toggle_meal_diet(&self, user_id: &str, id: &str) -> Result<bool> {
        let updated_at = now();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE meals
                 SET is_on_the_diet = NOT is_on_the_diet,
                     updated_at = ?3
                 WHERE id = ?1 AND user_id = ?2",
                rusqlite::params![id, user_id, updated_at],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_meal(&self, user_id: &str, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM meals WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Diet flags of the user's meals, oldest first.
    pub fn meal_diet_flags(&self, user_id: &str) -> Result<Vec<bool>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT is_on_the_diet FROM meals WHERE user_id = ?1 ORDER BY created_at, rowid",
            )?;
            let flags = stmt
                .query_map([user_id], |row| row.get::<_, bool>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(flags)
        })
    }
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    let row = conn.query_row(&sql, [id], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn meal_from_row(row: &Row<'_>) -> rusqlite::Result<MealRow> {
    Ok(MealRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        // Stored as INTEGER 0/1; read back as a strict bool
        is_on_the_diet: row.get(3)?,
        user_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
