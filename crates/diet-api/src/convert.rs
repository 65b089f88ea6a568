//! Row to API model conversion. Corrupt stored values are logged and replaced
//! with defaults rather than failing the whole response.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use diet_db::models::{MealRow, UserRow};
use diet_types::models::{Meal, User};

pub fn user_from_row(row: UserRow) -> User {
    User {
        id: parse_id(&row.id, "user id"),
        created_at: parse_timestamp(&row.created_at),
        updated_at: row.updated_at.as_deref().map(parse_timestamp),
        name: row.name,
    }
}

pub fn meal_from_row(row: MealRow) -> Meal {
    Meal {
        id: parse_id(&row.id, "meal id"),
        user_id: parse_id(&row.user_id, "meal user_id"),
        created_at: parse_timestamp(&row.created_at),
        updated_at: row.updated_at.as_deref().map(parse_timestamp),
        title: row.title,
        description: row.description,
        is_on_the_diet: row.is_on_the_diet,
    }
}

fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, raw, e);
        Uuid::default()
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
        warn!("Corrupt timestamp '{}': {}", raw, e);
        DateTime::default()
    })
}
