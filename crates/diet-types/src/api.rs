use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Meal, User};

// -- Users --

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

/// `GET /users/{id}` answers 200 either way; a missing user yields `Missing`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserLookupResponse {
    Found { user: User },
    Missing { message: String },
}

// -- Meals --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub is_on_the_diet: bool,
}

/// Fields left out keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MealListResponse {
    pub meals: Vec<Meal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MealResponse {
    pub meal: Meal,
}

// -- Metrics --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealMetrics {
    pub total_meals: u64,
    pub meals_on_diet: u64,
    pub meals_off_diet: u64,
    pub best_streak: u64,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
