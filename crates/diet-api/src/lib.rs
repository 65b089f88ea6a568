pub mod convert;
pub mod error;
pub mod meals;
pub mod metrics;
pub mod middleware;
pub mod users;

use std::sync::Arc;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use serde_json::{Value, json};

use diet_db::Database;

use crate::error::ApiError;
use crate::middleware::require_user;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

impl AppStateInner {
    pub fn new(db: Database) -> AppState {
        Arc::new(Self { db })
    }
}

/// Builds every route of the service. Meal routes sit behind the identity check,
/// user routes and `/health` do not.
pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        );

    let meal_routes = Router::new()
        .route("/meals", post(meals::create_meal).get(meals::list_meals))
        .route("/meals/metrics", get(metrics::get_metrics))
        .route(
            "/meals/{id}",
            get(meals::get_meal)
                .put(meals::update_meal)
                .delete(meals::delete_meal),
        )
        .route("/meals/{id}/is-on-the-diet", patch(meals::toggle_diet))
        .route_layer(from_fn_with_state(state.clone(), require_user));

    Router::new()
        .route("/health", get(health))
        .merge(user_routes)
        .merge(meal_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Runs a store call on the blocking pool so SQLite never stalls the runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;
    Ok(result)
}
