use axum::{Extension, Json, extract::State};

use diet_types::api::MealMetrics;

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::{AppState, with_db};

/// Aggregates diet flags given in creation order.
///
/// `best_streak` is the longest run of consecutive on-diet meals; any
/// off-diet meal ends the current run.
pub fn calculate<I>(flags: I) -> MealMetrics
where
    I: IntoIterator<Item = bool>,
{
    let mut metrics = MealMetrics::default();
    let mut current_streak = 0;

    for on_diet in flags {
        metrics.total_meals += 1;
        if on_diet {
            metrics.meals_on_diet += 1;
            current_streak += 1;
            metrics.best_streak = metrics.best_streak.max(current_streak);
        } else {
            current_streak = 0;
        }
    }

    metrics.meals_off_diet = metrics.total_meals - metrics.meals_on_diet;
    metrics
}

/// GET /meals/metrics
pub async fn get_metrics(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MealMetrics>, ApiError> {
    let uid = identity.user_id.to_string();
    let flags = with_db(&state, move |db| db.meal_diet_flags(&uid)).await?;
    Ok(Json(calculate(flags)))
}
