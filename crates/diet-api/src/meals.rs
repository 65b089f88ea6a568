use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use diet_db::models::NewMeal;
use diet_types::api::{CreateMealRequest, MealListResponse, MealResponse, UpdateMealRequest};

use crate::convert::meal_from_row;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::{AppState, with_db};

// Missing and foreign meals share this answer.
const MEAL_NOT_FOUND: &str = "Meal not found";

/// POST /meals — answers with the stored meal so the caller learns its id.
pub async fn create_meal(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateMealRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let id = Uuid::new_v4();
    let mid = id.to_string();
    let uid = identity.user_id.to_string();
    let row = with_db(&state, move |db| {
        db.create_meal(&NewMeal {
            id: &mid,
            user_id: &uid,
            title: &req.title,
            description: &req.description,
            is_on_the_diet: req.is_on_the_diet,
        })
    })
    .await?;

    debug!("User {} created meal {}", identity.user_id, id);
    Ok((StatusCode::CREATED, Json(meal_from_row(row))))
}

/// GET /meals
pub async fn list_meals(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = identity.user_id.to_string();
    let rows = with_db(&state, move |db| db.list_meals(&uid)).await?;
    let meals = rows.into_iter().map(meal_from_row).collect();
    Ok(Json(MealListResponse { meals }))
}

/// GET /meals/{id}
pub async fn get_meal(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;

    let uid = identity.user_id.to_string();
    let mid = id.to_string();
    let row = with_db(&state, move |db| db.get_meal(&uid, &mid))
        .await?
        .ok_or(ApiError::NotFound(MEAL_NOT_FOUND))?;

    Ok(Json(MealResponse {
        meal: meal_from_row(row),
    }))
}

/// PUT /meals/{id}
pub async fn update_meal(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateMealRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;

    let uid = identity.user_id.to_string();
    let mid = id.to_string();
    let updated = with_db(&state, move |db| {
        db.update_meal(&uid, &mid, req.title.as_deref(), req.description.as_deref())
    })
    .await?;
    if !updated {
        return Err(ApiError::NotFound(MEAL_NOT_FOUND));
    }

    debug!("User {} updated meal {}", identity.user_id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /meals/{id}/is-on-the-diet
pub async fn toggle_diet(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;

    let uid = identity.user_id.to_string();
    let mid = id.to_string();
    let toggled = with_db(&state, move |db| db.toggle_meal_diet(&uid, &mid)).await?;
    if !toggled {
        return Err(ApiError::NotFound(MEAL_NOT_FOUND));
    }

    debug!("User {} toggled diet flag of meal {}", identity.user_id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /meals/{id}
pub async fn delete_meal(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;

    let uid = identity.user_id.to_string();
    let mid = id.to_string();
    let deleted = with_db(&state, move |db| db.delete_meal(&uid, &mid)).await?;
    if !deleted {
        return Err(ApiError::NotFound(MEAL_NOT_FOUND));
    }

    debug!("User {} deleted meal {}", identity.user_id, id);
    Ok(StatusCode::NO_CONTENT)
}
