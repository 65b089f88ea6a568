use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use diet_types::api::{
    CreateUserRequest, CreateUserResponse, UpdateUserRequest, UserListResponse,
    UserLookupResponse,
};

use crate::convert::user_from_row;
use crate::error::ApiError;
use crate::{AppState, with_db};

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    Ok(())
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    validate_name(&req.name)?;

    let id = Uuid::new_v4();
    let uid = id.to_string();
    let name = req.name.clone();
    with_db(&state, move |db| db.create_user(&uid, &name)).await?;

    debug!("Created user {}", id);
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse { id, name: req.name }),
    ))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = with_db(&state, |db| db.list_users()).await?;
    let users = rows.into_iter().map(user_from_row).collect();
    Ok(Json(UserListResponse { users }))
}

/// GET /users/{id} — a missing user still answers 200, with a message body.
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;

    let uid = id.to_string();
    let row = with_db(&state, move |db| db.get_user(&uid)).await?;

    let body = match row {
        Some(row) => UserLookupResponse::Found {
            user: user_from_row(row),
        },
        None => UserLookupResponse::Missing {
            message: "User not found".into(),
        },
    };
    Ok(Json(body))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    validate_name(&req.name)?;

    let uid = id.to_string();
    let updated = with_db(&state, move |db| db.update_user_name(&uid, &req.name)).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found"));
    }

    debug!("Renamed user {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/{id} — the user's meals go with it.
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;

    let uid = id.to_string();
    let deleted = with_db(&state, move |db| db.delete_user(&uid)).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found"));
    }

    debug!("Deleted user {}", id);
    Ok(StatusCode::NO_CONTENT)
}
