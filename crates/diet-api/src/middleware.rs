use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::{AppState, with_db};

/// Header carrying the caller's user id. Header names are case-insensitive,
/// so clients sending `userId` match too.
pub const USER_ID_HEADER: &str = "userid";

/// The caller, as established by [`require_user`].
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
}

/// Trusts the user id header as-is: no signature or token is checked. The id
/// must occur exactly once, be valid text and name an existing user.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = {
        let mut values = req.headers().get_all(USER_ID_HEADER).iter();
        match (values.next(), values.next()) {
            (Some(value), None) => value.to_str().map(str::to_owned).ok(),
            _ => None,
        }
    };

    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            warn!("Rejected request without a single {} header", USER_ID_HEADER);
            return Err(ApiError::Unauthorized);
        }
    };

    // An id that is not a UUID cannot name any user.
    let user_id: Uuid = raw.parse().map_err(|_| ApiError::NotFound("User not found"))?;

    let uid = user_id.to_string();
    if !with_db(&state, move |db| db.user_exists(&uid)).await? {
        warn!("Rejected request for unknown user {}", user_id);
        return Err(ApiError::NotFound("User not found"));
    }

    req.extensions_mut().insert(Identity { user_id });
    Ok(next.run(req).await)
}
