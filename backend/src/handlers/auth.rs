use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::extractors::CurrentUser;
use crate::handlers::users::UserResponse;
use crate::models::NewUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/me", get(me))
}

/// International phone number, digits with optional +, spaces, dots, dashes.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 .\-]{5,19}$").unwrap());

pub(crate) fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Verified end-user identity claims without the registered-account
/// requirement; registration is the one route that runs before a `users`
/// row exists.
struct VerifiedIdentity {
    uid: String,
}

impl FromRequestParts<AppState> for VerifiedIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

        let claims = state.user_identity.verify(auth).await.map_err(|err| {
            tracing::debug!(error = ?err, "registration token rejected");
            ApiError::Unauthorized("invalid identity token".into())
        })?;

        Ok(Self { uid: claims.sub })
    }
}

/// Registers the verified identity subject. A soft-deleted account for the
/// same subject is re-activated with the freshly submitted profile instead
/// of creating a second row.
async fn register(
    State(state): State<AppState>,
    identity: VerifiedIdentity,
    Json(body): Json<NewUser>,
) -> ApiResult<Json<UserResponse>> {
    if body.username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username must not be empty".into()));
    }
    if !is_valid_phone(&body.phone) {
        return Err(ApiError::BadRequest("Invalid phone number format".into()));
    }

    if let Some(existing) = db::users::get_user_by_firebase_uid_any(&state.pool, &identity.uid).await? {
        if !existing.is_deleted {
            return Err(ApiError::BadRequest("User already registered".into()));
        }

        check_unique_fields(&state, &body, Some(existing.id)).await?;
        let restored = db::users::reactivate_user(&state.pool, existing.id, &body).await?;
        tracing::info!(user_id = restored.id, "re-activated deleted account");
        return Ok(Json(restored.into()));
    }

    check_unique_fields(&state, &body, None).await?;
    let user = db::users::create_user(&state.pool, &identity.uid, &body).await?;
    tracing::info!(user_id = user.id, "registered new user");
    Ok(Json(user.into()))
}

async fn check_unique_fields(
    state: &AppState,
    body: &NewUser,
    exclude_id: Option<i32>,
) -> ApiResult<()> {
    if db::users::username_taken(&state.pool, &body.username, exclude_id).await? {
        return Err(ApiError::BadRequest(
            "This username is already taken".into(),
        ));
    }
    if db::users::phone_taken(&state.pool, &body.phone, exclude_id).await? {
        return Err(ApiError::BadRequest(
            "This phone number is already registered".into(),
        ));
    }
    if db::users::email_taken(&state.pool, &body.email, exclude_id).await? {
        return Err(ApiError::BadRequest(
            "This email is already registered".into(),
        ));
    }
    Ok(())
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_validation_accepts_common_formats() {
        assert!(is_valid_phone("+33612345678"));
        assert!(is_valid_phone("0612345678"));
        assert!(is_valid_phone("+1 415-555-0101"));
    }

    #[test]
    fn phone_validation_rejects_garbage() {
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("not-a-number"));
        assert!(!is_valid_phone("123"));
        assert!(!is_valid_phone("+"));
    }
}
