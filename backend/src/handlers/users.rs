use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    USER_SEARCH_DEFAULT_LIMIT, USER_SEARCH_MAX_LIMIT, USER_SEARCH_MIN_QUERY_LEN,
};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::extractors::CurrentUser;
use crate::models::{User, UserPatch};
use crate::services::admin::users::{UserAdminService, UserDeletionReport};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(get_my_profile)
                .put(update_my_profile)
                .delete(delete_my_account),
        )
        .route("/search", get(search_users))
}

/// Full profile returned to the account owner.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub tickets_balance: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            birth_date: user.birth_date,
            phone: user.phone,
            tickets_balance: user.tickets_balance,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// What other players see of a user.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

async fn get_my_profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

async fn update_my_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(patch): Json<UserPatch>,
) -> ApiResult<Json<UserResponse>> {
    if patch.is_empty() {
        return Ok(Json(user.into()));
    }

    if let Some(username) = &patch.username
        && username != &user.username
        && db::users::username_taken(&state.pool, username, Some(user.id)).await?
    {
        return Err(ApiError::BadRequest(
            "This username is already taken".into(),
        ));
    }

    if let Some(phone) = &patch.phone
        && phone != &user.phone
        && db::users::phone_taken(&state.pool, phone, Some(user.id)).await?
    {
        return Err(ApiError::BadRequest(
            "This phone number is already registered".into(),
        ));
    }

    if let Some(email) = &patch.email
        && email != &user.email
        && db::users::email_taken(&state.pool, email, Some(user.id)).await?
    {
        return Err(ApiError::BadRequest(
            "This email is already registered".into(),
        ));
    }

    let updated = db::users::apply_patch(&state.pool, user.id, &patch).await?;
    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
    limit: Option<i64>,
}

async fn search_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let term = params.q.trim();
    if term.chars().count() < USER_SEARCH_MIN_QUERY_LEN {
        return Err(ApiError::BadRequest(format!(
            "Search term must be at least {USER_SEARCH_MIN_QUERY_LEN} characters"
        )));
    }

    let limit = params
        .limit
        .unwrap_or(USER_SEARCH_DEFAULT_LIMIT)
        .clamp(1, USER_SEARCH_MAX_LIMIT);

    let users = db::users::search_users(&state.pool, user.id, term, limit).await?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

/// GDPR-style self deletion; same preconditions and cascade as the admin
/// path.
async fn delete_my_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<UserDeletionReport>> {
    let service = UserAdminService::new(state.pool.clone());
    Ok(Json(service.soft_delete_user(user.id).await?))
}
