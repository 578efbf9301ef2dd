use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::extractors::CurrentUser;
use crate::handlers::users::UserSummary;
use crate::handlers::Message;
use crate::models::{FriendRequestDetail, FriendshipStatus};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(my_friends))
        .route("/requests", get(incoming_requests))
        .route("/request", post(send_request))
        .route("/request/{friendship_id}/accept", put(accept_request))
        .route("/request/{friendship_id}/reject", put(reject_request))
        .route("/{user_id}", delete(remove_friend))
}

async fn my_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let friends = db::friends::friends_of(&state.pool, user.id).await?;
    Ok(Json(friends.iter().map(UserSummary::from).collect()))
}

#[derive(Debug, Serialize)]
struct FriendRequestResponse {
    id: i32,
    status: FriendshipStatus,
    requester: UserSummary,
    created_at: DateTime<Utc>,
}

impl From<FriendRequestDetail> for FriendRequestResponse {
    fn from(detail: FriendRequestDetail) -> Self {
        Self {
            id: detail.id,
            status: detail.status,
            requester: UserSummary {
                id: detail.requester_id,
                username: detail.requester_username,
                first_name: detail.requester_first_name,
                last_name: detail.requester_last_name,
            },
            created_at: detail.created_at,
        }
    }
}

async fn incoming_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<FriendRequestResponse>>> {
    let requests = db::friends::pending_requests_for_user(&state.pool, user.id).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
struct FriendRequestCreate {
    user_id: i32,
}

async fn send_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<FriendRequestCreate>,
) -> ApiResult<Json<Message>> {
    if body.user_id == user.id {
        return Err(ApiError::BadRequest(
            "You cannot add yourself as a friend".into(),
        ));
    }

    db::users::get_user_by_id(&state.pool, body.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    if let Some(existing) = db::friends::between(&state.pool, user.id, body.user_id).await? {
        match existing.status {
            FriendshipStatus::Accepted => {
                return Err(ApiError::BadRequest("You are already friends".into()));
            }
            FriendshipStatus::Pending => {
                return Err(ApiError::BadRequest(
                    "A friend request is already pending".into(),
                ));
            }
            FriendshipStatus::Rejected => {
                // A rejected pair may try again; retire the old row so the
                // pair never carries two live relations.
                db::friends::soft_delete(&state.pool, existing.id, Utc::now()).await?;
            }
        }
    }

    db::friends::insert_request(&state.pool, user.id, body.user_id).await?;
    Ok(Json(Message::new("Friend request sent")))
}

async fn accept_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(friendship_id): Path<i32>,
) -> ApiResult<Json<Message>> {
    let request = db::friends::pending_request_for(&state.pool, friendship_id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Friend request"))?;

    db::friends::set_status(&state.pool, request.id, FriendshipStatus::Accepted).await?;
    Ok(Json(Message::new("Friend request accepted")))
}

async fn reject_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(friendship_id): Path<i32>,
) -> ApiResult<Json<Message>> {
    let request = db::friends::pending_request_for(&state.pool, friendship_id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Friend request"))?;

    db::friends::set_status(&state.pool, request.id, FriendshipStatus::Rejected).await?;
    Ok(Json(Message::new("Friend request rejected")))
}

async fn remove_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<Message>> {
    let friendship = db::friends::accepted_between(&state.pool, user.id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Friendship"))?;

    db::friends::soft_delete(&state.pool, friendship.id, Utc::now()).await?;
    Ok(Json(Message::new("Friend removed from your list")))
}
