use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::constants::ARCADE_API_KEY_HEADER;
use crate::db;
use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

/// The registered, non-deleted account behind a verified end-user token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Verified administrator identity; admins have no row in `users`.
#[derive(Debug, Clone)]
pub struct AdminClaims {
    pub uid: String,
    pub email: Option<String>,
}

/// Proof that the request carried the shared arcade-terminal credential.
#[derive(Debug, Clone, Copy)]
pub struct ArcadeKey;

fn bearer_token(parts: &Parts) -> Result<String, ApiError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("invalid Authorization header".into()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::to_owned)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state.user_identity.verify(&token).await.map_err(|err| {
            tracing::debug!(error = ?err, "user token rejected");
            ApiError::Unauthorized("invalid identity token".into())
        })?;

        let user = db::users::get_user_by_firebase_uid(&state.pool, &claims.sub)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        Ok(CurrentUser(user))
    }
}

impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state.admin_identity.verify(&token).await.map_err(|err| {
            tracing::debug!(error = ?err, "admin token rejected");
            ApiError::Unauthorized("invalid admin identity token".into())
        })?;

        Ok(AdminClaims {
            uid: claims.sub,
            email: claims.email,
        })
    }
}

impl FromRequestParts<AppState> for ArcadeKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ARCADE_API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing arcade API key".into()))?;

        if provided != state.config.arcade_api_key {
            return Err(ApiError::Unauthorized("invalid arcade API key".into()));
        }

        Ok(ArcadeKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_is_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let parts = parts_with_auth(None);
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn non_bearer_schemes_are_rejected() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwdw=="));
        assert!(bearer_token(&parts).is_err());
    }
}
