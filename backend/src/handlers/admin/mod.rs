//! Administrator routes, grouped by resource. Every handler authenticates
//! against the admin identity project and delegates to the matching admin
//! service.

pub mod arcades;
pub mod games;
pub mod promo_codes;
pub mod stats;
pub mod users;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/arcades", arcades::router())
        .nest("/games", games::router())
        .nest("/promo-codes", promo_codes::router())
        .nest("/users", users::router())
        .nest("/stats", stats::router())
}
