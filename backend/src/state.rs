use sqlx::PgPool;
use std::sync::Arc;

use crate::services::identity::IdentityProvider;
use crate::utils::Config;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Verifier trusting the end-user identity project.
    pub user_identity: Arc<IdentityProvider>,
    /// Verifier trusting the administrator identity project.
    pub admin_identity: Arc<IdentityProvider>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let user_identity = Arc::new(IdentityProvider::new(
            config.firebase_user_project_id.clone(),
        ));
        let admin_identity = Arc::new(IdentityProvider::new(
            config.firebase_admin_project_id.clone(),
        ));

        Self {
            pool,
            config: Arc::new(config),
            user_identity,
            admin_identity,
        }
    }
}
