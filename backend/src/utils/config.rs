use crate::constants::DEFAULT_SERVER_PORT;
use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Identity project trusted for end-user tokens.
    pub firebase_user_project_id: String,
    /// Identity project trusted for administrator tokens.
    pub firebase_admin_project_id: String,
    /// Shared credential presented by arcade terminals.
    pub arcade_api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_SERVER_PORT),
            firebase_user_project_id: env::var("FIREBASE_USER_PROJECT_ID")
                .map_err(|_| anyhow::anyhow!("FIREBASE_USER_PROJECT_ID must be set"))?,
            firebase_admin_project_id: env::var("FIREBASE_ADMIN_PROJECT_ID")
                .map_err(|_| anyhow::anyhow!("FIREBASE_ADMIN_PROJECT_ID must be set"))?,
            arcade_api_key: env::var("ARCADE_API_KEY")
                .map_err(|_| anyhow::anyhow!("ARCADE_API_KEY must be set"))?,
        })
    }
}
