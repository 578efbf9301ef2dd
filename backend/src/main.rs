use axum::http::{HeaderValue, Method};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use retronova::{handlers, utils, AppState, Config, get_db_pool};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = retronova::db::DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    retronova::db::migrations::run_migrations(&pool).await?;

    let port = config.port;
    let app = create_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors_layer = create_cors_layer();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1/auth", handlers::auth::router())
        .nest("/api/v1/users", handlers::users::router())
        .nest("/api/v1/friends", handlers::friends::router())
        .nest("/api/v1/tickets", handlers::tickets::router())
        .nest("/api/v1/games", handlers::games::router())
        .nest("/api/v1/arcades", handlers::arcades::router())
        .nest("/api/v1/reservations", handlers::reservations::router())
        .nest("/api/v1/scores", handlers::scores::router())
        .nest("/api/v1/promos", handlers::promos::router())
        .nest("/api/v1/admin", handlers::admin::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn create_cors_layer() -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    // Check if ALLOWED_ORIGINS environment variable is set for multiple domains
    if let Ok(cors_origins) = std::env::var("ALLOWED_ORIGINS") {
        let origins: Vec<HeaderValue> = cors_origins
            .split(',')
            .filter_map(|origin| {
                let trimmed = origin.trim();
                if !trimmed.is_empty() {
                    trimmed.parse().ok()
                } else {
                    None
                }
            })
            .collect();

        if !origins.is_empty() {
            cors = cors.allow_origin(origins);
        } else {
            // Fallback to permissive if parsing fails
            cors = cors.allow_origin(Any);
        }
    } else {
        // Default to permissive for development
        cors = cors.allow_origin(Any);
    }

    cors
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Retronova API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_check() -> &'static str {
    "OK"
}
