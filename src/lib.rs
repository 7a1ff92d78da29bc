// Library exports for testing and external use

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use handlers::{auth, collections, content, follows, health, profile, share};
use models::errors::AppError;
use services::{
    collection_service::CollectionService, content_service::ContentService,
    follow_service::FollowService, rate_limiter::RateLimiter, session_manager::SessionManager,
    share_token::ShareTokenService, store::Store, user_service::UserService,
};
use utils::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<UserService>,
    pub content: Arc<ContentService>,
    pub shares: Arc<ShareTokenService>,
    pub collections: Arc<CollectionService>,
    pub follows: Arc<FollowService>,
    pub session_manager: Arc<SessionManager>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wires every service onto one storage handle
    pub fn new<S: Store + 'static>(config: AppConfig, store: Arc<S>) -> Result<Self, AppError> {
        let shares = ShareTokenService::new(store.clone(), config.token_policy()?);
        let users = UserService::new(store.clone())?;
        let collections = CollectionService::new(store.clone())?;
        let follows = FollowService::new(store.clone());
        let content = ContentService::new(store)?;

        Ok(Self {
            session_manager: Arc::new(SessionManager::with_expiry(config.session_ttl())),
            rate_limiter: Arc::new(RateLimiter::with_config(config.auth_rate_limit())),
            config: Arc::new(config),
            users: Arc::new(users),
            content: Arc::new(content),
            shares: Arc::new(shares),
            collections: Arc::new(collections),
            follows: Arc::new(follows),
        })
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the application router
pub fn create_router(app_state: AppState) -> Router {
    let config = app_state.config.clone();

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit::limit_auth_requests,
        ));

    let api = Router::new()
        .merge(auth_routes)
        .route("/logout", post(auth::logout))
        .route("/content", post(content::add_content).get(content::list_content))
        .route("/content/:id", delete(content::delete_content))
        .route("/profile", get(profile::get_profile))
        .route("/brain/share", post(share::toggle_share))
        .route("/brain/:token", get(share::view_shared))
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route("/collections/reorder", put(collections::reorder_collections))
        .route(
            "/collections/:id",
            get(collections::get_collection)
                .put(collections::update_collection)
                .delete(collections::delete_collection),
        )
        .route("/collections/:id/content", post(collections::add_to_collection))
        .route(
            "/collections/:id/content/:content_id",
            delete(collections::remove_from_collection),
        )
        .route("/follow/:user_id", post(follows::follow))
        .route("/unfollow/:user_id", post(follows::unfollow))
        .route("/followers/:user_id", get(follows::followers))
        .route("/following/:user_id", get(follows::following))
        .route("/is-following/:user_id", get(follows::is_following));

    Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        .route("/api/health", get(health::health_check))
        .nest("/api/v1", api)
        // Every JSON body is sanitized before extraction
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::sanitize::sanitize_json_body,
        ))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_seconds)))
                .layer(cors_layer(&config)),
        )
}
