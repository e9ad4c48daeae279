use crate::auth::gate;
use crate::handlers::{
    activity::{get_activities, get_user_activities},
    auth::{login, me},
    channels::{create_channel, get_channel, get_channels, update_channel, upload_logo},
    health::health_check,
    keywords::{create_keyword, delete_keyword, get_keywords},
    users::{
        add_favorite, create_user, delete_user, get_favorites, get_recently_watched,
        get_social_networks, get_user, get_user_roles, get_users, record_watch, remove_favorite,
        sync_user_roles, update_social_networks, update_user,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use model::entities::permission;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Extra room for multipart framing around the logo itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/activity", get(get_activities))
        .route("/api/v1/users/:user_id/activity", get(get_user_activities))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users", get(get_users).post(create_user))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route(
            "/api/v1/users/:user_id/roles",
            get(get_user_roles).put(sync_user_roles),
        )
        .route(
            "/api/v1/users/:user_id/social-networks",
            get(get_social_networks).put(update_social_networks),
        )
        .route("/api/v1/users/:user_id/favorites", get(get_favorites))
        .route(
            "/api/v1/users/:user_id/favorites/:product_id",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/api/v1/users/:user_id/recently-watched",
            get(get_recently_watched),
        )
        .route(
            "/api/v1/users/:user_id/recently-watched/:product_id",
            post(record_watch),
        )
}

fn channel_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/v1/channels", get(get_channels).post(create_channel))
        .route(
            "/api/v1/channels/:channel_id",
            get(get_channel).put(update_channel),
        )
        .route(
            "/api/v1/channels/:channel_id/logo",
            post(upload_logo).layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
        )
}

fn keyword_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/keywords", get(get_keywords).post(create_keyword))
        .route("/api/v1/keywords/:keyword_id", delete(delete_keyword))
}

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/me", get(me))
        // Permission gated groups
        .merge(gate(activity_routes(), &state, permission::USERS_ACTIVITY))
        .merge(gate(user_routes(), &state, permission::USERS_MANAGE))
        .merge(gate(channel_routes(max_upload_bytes), &state, permission::CHANNELS_MANAGE))
        .merge(gate(keyword_routes(), &state, permission::KEYWORDS_MANAGE))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
