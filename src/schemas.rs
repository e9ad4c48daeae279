use common::Page;
use model::repositories::DbActivityRepository;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{
    IntoParams, Modify, OpenApi, ToSchema,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::auth::JwtService;
use crate::config::AppConfig;
use crate::handlers::{
    activity::ActivityResponse,
    auth::{LoginRequest, LoginResponse, MeResponse},
    channels::{ChannelResponse, CreateChannelRequest, UpdateChannelRequest},
    keywords::{CreateKeywordRequest, KeywordResponse},
    users::{
        CreateUserRequest, PivotProductResponse, RoleResponse, SocialNetworksRequest,
        SocialNetworksResponse, SyncRolesRequest, UpdateUserRequest, UserResponse,
    },
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Loaded runtime configuration
    pub config: Arc<AppConfig>,
    /// Bearer token issuer and validator
    pub jwt: JwtService,
    /// User activity log
    pub activities: DbActivityRepository,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Query parameters shared by the paginated listings
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Rows per page (1-100)
    pub per_page: Option<u64>,
    /// Free-text search term
    pub search: Option<String>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::activity::get_activities,
        crate::handlers::activity::get_user_activities,
        crate::handlers::users::get_users,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::get_user_roles,
        crate::handlers::users::sync_user_roles,
        crate::handlers::users::get_social_networks,
        crate::handlers::users::update_social_networks,
        crate::handlers::users::get_favorites,
        crate::handlers::users::add_favorite,
        crate::handlers::users::remove_favorite,
        crate::handlers::users::get_recently_watched,
        crate::handlers::users::record_watch,
        crate::handlers::channels::get_channels,
        crate::handlers::channels::create_channel,
        crate::handlers::channels::get_channel,
        crate::handlers::channels::update_channel,
        crate::handlers::channels::upload_logo,
        crate::handlers::keywords::get_keywords,
        crate::handlers::keywords::create_keyword,
        crate::handlers::keywords::delete_keyword,
    ),
    components(
        schemas(
            ApiResponse<UserResponse>,
            ApiResponse<LoginResponse>,
            ApiResponse<ChannelResponse>,
            ApiResponse<KeywordResponse>,
            Page<ActivityResponse>,
            Page<UserResponse>,
            ErrorResponse,
            HealthResponse,
            ListQuery,
            LoginRequest,
            LoginResponse,
            MeResponse,
            ActivityResponse,
            UserResponse,
            CreateUserRequest,
            UpdateUserRequest,
            RoleResponse,
            SyncRolesRequest,
            SocialNetworksRequest,
            SocialNetworksResponse,
            PivotProductResponse,
            ChannelResponse,
            CreateChannelRequest,
            UpdateChannelRequest,
            KeywordResponse,
            CreateKeywordRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login and current user"),
        (name = "activity", description = "User activity log"),
        (name = "users", description = "User management endpoints"),
        (name = "channels", description = "Channel management endpoints"),
        (name = "keywords", description = "Keyword management endpoints"),
    ),
    info(
        title = "Backoffice API",
        description = "Administrative back office: users, roles, activity log, channels and keywords",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
