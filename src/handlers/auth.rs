use axum::{extract::State, response::Json};
use chrono::Utc;
use model::entities::user;
use model::repositories::ActivityRepository;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{AuthUser, ClientInfo};
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::handlers::users::UserResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Login credentials
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address or username
    #[validate(length(min = 1))]
    pub login: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserResponse,
}

/// The logged in user with its effective roles and permissions
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: UserResponse,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("INVALID_CREDENTIALS", "These credentials do not match our records")
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account banned or not confirmed", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    trace!("Entering login function");
    let login = request.login.trim();

    let candidate = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(login))
                .add(user::Column::Username.eq(login)),
        )
        .one(&state.db)
        .await?;

    let Some(candidate) = candidate else {
        debug!("No user matches login");
        return Err(invalid_credentials());
    };

    if !common::verify_password(&request.password, &candidate.password)? {
        warn!("Wrong password for user {}", candidate.id);
        return Err(invalid_credentials());
    }

    if candidate.is_banned() {
        warn!("Banned user {} attempted to log in", candidate.id);
        return Err(ApiError::forbidden("USER_BANNED", "Your account is banned"));
    }
    if candidate.is_unconfirmed() {
        return Err(ApiError::forbidden(
            "USER_UNCONFIRMED",
            "Please confirm your email address first",
        ));
    }

    let mut active: user::ActiveModel = candidate.into();
    active.last_login = Set(Some(Utc::now().naive_utc()));
    let logged_in = active.update(&state.db).await?;

    state
        .activities
        .log(client.activity(logged_in.id, "Logged in."))
        .await?;

    let token = state.jwt.issue(logged_in.id).map_err(ApiError::internal)?;
    info!("User {} logged in", logged_in.id);

    Ok(Json(ApiResponse::new(
        LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: state.jwt.expiry_seconds(),
            user: UserResponse::from(logged_in),
        },
        "Logged in successfully",
    )))
}

/// The logged in user
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<MeResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Account banned", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<MeResponse>>> {
    let roles = auth
        .user
        .roles(&state.db)
        .await?
        .into_iter()
        .map(|role| role.name)
        .collect();
    let permissions = auth.user.permissions(&state.db).await?;

    Ok(Json(ApiResponse::new(
        MeResponse {
            user: UserResponse::from(auth.user),
            roles,
            permissions,
        },
        "Current user retrieved successfully",
    )))
}
