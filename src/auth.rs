//! Bearer token authentication and the permission gate.
//!
//! Handlers take an [`AuthUser`] to require a logged in, non-banned user.
//! Whole route groups are guarded with [`gate`], which additionally checks a
//! named permission through the user's roles.

use axum::{
    Router, async_trait,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, UserAgent, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use model::entities::user;
use model::repositories::NewActivity;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::schemas::AppState;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Issues and validates HS256 bearer tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    pub fn expiry_seconds(&self) -> i64 {
        self.expiry_seconds
    }

    pub fn issue(&self, user_id: i32) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_seconds)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish_non_exhaustive()
    }
}

/// The logged in user behind a request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: user::Model,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Already resolved by the permission gate
        if let Some(auth) = parts.extensions.get::<AuthUser>() {
            return Ok(auth.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::unauthorized("MISSING_AUTHORIZATION", "Missing bearer token")
                })?;

        let claims = state.jwt.validate(bearer.token()).map_err(|e| {
            warn!(error = %e, "Invalid access token");
            ApiError::unauthorized("INVALID_TOKEN", "Invalid or expired token")
        })?;

        let user_id = claims
            .user_id()
            .ok_or_else(|| ApiError::unauthorized("INVALID_TOKEN", "Invalid or expired token"))?;

        let user = user::Entity::find_by_id(user_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                warn!("Token refers to missing user {}", user_id);
                ApiError::unauthorized("INVALID_TOKEN", "Invalid or expired token")
            })?;

        if user.is_banned() {
            warn!("Banned user {} attempted an authenticated request", user.id);
            return Err(ApiError::forbidden("USER_BANNED", "Your account is banned"));
        }

        let auth = AuthUser { user };
        parts.extensions.insert(auth.clone());
        Ok(auth)
    }
}

/// Client address and user agent, recorded with activity entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

impl ClientInfo {
    /// An activity entry for `user_id` stamped with this client
    pub fn activity(&self, user_id: i32, description: impl Into<String>) -> NewActivity {
        NewActivity::new(user_id, description)
            .with_client(self.ip_address.clone(), self.user_agent.clone())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let ip_address = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_default();

        let user_agent = TypedHeader::<UserAgent>::from_request_parts(parts, state)
            .await
            .map(|TypedHeader(agent)| agent.as_str().to_string())
            .unwrap_or_default();

        Ok(ClientInfo {
            ip_address,
            user_agent,
        })
    }
}

/// State of a single permission gate
#[derive(Clone)]
pub struct PermissionGate {
    state: AppState,
    permission: &'static str,
}

/// Reject the request unless the bearer holds `gate.permission`
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let auth = AuthUser::from_request_parts(&mut parts, &gate.state).await?;

    if !auth.user.has_permission(&gate.state.db, gate.permission).await? {
        warn!(
            "User {} lacks permission '{}' for {}",
            auth.user.id, gate.permission, parts.uri
        );
        return Err(ApiError::forbidden(
            "FORBIDDEN",
            format!("Missing permission '{}'", gate.permission),
        ));
    }

    debug!("User {} passed permission '{}'", auth.user.id, gate.permission);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Guard every route of `router` with `permission`
pub fn gate(router: Router<AppState>, state: &AppState, permission: &'static str) -> Router<AppState> {
    router.route_layer(from_fn_with_state(
        PermissionGate {
            state: state.clone(),
            permission,
        },
        require_permission,
    ))
}
