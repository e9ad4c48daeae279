use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use common::{Page, PageRequest};
use model::entities::{favorite, product, role, user, user_social_network, watch_recent};
use model::repositories::ActivityRepository;
use model::repositories::search::contains as contains_term;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::auth::{AuthUser, ClientInfo};
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Query parameters for the user listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Rows per page (1-100)
    pub per_page: Option<u64>,
    /// Matches email, username, first and last name
    pub search: Option<String>,
    /// Only users in this status (Unconfirmed, Active, Banned)
    pub status: Option<String>,
}

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub username: Option<String>,
    #[validate(length(min = 6))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country_id: Option<i32>,
    /// YYYY-MM-DD, blank for none
    pub birthday: Option<String>,
    /// Unconfirmed (default), Active or Banned
    pub status: Option<String>,
}

/// Request body for updating a user. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub username: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country_id: Option<i32>,
    /// YYYY-MM-DD; a blank string clears the birthday
    pub birthday: Option<String>,
    pub status: Option<String>,
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// First and last name, falling back to username or email
    pub full_name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub gravatar: String,
    pub address: Option<String>,
    pub country_id: Option<i32>,
    pub birthday: Option<NaiveDate>,
    pub last_login: Option<NaiveDateTime>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            full_name: model.full_name(),
            gravatar: model.gravatar(),
            status: model.status.to_value(),
            id: model.id,
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            avatar: model.avatar,
            address: model.address,
            country_id: model.country_id,
            birthday: model.birthday,
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    pub id: i32,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub removable: bool,
}

impl From<role::Model> for RoleResponse {
    fn from(model: role::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            display_name: model.display_name,
            description: model.description,
            removable: model.removable,
        }
    }
}

/// Replaces the complete role set of a user
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct SyncRolesRequest {
    pub roles: Vec<i32>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct SocialNetworksRequest {
    #[validate(length(max = 255))]
    pub facebook: Option<String>,
    #[validate(length(max = 255))]
    pub twitter: Option<String>,
    #[validate(length(max = 255))]
    pub google_plus: Option<String>,
    #[validate(length(max = 255))]
    pub linked_in: Option<String>,
    #[validate(length(max = 255))]
    pub dribbble: Option<String>,
    #[validate(length(max = 255))]
    pub skype: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SocialNetworksResponse {
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub google_plus: Option<String>,
    pub linked_in: Option<String>,
    pub dribbble: Option<String>,
    pub skype: Option<String>,
}

impl From<user_social_network::Model> for SocialNetworksResponse {
    fn from(model: user_social_network::Model) -> Self {
        Self {
            facebook: model.facebook,
            twitter: model.twitter,
            google_plus: model.google_plus,
            linked_in: model.linked_in,
            dribbble: model.dribbble,
            skype: model.skype,
        }
    }
}

/// A product attached to a user through a timestamped pivot row
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PivotProductResponse {
    pub product_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// When the pivot row was created
    pub created_at: NaiveDateTime,
    /// When the pivot row was last touched
    pub updated_at: NaiveDateTime,
}

impl From<(favorite::Model, product::Model)> for PivotProductResponse {
    fn from((pivot, product): (favorite::Model, product::Model)) -> Self {
        Self {
            product_id: product.id,
            name: product.name,
            description: product.description,
            created_at: pivot.created_at,
            updated_at: pivot.updated_at,
        }
    }
}

impl From<(watch_recent::Model, product::Model)> for PivotProductResponse {
    fn from((pivot, product): (watch_recent::Model, product::Model)) -> Self {
        Self {
            product_id: product.id,
            name: product.name,
            description: product.description,
            created_at: pivot.created_at,
            updated_at: pivot.updated_at,
        }
    }
}

/// Load a user or fail with 404
pub async fn find_user(db: &DatabaseConnection, user_id: i32) -> ApiResult<user::Model> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            warn!("User with ID {} not found", user_id);
            ApiError::not_found(format!("User {} not found", user_id))
        })
}

async fn find_product(db: &DatabaseConnection, product_id: i32) -> ApiResult<product::Model> {
    product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product {} not found", product_id)))
}

fn parse_status(raw: &str) -> ApiResult<user::UserStatus> {
    user::UserStatus::try_from_value(&raw.trim().to_string()).map_err(|_| {
        ApiError::unprocessable(
            "INVALID_STATUS",
            format!("Unknown user status '{}'", raw),
        )
    })
}

fn parse_birthday(raw: &str) -> ApiResult<Option<NaiveDate>> {
    common::normalize_birthday(raw)
        .map_err(|e| ApiError::unprocessable("INVALID_BIRTHDAY", e.to_string()))
}

/// Blank optional strings are stored as NULL
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get users, paginated
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(UserListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Page<UserResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 422, description = "Unknown status filter", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<ApiResponse<Page<UserResponse>>>> {
    trace!("Entering get_users function");
    let request = PageRequest::new(query.page, query.per_page, common::DEFAULT_PER_PAGE);
    let search = non_blank(query.search);

    let mut select = user::Entity::find();
    if let Some(status) = query.status.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(user::Column::Status.eq(parse_status(status)?));
    }
    if let Some(term) = &search {
        select = select.filter(
            Condition::any()
                .add(user::Column::Email.like(contains_term(term)))
                .add(user::Column::Username.like(contains_term(term)))
                .add(user::Column::FirstName.like(contains_term(term)))
                .add(user::Column::LastName.like(contains_term(term))),
        );
    }

    let paginator = select
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .paginate(&state.db, request.per_page);
    let total = paginator.num_items().await?;
    let users = paginator.fetch_page(request.index()).await?;
    debug!("Retrieved {} of {} users", users.len(), total);

    let page = Page::new(
        users.into_iter().map(UserResponse::from).collect(),
        request,
        total,
        search,
    );
    Ok(Json(ApiResponse::new(page, "Users retrieved successfully")))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 409, description = "Email or username already taken", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request, auth))]
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    trace!("Entering create_user function");
    debug!("Creating user with email: {}", request.email);

    let birthday = match request.birthday.as_deref() {
        Some(raw) => parse_birthday(raw)?,
        None => None,
    };
    let status = match request.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => user::UserStatus::Unconfirmed,
    };

    let created = user::ActiveModel {
        email: Set(request.email.trim().to_string()),
        username: Set(non_blank(request.username)),
        password: Set(request.password),
        first_name: Set(non_blank(request.first_name)),
        last_name: Set(non_blank(request.last_name)),
        phone: Set(non_blank(request.phone)),
        address: Set(non_blank(request.address)),
        country_id: Set(request.country_id),
        birthday: Set(birthday),
        status: Set(status),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    state
        .activities
        .log(client.activity(
            auth.user.id,
            format!("Created new user with email {}.", created.email),
        ))
        .await?;

    info!("User created successfully with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            UserResponse::from(created),
            "User created successfully",
        )),
    ))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = find_user(&state.db, user_id).await?;
    Ok(Json(ApiResponse::new(
        UserResponse::from(user),
        "User retrieved successfully",
    )))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request, auth))]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(user_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering update_user function for user_id: {}", user_id);
    let existing = find_user(&state.db, user_id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(email) = request.email {
        active.email = Set(email.trim().to_string());
    }
    if let Some(username) = request.username {
        active.username = Set(non_blank(Some(username)));
    }
    if let Some(password) = request.password {
        debug!("Password change requested for user {}", user_id);
        active.password = Set(password);
    }
    if let Some(first_name) = request.first_name {
        active.first_name = Set(non_blank(Some(first_name)));
    }
    if let Some(last_name) = request.last_name {
        active.last_name = Set(non_blank(Some(last_name)));
    }
    if let Some(phone) = request.phone {
        active.phone = Set(non_blank(Some(phone)));
    }
    if let Some(address) = request.address {
        active.address = Set(non_blank(Some(address)));
    }
    if request.country_id.is_some() {
        active.country_id = Set(request.country_id);
    }
    if let Some(birthday) = request.birthday {
        active.birthday = Set(parse_birthday(&birthday)?);
    }
    if let Some(status) = request.status {
        active.status = Set(parse_status(&status)?);
    }

    let updated = active.update(&state.db).await?;

    let description = if updated.id == auth.user.id {
        "Updated profile details.".to_string()
    } else {
        format!("Updated profile details for {}.", updated.email)
    };
    state
        .activities
        .log(client.activity(auth.user.id, description))
        .await?;

    info!("User with ID {} updated successfully", updated.id);
    Ok(Json(ApiResponse::new(
        UserResponse::from(updated),
        "User updated successfully",
    )))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 403, description = "Users cannot delete themselves", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(user_id): Path<i32>,
) -> ApiResult<StatusCode> {
    if user_id == auth.user.id {
        warn!("User {} attempted to delete themselves", user_id);
        return Err(ApiError::forbidden(
            "CANNOT_DELETE_SELF",
            "You cannot delete yourself",
        ));
    }

    let target = find_user(&state.db, user_id).await?;
    let email = target.email.clone();
    target.delete(&state.db).await?;

    state
        .activities
        .log(client.activity(auth.user.id, format!("Deleted user {}.", email)))
        .await?;

    info!("User with ID {} deleted successfully", user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Get the roles of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/roles",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Roles retrieved successfully", body = ApiResponse<Vec<RoleResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_roles(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<RoleResponse>>>> {
    let user = find_user(&state.db, user_id).await?;
    let roles = user.roles(&state.db).await?;
    Ok(Json(ApiResponse::new(
        roles.into_iter().map(RoleResponse::from).collect(),
        "Roles retrieved successfully",
    )))
}

/// Replace the roles of a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/roles",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = SyncRolesRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Roles updated successfully", body = ApiResponse<Vec<RoleResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Unknown role", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn sync_user_roles(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(user_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<SyncRolesRequest>,
) -> ApiResult<Json<ApiResponse<Vec<RoleResponse>>>> {
    let user = find_user(&state.db, user_id).await?;

    let known = role::Entity::find()
        .filter(role::Column::Id.is_in(request.roles.clone()))
        .all(&state.db)
        .await?;
    if let Some(missing) = request
        .roles
        .iter()
        .find(|id| !known.iter().any(|role| role.id == **id))
    {
        return Err(ApiError::unprocessable(
            "UNKNOWN_ROLE",
            format!("Role {} does not exist", missing),
        ));
    }

    user.sync_roles(&state.db, &request.roles).await?;
    state
        .activities
        .log(client.activity(
            auth.user.id,
            format!("Updated roles for user {}.", user.email),
        ))
        .await?;

    let roles = user.roles(&state.db).await?;
    info!("User {} now has {} roles", user.id, roles.len());
    Ok(Json(ApiResponse::new(
        roles.into_iter().map(RoleResponse::from).collect(),
        "Roles updated successfully",
    )))
}

/// Get the social network links of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/social-networks",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Social networks retrieved successfully", body = ApiResponse<SocialNetworksResponse>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_social_networks(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<SocialNetworksResponse>>> {
    let user = find_user(&state.db, user_id).await?;
    let networks = user
        .social_networks(&state.db)
        .await?
        .map(SocialNetworksResponse::from)
        .unwrap_or_default();
    Ok(Json(ApiResponse::new(
        networks,
        "Social networks retrieved successfully",
    )))
}

/// Create or replace the social network links of a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/social-networks",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = SocialNetworksRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Social networks updated successfully", body = ApiResponse<SocialNetworksResponse>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request, auth))]
pub async fn update_social_networks(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(user_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<SocialNetworksRequest>,
) -> ApiResult<Json<ApiResponse<SocialNetworksResponse>>> {
    let user = find_user(&state.db, user_id).await?;

    let mut active: user_social_network::ActiveModel = match user.social_networks(&state.db).await? {
        Some(existing) => existing.into(),
        None => user_social_network::ActiveModel {
            user_id: Set(user.id),
            ..Default::default()
        },
    };
    active.facebook = Set(non_blank(request.facebook));
    active.twitter = Set(non_blank(request.twitter));
    active.google_plus = Set(non_blank(request.google_plus));
    active.linked_in = Set(non_blank(request.linked_in));
    active.dribbble = Set(non_blank(request.dribbble));
    active.skype = Set(non_blank(request.skype));
    let saved = active.save(&state.db).await?;
    let saved: user_social_network::Model = saved.try_into()?;

    state
        .activities
        .log(client.activity(
            auth.user.id,
            format!("Updated social networks for {}.", user.email),
        ))
        .await?;

    Ok(Json(ApiResponse::new(
        SocialNetworksResponse::from(saved),
        "Social networks updated successfully",
    )))
}

/// Get the favorite products of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/favorites",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Favorites retrieved successfully", body = ApiResponse<Vec<PivotProductResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<PivotProductResponse>>>> {
    let user = find_user(&state.db, user_id).await?;
    let favorites = user.favorites(&state.db).await?;
    Ok(Json(ApiResponse::new(
        favorites.into_iter().map(PivotProductResponse::from).collect(),
        "Favorites retrieved successfully",
    )))
}

/// Mark a product as favorite
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/favorites/{product_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product added to favorites", body = ApiResponse<bool>),
        (status = 200, description = "Product already was a favorite", body = ApiResponse<bool>),
        (status = 404, description = "User or product not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(i32, i32)>,
) -> ApiResult<(StatusCode, Json<ApiResponse<bool>>)> {
    let user = find_user(&state.db, user_id).await?;
    find_product(&state.db, product_id).await?;

    if user.add_favorite(&state.db, product_id).await? {
        debug!("Product {} added to favorites of user {}", product_id, user_id);
        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::new(true, "Product added to favorites")),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(ApiResponse::new(false, "Product already is a favorite")),
        ))
    }
}

/// Remove a product from the favorites
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/favorites/{product_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Product removed from favorites"),
        (status = 404, description = "User not found or product is not a favorite", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(i32, i32)>,
) -> ApiResult<StatusCode> {
    let user = find_user(&state.db, user_id).await?;

    if user.remove_favorite(&state.db, product_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "Product {} is not a favorite of user {}",
            product_id, user_id
        )))
    }
}

/// Get the recently watched products of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/recently-watched",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Recently watched products retrieved successfully", body = ApiResponse<Vec<PivotProductResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_recently_watched(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<PivotProductResponse>>>> {
    let user = find_user(&state.db, user_id).await?;
    let watched = user.recently_watched(&state.db).await?;
    Ok(Json(ApiResponse::new(
        watched.into_iter().map(PivotProductResponse::from).collect(),
        "Recently watched products retrieved successfully",
    )))
}

/// Record that a user watched a product
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/recently-watched/{product_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "View recorded", body = ApiResponse<PivotProductResponse>),
        (status = 404, description = "User or product not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn record_watch(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(i32, i32)>,
) -> ApiResult<Json<ApiResponse<PivotProductResponse>>> {
    let user = find_user(&state.db, user_id).await?;
    let product = find_product(&state.db, product_id).await?;

    let pivot = user.record_watch(&state.db, product_id).await?;
    Ok(Json(ApiResponse::new(
        PivotProductResponse::from((pivot, product)),
        "View recorded",
    )))
}
