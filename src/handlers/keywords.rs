use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::keyword;
use model::repositories::ActivityRepository;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{AuthUser, ClientInfo};
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateKeywordRequest {
    #[validate(length(min = 1, max = 255))]
    pub keyword: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KeywordResponse {
    pub id: i32,
    pub keyword: String,
}

impl From<keyword::Model> for KeywordResponse {
    fn from(model: keyword::Model) -> Self {
        Self {
            id: model.id,
            keyword: model.keyword,
        }
    }
}

/// Get all keywords, alphabetically
#[utoipa::path(
    get,
    path = "/api/v1/keywords",
    tag = "keywords",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Keywords retrieved successfully", body = ApiResponse<Vec<KeywordResponse>>),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_keywords(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<KeywordResponse>>>> {
    let keywords = keyword::Entity::find()
        .order_by_asc(keyword::Column::Keyword)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::new(
        keywords.into_iter().map(KeywordResponse::from).collect(),
        "Keywords retrieved successfully",
    )))
}

/// Add a keyword
#[utoipa::path(
    post,
    path = "/api/v1/keywords",
    tag = "keywords",
    request_body = CreateKeywordRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Keyword created successfully", body = ApiResponse<KeywordResponse>),
        (status = 409, description = "Keyword already exists", body = ErrorResponse),
        (status = 422, description = "Invalid keyword", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn create_keyword(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    ValidatedJson(request): ValidatedJson<CreateKeywordRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<KeywordResponse>>)> {
    let value = request.keyword.trim();
    if value.is_empty() {
        return Err(ApiError::unprocessable(
            "INVALID_KEYWORD",
            "The keyword must not be blank",
        ));
    }

    let created = keyword::ActiveModel {
        keyword: Set(value.to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    state
        .activities
        .log(client.activity(
            auth.user.id,
            format!("Added keyword {}.", created.keyword),
        ))
        .await?;

    info!("Keyword created with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            KeywordResponse::from(created),
            "Keyword created successfully",
        )),
    ))
}

/// Remove a keyword
#[utoipa::path(
    delete,
    path = "/api/v1/keywords/{keyword_id}",
    tag = "keywords",
    params(("keyword_id" = i32, Path, description = "Keyword ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Keyword deleted successfully"),
        (status = 404, description = "Keyword not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn delete_keyword(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(keyword_id): Path<i32>,
) -> ApiResult<StatusCode> {
    let existing = keyword::Entity::find_by_id(keyword_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Keyword with ID {} not found", keyword_id);
            ApiError::not_found(format!("Keyword {} not found", keyword_id))
        })?;
    let value = existing.keyword.clone();
    existing.delete(&state.db).await?;

    state
        .activities
        .log(client.activity(auth.user.id, format!("Removed keyword {}.", value)))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
