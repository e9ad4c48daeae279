use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDateTime;
use common::{Page, PageRequest};
use model::repositories::{ActivityEntry, ActivityRepository};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::error::ApiResult;
use crate::handlers::users::find_user;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ListQuery};

/// One activity log row
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponse {
    pub id: i32,
    pub user_id: i32,
    pub description: String,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: NaiveDateTime,
    /// Display name of the acting user
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_gravatar: Option<String>,
}

impl From<ActivityEntry> for ActivityResponse {
    fn from(entry: ActivityEntry) -> Self {
        let ActivityEntry { activity, user } = entry;
        Self {
            id: activity.id,
            user_id: activity.user_id,
            description: activity.description,
            ip_address: activity.ip_address,
            user_agent: activity.user_agent,
            created_at: activity.created_at,
            user_name: user.as_ref().map(|u| u.full_name()),
            user_gravatar: user.as_ref().map(|u| u.gravatar()),
            user_email: user.map(|u| u.email),
        }
    }
}

fn page_request(state: &AppState, query: &ListQuery) -> PageRequest {
    PageRequest::new(query.page, query.per_page, state.config.activity_per_page)
}

/// Activity of all users, newest first
#[utoipa::path(
    get,
    path = "/api/v1/activity",
    tag = "activity",
    params(ListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Activity retrieved successfully", body = ApiResponse<Page<ActivityResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_activities(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Page<ActivityResponse>>>> {
    let page = state
        .activities
        .paginate_activities(page_request(&state, &query), query.search.as_deref())
        .await?;
    debug!("Activity page {} of {}", page.current_page, page.last_page);

    Ok(Json(ApiResponse::new(
        page.map(ActivityResponse::from),
        "Activity retrieved successfully",
    )))
}

/// Activity of one user, newest first
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/activity",
    tag = "activity",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ListQuery,
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Activity retrieved successfully", body = ApiResponse<Page<ActivityResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_activities(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Page<ActivityResponse>>>> {
    let user = find_user(&state.db, user_id).await?;
    let page = state
        .activities
        .paginate_activities_for_user(user.id, page_request(&state, &query), query.search.as_deref())
        .await?;

    Ok(Json(ApiResponse::new(
        page.map(ActivityResponse::from),
        "Activity retrieved successfully",
    )))
}
