use axum::{
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDateTime;
use model::entities::channel;
use model::repositories::ActivityRepository;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::path::{Path as FsPath, PathBuf};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthUser, ClientInfo};
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::handlers::users::find_user;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Directory under the upload root that holds channel logos
const LOGO_DIR: &str = "channels";
/// Public prefix stored in `relative_logo_link`
const LOGO_LINK_PREFIX: &str = "upload/channels/";

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateChannelRequest {
    /// Owner of the channel; a user owns at most one
    pub user_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateChannelRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelResponse {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Stored logo link, empty when no logo was uploaded
    pub relative_logo_link: String,
    /// Logo to display, falling back to the default image
    pub logo_path: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<channel::Model> for ChannelResponse {
    fn from(model: channel::Model) -> Self {
        Self {
            logo_path: model.logo_path().to_string(),
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            relative_logo_link: model.relative_logo_link,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

async fn find_channel(db: &DatabaseConnection, channel_id: i32) -> ApiResult<channel::Model> {
    channel::Entity::find_by_id(channel_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            warn!("Channel with ID {} not found", channel_id);
            ApiError::not_found(format!("Channel {} not found", channel_id))
        })
}

/// File extension for an accepted image upload.
///
/// The declared content type must be one of PNG, JPEG or GIF and the file
/// signature must agree with it.
pub fn image_extension(content_type: Option<&str>, data: &[u8]) -> Option<&'static str> {
    let (extension, signature): (&str, &[u8]) = match content_type? {
        "image/png" => ("png", b"\x89PNG\r\n\x1a\n"),
        "image/jpeg" | "image/jpg" => ("jpg", b"\xff\xd8\xff"),
        "image/gif" => ("gif", b"GIF8"),
        _ => return None,
    };

    data.starts_with(signature).then_some(extension)
}

/// Filesystem location of a stored logo link, if it points into the logo directory
fn stored_logo_path(upload_dir: &FsPath, link: &str) -> Option<PathBuf> {
    let name = link.strip_prefix(LOGO_LINK_PREFIX)?;
    let file_name = FsPath::new(name).file_name()?;
    (file_name.to_str() == Some(name)).then(|| upload_dir.join(LOGO_DIR).join(file_name))
}

/// Trimmed channel name; blank names are rejected
fn channel_name(raw: &str) -> ApiResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::unprocessable(
            "INVALID_CHANNEL_NAME",
            "The channel name must not be blank",
        ));
    }
    Ok(name.to_string())
}

fn multipart_error(err: MultipartError, max_mb: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(max_mb)
    } else {
        ApiError::unprocessable("INVALID_MULTIPART", err.body_text())
    }
}

/// Get all channels
#[utoipa::path(
    get,
    path = "/api/v1/channels",
    tag = "channels",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Channels retrieved successfully", body = ApiResponse<Vec<ChannelResponse>>),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_channels(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<ChannelResponse>>>> {
    let channels = channel::Entity::find()
        .order_by_asc(channel::Column::Name)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} channels", channels.len());

    Ok(Json(ApiResponse::new(
        channels.into_iter().map(ChannelResponse::from).collect(),
        "Channels retrieved successfully",
    )))
}

/// Create a channel for a user
#[utoipa::path(
    post,
    path = "/api/v1/channels",
    tag = "channels",
    request_body = CreateChannelRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Channel created successfully", body = ApiResponse<ChannelResponse>),
        (status = 404, description = "Owner not found", body = ErrorResponse),
        (status = 409, description = "User already owns a channel", body = ErrorResponse),
        (status = 422, description = "Blank channel name", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn create_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    ValidatedJson(request): ValidatedJson<CreateChannelRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ChannelResponse>>)> {
    trace!("Entering create_channel function");
    let name = channel_name(&request.name)?;
    let owner = find_user(&state.db, request.user_id).await?;

    let created = channel::ActiveModel {
        user_id: Set(owner.id),
        name: Set(name),
        description: Set(request.description),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    state
        .activities
        .log(client.activity(
            auth.user.id,
            format!("Created channel {} for {}.", created.name, owner.email),
        ))
        .await?;

    info!("Channel created successfully with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ChannelResponse::from(created),
            "Channel created successfully",
        )),
    ))
}

/// Get a channel
#[utoipa::path(
    get,
    path = "/api/v1/channels/{channel_id}",
    tag = "channels",
    params(("channel_id" = i32, Path, description = "Channel ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Channel retrieved successfully", body = ApiResponse<ChannelResponse>),
        (status = 404, description = "Channel not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<ChannelResponse>>> {
    let channel = find_channel(&state.db, channel_id).await?;
    Ok(Json(ApiResponse::new(
        ChannelResponse::from(channel),
        "Channel retrieved successfully",
    )))
}

/// Update a channel
#[utoipa::path(
    put,
    path = "/api/v1/channels/{channel_id}",
    tag = "channels",
    params(("channel_id" = i32, Path, description = "Channel ID")),
    request_body = UpdateChannelRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Channel updated successfully", body = ApiResponse<ChannelResponse>),
        (status = 404, description = "Channel not found", body = ErrorResponse),
        (status = 422, description = "Blank channel name", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn update_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(channel_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateChannelRequest>,
) -> ApiResult<Json<ApiResponse<ChannelResponse>>> {
    let name = request.name.as_deref().map(channel_name).transpose()?;
    let existing = find_channel(&state.db, channel_id).await?;
    let mut active: channel::ActiveModel = existing.into();

    if let Some(name) = name {
        active.name = Set(name);
    }
    if request.description.is_some() {
        active.description = Set(request.description);
    }
    let updated = active.update(&state.db).await?;

    state
        .activities
        .log(client.activity(
            auth.user.id,
            format!("Updated channel {}.", updated.name),
        ))
        .await?;

    Ok(Json(ApiResponse::new(
        ChannelResponse::from(updated),
        "Channel updated successfully",
    )))
}

/// Upload a new channel logo
///
/// Expects a multipart form with the image in the `logo` field.
#[utoipa::path(
    post,
    path = "/api/v1/channels/{channel_id}/logo",
    tag = "channels",
    params(("channel_id" = i32, Path, description = "Channel ID")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Image in the `logo` field"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logo uploaded successfully", body = ApiResponse<ChannelResponse>),
        (status = 404, description = "Channel not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Missing or invalid image", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart, auth))]
pub async fn upload_logo(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(channel_id): Path<i32>,
    mut multipart: Multipart,
) -> ApiResult<Json<ApiResponse<ChannelResponse>>> {
    let max_mb = state.config.max_upload_mb;
    let channel = find_channel(&state.db, channel_id).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_mb))?
    {
        if field.name() != Some("logo") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| multipart_error(e, max_mb))?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) = upload
        .ok_or_else(|| ApiError::unprocessable("MISSING_LOGO", "The logo field is required"))?;

    if data.len() > state.config.max_upload_bytes() {
        warn!("Rejected {} byte logo for channel {}", data.len(), channel_id);
        return Err(ApiError::PayloadTooLarge(max_mb));
    }

    let extension = image_extension(content_type.as_deref(), &data).ok_or_else(|| {
        ApiError::unprocessable("INVALID_IMAGE", "The logo must be a PNG, JPEG or GIF image")
    })?;

    let dir = state.config.upload_dir.join(LOGO_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(ApiError::internal)?;
    let file_name = format!("{}.{}", Uuid::new_v4(), extension);
    tokio::fs::write(dir.join(&file_name), &data)
        .await
        .map_err(ApiError::internal)?;
    debug!("Stored {} byte logo as {}", data.len(), file_name);

    let previous = channel.relative_logo_link.clone();
    let mut active: channel::ActiveModel = channel.into();
    active.relative_logo_link = Set(format!("{}{}", LOGO_LINK_PREFIX, file_name));
    let updated = match active.update(&state.db).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(dir.join(&file_name)).await {
                warn!("Could not remove unused logo {}: {}", file_name, remove_err);
            }
            return Err(e.into());
        }
    };

    if let Some(old_path) = stored_logo_path(&state.config.upload_dir, &previous) {
        if let Err(e) = tokio::fs::remove_file(&old_path).await {
            warn!("Could not remove old logo {}: {}", old_path.display(), e);
        }
    }

    state
        .activities
        .log(client.activity(
            auth.user.id,
            format!("Updated logo of channel {}.", updated.name),
        ))
        .await?;

    info!("Logo of channel {} updated", updated.id);
    Ok(Json(ApiResponse::new(
        ChannelResponse::from(updated),
        "Logo uploaded successfully",
    )))
}
