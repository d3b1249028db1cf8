use crate::AppState;
use crate::api::error::AppError;
use crate::services::media::UploadedMedia;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct MediaUploadForm {
    /// Image or audio file
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/admin/media",
    request_body(content = MediaUploadForm, description = "Media upload", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored; url is publicly reachable", body = UploadedMedia),
        (status = 400, description = "Not an image or audio file"),
        (status = 409, description = "Upload already in progress"),
        (status = 413, description = "File too large")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn upload_media(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UploadedMedia>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let declared_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(multipart_error)?;

        let uploaded = state
            .media
            .upload(&claims.sub, &file_name, declared_type.as_deref(), data.to_vec())
            .await?;
        return Ok(Json(uploaded));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
    }
}
