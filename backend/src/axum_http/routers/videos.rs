use crate::{
    axum_http::error_responses::AppError,
    config::config_model::Videos,
    usecases::{
        video_catalog::{CatalogRequest, VideoCatalogUseCase},
        video_upload::{UploadedFile, VideoUploadForm, VideoUploadUseCase},
    },
};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State,
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::QueryRejection,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bytes::BytesMut;
use crates::domain::{errors::VideoError, repositories::media_storage::MediaStorageClient};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

const FILE_FIELD: &str = "file";
const TITLE_FIELD: &str = "title";
const MAX_TITLE_BYTES: u64 = 4 * 1024;

#[derive(Debug, Deserialize)]
pub struct ListVideosQuery {
    limit: Option<i64>,
    cursor: Option<String>,
    q: Option<String>,
}

pub struct VideosState<M>
where
    M: MediaStorageClient + Send + Sync + 'static,
{
    upload: VideoUploadUseCase<M>,
    catalog: VideoCatalogUseCase<M>,
}

pub fn routes<M>(storage: Arc<M>, config: &Videos) -> Router
where
    M: MediaStorageClient + Send + Sync + 'static,
{
    let state = VideosState {
        upload: VideoUploadUseCase::new(Arc::clone(&storage), config),
        catalog: VideoCatalogUseCase::new(storage, config),
    };

    Router::new()
        .route("/", post(upload_video::<M>).get(list_videos::<M>))
        .route("/:id", get(find_video::<M>))
        // Upload size is enforced while reading the file field instead.
        .layer(DefaultBodyLimit::disable())
        .with_state(Arc::new(state))
}

pub async fn upload_video<M>(
    State(state): State<Arc<VideosState<M>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError>
where
    M: MediaStorageClient + Send + Sync + 'static,
{
    info!("videos: upload request received");
    let multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "videos: request is not a multipart upload");
        VideoError::ParseFailure(rejection.body_text())
    })?;

    let form = read_upload_form(multipart, state.upload.max_upload_bytes()).await?;
    let uploaded = state.upload.upload(form).await?;

    Ok((StatusCode::OK, Json(uploaded)))
}

pub async fn list_videos<M>(
    State(state): State<Arc<VideosState<M>>>,
    query: Result<Query<ListVideosQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    M: MediaStorageClient + Send + Sync + 'static,
{
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let page = state
        .catalog
        .list_videos(CatalogRequest {
            limit: query.limit,
            cursor: query.cursor,
            search: query.q,
        })
        .await?;

    Ok(Json(page))
}

pub async fn find_video<M>(
    State(state): State<Arc<VideosState<M>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    M: MediaStorageClient + Send + Sync + 'static,
{
    let video = state.catalog.find_video(&id).await?;
    Ok(Json(video))
}

/// Reads the `file` and `title` fields. Unknown fields are skipped; a second
/// `file` field is rejected.
async fn read_upload_form(
    mut multipart: Multipart,
    max_upload_bytes: u64,
) -> Result<VideoUploadForm, VideoError> {
    let mut form = VideoUploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| map_multipart_error(err, max_upload_bytes))?
    {
        let field_name = field.name().map(str::to_string).unwrap_or_default();

        match field_name.as_str() {
            FILE_FIELD => {
                if form.file.is_some() {
                    return Err(VideoError::ParseFailure(
                        "multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let filename = field.file_name().map(str::to_string);
                let bytes = read_field_bounded(field, max_upload_bytes).await?;
                form.file = Some(UploadedFile {
                    bytes: bytes.freeze(),
                    filename,
                });
            }
            TITLE_FIELD => {
                let raw = read_field_bounded(field, MAX_TITLE_BYTES).await?;
                let title = String::from_utf8(raw.to_vec()).map_err(|_| {
                    VideoError::ParseFailure("title must be valid UTF-8".to_string())
                })?;
                form.title = Some(title);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Buffers one field in memory, giving up as soon as it grows past the limit.
async fn read_field_bounded(
    mut field: Field<'_>,
    limit_bytes: u64,
) -> Result<BytesMut, VideoError> {
    let field_name = field.name().unwrap_or_default().to_string();
    let mut buffer = BytesMut::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|err| map_multipart_error(err, limit_bytes))?
    {
        if (buffer.len() + chunk.len()) as u64 > limit_bytes {
            warn!(
                field = %field_name,
                limit_bytes,
                "videos: upload rejected while reading, field too large"
            );
            return Err(VideoError::PayloadTooLarge { limit_bytes });
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer)
}

fn map_multipart_error(err: MultipartError, max_upload_bytes: u64) -> VideoError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return VideoError::PayloadTooLarge {
            limit_bytes: max_upload_bytes,
        };
    }
    VideoError::ParseFailure(err.body_text())
}
