use crates::domain::{
    entities::videos::{Video, map_video_resources},
    errors::VideoError,
    repositories::media_storage::MediaStorageClient,
    value_objects::search::{SearchExpression, SearchQuery},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::config_model::Videos;

#[derive(Debug, Clone, Default)]
pub struct CatalogRequest {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoPageDto {
    pub videos: Vec<Video>,
    pub next_cursor: Option<String>,
    pub total_count: Option<u64>,
}

/// Lists and looks up videos in the configured folder.
///
/// Nothing is cached: every call goes to the media service.
pub struct VideoCatalogUseCase<M>
where
    M: MediaStorageClient + Send + Sync + 'static,
{
    storage: Arc<M>,
    folder: String,
    page_size: u32,
    max_page_size: u32,
}

impl<M> VideoCatalogUseCase<M>
where
    M: MediaStorageClient + Send + Sync + 'static,
{
    pub fn new(storage: Arc<M>, config: &Videos) -> Self {
        Self {
            storage,
            folder: config.folder.clone(),
            page_size: config.page_size,
            max_page_size: config.max_page_size,
        }
    }

    /// An empty folder is `Ok` with no videos; an upstream failure is always `Err`.
    pub async fn list_videos(&self, request: CatalogRequest) -> Result<VideoPageDto, VideoError> {
        let max_results = self.resolve_limit(request.limit)?;

        let mut expression = SearchExpression::videos_in_folder(&self.folder);
        if let Some(term) = request.search.as_deref() {
            expression = expression.with_text(term);
        }

        debug!(%expression, max_results, "videos: searching catalog");

        let page = self
            .storage
            .search_videos(SearchQuery {
                expression,
                max_results,
                next_cursor: request.cursor.filter(|cursor| !cursor.is_empty()),
            })
            .await
            .map_err(|err| {
                error!(error = ?err, folder = %self.folder, "videos: catalog search failed");
                err
            })?;

        Ok(VideoPageDto {
            videos: map_video_resources(&page.resources),
            next_cursor: page.next_cursor,
            total_count: page.total_count,
        })
    }

    pub async fn find_video(&self, id: &str) -> Result<Video, VideoError> {
        if !is_valid_video_id(id) {
            return Err(VideoError::InvalidRequest(
                "video id may only contain letters, digits, '-', '_' and '.'".to_string(),
            ));
        }

        let public_id = format!("{}/{}", self.folder, id);
        let asset = self
            .storage
            .find_video(public_id.clone())
            .await
            .map_err(|err| {
                error!(error = ?err, %public_id, "videos: lookup failed");
                err
            })?;

        match asset {
            Some(asset) => Ok(Video::from_asset_preferring_context_title(&asset)),
            None => {
                info!(%public_id, "videos: video not found");
                Err(VideoError::NotFound(id.to_string()))
            }
        }
    }

    fn resolve_limit(&self, limit: Option<i64>) -> Result<u32, VideoError> {
        let Some(limit) = limit else {
            return Ok(self.page_size);
        };
        if limit <= 0 {
            return Err(VideoError::InvalidRequest(
                "limit must be a positive number".to_string(),
            ));
        }
        if limit > i64::from(self.max_page_size) {
            return Err(VideoError::InvalidRequest(format!(
                "limit must be <= {}",
                self.max_page_size
            )));
        }
        // Bounded by `max_page_size` above.
        Ok(limit as u32)
    }
}

fn is_valid_video_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
}
