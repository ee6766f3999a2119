use async_trait::async_trait;
use mockall::automock;

use crate::domain::errors::VideoError;
use crate::domain::value_objects::{
    assets::StoredAsset,
    search::{SearchPage, SearchQuery},
    uploads::VideoUpload,
};

/// External media-management service holding every uploaded video.
#[async_trait]
#[automock]
pub trait MediaStorageClient {
    /// Creates exactly one remote asset from the buffered payload.
    async fn upload_video(&self, upload: VideoUpload) -> Result<StoredAsset, VideoError>;

    async fn search_videos(&self, query: SearchQuery) -> Result<SearchPage, VideoError>;

    /// Looks up a single video by its full public id (`<folder>/<id>`).
    /// `Ok(None)` when the identifier does not resolve upstream.
    async fn find_video(&self, public_id: String) -> Result<Option<StoredAsset>, VideoError>;
}
