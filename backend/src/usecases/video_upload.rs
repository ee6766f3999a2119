use bytes::Bytes;
use crates::domain::{
    errors::VideoError,
    repositories::media_storage::MediaStorageClient,
    value_objects::{asset_context::AssetContext, assets::StoredAsset, uploads::VideoUpload},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::config_model::Videos;

const FALLBACK_FILENAME: &str = "video";

/// File part of an upload form, already buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VideoUploadForm {
    pub file: Option<UploadedFile>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedVideoDto {
    pub id: String,
    pub url: String,
    pub public_id: String,
    pub filename: String,
    pub title: String,
}

impl UploadedVideoDto {
    fn from_asset(asset: StoredAsset, title: String) -> Self {
        let title = asset
            .context_title()
            .map(str::to_string)
            .unwrap_or(title);
        let filename = asset.resolved_filename();

        Self {
            id: asset.asset_id,
            url: asset.secure_url,
            public_id: asset.public_id,
            filename,
            title,
        }
    }
}

/// Forwards a buffered upload to the media service as a single operation.
pub struct VideoUploadUseCase<M>
where
    M: MediaStorageClient + Send + Sync + 'static,
{
    storage: Arc<M>,
    folder: String,
    default_title: String,
    max_upload_bytes: u64,
}

impl<M> VideoUploadUseCase<M>
where
    M: MediaStorageClient + Send + Sync + 'static,
{
    pub fn new(storage: Arc<M>, config: &Videos) -> Self {
        Self {
            storage,
            folder: config.folder.clone(),
            default_title: config.default_title.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Blank or missing titles become the placeholder; anything else is kept verbatim.
    pub fn resolve_title(&self, raw: Option<&str>) -> String {
        match raw {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => self.default_title.clone(),
        }
    }

    pub async fn upload(&self, form: VideoUploadForm) -> Result<UploadedVideoDto, VideoError> {
        let file = form
            .file
            .filter(|file| !file.bytes.is_empty())
            .ok_or(VideoError::MissingFile)?;

        if file.bytes.len() as u64 > self.max_upload_bytes {
            warn!(
                size_bytes = file.bytes.len(),
                limit_bytes = self.max_upload_bytes,
                "videos: upload rejected, file too large"
            );
            return Err(VideoError::PayloadTooLarge {
                limit_bytes: self.max_upload_bytes,
            });
        }

        let title = self.resolve_title(form.title.as_deref());
        let filename = file
            .filename
            .as_deref()
            .map(base_filename)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();

        let upload = VideoUpload {
            payload: file.bytes,
            filename,
            folder: self.folder.clone(),
            display_name: title.clone(),
            context: AssetContext::with_title(title.clone()),
        };

        info!(
            folder = %upload.folder,
            size_bytes = upload.size_bytes(),
            "videos: forwarding upload to media storage"
        );

        // Detached so a client disconnect cannot abort the upstream call halfway;
        // the outcome is logged either way.
        let storage = Arc::clone(&self.storage);
        let task = tokio::spawn(async move {
            let result = storage.upload_video(upload).await;
            match &result {
                Ok(asset) => info!(
                    asset_id = %asset.asset_id,
                    public_id = %asset.public_id,
                    "videos: upload stored"
                ),
                Err(err) => error!(error = ?err, "videos: upload to media storage failed"),
            }
            result
        });

        let asset = task
            .await
            .map_err(|err| VideoError::upstream(format!("upload task failed: {err}")))??;

        Ok(UploadedVideoDto::from_asset(asset, title))
    }
}

fn base_filename(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        repositories::media_storage::MockMediaStorageClient,
        value_objects::assets::StoredContext,
    };
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn videos_config() -> Videos {
        Videos {
            folder: "video-player".to_string(),
            default_title: "Untitled Video".to_string(),
            max_upload_bytes: 1024,
            page_size: 12,
            max_page_size: 100,
        }
    }

    fn stored_asset(title: &str) -> StoredAsset {
        StoredAsset {
            asset_id: "asset-1".to_string(),
            public_id: "video-player/abc123".to_string(),
            secure_url: "https://res.cloudinary.com/demo/video/upload/v1/video-player/abc123.mp4"
                .to_string(),
            display_name: Some(title.to_string()),
            original_filename: Some("trip".to_string()),
            context: Some(StoredContext {
                custom: AssetContext::with_title(title),
            }),
            ..StoredAsset::default()
        }
    }

    fn form(bytes: &'static [u8], title: Option<&str>) -> VideoUploadForm {
        VideoUploadForm {
            file: Some(UploadedFile {
                bytes: Bytes::from_static(bytes),
                filename: Some("trip.mp4".to_string()),
            }),
            title: title.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn uploads_with_title_metadata() {
        let mut storage = MockMediaStorageClient::new();
        let asset = stored_asset("My Trip");

        storage
            .expect_upload_video()
            .withf(|upload| {
                upload.folder == "video-player"
                    && upload.display_name == "My Trip"
                    && upload.context.title() == Some("My Trip")
                    && upload.filename == "trip.mp4"
                    && upload.payload.as_ref() == b"video"
            })
            .times(1)
            .returning(move |_| {
                let asset = asset.clone();
                Box::pin(async move { Ok(asset) })
            });

        let usecase = VideoUploadUseCase::new(Arc::new(storage), &videos_config());
        let uploaded = usecase
            .upload(form(b"video", Some("My Trip")))
            .await
            .unwrap();

        assert_eq!(
            uploaded,
            UploadedVideoDto {
                id: "asset-1".to_string(),
                url: "https://res.cloudinary.com/demo/video/upload/v1/video-player/abc123.mp4"
                    .to_string(),
                public_id: "video-player/abc123".to_string(),
                filename: "trip".to_string(),
                title: "My Trip".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn missing_file_makes_no_upstream_call() {
        let mut storage = MockMediaStorageClient::new();
        storage.expect_upload_video().never();

        let usecase = VideoUploadUseCase::new(Arc::new(storage), &videos_config());
        let result = usecase
            .upload(VideoUploadForm {
                file: None,
                title: Some("My Trip".to_string()),
            })
            .await;

        assert_eq!(result, Err(VideoError::MissingFile));
    }

    #[tokio::test]
    async fn empty_file_counts_as_missing() {
        let mut storage = MockMediaStorageClient::new();
        storage.expect_upload_video().never();

        let usecase = VideoUploadUseCase::new(Arc::new(storage), &videos_config());
        let result = usecase.upload(form(b"", Some("Empty"))).await;

        assert_eq!(result, Err(VideoError::MissingFile));
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_before_upload() {
        let mut storage = MockMediaStorageClient::new();
        storage.expect_upload_video().never();

        let mut config = videos_config();
        config.max_upload_bytes = 4;
        let usecase = VideoUploadUseCase::new(Arc::new(storage), &config);

        let result = usecase.upload(form(b"too large", None)).await;

        assert_eq!(result, Err(VideoError::PayloadTooLarge { limit_bytes: 4 }));
    }

    #[tokio::test]
    async fn title_with_separators_is_kept_verbatim() {
        let mut storage = MockMediaStorageClient::new();
        let asset = stored_asset("a=b|c");

        storage
            .expect_upload_video()
            .withf(|upload| upload.context.title() == Some("a=b|c"))
            .times(1)
            .returning(move |_| {
                let asset = asset.clone();
                Box::pin(async move { Ok(asset) })
            });

        let usecase = VideoUploadUseCase::new(Arc::new(storage), &videos_config());
        let uploaded = usecase.upload(form(b"video", Some("a=b|c"))).await.unwrap();

        assert_eq!(uploaded.title, "a=b|c");
    }

    #[tokio::test]
    async fn upstream_failure_is_propagated() {
        let mut storage = MockMediaStorageClient::new();
        storage.expect_upload_video().times(1).returning(|_| {
            Box::pin(async {
                Err(VideoError::upstream(
                    "video upload failed: quota exceeded (status 420)",
                ))
            })
        });

        let usecase = VideoUploadUseCase::new(Arc::new(storage), &videos_config());
        let result = usecase.upload(form(b"video", Some("My Trip"))).await;

        assert_eq!(
            result,
            Err(VideoError::UpstreamFailure(
                "video upload failed: quota exceeded (status 420)".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn dropped_caller_does_not_abort_upstream_upload() {
        let mut storage = MockMediaStorageClient::new();
        let asset = stored_asset("My Trip");
        let stored = Arc::new(AtomicBool::new(false));
        let stored_flag = Arc::clone(&stored);

        storage.expect_upload_video().times(1).returning(move |_| {
            let asset = asset.clone();
            let stored = Arc::clone(&stored_flag);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                stored.store(true, Ordering::SeqCst);
                Ok(asset)
            })
        });

        let usecase = VideoUploadUseCase::new(Arc::new(storage), &videos_config());
        let caller = tokio::time::timeout(
            Duration::from_millis(20),
            usecase.upload(form(b"video", Some("My Trip"))),
        )
        .await;

        assert!(caller.is_err());
        assert!(!stored.load(Ordering::SeqCst));

        for _ in 0..50 {
            if stored.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(stored.load(Ordering::SeqCst));
    }

    #[test]
    fn resolves_placeholder_title() {
        let usecase =
            VideoUploadUseCase::new(Arc::new(MockMediaStorageClient::new()), &videos_config());

        assert_eq!(usecase.resolve_title(None), "Untitled Video");
        assert_eq!(usecase.resolve_title(Some("")), "Untitled Video");
        assert_eq!(usecase.resolve_title(Some("  ")), "Untitled Video");
        assert_eq!(usecase.resolve_title(Some(" My Trip ")), " My Trip ");
    }

    #[test]
    fn strips_client_side_directories_from_filename() {
        assert_eq!(base_filename("C:\\Users\\me\\trip.mp4"), "trip.mp4");
        assert_eq!(base_filename("../../trip.mp4"), "trip.mp4");
        assert_eq!(base_filename("trip.mp4"), "trip.mp4");
    }
}
