use serde::{Deserialize, Serialize};

use crate::domain::value_objects::assets::StoredAsset;

/// Application view of a stored video, rebuilt from the media service on every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub public_id: String,
    pub filename: String,
}

impl Video {
    /// Same projection as [`From<&StoredAsset>`] but preferring the context title
    /// over the display name, as the detail view does.
    pub fn from_asset_preferring_context_title(asset: &StoredAsset) -> Self {
        let mut video = Self::from(asset);
        if let Some(title) = asset.context_title() {
            video.title = title.to_string();
        }
        video
    }
}

impl From<&StoredAsset> for Video {
    fn from(asset: &StoredAsset) -> Self {
        let title = asset
            .display_name()
            .or_else(|| asset.context_title())
            .unwrap_or(asset.public_id.as_str())
            .to_string();

        Self {
            id: asset.asset_id.clone(),
            title,
            url: asset.secure_url.clone(),
            width: asset.width.unwrap_or_default(),
            height: asset.height.unwrap_or_default(),
            public_id: asset.public_id.clone(),
            filename: asset.resolved_filename(),
        }
    }
}

/// Projects search records into videos, one for one and in upstream order.
pub fn map_video_resources(resources: &[StoredAsset]) -> Vec<Video> {
    resources.iter().map(Video::from).collect()
}
