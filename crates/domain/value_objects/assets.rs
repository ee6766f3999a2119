use serde::{Deserialize, Serialize};

use super::asset_context::AssetContext;

/// Asset record as returned by the media service's upload, search and resource endpoints.
///
/// The service is the system of record; this is never persisted locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    pub asset_id: String,
    pub public_id: String,
    pub secure_url: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub context: Option<StoredContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContext {
    #[serde(default)]
    pub custom: AssetContext,
}

impl StoredAsset {
    pub fn context_title(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|context| context.custom.title())
            .filter(|title| !title.is_empty())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Filename as stored upstream, falling back to the original filename and then
    /// to the last segment of the public id.
    pub fn resolved_filename(&self) -> String {
        [self.filename.as_deref(), self.original_filename.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.public_id
                    .rsplit('/')
                    .next()
                    .unwrap_or(&self.public_id)
                    .to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_search_record_with_context() {
        let raw = json!({
            "asset_id": "a1b2c3",
            "public_id": "video-player/abc123",
            "secure_url": "https://res.cloudinary.com/demo/video/upload/v1/video-player/abc123.mp4",
            "display_name": "My Trip",
            "filename": "abc123",
            "width": 1920,
            "height": 1080,
            "format": "mp4",
            "bytes": 10485760,
            "duration": 12.5,
            "created_at": "2025-02-01T10:00:00Z",
            "context": { "custom": { "title": "My Trip" } },
            "tags": []
        });

        let asset: StoredAsset = serde_json::from_value(raw).expect("asset should parse");

        assert_eq!(asset.asset_id, "a1b2c3");
        assert_eq!(asset.width, Some(1920));
        assert_eq!(asset.context_title(), Some("My Trip"));
        assert_eq!(asset.resolved_filename(), "abc123");
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let raw = json!({
            "asset_id": "a1",
            "public_id": "video-player/xyz",
            "secure_url": "https://example.com/xyz.mp4"
        });

        let asset: StoredAsset = serde_json::from_value(raw).expect("asset should parse");

        assert_eq!(asset.display_name(), None);
        assert_eq!(asset.context_title(), None);
        assert_eq!(asset.resolved_filename(), "xyz");
    }

    #[test]
    fn falls_back_to_original_filename() {
        let asset = StoredAsset {
            public_id: "video-player/xyz".to_string(),
            original_filename: Some("holiday".to_string()),
            ..StoredAsset::default()
        };

        assert_eq!(asset.resolved_filename(), "holiday");
    }
}
