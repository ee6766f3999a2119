use bytes::Bytes;

use super::asset_context::AssetContext;

/// A fully buffered video ready to be handed to the media service as a single upload.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoUpload {
    pub payload: Bytes,
    pub filename: String,
    pub folder: String,
    pub display_name: String,
    pub context: AssetContext,
}

impl VideoUpload {
    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }
}
