pub mod video_catalog;
pub mod video_upload;
