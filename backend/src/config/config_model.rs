use crates::infra::cloudinary::CloudinaryConfig;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub cloudinary: CloudinaryConfig,
    pub videos: Videos,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// Seconds
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Videos {
    pub folder: String,
    pub default_title: String,
    pub max_upload_bytes: u64,
    pub page_size: u32,
    pub max_page_size: u32,
}
