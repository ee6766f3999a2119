use anyhow::{Context, Result, anyhow, bail};
use crates::infra::cloudinary::{CloudinaryConfig, SignatureAlgorithm};
use std::fmt::Display;
use std::str::FromStr;
use url::Url;

use super::config_model::{BackendServer, DotEnvyConfig, Videos};

const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";
const BYTES_PER_MIB: u64 = 1024 * 1024;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let backend_server = BackendServer {
        port: parsed_or(&lookup, "SERVER_PORT_BACKEND", 8080)?,
        body_limit: parsed_or(&lookup, "SERVER_BODY_LIMIT", 110)?,
        timeout: parsed_or(&lookup, "SERVER_TIMEOUT", 360)?,
    };

    let api_base_url = optional(&lookup, "CLOUDINARY_API_BASE_URL")
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    let cloudinary = CloudinaryConfig {
        cloud_name: required(&lookup, "CLOUDINARY_CLOUD_NAME")?,
        api_key: required(&lookup, "CLOUDINARY_API_KEY")?,
        api_secret: required(&lookup, "CLOUDINARY_API_SECRET")?,
        api_base_url: Url::parse(&api_base_url)
            .with_context(|| format!("CLOUDINARY_API_BASE_URL is invalid: {api_base_url}"))?,
        signature_algorithm: parsed_or(
            &lookup,
            "CLOUDINARY_SIGNATURE_ALGORITHM",
            SignatureAlgorithm::Sha1,
        )?,
        connect_timeout_secs: parsed_or(&lookup, "CLOUDINARY_CONNECT_TIMEOUT", 10)?,
        request_timeout_secs: parsed_or(&lookup, "CLOUDINARY_REQUEST_TIMEOUT", 300)?,
    };

    let max_upload_mb: u64 = parsed_or(&lookup, "VIDEO_MAX_UPLOAD_MB", 100)?;

    if max_upload_mb == 0 {
        bail!("VIDEO_MAX_UPLOAD_MB must be greater than zero");
    }
    if max_upload_mb > backend_server.body_limit {
        bail!(
            "VIDEO_MAX_UPLOAD_MB ({}) must not exceed SERVER_BODY_LIMIT ({})",
            max_upload_mb,
            backend_server.body_limit
        );
    }
    // The server timeout wraps the whole upload, upstream call included.
    if backend_server.timeout <= cloudinary.request_timeout_secs {
        bail!(
            "SERVER_TIMEOUT ({}) must be greater than CLOUDINARY_REQUEST_TIMEOUT ({})",
            backend_server.timeout,
            cloudinary.request_timeout_secs
        );
    }
    mib_to_bytes(backend_server.body_limit, "SERVER_BODY_LIMIT")?;

    let videos = Videos {
        folder: optional(&lookup, "VIDEO_FOLDER")
            .map(|folder| folder.trim_matches('/').to_string())
            .filter(|folder| !folder.is_empty())
            .unwrap_or_else(|| "video-player".to_string()),
        default_title: optional(&lookup, "VIDEO_DEFAULT_TITLE")
            .unwrap_or_else(|| "Untitled Video".to_string()),
        max_upload_bytes: mib_to_bytes(max_upload_mb, "VIDEO_MAX_UPLOAD_MB")?,
        page_size: parsed_or(&lookup, "VIDEO_PAGE_SIZE", 12)?,
        max_page_size: parsed_or(&lookup, "VIDEO_MAX_PAGE_SIZE", 100)?,
    };

    if videos.page_size == 0 || videos.page_size > videos.max_page_size {
        bail!(
            "VIDEO_PAGE_SIZE must be between 1 and VIDEO_MAX_PAGE_SIZE ({})",
            videos.max_page_size
        );
    }

    Ok(DotEnvyConfig {
        backend_server,
        cloudinary,
        videos,
    })
}

fn mib_to_bytes(mib: u64, key: &str) -> Result<u64> {
    mib.checked_mul(BYTES_PER_MIB)
        .filter(|bytes| usize::try_from(*bytes).is_ok())
        .with_context(|| format!("{key} is too large (value: {mib})"))
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).with_context(|| format!("{key} is required"))
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match optional(lookup, key) {
        Some(raw) => raw
            .parse()
            .map_err(|err| anyhow!("{key} is invalid (value: {raw}): {err}")),
        None => Ok(default),
    }
}
