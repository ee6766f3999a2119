use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Body, StatusCode,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{debug, error, info};
use url::Url;

use super::signature::{SignatureAlgorithm, sign_params};
use crate::domain::{
    errors::VideoError,
    repositories::media_storage::MediaStorageClient,
    value_objects::{
        assets::StoredAsset,
        search::{SearchPage, SearchQuery, VIDEO_RESOURCE_TYPE},
        uploads::VideoUpload,
    },
};

const API_VERSION: &str = "v1_1";
const DELIVERY_TYPE: &str = "upload";

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: Url,
    pub signature_algorithm: SignatureAlgorithm,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("signature_algorithm", &self.signature_algorithm)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Media service client built on reqwest: signed uploads, Basic-auth admin reads.
pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorEnvelope {
    error: CloudinaryErrorDetails,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorDetails {
    message: Option<String>,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build media service http client")?;

        Ok(Self { http, config })
    }

    /// `<base>/v1_1/<cloud>/<segments...>`, each segment percent-encoded.
    fn endpoint<'a, I>(&self, segments: I) -> Result<Url, VideoError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.config.api_base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| VideoError::upstream("media service base URL is not a valid base"))?;
            path.pop_if_empty()
                .push(API_VERSION)
                .push(&self.config.cloud_name)
                .extend(segments);
        }
        Ok(url)
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, VideoError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let upstream_message = serde_json::from_str::<CloudinaryErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.error.message);

        error!(
            status = %status,
            upstream_message = ?upstream_message,
            response_body = %body.chars().take(512).collect::<String>(),
            context = %context,
            "cloudinary: api request failed"
        );

        let detail = upstream_message.unwrap_or_else(|| body.chars().take(512).collect());
        Err(VideoError::UpstreamFailure(format!(
            "{}: {} (status {})",
            context,
            detail,
            status.as_u16()
        )))
    }
}

#[async_trait]
impl MediaStorageClient for CloudinaryClient {
    async fn upload_video(&self, upload: VideoUpload) -> Result<StoredAsset, VideoError> {
        let url = self.endpoint([VIDEO_RESOURCE_TYPE, DELIVERY_TYPE])?;
        let size_bytes = upload.size_bytes();

        let mut params: BTreeMap<&'static str, String> = BTreeMap::new();
        params.insert("timestamp", Utc::now().timestamp().to_string());
        params.insert("folder", upload.folder.clone());
        params.insert("display_name", upload.display_name.clone());
        params.insert("context", upload.context.to_wire());

        let signature = sign_params(
            &params,
            &self.config.api_secret,
            self.config.signature_algorithm,
        );

        let mime = mime_guess::from_path(&upload.filename).first_or_octet_stream();
        let file_part = Part::stream_with_length(Body::from(upload.payload), size_bytes as u64)
            .file_name(upload.filename.clone())
            .mime_str(mime.as_ref())
            .map_err(|err| VideoError::upstream(format!("invalid upload content type: {err}")))?;

        let mut form = Form::new().text("api_key", self.config.api_key.clone());
        for (key, value) in params {
            if !value.is_empty() {
                form = form.text(key, value);
            }
        }
        let form = form.text("signature", signature).part("file", file_part);

        debug!(
            folder = %upload.folder,
            filename = %upload.filename,
            size_bytes,
            "cloudinary: uploading video"
        );

        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        let resp = Self::ensure_success(resp, "video upload failed").await?;
        let asset = resp.json::<StoredAsset>().await.map_err(|err| {
            VideoError::upstream(format!("failed to decode upload response: {err}"))
        })?;

        info!(
            asset_id = %asset.asset_id,
            public_id = %asset.public_id,
            size_bytes,
            "cloudinary: video uploaded"
        );

        Ok(asset)
    }

    async fn search_videos(&self, query: SearchQuery) -> Result<SearchPage, VideoError> {
        let url = self.endpoint(["resources", "search"])?;

        let mut params = vec![
            ("expression", query.expression.to_string()),
            ("max_results", query.max_results.to_string()),
            ("with_field", "context".to_string()),
        ];
        if let Some(cursor) = query.next_cursor.filter(|cursor| !cursor.is_empty()) {
            params.push(("next_cursor", cursor));
        }

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .query(&params)
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        let resp = Self::ensure_success(resp, "video search failed").await?;
        let page = resp.json::<SearchPage>().await.map_err(|err| {
            VideoError::upstream(format!("failed to decode search response: {err}"))
        })?;

        debug!(
            expression = %query.expression,
            returned = page.resources.len(),
            total_count = ?page.total_count,
            "cloudinary: search completed"
        );

        Ok(page)
    }

    async fn find_video(&self, public_id: String) -> Result<Option<StoredAsset>, VideoError> {
        let segments = ["resources", VIDEO_RESOURCE_TYPE, DELIVERY_TYPE]
            .into_iter()
            .chain(public_id.split('/'));
        let url = self.endpoint(segments)?;

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!(%public_id, "cloudinary: resource not found");
            return Ok(None);
        }

        let resp = Self::ensure_success(resp, "video lookup failed").await?;
        let asset = resp.json::<StoredAsset>().await.map_err(|err| {
            VideoError::upstream(format!("failed to decode resource response: {err}"))
        })?;

        Ok(Some(asset))
    }
}

fn sanitize_reqwest_error(error: reqwest::Error) -> VideoError {
    if error.is_timeout() {
        return VideoError::upstream("media service request timed out");
    }
    if error.is_connect() {
        return VideoError::upstream("media service connection failed");
    }
    VideoError::upstream(format!("media service request failed: {error}"))
}
