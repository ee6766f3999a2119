use anyhow::Result;
use backend::axum_http::http_serve;
use backend::config::config_loader;
use crates::infra::cloudinary::CloudinaryClient;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let storage = CloudinaryClient::new(dotenvy_env.cloudinary.clone())?;
    info!(
        cloud_name = %dotenvy_env.cloudinary.cloud_name,
        folder = %dotenvy_env.videos.folder,
        "Media storage client has been initialized"
    );

    http_serve::start(Arc::new(dotenvy_env), Arc::new(storage)).await?;

    Ok(())
}
