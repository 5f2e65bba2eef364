use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use folio_admin::backend::Backend;
use folio_admin::config::{self, AssetHostConfig};
use folio_admin::upload::AssetUploader;
use folio_admin::web::{self, AppState};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Local identities and documents, used when Firebase is not configured.
    #[arg(long, default_value = folio_admin::cli::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    folio_admin::logging::init_with_default(folio_admin::logging::APP_FILTER)?;
    config::load_dotenv();

    let args = AppArgs::parse();
    tracing::info!(?args, "starting folio-admin-app");

    let client = reqwest::Client::new();
    let backend = Backend::from_env(client.clone(), &args.data_dir);
    let asset_host = AssetHostConfig::from_env();
    match &asset_host {
        Some(host) => tracing::info!(cloud_name = %host.cloud_name, "image uploads enabled"),
        None => tracing::warn!("asset host not configured; image uploads will fail"),
    }
    let state = AppState::new(backend, AssetUploader::new(client, asset_host));
    let app = web::router(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
