use std::net::SocketAddr;

use qr_server::{AppState, Config, api, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(
        &config.log_level,
        config.environment == "production",
        config.log_dir.as_deref(),
    )?;

    tracing::info!(environment = %config.environment, "QR server starting");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::initialize(config).await?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
