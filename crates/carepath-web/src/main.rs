//! CarePath triage server
//!
//! Run with: cargo run -p carepath-web

use tracing::info;
use tracing_subscriber::EnvFilter;

use carepath_common::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting CarePath triage server...");

    let addr = config.server.bind_addr();
    let state = carepath_web::state::AppState::from_config(config)?;
    let app = carepath_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
