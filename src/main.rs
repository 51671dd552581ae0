use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use tariff_engine::api::{AppState, ENGINE_VERSION, create_router};
use tariff_engine::config::ConfigLoader;
use tariff_engine::error::{EngineError, EngineResult};
use tariff_engine::logging;

#[derive(Debug, Clone, Parser)]
#[command(name = "tariff-engine", version, about = "HTTP API for the tariff compensation engine")]
struct Cli {
    /// Path to the tariff dataset (.json, .yaml or .yml)
    #[arg(long, env = "TARIFF_DATASET")]
    dataset: PathBuf,

    /// Address to listen on
    #[arg(long, env = "TARIFF_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
}

async fn run(cli: Cli) -> EngineResult<()> {
    let loader = ConfigLoader::load(&cli.dataset)?;
    let state = AppState::from_loader(loader);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .map_err(|err| EngineError::Server {
            message: format!("failed to bind {}: {err}", cli.bind),
        })?;

    info!(addr = %cli.bind, engine_version = ENGINE_VERSION, "tariff-engine listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| EngineError::Server {
            message: err.to_string(),
        })
}

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!(error = %err, "tariff-engine failed");
        std::process::exit(1);
    }
}
