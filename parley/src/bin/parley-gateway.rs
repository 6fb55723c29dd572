use std::process::ExitCode;
use std::sync::Arc;

use parley::{
    GatewayConfig, RuntimeHooks, anthropic_provider, build_runtime_with, gateway_registry,
    in_memory_store, serve,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "gateway exited");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::from_env()?;
    let hooks = RuntimeHooks::observed();

    let provider = anthropic_provider(&config, &hooks)?;
    let store = in_memory_store();
    let registry = gateway_registry(Arc::clone(&store))?;
    let runtime = build_runtime_with(provider, Arc::new(registry), store, config.policy(), hooks);

    let listener = TcpListener::bind(config.bind).await?;
    serve(listener, runtime).await?;
    Ok(())
}
