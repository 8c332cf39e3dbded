use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use strangerq_api::AppState;
use strangerq_entropy::{QuantumSource, RandomSource, SourceConfig, MAX_REQUEST_BYTES};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "server", about = "Stranger Q random-generation API")]
struct Args {
    /// Listen address.
    #[arg(long, env = "STRANGERQ_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Remote QRNG endpoint.
    #[arg(
        long,
        env = "STRANGERQ_QRNG_ENDPOINT",
        default_value = strangerq_entropy::DEFAULT_ENDPOINT
    )]
    qrng_endpoint: Url,

    /// Bound on the remote attempt before falling back to the CSPRNG.
    #[arg(long, env = "STRANGERQ_TIMEOUT_MS", default_value_t = 2_000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let source: Arc<dyn RandomSource> = Arc::new(QuantumSource::new(SourceConfig {
        endpoint: args.qrng_endpoint,
        timeout: Duration::from_millis(args.timeout_ms),
        max_bytes: MAX_REQUEST_BYTES,
    }));

    let app = strangerq_api::router(AppState { source });

    tracing::info!(bind = %args.bind, "stranger q api starting");

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
