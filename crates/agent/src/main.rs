use heartbeat_agent::{cli, config, run};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let args = cli::parse();
    let cfg = config::load_from_file(&args.config_path)?;
    if args.check_only {
        tracing::info!(path = %args.config_path.display(), "configuration valid");
        return Ok(());
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "heartbeat agent starting");
    run::run(cfg).await
}
