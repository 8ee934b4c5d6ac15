use anyhow::Context;
use clap::Parser;
use screenshot_server::{create_router, Config, ScreenshotService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

#[derive(Parser)]
#[command(name = "screenshot-server")]
#[command(about = "Web page screenshot service with caching")]
#[command(version)]
struct Args {
    #[arg(long, default_value = "127.0.0.1", help = "Bind address")]
    host: String,

    #[arg(short, long, default_value = "3000", help = "Port to listen on")]
    port: u16,

    #[arg(long, help = "Configuration file path (JSON)")]
    config: Option<PathBuf>,

    #[arg(long, help = "Maximum concurrent captures")]
    max_concurrent: Option<usize>,

    #[arg(long, help = "Navigation timeout in seconds")]
    timeout: Option<u64>,

    #[arg(long, help = "Cache TTL in seconds")]
    cache_ttl: Option<u64>,

    #[arg(long, help = "Chrome executable path")]
    chrome_path: Option<String>,

    #[arg(long, help = "Include error detail in failure responses")]
    dev: bool,

    #[arg(long, help = "Enable verbose logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose);

    info!("Starting screenshot-server v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args).await?;

    let service = Arc::new(ScreenshotService::new(config.clone()));
    let _sweeper = service.cache().start_sweeper(config.cache_sweep_interval);

    let app = create_router(service);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("screenshot-server stopped");
    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

async fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = tokio::fs::read_to_string(config_path)
            .await
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        serde_json::from_str(&config_content).context("failed to parse configuration")?
    } else {
        Config::default()
    };

    // CLI arguments win over the file.
    if let Some(max_concurrent) = args.max_concurrent {
        config.max_concurrent_captures = max_concurrent;
    }

    if let Some(timeout) = args.timeout {
        config.navigation_timeout = Duration::from_secs(timeout);
    }

    if let Some(ttl) = args.cache_ttl {
        config.cache_ttl = Duration::from_secs(ttl);
    }

    if let Some(chrome_path) = &args.chrome_path {
        config.chrome_path = Some(chrome_path.clone());
    }

    if args.dev {
        config.dev_mode = true;
    }

    validate_config(&config)?;

    info!("Max concurrent captures: {}", config.max_concurrent_captures);
    info!("Navigation timeout: {:?}", config.navigation_timeout);
    info!("Cache TTL: {:?}", config.cache_ttl);

    Ok(config)
}

fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.max_concurrent_captures == 0 {
        anyhow::bail!("Max concurrent captures must be greater than 0");
    }

    if config.navigation_timeout.is_zero() {
        anyhow::bail!("Navigation timeout must be greater than 0");
    }

    if config.viewport.width == 0 || config.viewport.height == 0 {
        anyhow::bail!("Viewport dimensions must be greater than 0");
    }

    if config.viewport.width > config.max_dimension || config.viewport.height > config.max_dimension
    {
        anyhow::bail!("Default viewport exceeds max dimension");
    }

    Ok(())
}

async fn shutdown_signal() {
    let mut sigint =
        signal::unix::signal(signal::unix::SignalKind::interrupt()).expect("SIGINT handler");
    let mut sigterm =
        signal::unix::signal(signal::unix::SignalKind::terminate()).expect("SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => {
            info!("Received SIGINT");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
        }
    }
}
