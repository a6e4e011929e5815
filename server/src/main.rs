use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};
use server::{build_app, AppConfig};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Reel store directory
    #[arg(long, default_value = "./store")]
    store: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Directory for generated videos
    #[arg(long, default_value = "./uploads/generated")]
    generated_dir: String,
    /// JSON synonym table to use instead of the built-in one
    #[arg(long)]
    synonyms: Option<String>,
    /// ffmpeg binary (defaults to FFMPEG_PATH, then `ffmpeg` on PATH)
    #[arg(long)]
    ffmpeg: Option<String>,
    /// Kill encodes that run longer than this many seconds
    #[arg(long)]
    encode_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let from_args = args.ffmpeg.is_some();
    let config = AppConfig {
        store_dir: PathBuf::from(&args.store),
        generated_dir: PathBuf::from(&args.generated_dir),
        synonyms: args.synonyms.map(PathBuf::from),
        ffmpeg: args.ffmpeg.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("ffmpeg")),
        encode_timeout: args.encode_timeout_secs.map(Duration::from_secs),
        ..AppConfig::default()
    }
    .with_env(from_args);
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
