use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use edugrade::{
    api::{AppState, router},
    config::Config,
    remark::OpenAiDrafter,
    store::RecordStore,
    utils::init_log,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short = 'H', long)]
    host: Option<String>,
    #[arg(short, long)]
    port: Option<u16>,
    /// Write daily-rotated logs here instead of stdout
    #[arg(short, long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.log_dir.is_some() {
        config.log_dir = args.log_dir;
    }
    let _guard = init_log(config.log_dir.clone())?;
    info!("config: {:?}", config);

    let store = RecordStore::seeded().into_shared();
    let drafter = Arc::new(OpenAiDrafter::new(&config.ai));
    let app = router(AppState::new(store, drafter));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    println!("Starting server at http://{}", listener.local_addr()?);
    println!(
        "Swagger UI available at http://{}/swagger-ui/",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;
    Ok(())
}
