//! Task tree server binary.

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use task_tree_server::auth::TokenService;
use task_tree_server::config::Config;
use task_tree_server::db::Database;
use task_tree_server::server::{self, AppState};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "task-tree-server", version, about)]
struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the database path from the config.
    #[arg(long)]
    database: Option<PathBuf>,

    /// Override the listen port from the config.
    #[arg(short, long)]
    port: Option<u16>,

    /// Log destination: "off", "stdout", "stderr", or a file path.
    #[arg(long, default_value = "stderr")]
    log: String,

    /// Enable debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "off" => {}
        "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            let file = OpenOptions::new().create(true).append(true).open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.server.db_path = database;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    info!(
        "Starting task-tree-server v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Database: {:?}", config.server.db_path);

    let db = Database::open(&config.server.db_path)?;
    let tokens = TokenService::new(
        &config.auth.secret,
        config.auth.token_ttl_minutes,
        config.auth.refresh_after_minutes,
    );

    let app = server::router(AppState { db, tokens });

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
