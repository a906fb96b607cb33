use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use reps_api::mailer::{LogMailer, Mailer, SmtpMailer};
use reps_api::session::{SessionStore, run_gc_loop};
use reps_api::{AppState, AppStateInner};
use reps_bot::KeywordResponder;
use reps_types::config::{Configuration, LoadOutcome};

/// How often idle sessions are swept, in seconds.
const SESSION_GC_INTERVAL_SECS: u64 = 3600;

#[derive(Parser)]
#[command(name = "reps", version, about = "Class representative platform")]
struct Cli {
    /// Configuration file. Written with defaults if missing.
    #[arg(long, global = true, env = "REPS_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the website.
    #[command(visible_aliases = ["start", "web"])]
    Run,
    /// Run the keyword bot against a message relay.
    Bot {
        #[arg(long, env = "REPS_BOT_RELAY", default_value = "ws://127.0.0.1:9000/relay")]
        relay: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reps=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match Configuration::load_or_generate(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?
    {
        LoadOutcome::Loaded(config) => config,
        LoadOutcome::Generated => {
            info!(
                "Wrote a default configuration to {}. Edit it and start again.",
                cli.config.display()
            );
            return Ok(());
        }
    };

    match cli.command {
        Command::Run => serve(config, &cli.config).await,
        Command::Bot { relay } => {
            let responder = KeywordResponder::new(Arc::new(config));
            tokio::select! {
                _ = reps_bot::run(&relay, responder) => {}
                _ = shutdown_signal() => info!("Bot shutting down"),
            }
            Ok(())
        }
    }
}

async fn serve(config: Configuration, config_path: &Path) -> anyhow::Result<()> {
    let db = reps_db::Database::open(Path::new(&config.db_config.path))?;

    let mailer: Arc<dyn Mailer> = if config.dev_mode {
        warn!("Dev mode is on: mail is logged, not sent, and any OTP code is accepted");
        Arc::new(LogMailer)
    } else {
        Arc::new(SmtpMailer::from_config(&config)?)
    };

    let host = std::env::var("REPS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let addr: SocketAddr = format!("{}:{}", host, config.site_port).parse()?;

    let sessions = SessionStore::new();
    tokio::spawn(run_gc_loop(sessions.clone(), SESSION_GC_INTERVAL_SECS));

    let state: AppState = Arc::new(AppStateInner::new(
        db,
        config,
        config_path.to_path_buf(),
        sessions,
        mailer,
    ));

    let app = reps_api::router(state).layer(TraceLayer::new_for_http());

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
