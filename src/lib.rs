pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;

pub use config::Config;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Entry point called from `main` once the runtime is up.
///
/// Initializes the tracing subscriber from the configured log level
/// (`RUST_LOG` wins when set) and dispatches to the CLI.
pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = cli::Cli::parse();

    match cli.command.unwrap_or(cli::Commands::Serve) {
        cli::Commands::Serve => serve(config).await,
        cli::Commands::Init => cli::cmd_init(),
        cli::Commands::User { command } => cli::cmd_user(&config, command).await,
        cli::Commands::Location { command } => cli::cmd_location(&config, command).await,
    }
}

/// Run the web server until Ctrl+C.
async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Birdie v{} starting...", env!("CARGO_PKG_VERSION"));

    let state = api::create_app_state(config.clone()).await?;
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => tracing::error!("Error listening for shutdown: {e}"),
    }
}
