use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use darkroom_server::app::App;
use darkroom_server::config::DarkroomConfig;
use darkroom_server::state_factory::create_state;
use darkroom_server::telemetry;

/// Photo-session bot: watches the capture folder and delivers photos to
/// clients over Telegram or Yandex Disk.
#[derive(Parser, Debug)]
#[command(name = "darkroom", about = "Photo-session delivery bot")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "darkroom.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Default)]
enum Commands {
    /// Run the bot (default).
    #[default]
    Run,
    /// Create the state backend's tables, then exit.
    Migrate,
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = DarkroomConfig::load(&cli.config)?;
    telemetry::init(&config.logging)?;

    if !cli.config.exists() {
        info!(path = %cli.config.display(), "config file not found, using defaults");
    }

    match cli.command.unwrap_or_default() {
        Commands::Run => run(&config).await,
        Commands::Migrate => run_migrate(&config).await,
        Commands::CheckConfig => {
            config.validate()?;
            info!(path = %cli.config.display(), "configuration is valid");
            Ok(())
        }
    }
}

async fn run(config: &DarkroomConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    let app = App::build(config).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    app.run(shutdown).await;
    info!("darkroom stopped");
    Ok(())
}

/// Run the `migrate` subcommand: open the configured state backend, which
/// creates its schema, and exit.
async fn run_migrate(config: &DarkroomConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(backend = %config.state.backend, "running state backend migrations");
    let _store = create_state(&config.state).await?;
    info!(backend = %config.state.backend, "state backend migrations complete");
    Ok(())
}

/// Cancel `token` on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
    token.cancel();
}
