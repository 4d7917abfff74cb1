use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timerstore::config::{self, Config};

mod commands;

use commands::ServeParams;

#[derive(Parser)]
#[command(
    name = "timerstore",
    version,
    about = "Timer resource registry with a REST API",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Environment file loaded before configuration (defaults to ./.env when present)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer API server
    Serve {
        /// Hostname resolvable via DNS, or 'localhost'
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Keep timers in memory only
        #[arg(long, default_value = "false", conflicts_with = "db")]
        memory: bool,

        /// Deadline for each storage call in seconds
        #[arg(long)]
        storage_timeout: Option<u64>,

        /// Disable the /metrics endpoint
        #[arg(long, default_value = "false")]
        no_metrics: bool,

        /// PEM certificate chain; serves HTTPS together with --keyfile
        #[arg(long, requires = "keyfile")]
        certfile: Option<PathBuf>,

        /// PEM private key for --certfile
        #[arg(long, requires = "certfile")]
        keyfile: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = config::load_dotenv(cli.env_file.as_deref())?;

    let mut config = Config::load(cli.config.as_deref())?.with_log_format(cli.log_format)?;

    setup_tracing(&config.logging.level, &config.logging.format, cli.verbose)?;

    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            db,
            memory,
            storage_timeout,
            no_metrics,
            certfile,
            keyfile,
        } => {
            ServeParams {
                host,
                port,
                db,
                memory,
                storage_timeout,
                no_metrics,
                certfile,
                keyfile,
            }
            .apply(&mut config);

            tracing::info!(
                address = %config.server.bind_address(),
                backend = ?config.storage.backend,
                timeout_secs = ?config.storage.timeout_secs,
                tls = config.server.tls_files().is_some(),
                "Starting serve command"
            );
            commands::serve(config).await?;
        }

        Commands::Config => {
            commands::show_config(&config)?;
        }
    }

    Ok(())
}

fn setup_tracing(level: &str, format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("timerstore=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
            tracing_subscriber::EnvFilter::try_new(format!(
                "timerstore={level},tower_http={level},warn"
            ))
        })?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
    }

    Ok(())
}
