use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wastewise_pickup::config::Config;
use wastewise_pickup::metrics::init_metrics;
use wastewise_pickup::server::PickupServer;
use wastewise_pickup::storage::{PickupStore, SqlitePickupStore};

#[derive(Parser)]
#[command(
    name = "wastewise-pickup",
    version,
    about = "Waste pickup scheduling service with cross-registry validation",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pickup HTTP server
    Serve {
        /// Bind address, overrides WASTEWISE_BIND_ADDRESS
        #[arg(short, long)]
        bind: Option<String>,

        /// SQLite database path, overrides WASTEWISE_SQLITE_PATH
        #[arg(long)]
        database: Option<String>,
    },

    /// List pickups stored in the local database
    List {
        /// SQLite database path, overrides WASTEWISE_SQLITE_PATH
        #[arg(long)]
        database: Option<String>,
    },

    /// Validate configuration and print the effective settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Serve { bind, database } => {
            tracing::info!(bind = ?bind, database = ?database, "Starting serve command");
            serve(bind, database).await?;
        }

        Commands::List { database } => {
            list(database)?;
        }

        Commands::CheckConfig => {
            check_config()?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("wastewise_pickup=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("wastewise_pickup=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn serve(bind: Option<String>, database: Option<String>) -> Result<()> {
    let mut config = Config::from_env()?;

    if let Some(bind) = bind {
        config.server.bind_address = bind.parse()?;
    }
    if let Some(database) = database {
        config.database.sqlite_path = database.into();
    }

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed; continuing without");
    }

    let server = PickupServer::new(config)?;

    server
        .start_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

fn list(database: Option<String>) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(database) = database {
        config.database.sqlite_path = database.into();
    }

    let store = SqlitePickupStore::new(&config.database.sqlite_path)?;
    let pickups = store.list_all()?;

    if pickups.is_empty() {
        println!("No pickups stored");
        return Ok(());
    }

    for pickup in pickups {
        println!(
            "{}  {}  {} -> {}  zone={} vehicle={} workers={},{}  {}",
            pickup.id,
            pickup.status,
            pickup.time_slot_start.to_rfc3339(),
            pickup.time_slot_end.to_rfc3339(),
            pickup.zone_id,
            pickup.vehicle_id,
            pickup.worker1_id,
            pickup.worker2_id,
            pickup.location_name,
        );
    }

    Ok(())
}

fn check_config() -> Result<()> {
    let config = Config::from_env()?;

    println!("Configuration OK");
    println!("  Bind address:   {}", config.server.bind_address);
    println!("  Zone service:   {}", config.services.zone_url);
    println!("  Worker service: {}", config.services.worker_url);
    println!("  Vehicle service: {}", config.services.vehicle_url);
    println!(
        "  Logging service: {}",
        config.services.logging_url.as_deref().unwrap_or("(none)")
    );
    println!("  Validation mode: {:?}", config.orchestration.validation_mode);
    println!("  Release order:   {:?}", config.orchestration.release_order);
    println!("  Database:        {}", config.database.sqlite_path.display());

    Ok(())
}
