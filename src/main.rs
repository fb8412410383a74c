use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use market_search_lib::commands;
use market_search_lib::domain::SearchRequest;
use market_search_lib::infrastructure::config::{defaults, AppConfig, ConfigManager};
use market_search_lib::infrastructure::logging::{init_logging_with_config, log_system_info};
use market_search_lib::SearchService;

#[derive(Parser)]
#[command(name = "market-search", version, about = "Marketplace product search scraper")]
struct Cli {
    /// Configuration file (default: user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search products and print the response as JSON
    Search {
        /// Search query
        query: String,
        /// Number of products to collect (default from configuration)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Upper bound on fetched result pages
        #[arg(long)]
        max_pages: Option<u32>,
    },
    /// Serve the HTTP API
    Serve {
        /// Listen address
        #[arg(long, default_value = defaults::SERVER_ADDR)]
        addr: String,
    },
    /// Inspect or reset the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file location
    Path,
    /// Update search defaults in the configuration file
    Set {
        /// Default number of products per query
        #[arg(long)]
        default_limit: Option<usize>,
        /// Default upper bound on fetched pages
        #[arg(long)]
        max_pages: Option<u32>,
    },
    /// Overwrite the configuration file with defaults
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config().await?;

    init_logging_with_config(&config.user.logging)?;
    log_system_info();

    match cli.command {
        Commands::Search {
            query,
            limit,
            max_pages,
        } => {
            if let Some(max_pages) = max_pages {
                config.user.max_pages = max_pages;
            }
            let limit = limit.unwrap_or(config.user.default_limit as i64);
            run_search(&config, SearchRequest::new(query, limit)).await
        }
        Commands::Serve { addr } => serve(&config, &addr).await,
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
                ConfigAction::Path => println!("{}", manager.config_path().display()),
                ConfigAction::Set {
                    default_limit,
                    max_pages,
                } => {
                    manager
                        .update_user_config(|user| {
                            if let Some(limit) = default_limit {
                                user.default_limit = limit;
                            }
                            if let Some(max_pages) = max_pages {
                                user.max_pages = max_pages;
                            }
                        })
                        .await?;
                    println!("Configuration updated: {}", manager.config_path().display());
                }
                ConfigAction::Reset => {
                    manager.reset_to_defaults().await?;
                    println!("Configuration reset: {}", manager.config_path().display());
                }
            }
            Ok(())
        }
    }
}

async fn run_search(config: &AppConfig, request: SearchRequest) -> Result<()> {
    let service = SearchService::from_config(config)?;

    // Ctrl-C abandons the query but still prints what was collected
    let cancellation_token = CancellationToken::new();
    let token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with collected products");
            token.cancel();
        }
    });

    let response = service
        .search_with_cancellation(request, cancellation_token)
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn serve(config: &AppConfig, addr: &str) -> Result<()> {
    let service = SearchService::from_config(config)?;
    let app = commands::router(service, config.user.default_limit);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🚀 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
        .context("HTTP server failed")
}
