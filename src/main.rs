use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use farmers_markets::commands::{run_repl, AppState};
use farmers_markets::config::Settings;
use farmers_markets::services::{MarketCatalog, ReviewStore, UserStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Interactive console for farmers markets and their reviews
#[derive(Debug, Parser)]
#[command(name = "farmers-markets", version, about)]
struct Cli {
    /// Settings file (TOML); defaults to config/default.toml and config/local.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Farmers markets CSV export
    #[arg(long)]
    markets: Option<PathBuf>,

    /// Users JSON file
    #[arg(long)]
    users: Option<PathBuf>,

    /// Reviews JSON file
    #[arg(long)]
    reviews: Option<PathBuf>,
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn load_state(settings: &Settings) -> Result<AppState, Box<dyn std::error::Error>> {
    let catalog = MarketCatalog::load_csv(&settings.data.markets_csv)?;
    if catalog.skipped() > 0 {
        println!("Предупреждение: пропущено строк CSV: {}", catalog.skipped());
    }

    let users = UserStore::load(&settings.data.users_json, settings.accounts.hash_cost())?;
    let reviews = ReviewStore::load(&settings.data.reviews_json)?;

    Ok(AppState::new(catalog, users, reviews, settings.query.default_page_size))
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = cli.markets {
        settings.data.markets_csv = path;
    }
    if let Some(path) = cli.users {
        settings.data.users_json = path;
    }
    if let Some(path) = cli.reviews {
        settings.data.reviews_json = path;
    }

    init_logging(&settings.logging.level, &settings.logging.format);
    info!("Configuration loaded: {:?}", settings.data);

    let mut state = match load_state(&settings) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to load data: {}", e);
            eprintln!("Ошибка загрузки данных: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Farmers Markets CLI");
    println!("Введите команду: help  (выход: exit)");

    let stdin = io::stdin();
    if let Err(e) = run_repl(&mut state, stdin.lock(), io::stdout()) {
        error!("Console I/O failed: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
