//! Plateful CLI - Availability checks and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # List bookable slots for an order on a date
//! plateful slots --order ord_8c41 --date 2026-09-01 --mode pickup
//!
//! # List saved payment methods
//! plateful cards list
//!
//! # Delete a saved payment method
//! plateful cards delete --id card_19af
//!
//! # Show the account profile
//! plateful profile show
//! ```
//!
//! # Commands
//!
//! - `slots` - Query bookable schedule slots for an order
//! - `cards` - Manage saved payment methods
//! - `profile` - Inspect the account profile

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use plateful_checkout::config::CheckoutConfig;
use plateful_core::FulfillmentMethod;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "plateful")]
#[command(author, version, about = "Plateful CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query bookable schedule slots for an order
    Slots {
        /// Order reference issued by the backend at checkout open
        #[arg(short, long)]
        order: String,

        /// Calendar date to query (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Fulfillment method (`pickup`, `delivery`)
        #[arg(short, long, default_value = "pickup")]
        mode: FulfillmentMethod,
    },
    /// Manage saved payment methods
    Cards {
        #[command(subcommand)]
        action: CardsAction,
    },
    /// Inspect the account profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum CardsAction {
    /// List saved payment methods
    List,
    /// Delete a saved payment method
    Delete {
        /// Card id to delete
        #[arg(short, long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the account profile
    Show,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CheckoutConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = CheckoutConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "plateful_cli=info,plateful_checkout=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CheckoutConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Slots { order, date, mode } => {
            commands::slots::list(&config.api, &order, date, mode).await?;
        }
        Commands::Cards { action } => match action {
            CardsAction::List => commands::cards::list(&config.api).await?,
            CardsAction::Delete { id } => commands::cards::delete(&config.api, &id).await?,
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&config.api).await?,
        },
    }
    Ok(())
}
