//! QKart CLI - Browse, search and shop from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog
//! qkart products
//!
//! # Search by name or category
//! qkart search headphones
//!
//! # Log in (persists the session) and add to the cart
//! qkart login -e crio.do@example.com -p learnbydoing
//! qkart cart add KCRwjF7lN97HnEaY
//! qkart cart inc KCRwjF7lN97HnEaY
//!
//! # Interactive session with debounced search
//! qkart shell
//! ```
//!
//! # Commands
//!
//! - `products`, `search` - Browse the catalog
//! - `login`, `register`, `logout`, `whoami` - Account
//! - `cart show|add|inc|dec` - Cart
//! - `shell` - Interactive storefront

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use qkart_storefront::Storefront;
use qkart_storefront::api::ApiError;
use qkart_storefront::config::{ConfigError, StorefrontConfig};
use qkart_storefront::error::AppError;
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod console;

use console::ConsoleNotifier;

#[derive(Parser)]
#[command(name = "qkart")]
#[command(author, version, about = "QKart storefront in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all products
    Products,
    /// Search products by name or category
    Search {
        /// Text to search for
        text: String,
    },
    /// Log in and remember the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        /// Display name (at least 3 characters)
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Password again
        #[arg(short, long)]
        confirm: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Interactive storefront; plain lines search, `/help` lists commands
    Shell,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its total
    Show,
    /// Add a product that is not in the cart yet
    Add {
        /// Product id
        product_id: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Increase a product's quantity by one
    Inc {
        /// Product id
        product_id: String,
    },
    /// Decrease a product's quantity by one
    Dec {
        /// Product id
        product_id: String,
    },
}

/// Errors that end the process with a failure status.
#[derive(Debug, Error)]
enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not create API client: {0}")]
    Client(#[from] ApiError),

    /// Already shown to the user as a notification.
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("{e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qkart_storefront=info,qkart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        match e {
            CliError::App(_) => tracing::debug!("Command failed: {e}"),
            _ => tracing::error!("Command failed: {e}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let mut storefront = Storefront::from_config(config, Arc::new(ConsoleNotifier))?;
    storefront.load_session()?;

    match cli.command {
        Commands::Products => commands::catalog::products(&mut storefront).await?,
        Commands::Search { text } => commands::catalog::search(&mut storefront, &text).await?,
        Commands::Login { email, password } => {
            commands::auth::login(&mut storefront, &email, &password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            confirm,
        } => {
            commands::auth::register(&mut storefront, name, email, password, confirm).await?;
        }
        Commands::Logout => commands::auth::logout(&mut storefront)?,
        Commands::Whoami => commands::auth::whoami(&storefront),
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&mut storefront).await?,
            CartAction::Add { product_id, qty } => {
                commands::cart::add(&mut storefront, &product_id, qty).await?;
            }
            CartAction::Inc { product_id } => {
                commands::cart::step(&mut storefront, &product_id, qkart_core::Intent::Add).await?;
            }
            CartAction::Dec { product_id } => {
                commands::cart::step(&mut storefront, &product_id, qkart_core::Intent::Remove)
                    .await?;
            }
        },
        Commands::Shell => commands::shell::run(&mut storefront).await?,
    }
    Ok(())
}
