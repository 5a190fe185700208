//! Mirrorcraft CLI - drive a storefront session from the terminal.
//!
//! State is kept in `STOREFRONT_STATE_DIR` between invocations, so a cart
//! built by one command is there for the next.
//!
//! # Usage
//!
//! ```bash
//! # Log in, then sync the wishlist from the server
//! mc-cli account login -e asha@example.in
//! mc-cli wishlist sync
//!
//! # Build a cart
//! mc-cli cart add 65f1c0 --title "Arch Mirror" --price "₹1,499" -q 2
//! mc-cli cart show
//!
//! # Orders
//! mc-cli orders list --force
//! mc-cli orders cancel 66a01b
//! ```
//!
//! # Commands
//!
//! - `cart` - Local cart: add, remove, set quantity, show, clear, mirror
//! - `wishlist` - Wishlist with server sync
//! - `orders` - Order history, cancel, tracking
//! - `account` - Login, logout, registration, profile
//! - `catalog` - Products and categories
//! - `theme` - Light/dark preference

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mirrorcraft_storefront::StorefrontConfig;

mod commands;

use commands::{
    AccountAction, CartAction, CatalogAction, CliError, OrdersAction, ThemeAction, WishlistAction,
};

#[derive(Parser)]
#[command(name = "mc-cli")]
#[command(author, version, about = "Mirrorcraft storefront client")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// View and manage orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Log in, log out and manage the profile
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Browse products and categories
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Show or switch the colour theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
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
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialised before the tracing subscriber
    let sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mirrorcraft_storefront=info,mc_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        e.report();
        eprintln!("Error: {e}");
        // exit() skips destructors; flush queued events first
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let storefront = commands::open_session(config)?;
    let out = commands::Output::new(cli.json);

    match cli.command {
        Commands::Cart { action } => commands::cart::run(&storefront, &out, action).await,
        Commands::Wishlist { action } => commands::wishlist::run(&storefront, &out, action).await,
        Commands::Orders { action } => commands::orders::run(&storefront, &out, action).await,
        Commands::Account { action } => commands::account::run(&storefront, &out, action).await,
        Commands::Catalog { action } => commands::catalog::run(&storefront, &out, action).await,
        Commands::Theme { action } => commands::theme::run(&storefront, &out, action),
    }
}
