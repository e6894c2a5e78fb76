//! Shopfront CLI - drive the cart engine from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Add products (repeat to increase the quantity)
//! sf-cli cart add --id 1 --price 9.99 --name "Mug"
//! sf-cli cart add --json '{"id": 2, "name": "Tote", "price": 24.5, "stock": 3}'
//!
//! # Inspect and edit
//! sf-cli cart show
//! sf-cli cart set --id 1 --quantity 3
//! sf-cli cart remove --id 2
//! sf-cli cart summary
//!
//! # Place a simulated order (clears the cart)
//! sf-cli checkout --first-name Ada --last-name Lovelace --email ada@example.com \
//!     --address "12 Analytical Way" --city London --state LDN --zip-code 10001 \
//!     --card-number "4242 4242 4242 4242" --expiry-date 09/29 --cvv 123 --card-name "A. Lovelace"
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and edit the saved cart
//! - `checkout` - Place a simulated order for the cart contents

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_cart::CartConfig;
use shopfront_core::{Price, ProductId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Shopfront cart tools")]
struct Cli {
    /// Directory holding the saved cart (overrides `SHOPFRONT_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and edit the saved cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Place a simulated order for the cart contents
    Checkout(commands::checkout::CheckoutArgs),
}

#[derive(Subcommand)]
enum CartCommand {
    /// List the items in the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product id (integers are stored as numbers)
        #[arg(long, required_unless_present = "json")]
        id: Option<ProductId>,

        /// Unit price
        #[arg(long, required_unless_present = "json")]
        price: Option<Price>,

        /// Product name
        #[arg(long)]
        name: Option<String>,

        /// Product image URL
        #[arg(long)]
        image_url: Option<String>,

        /// Full catalog record as JSON
        #[arg(long, conflicts_with_all = ["id", "price", "name", "image_url"])]
        json: Option<String>,
    },
    /// Remove a product from the cart
    Remove {
        #[arg(long)]
        id: ProductId,
    },
    /// Set the quantity of a product (0 or less removes it)
    Set {
        #[arg(long)]
        id: ProductId,

        #[arg(long, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Show subtotal, shipping, tax and total
    Summary,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

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

/// Initialize tracing with `EnvFilter` and Sentry integration.
fn init_tracing(json_logs: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_cart=info,sf_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = CartConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing(cli.json_logs);

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut config: CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let mut cart = commands::open_cart(&config).await;

    let result = match cli.command {
        Commands::Cart { action } => match action {
            CartCommand::Show => {
                commands::cart::show(&cart);
                Ok(())
            }
            CartCommand::Add {
                id,
                price,
                name,
                image_url,
                json,
            } => {
                let product = match json {
                    Some(json) => commands::cart::product_from_json(&json)?,
                    None => commands::cart::product_from_flags(id, price, name, image_url)?,
                };
                commands::cart::add(&mut cart, &product)
            }
            CartCommand::Remove { id } => {
                commands::cart::remove(&mut cart, &id);
                Ok(())
            }
            CartCommand::Set { id, quantity } => {
                commands::cart::set_quantity(&mut cart, &id, quantity);
                Ok(())
            }
            CartCommand::Clear => {
                commands::cart::clear(&mut cart);
                Ok(())
            }
            CartCommand::Summary => {
                commands::cart::summary(&cart, &config.pricing);
                Ok(())
            }
        },
        Commands::Checkout(args) => commands::checkout::run(&mut cart, args, &config.pricing),
    };

    // Let queued writes land before the runtime shuts down
    cart.flush().await;
    result
}
