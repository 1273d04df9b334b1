//! Storefront CLI - drive the cart and checkout from the terminal.
//!
//! Commands:
//! - `storefront login` / `logout` / `whoami` - Manage the session on this device
//! - `storefront catalog` - List configured products
//! - `storefront cart` - Inspect and edit the cart
//! - `storefront checkout` - Quote totals and pay for selected lines
//! - `storefront orders` - Browse completed orders
//! - `storefront config` - Manage configuration

mod backend;
mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{CartArgs, CheckoutArgs, ConfigArgs, LoginArgs, OrdersArgs};

/// Storefront CLI - cart, checkout and order history
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in on this device
    Login(LoginArgs),

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List products
    Catalog,

    /// Inspect and edit the cart
    Cart(CartArgs),

    /// Quote and pay
    Checkout(CheckoutArgs),

    /// Browse completed orders
    Orders(OrdersArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Login(args) => commands::session::login(args, &ctx).await,
        Commands::Logout => commands::session::logout(&ctx).await,
        Commands::Whoami => commands::session::whoami(&ctx).await,
        Commands::Catalog => commands::catalog::run(&ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
