//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod orders;
pub mod session;

use clap::{Args, Subcommand};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// User id to sign in as.
    pub user_id: String,

    /// Display name (defaults to the user id).
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// List cart lines and totals.
    List,
    /// Add a catalog product.
    Add {
        /// Product id.
        product: u64,
        /// Units to add.
        #[arg(short, long, default_value = "1")]
        qty: i64,
    },
    /// Set a line's quantity (0 removes it).
    Update {
        /// Product id.
        product: u64,
        /// New quantity.
        qty: i64,
    },
    /// Remove a line.
    Remove {
        /// Product id.
        product: u64,
    },
    /// Include lines in checkout.
    Select {
        /// Product ids.
        products: Vec<u64>,
        /// Select every line.
        #[arg(long, conflicts_with = "products")]
        all: bool,
    },
    /// Exclude lines from checkout.
    Deselect {
        /// Product ids.
        products: Vec<u64>,
        /// Deselect every line.
        #[arg(long, conflicts_with = "products")]
        all: bool,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    #[command(subcommand)]
    pub command: CheckoutCommand,
}

#[derive(Subcommand)]
pub enum CheckoutCommand {
    /// Show totals for the selected lines.
    Quote,
    /// Pay for the selected lines.
    Pay {
        /// Payment method (wallet, visa, mastercard, amex, paypal, alipay, wechat_pay).
        #[arg(short, long)]
        method: Option<String>,

        /// Recipient name.
        #[arg(long)]
        recipient: Option<String>,

        /// Shipping address.
        #[arg(long)]
        address: Option<String>,

        /// Contact phone.
        #[arg(long)]
        phone: Option<String>,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,

    /// Show only the last N orders.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List completed orders.
    List,
    /// Show one order.
    Show {
        /// Order id.
        order_id: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
